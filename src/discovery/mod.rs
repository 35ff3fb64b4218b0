mod file_finder;

pub use file_finder::{DiscoveryError, FileFinder, FileKind, FileSet, SourceFile};
