//! cssprune - remove unused rules from stylesheets
//!
//! Selectors are kept when they might match something in a corpus of HTML
//! documents and auxiliary text files, or when a configured override says
//! so. Matching is approximate and always errs on the side of keeping.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! 1. **File Discovery** - Expand the HTML, CSS and word globs
//! 2. **Extraction** - Build the usage indices from every file in parallel
//! 3. **Purge** - Stream each stylesheet through the purge engine
//! 4. **Reporting** - Summarize what was kept and removed

pub mod config;
pub mod css;
pub mod discovery;
pub mod extract;
pub mod purge;
pub mod report;
pub mod selector;
pub mod usage;

pub use config::Config;
pub use discovery::{FileFinder, FileSet};
pub use extract::{Extracted, Extractor, Overrides};
pub use purge::{PurgeError, PurgeStats, Purger};
pub use report::{FileReport, ReportFormat, Reporter};
pub use selector::{Chain, Compound};
pub use usage::{CssUsage, UsageIndex};
