use crate::config::Config;
use serde::Serialize;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Role of a discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Markup feeding the seen-node index
    Html,
    /// Stylesheet to purge, also scanned for font and animation usage
    Css,
    /// Free text feeding the word index
    Words,
}

impl FileKind {
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Html => "HTML",
            FileKind::Css => "CSS",
            FileKind::Words => "words",
        }
    }
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid glob pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Represents a discovered file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl SourceFile {
    pub fn new(path: PathBuf, kind: FileKind) -> Self {
        Self { path, kind }
    }

    pub fn read_contents(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// Discovered files by role, each list in glob order
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    pub html: Vec<SourceFile>,
    pub css: Vec<SourceFile>,
    pub words: Vec<SourceFile>,
}

impl FileSet {
    pub fn total(&self) -> usize {
        self.html.len() + self.css.len() + self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.html.iter().chain(&self.css).chain(&self.words)
    }
}

/// Expands the configured globs into files
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn find_files(&self) -> Result<FileSet, DiscoveryError> {
        let excludes = self
            .config
            .exclude
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let files = FileSet {
            html: self.expand(&self.config.html, FileKind::Html, &excludes)?,
            css: self.expand(&self.config.css, FileKind::Css, &excludes)?,
            words: self.expand(&self.config.words, FileKind::Words, &excludes)?,
        };

        debug!(
            "Found {} HTML, {} CSS and {} word files",
            files.html.len(),
            files.css.len(),
            files.words.len()
        );
        Ok(files)
    }

    /// Expand globs in order, dropping directories, excluded paths and
    /// files already matched by an earlier glob
    fn expand(
        &self,
        patterns: &[String],
        kind: FileKind,
        excludes: &[glob::Pattern],
    ) -> Result<Vec<SourceFile>, DiscoveryError> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for pattern in patterns {
            let entries = glob::glob(pattern).map_err(|source| DiscoveryError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;

            let before = files.len();
            for entry in entries {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    DiscoveryError::Unreadable {
                        path,
                        source: io::Error::from(e),
                    }
                })?;

                if path.is_dir() {
                    continue;
                }

                if is_excluded(&path, excludes) {
                    trace!("Excluding: {}", path.display());
                    continue;
                }

                if seen.insert(path.clone()) {
                    trace!("Found {:?}: {}", kind, path.display());
                    files.push(SourceFile::new(path, kind));
                }
            }

            if files.len() == before {
                debug!("No {} files matched {}", kind.label(), pattern);
            }
        }

        Ok(files)
    }
}

fn compile(pattern: &str) -> Result<glob::Pattern, DiscoveryError> {
    glob::Pattern::new(pattern).map_err(|source| DiscoveryError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn is_excluded(path: &Path, excludes: &[glob::Pattern]) -> bool {
    excludes.iter().any(|pattern| pattern.matches_path(path))
}
