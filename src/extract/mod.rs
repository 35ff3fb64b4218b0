//! Parallel extraction of usage from every discovered file
//!
//! Each file is read and extracted on its own rayon task. Results are merged
//! into one accumulator per kind under that kind's lock; failures are
//! collected and reported together once every task has finished.

use crate::config::Config;
use crate::discovery::{FileKind, FileSet, SourceFile};
use crate::usage::{
    CssUsage, CssUsageError, HtmlError, HtmlExtractor, HtmlUsage, PatternError, PatternSet,
    PresetError, UsageIndex, WordExtractor, WordUsage, DEFAULT_PRESET,
};
use rayon::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("usage extraction failed for {} file(s): {}", .0.len(), summarize(.0))]
    Failed(Vec<FileFailure>),
}

/// Why a single file could not be extracted
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Css(#[from] CssUsageError),
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: FileError,
}

fn summarize(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.path.display(), failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum OverrideError {
    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Always-kept selectors and patterns, compiled before any file is read
#[derive(Debug, Clone)]
pub struct Overrides {
    pub preset: HtmlUsage,
    pub classes: PatternSet,
    pub ids: PatternSet,
}

impl Overrides {
    pub fn from_config(config: &Config) -> Result<Self, OverrideError> {
        let mut selectors: Vec<&str> = DEFAULT_PRESET.to_vec();
        selectors.extend(config.include.iter().map(String::as_str));

        Ok(Self {
            preset: HtmlUsage::from_selectors(&selectors)?,
            classes: PatternSet::new(&config.include_class)?,
            ids: PatternSet::new(&config.include_id)?,
        })
    }
}

/// Frozen accumulators after the extraction phase
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub html: HtmlUsage,
    pub words: WordUsage,
    pub css: CssUsage,
}

impl Extracted {
    /// Combine the corpus indices with the overrides into the index the
    /// purge pass consults
    pub fn into_index(self, overrides: Overrides) -> (UsageIndex, CssUsage) {
        let mut members = vec![UsageIndex::Html(self.html)];
        if !self.words.is_empty() {
            members.push(UsageIndex::Words(self.words));
        }
        if !overrides.classes.is_empty() {
            members.push(UsageIndex::ClassPatterns(overrides.classes));
        }
        if !overrides.ids.is_empty() {
            members.push(UsageIndex::IdPatterns(overrides.ids));
        }
        members.push(UsageIndex::Preset(overrides.preset));

        for member in &members {
            match member {
                UsageIndex::ClassPatterns(patterns) | UsageIndex::IdPatterns(patterns) => {
                    debug!("Usage index: {} ({} patterns)", member.name(), patterns.len());
                }
                _ => debug!("Usage index: {}", member.name()),
            }
        }

        (UsageIndex::Union(members), self.css)
    }
}

/// Runs the per-file extractors over a file set
pub struct Extractor {
    html: HtmlExtractor,
    words: WordExtractor,
}

struct Accumulators {
    html: Mutex<HtmlUsage>,
    words: Mutex<WordUsage>,
    css: Mutex<CssUsage>,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            html: HtmlExtractor::new(),
            words: WordExtractor::new(),
        }
    }

    pub fn extract(&self, files: &FileSet) -> Result<Extracted, ExtractError> {
        let jobs: Vec<&SourceFile> = files.iter().collect();
        info!("Extracting usage from {} files in parallel...", files.total());

        let accumulators = Accumulators {
            html: Mutex::new(HtmlUsage::new()),
            words: Mutex::new(WordUsage::new()),
            css: Mutex::new(CssUsage::new()),
        };
        let failures = Mutex::new(Vec::new());

        jobs.par_iter().for_each(|file| {
            if let Err(error) = self.extract_file(file, &accumulators) {
                debug!("Extraction failed for {}: {}", file.path.display(), error);
                lock(&failures).push(FileFailure {
                    path: file.path.clone(),
                    error,
                });
            }
        });

        let failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        if !failures.is_empty() {
            return Err(ExtractError::Failed(failures));
        }

        let extracted = Extracted {
            html: accumulators.html.into_inner().unwrap_or_else(PoisonError::into_inner),
            words: accumulators.words.into_inner().unwrap_or_else(PoisonError::into_inner),
            css: accumulators.css.into_inner().unwrap_or_else(PoisonError::into_inner),
        };

        info!(
            "Extracted {} nodes, {} words, {} font families, {} animations",
            extracted.html.len(),
            extracted.words.len(),
            extracted.css.font_faces().len(),
            extracted.css.keyframes().len()
        );

        Ok(extracted)
    }

    fn extract_file(&self, file: &SourceFile, accumulators: &Accumulators) -> Result<(), FileError> {
        let contents = file.read_contents()?;

        match file.kind {
            FileKind::Html => {
                let usage = self.html.extract(&contents)?;
                debug!("Processed HTML file: {} ({} nodes)", file.path.display(), usage.len());
                lock(&accumulators.html).merge(usage);
            }
            FileKind::Words => {
                let usage = self.words.extract(&contents);
                debug!("Processed word file: {} ({} words)", file.path.display(), usage.len());
                lock(&accumulators.words).merge(usage);
            }
            FileKind::Css => {
                let usage = CssUsage::extract(&contents)?;
                debug!("Extracted usage from CSS file: {}", file.path.display());
                lock(&accumulators.css).merge(usage);
            }
        }

        Ok(())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
