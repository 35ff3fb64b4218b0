use super::{savings, totals, FileReport};
use crate::purge::PurgeStats;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, files: &[FileReport]) -> Result<()> {
        let json = self.render(files)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write report: {}", path.display()))?;
            info!("Report written to: {}", path.display());
        } else {
            eprintln!("{}", json);
        }

        Ok(())
    }

    pub fn render(&self, files: &[FileReport]) -> Result<String> {
        let report = JsonReport::from_files(files);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    files: Vec<JsonFile<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: String,
    #[serde(flatten)]
    stats: &'a PurgeStats,
    savings_percent: f64,
}

#[derive(Serialize)]
struct JsonSummary {
    file_count: usize,
    #[serde(flatten)]
    stats: PurgeStats,
    savings_percent: f64,
}

impl<'a> JsonReport<'a> {
    fn from_files(files: &'a [FileReport]) -> Self {
        let total = totals(files);

        Self {
            version: env!("CARGO_PKG_VERSION"),
            files: files
                .iter()
                .map(|file| JsonFile {
                    path: file.path.to_string_lossy().to_string(),
                    stats: &file.stats,
                    savings_percent: savings(&file.stats),
                })
                .collect(),
            summary: JsonSummary {
                file_count: files.len(),
                stats: total,
                savings_percent: savings(&total),
            },
        }
    }
}
