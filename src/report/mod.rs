mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::purge::PurgeStats;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "terminal" => Ok(ReportFormat::Terminal),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown report format '{}', expected terminal or json",
                other
            )),
        }
    }
}

/// Purge outcome for one stylesheet
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub stats: PurgeStats,
}

impl FileReport {
    pub fn new(path: PathBuf, stats: PurgeStats) -> Self {
        Self { path, stats }
    }
}

/// Sum of every file's counters
pub fn totals(files: &[FileReport]) -> PurgeStats {
    let mut total = PurgeStats::default();
    for file in files {
        total += file.stats;
    }
    total
}

/// Share of the input bytes that were dropped, in percent
pub fn savings(stats: &PurgeStats) -> f64 {
    if stats.bytes_in == 0 {
        return 0.0;
    }
    let removed = stats.bytes_in.saturating_sub(stats.bytes_out);
    removed as f64 * 100.0 / stats.bytes_in as f64
}

/// Reporter for purge results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    pub fn report(&self, files: &[FileReport]) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new().report(files),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(files),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(bytes_in: u64, bytes_out: u64) -> PurgeStats {
        PurgeStats {
            bytes_in,
            bytes_out,
            selectors_kept: 1,
            ..PurgeStats::default()
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("Terminal".parse::<ReportFormat>(), Ok(ReportFormat::Terminal));
        assert!("sarif".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_totals_and_savings() {
        let files = vec![
            FileReport::new(PathBuf::from("a.css"), stats(100, 25)),
            FileReport::new(PathBuf::from("b.css"), stats(100, 75)),
        ];

        let total = totals(&files);
        assert_eq!(total.bytes_in, 200);
        assert_eq!(total.bytes_out, 100);
        assert_eq!(total.selectors_kept, 2);
        assert_eq!(savings(&total), 50.0);
        assert_eq!(savings(&PurgeStats::default()), 0.0);
    }
}
