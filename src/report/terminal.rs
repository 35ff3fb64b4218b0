use super::{savings, totals, FileReport};
use crate::purge::PurgeStats;
use colored::Colorize;
use miette::Result;

/// Colored summary on stderr; stdout is reserved for the purged CSS
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, files: &[FileReport]) -> Result<()> {
        if files.is_empty() {
            eprintln!("{}", "No stylesheets purged.".yellow().bold());
            return Ok(());
        }

        eprintln!();
        eprintln!(
            "{}",
            format!("Purged {} stylesheet(s):", files.len()).green().bold()
        );
        eprintln!();

        for file in files {
            eprintln!("{}", file.path.display().to_string().cyan().bold());
            self.print_stats(&file.stats);
            eprintln!();
        }

        self.print_summary(&totals(files));
        Ok(())
    }

    fn print_stats(&self, stats: &PurgeStats) {
        eprintln!(
            "  {} {} kept, {} removed",
            "selectors".dimmed(),
            stats.selectors_kept.to_string().green(),
            stats.selectors_removed.to_string().red()
        );

        if stats.rulesets_removed > 0 {
            eprintln!(
                "  {} {} removed",
                "rulesets".dimmed(),
                stats.rulesets_removed.to_string().red()
            );
        }
        if stats.font_faces_removed > 0 || stats.keyframes_removed > 0 {
            eprintln!(
                "  {} {} font faces, {} keyframes removed",
                "at-rules".dimmed(),
                stats.font_faces_removed.to_string().red(),
                stats.keyframes_removed.to_string().red()
            );
        }

        eprintln!(
            "  {} {} -> {} bytes ({:.1}% smaller)",
            "size".dimmed(),
            stats.bytes_in,
            stats.bytes_out,
            savings(stats)
        );
    }

    fn print_summary(&self, total: &PurgeStats) {
        eprintln!("{}", "Summary:".bold());
        eprintln!(
            "  {} selectors kept, {} removed, {} rulesets dropped",
            total.selectors_kept.to_string().green().bold(),
            total.selectors_removed.to_string().red().bold(),
            total.rulesets_removed
        );
        eprintln!(
            "  {} -> {} bytes ({:.1}% smaller)",
            total.bytes_in,
            total.bytes_out,
            savings(total)
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
