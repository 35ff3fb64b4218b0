use clap::Parser;
use cssprune::{
    Config, Extractor, FileFinder, FileReport, Overrides, Purger, ReportFormat, Reporter,
};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// cssprune - remove unused rules from stylesheets
#[derive(Parser, Debug)]
#[command(name = "cssprune")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSS files to purge (can be specified multiple times)
    #[arg(short, long, value_name = "GLOB")]
    css: Vec<String>,

    /// HTML files whose elements mark selectors as used
    #[arg(short = 'H', long, value_name = "GLOB")]
    html: Vec<String>,

    /// Auxiliary files (templates, scripts) scanned for class and id words
    #[arg(short, long, value_name = "GLOB")]
    words: Vec<String>,

    /// Selectors that are always kept
    #[arg(short, long, value_name = "SELECTOR")]
    include: Vec<String>,

    /// Class names matching this regex are always kept
    #[arg(long, value_name = "REGEX")]
    include_class: Vec<String>,

    /// Ids matching this regex are always kept
    #[arg(long, value_name = "REGEX")]
    include_id: Vec<String>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Output file for the purged CSS (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the purge report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    report_format: Option<OutputFormat>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output the purged CSS
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("cssprune v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(Path::new("."))?
    };

    // Override with CLI arguments
    if !cli.css.is_empty() {
        config.css = cli.css.clone();
    }
    if !cli.html.is_empty() {
        config.html = cli.html.clone();
    }
    if !cli.words.is_empty() {
        config.words = cli.words.clone();
    }
    config.include.extend(cli.include.iter().cloned());
    config.include_class.extend(cli.include_class.iter().cloned());
    config.include_id.extend(cli.include_id.iter().cloned());
    config.exclude.extend(cli.exclude.iter().cloned());
    if cli.output.is_some() {
        config.output = cli.output.clone();
    }
    if cli.report.is_some() {
        config.report.path = cli.report.clone();
    }

    Ok(config)
}

fn report_format(config: &Config, cli: &Cli) -> Result<ReportFormat> {
    match cli.report_format {
        Some(format) => Ok(format.into()),
        // a report path without an explicit format means JSON
        None if cli.report.is_some() => Ok(ReportFormat::Json),
        None => config
            .report
            .format
            .parse()
            .map_err(|e: String| miette::miette!("{}", e)),
    }
}

fn run(config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    if !config.has_inputs() {
        return Err(miette::miette!(
            "No CSS files given; pass --css or set `css` in a config file"
        ));
    }

    // Step 1: Compile overrides before touching any file
    let format = report_format(config, cli)?;
    let overrides = Overrides::from_config(config)
        .into_diagnostic()
        .wrap_err("Invalid include option")?;

    // Step 2: Discover files
    info!("Discovering files...");
    let files = FileFinder::new(config)
        .find_files()
        .into_diagnostic()
        .wrap_err("File discovery failed")?;

    info!(
        "Found {} HTML, {} CSS and {} word files",
        files.html.len(),
        files.css.len(),
        files.words.len()
    );

    if files.css.is_empty() {
        warn!("No CSS files matched the given patterns");
    }

    // Step 3: Extract usage
    let extracted = Extractor::new().extract(&files).into_diagnostic()?;
    let (index, css_usage) = extracted.into_index(overrides);

    // Step 4: Purge each stylesheet in discovery order
    let purger = Purger::new(&index, &css_usage);
    let mut out = open_output(config.output.as_deref())?;
    let mut reports = Vec::with_capacity(files.css.len());

    for file in &files.css {
        info!("Purging {}", file.path.display());
        let source = file
            .read_contents()
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", file.path.display()))?;

        let stats = purger
            .purge(&source, &mut out)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to purge {}", file.path.display()))?;

        reports.push(FileReport::new(file.path.clone(), stats));
    }

    out.flush()
        .into_diagnostic()
        .wrap_err("Failed to flush output")?;

    info!("Finished in {:.2}s", start_time.elapsed().as_secs_f64());

    // Step 5: Report
    if !cli.quiet || config.report.path.is_some() {
        Reporter::new(format, config.report.path.clone()).report(&reports)?;
    }

    Ok(())
}

fn open_output(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(
            File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    Ok(BufWriter::new(sink))
}
