use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a purge run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Globs of stylesheets to purge, in output order
    pub css: Vec<String>,

    /// Globs of HTML documents whose start tags mark selectors as used
    pub html: Vec<String>,

    /// Globs of auxiliary files (templates, scripts) scanned for words
    pub words: Vec<String>,

    /// Selectors that are always kept
    pub include: Vec<String>,

    /// Class names matching any of these regexes are always kept
    pub include_class: Vec<String>,

    /// Ids matching any of these regexes are always kept
    pub include_id: Vec<String>,

    /// Globs removed from every expansion
    pub exclude: Vec<String>,

    /// Output file, stdout when unset
    pub output: Option<PathBuf>,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// Where to write the report, stderr when unset
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            css: vec![],
            html: vec![],
            words: vec![],
            include: vec![],
            include_class: vec![],
            include_id: vec![],
            exclude: vec!["**/node_modules/**".to_string()],
            output: None,
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".cssprune.yml",
            ".cssprune.yaml",
            ".cssprune.toml",
            "cssprune.yml",
            "cssprune.yaml",
            "cssprune.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Whether any input glob was configured at all
    pub fn has_inputs(&self) -> bool {
        !self.css.is_empty()
    }
}
