//! Configuration for conformance runs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::grading::{GradeLetter, ScoringPolicy};
use crate::{ConformanceError, ConformanceResult};

/// Environment variable selecting the report format
pub const ENV_REPORT_FORMAT: &str = "MCP_APPS_REPORT_FORMAT";
/// Environment variable setting the minimum passing grade
pub const ENV_MINIMUM_GRADE: &str = "MCP_APPS_MINIMUM_GRADE";
/// Environment variable making undocumented enum values count as failures
pub const ENV_STRICT_ENUMS: &str = "MCP_APPS_STRICT_ENUMS";
/// Conventional switch disabling colored output
pub const ENV_NO_COLOR: &str = "NO_COLOR";

/// Configuration for a conformance run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceConfig {
    /// How test outcomes are scored
    pub scoring: ScoringPolicy,

    /// Which checks beyond the generated suite contribute issues
    pub checks: ChecksConfig,

    /// Report output settings
    pub report: ReportConfig,
}

/// Optional checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Report container objects that satisfy none of a union group's fields
    pub union_groups: bool,

    /// Report host properties the schema does not declare
    pub unexpected_properties: bool,
}

/// Report output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format
    pub format: OutputFormat,

    /// Lowest grade still treated as passing in strict mode
    pub minimum_grade: GradeLetter,

    /// Colorize text output
    pub color: bool,

    /// Write the report here instead of stdout
    pub output_path: Option<PathBuf>,

    /// Maximum number of unexpected properties listed in text output
    pub max_listed: usize,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            union_groups: true,
            unexpected_properties: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            minimum_grade: GradeLetter::C,
            color: true,
            output_path: None,
            max_listed: 50,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConformanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(ConformanceError::configuration(format!(
                "Unknown output format '{other}', expected text, json or yaml"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        })
    }
}

impl ConformanceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConformanceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConformanceError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ConformanceError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load defaults overridden by environment variables
    pub fn from_env() -> ConformanceResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override settings from the process environment
    pub fn apply_env(&mut self) -> ConformanceResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override settings from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConformanceResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(format) = lookup(ENV_REPORT_FORMAT) {
            self.report.format = format.parse()?;
        }

        if let Some(grade) = lookup(ENV_MINIMUM_GRADE) {
            self.report.minimum_grade = grade.parse().map_err(|_| {
                ConformanceError::configuration(format!("Invalid {}: {}", ENV_MINIMUM_GRADE, grade))
            })?;
        }

        if let Some(strict) = lookup(ENV_STRICT_ENUMS) {
            let strict = parse_flag(&strict).ok_or_else(|| {
                ConformanceError::configuration(format!("Invalid {}: {}", ENV_STRICT_ENUMS, strict))
            })?;
            self.scoring.count_warnings_as_passed = !strict;
        }

        if lookup(ENV_NO_COLOR).is_some_and(|v| !v.is_empty()) {
            self.report.color = false;
        }

        self.validate()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> ConformanceResult<()> {
        if self.report.max_listed == 0 {
            return Err(ConformanceError::configuration(
                "report.max_listed must be greater than 0",
            ));
        }

        if let Some(parent) = self
            .report
            .output_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            if !parent.is_dir() {
                return Err(ConformanceError::configuration(format!(
                    "Report output directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
