//! Command-line tool for checking MCP Apps host contexts

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pulseengine_mcp_apps_conformance::{
    generate_test_cases, host_context_schema, validate, ConformanceConfig, ConformanceError,
    ConformanceReport, OutputFormat, Transcript,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mcp-apps-check")]
#[command(about = "Check MCP Apps hostContext payloads for conformance")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a payload or a captured transcript
    Check {
        /// Payload, JSON array of messages, or JSON lines transcript
        file: PathBuf,

        /// Configuration file path
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Output format (text, json, yaml)
        #[arg(long, short)]
        format: Option<OutputFormat>,

        /// Exit with error code if the grade is below the configured minimum
        #[arg(long)]
        strict: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the missing, unexpected and valid paths of a payload
    Validate {
        /// Payload, JSON array of messages, or JSON lines transcript
        file: PathBuf,
    },

    /// Print the generated test case suite
    Cases {
        /// Output format (text, json, yaml)
        #[arg(long, short, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Check {
            file,
            config,
            format,
            strict,
            no_color,
        } => run_check(&file, config.as_deref(), format, strict, no_color),
        Commands::Validate { file } => run_validate(&file).map(|()| true),
        Commands::Cases { format } => run_cases(format).map(|()| true),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            process::exit(2);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ConformanceConfig> {
    let mut config = match path {
        Some(path) => ConformanceConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ConformanceConfig::default(),
    };
    config
        .apply_env()
        .context("Invalid configuration in environment")?;
    Ok(config)
}

fn load_payload(file: &Path) -> Result<serde_json::Value> {
    let transcript = Transcript::from_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    debug!(entries = transcript.entries().len(), "Transcript loaded");
    transcript
        .host_context_payload()
        .ok_or_else(|| ConformanceError::no_host_context(file.display().to_string()).into())
}

/// Returns whether the run passed
fn run_check(
    file: &Path,
    config_path: Option<&Path>,
    format: Option<OutputFormat>,
    strict: bool,
    no_color: bool,
) -> Result<bool> {
    let mut config = load_config(config_path)?;
    if let Some(format) = format {
        config.report.format = format;
    }
    if no_color {
        config.report.color = false;
    }

    info!("Checking host context from {}", file.display());
    let transcript = Transcript::from_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = ConformanceReport::from_transcript(file.display().to_string(), &transcript, &config)?;

    let rendered = report.render(config.report.format, config.report.color, config.report.max_listed)?;
    match &config.report.output_path {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{}", report.summary());
        }
        None => println!("{}", rendered),
    }

    if strict && !report.meets(config.report.minimum_grade) {
        error!(
            "Grade {} is below the required minimum {}",
            report.score.grade.letter, config.report.minimum_grade
        );
        return Ok(false);
    }
    Ok(true)
}

fn run_validate(file: &Path) -> Result<()> {
    let payload = load_payload(file)?;
    let result = validate(&payload);

    for (label, paths) in [
        ("missing", &result.missing),
        ("unexpected", &result.unexpected),
        ("valid", &result.valid),
    ] {
        println!("{} ({}):", label.bold(), paths.len());
        for path in paths {
            println!("  {}", path);
        }
    }
    Ok(())
}

fn run_cases(format: OutputFormat) -> Result<()> {
    let cases = generate_test_cases(host_context_schema());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cases)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&cases)?),
        OutputFormat::Text => {
            if cases.is_empty() {
                bail!("Schema produced no test cases");
            }
            let width = cases.iter().map(|c| c.path.len()).max().unwrap_or(0);
            for case in &cases {
                let mut line = format!(
                    "{:<width$}  {}",
                    case.path,
                    case.expected_type,
                    width = width
                );
                if let Some(values) = &case.enum_values {
                    line.push_str(&format!(" [{}]", values.join(", ")));
                }
                if case.optional {
                    line.push_str(" (optional)");
                }
                println!("{}", line);
            }
            println!("\n{} test cases", cases.len());
        }
    }
    Ok(())
}
