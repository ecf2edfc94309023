use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pkgscan::{
    cache::RegistryCache,
    config::Config,
    model::ScanSummary,
    output::{format_result_to_string, print_result, OutputFormat},
    scanner::ScanEngine,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const FINDINGS: u8 = 1;
    pub const ERROR: u8 = 2;
}

#[derive(Parser)]
#[command(name = "pkgscan")]
#[command(
    author,
    version,
    about = "Detect compromised npm packages in project manifests and lockfiles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project for compromised packages
    Scan {
        /// Path to a config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory to scan (defaults to the configured root, then the current directory)
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Output format (table, json, github)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Exit with success even when compromised packages are found
        #[arg(long)]
        no_fail: bool,

        /// Only log warnings and errors
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,

        /// Log per-file detail
        #[arg(short, long)]
        verbose: bool,

        /// Clear the registry cache before scanning
        #[arg(long)]
        clear_cache: bool,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Where to write the file (defaults to ./.pkgscan.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Show the resolved configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the registry cache
    ClearCache,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (quiet, verbose) = match &cli.command {
        Commands::Scan { quiet, verbose, .. } => (*quiet, *verbose),
        _ => (false, false),
    };
    if let Err(e) = init_tracing(quiet, verbose) {
        eprintln!("Warning: {}", e);
    }

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

/// Logs go to stderr so stdout stays clean for JSON and CI output.
fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let default_level = if quiet {
        "pkgscan=warn"
    } else if verbose {
        "pkgscan=debug"
    } else {
        "pkgscan=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))
}

async fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Scan {
            config,
            directory,
            format,
            no_fail,
            clear_cache,
            output,
            ..
        } => {
            let config = Config::load(config.as_deref())?;
            let format = OutputFormat::from_str(&format).map_err(|e| anyhow::anyhow!(e))?;

            if clear_cache {
                RegistryCache::with_timeout_minutes(config.cache_timeout()).clear()?;
            }

            let root = directory
                .or_else(|| config.root_directory.clone())
                .unwrap_or_else(|| PathBuf::from("."));

            let summary = run_scan(&config, &root, format, output.as_deref()).await?;

            Ok(determine_exit_code(&summary, no_fail))
        }
        Commands::Init { force, path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(pkgscan::config::LOCAL_CONFIG_FILE));
            handle_init(&path, force)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { path } => {
            handle_config(path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            RegistryCache::default().clear()?;
            println!("Cache cleared.");
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(
    config: &Config,
    root: &Path,
    format: OutputFormat,
    output_file: Option<&Path>,
) -> Result<ScanSummary> {
    let is_interactive = format == OutputFormat::Table && output_file.is_none();

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Scanning {}...", root.display()));
        Some(pb)
    } else {
        None
    };

    let engine = ScanEngine::from_config(config);
    let result = engine.scan(root).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let summary = result.with_context(|| format!("Failed to scan {}", root.display()))?;

    if let Some(path) = output_file {
        let rendered = format_result_to_string(&summary, format, config.severity_level)?;
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Results written to: {}", path.display());
    } else {
        print_result(&summary, format, config.severity_level)?;
    }

    Ok(summary)
}

fn determine_exit_code(summary: &ScanSummary, no_fail: bool) -> u8 {
    if summary.has_findings() && !no_fail {
        exit_codes::FINDINGS
    } else {
        exit_codes::SUCCESS
    }
}

fn handle_init(path: &Path, force: bool) -> Result<()> {
    Config::write_default(path, force)?;
    println!("Created config file at: {}", path.display());
    Ok(())
}

fn handle_config(show_path: bool) -> Result<()> {
    if show_path {
        println!("Project: {}", pkgscan::config::LOCAL_CONFIG_FILE);
        println!("User:    {}", Config::config_path().display());
        return Ok(());
    }

    let config = Config::load(None)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
