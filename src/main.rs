//! sbom-graph: project SBOM documents into graph elements
//!
//! Reads `CycloneDX` and SPDX JSON documents and writes one typed node record
//! per document, component, vulnerability and external reference.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_graph::{
    cli,
    config::{AppConfig, CliOverrides, CONFIG_DIR_NAME, CONFIG_FILE_NAMES},
    model::RecordLayout,
    pipeline::{exit_codes, OutputFormat},
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported SBOM Formats:",
        "\n  CycloneDX: JSON (bomFormat \"CycloneDX\")",
        "\n  SPDX:      JSON (top-level SPDXID)",
        "\n\nOutput Formats:",
        "\n  jsonl, json"
    )
}

#[derive(Parser)]
#[command(name = "sbom-graph")]
#[command(author = "Binarly.io")]
#[command(version, long_version = build_long_version())]
#[command(about = "Project SBOM documents into graph elements", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Every document was projected
    1  One or more documents failed or were not recognized
    2  Error occurred

EXAMPLES:
    # Project a directory of SBOMs to JSON Lines on stdout
    sbom-graph project ./sboms

    # Write a pretty JSON array with attributes merged into each record
    sbom-graph project bom.cdx.json -o elements.json --format json --layout inline

    # Check which documents would be recognized
    sbom-graph detect ./sboms")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `project` subcommand
#[derive(Parser)]
struct ProjectArgs {
    /// SBOM files or directories to project
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Record encoding
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Where attributes go in each record
    #[arg(long)]
    layout: Option<RecordLayout>,

    /// Stop at the first document that fails to project
    #[arg(long)]
    fail_fast: bool,

    /// Project documents one at a time
    #[arg(long)]
    no_parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project SBOM documents into graph element records
    Project(ProjectArgs),

    /// Report the detected format of each document without projecting it
    Detect {
        /// SBOM files or directories to inspect
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the JSON Schema of the configuration file
    ConfigSchema {
        /// Write the schema to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show where configuration files are searched for
    Path,
    /// Write an example .sbom-graph.yaml in the current directory
    Init,
}

impl ProjectArgs {
    /// What was set on the command line.
    fn overrides(&self, quiet: bool) -> CliOverrides {
        CliOverrides {
            layout: self.layout,
            format: self.format,
            output_file: self.output.clone(),
            fail_fast: self.fail_fast,
            no_parallel: self.no_parallel,
            quiet,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Project(args) => {
            let (config, loaded_from) = AppConfig::from_file_with_overrides(
                cli.config.as_deref(),
                &args.overrides(cli.quiet),
            );
            if let Some(path) = loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }
            cli::run_project(args.paths, config)
        }

        Commands::Detect { paths } => {
            let (config, _) = sbom_graph::config::load_or_default(cli.config.as_deref());
            cli::run_detect(paths, config)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-graph", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = sbom_graph::config::generate_json_schema()
                .context("failed to serialize schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    sbom_graph::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir().ok().map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (git root is checked after the current directory):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match sbom_graph::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".sbom-graph.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = sbom_graph::config::generate_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
