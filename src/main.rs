use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use opforge::accel::{self, DEFAULT_VERSION};
use opforge::config::{LayerManifest, LoggingConfig, OpforgeConfig};
use opforge::factory::{self, Factory};

#[derive(Parser)]
#[command(
    name = "opforge",
    about = "Operator construction registry with capability-aware engine resolution",
    version,
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to $OPFORGE_CONFIG, then /etc/opforge/opforge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every layer of a TOML manifest and show the chosen implementation
    Resolve {
        /// Manifest with one [[layer]] table per operator
        manifest: PathBuf,

        /// Resolve as if the accelerated engine were present
        #[arg(long, conflicts_with = "native_only")]
        assume_accelerated: bool,

        /// Resolve with the accelerated engine switched off
        #[arg(long)]
        native_only: bool,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// List the registered operator types
    Types,

    /// Show what the accelerated engine supports in this build
    Probe {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    // stdout carries command output; diagnostics go to stderr.
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the configuration with a temporary stderr subscriber in place, so a
/// config file that cannot be read is reported before `[logging]` applies.
fn load_config(path: Option<&Path>) -> Result<OpforgeConfig> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::with_default(bootstrap, || match path {
        Some(path) => OpforgeConfig::load(path),
        None => Ok(OpforgeConfig::load_or_default()),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Resolve {
            manifest,
            assume_accelerated,
            native_only,
            json,
        } => {
            let mut probe = accel::detect(&config.accelerator);
            if assume_accelerated {
                probe.compiled = true;
                probe.available = true;
                probe.version.get_or_insert_with(|| DEFAULT_VERSION.to_string());
            }
            if native_only {
                probe = probe.disabled();
            }
            tracing::info!(manifest = %manifest.display(), available = probe.available, "Resolving layers");

            factory::install(Factory::with_builtins(probe)?)?;
            let manifest = LayerManifest::load(&manifest)?;

            let mut summaries = Vec::with_capacity(manifest.layers.len());
            for spec in &manifest.layers {
                let op = opforge::create(spec)
                    .with_context(|| format!("failed to resolve layer '{}'", spec.name))?;
                summaries.push(op.summary());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!("{:<20} | {:<20} | {:<28} | Engine", "Layer", "Type", "Implementation");
                println!("{:-<20}-|-{:-<20}-|-{:-<28}-|-{:-<11}", "", "", "", "");
                for s in &summaries {
                    println!(
                        "{:<20} | {:<20} | {:<28} | {}",
                        s.name, s.type_name, s.implementation, s.engine
                    );
                }
            }
        }
        Commands::Types => {
            let factory = factory::init(&config)?;
            for name in factory.registry().type_names() {
                println!("{}", name);
            }
        }
        Commands::Probe { json } => {
            let probe = accel::detect(&config.accelerator);
            if json {
                println!("{}", serde_json::to_string_pretty(&probe)?);
            } else {
                let yes_no = |b: bool| if b { "yes" } else { "no" };
                println!("\nAccelerated Engine Capabilities");
                println!("{:<24} : {}", "Compiled in", yes_no(probe.compiled));
                println!("{:<24} : {}", "Available", yes_no(probe.available));
                println!("{:<24} : {}", "Version", probe.version.as_deref().unwrap_or("-"));
                println!("{:<24} : {}", "Max LRN window", probe.max_lrn_window);
                println!("{:<24} : {}", "Dilated convolution", yes_no(probe.dilated_convolution));
                println!("{:<24} : {}", "Multi-output pooling", yes_no(probe.multi_output_pooling));
                println!("{:<24} : {}", "In-place max pooling", yes_no(probe.max_pooling_in_place));
                println!();
            }
        }
    }

    Ok(())
}
