mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_FAILURE, EXIT_INPUT_ERROR};
use launchmeta_core::{parse_config_file, ReconcileConfig, Reconciler};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "launchmeta",
    version,
    about = "Deterministic reconciliation of launcher version metadata"
)]
struct Cli {
    /// TOML file overriding the built-in fixup tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile base-platform release documents and their windowing variants.
    Base {
        /// JSON array of base release documents.
        #[arg(long)]
        input: PathBuf,
        /// Root of the canonical metadata tree.
        #[arg(long)]
        out: PathBuf,
    },
    /// Reconcile add-on releases against the base records already in the tree.
    Addon {
        /// JSON array of add-on release bundles.
        #[arg(long)]
        input: PathBuf,
        /// Root of the canonical metadata tree.
        #[arg(long)]
        out: PathBuf,
    },
    /// List windowing variants with their content hash and classification.
    Variants {
        /// JSON array of base release documents.
        #[arg(long)]
        input: PathBuf,
    },
    /// Finalize recommended runtimes and write one document per major version.
    Runtimes {
        /// JSON array of runtime candidates.
        #[arg(long)]
        input: PathBuf,
        /// Root of the canonical metadata tree.
        #[arg(long)]
        out: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<ReconcileConfig, String> {
    match path {
        Some(p) => parse_config_file(p).map_err(|e| format!("config error: {e}")),
        None => Ok(ReconcileConfig::default()),
    }
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LAUNCHMETA_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let result = load_config(cli.config.as_deref()).and_then(|config| {
        let reconciler = Reconciler::new(config);
        match cli.command {
            Commands::Base { input, out } => {
                commands::base::run(&reconciler, &input, &out, json_output)
            }
            Commands::Addon { input, out } => {
                commands::addon::run(&reconciler, &input, &out, json_output)
            }
            Commands::Variants { input } => {
                commands::variants::run(&reconciler, &input, json_output)
            }
            Commands::Runtimes { input, out } => {
                commands::runtimes::run(&reconciler, &input, &out, json_output)
            }
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("config error:") || msg.starts_with("input error:") {
                EXIT_INPUT_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
