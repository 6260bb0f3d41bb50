use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod check;
mod survey;
mod validate;

/// xmlmap - Streaming XML-to-Object Mapping
#[derive(Parser)]
#[command(name = "xmlmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Load parser settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a document is well-formed and count its elements
    Check {
        /// Input XML file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Validate a document against a schema while mapping it
    Validate {
        /// Input XML file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Schema file path or file: URL
        #[arg(short, long, value_name = "LOCATOR")]
        schema: Option<String>,

        /// Namespace given to elements written without one
        #[arg(short, long, value_name = "URI")]
        namespace: Option<String>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => xmlmap::ParserConfig::from_file(path)?,
        None => xmlmap::ParserConfig::default(),
    };

    match cli.command {
        Commands::Check { input } => check::run(input, config),
        Commands::Validate {
            input,
            schema,
            namespace,
        } => validate::run(input, config, schema, namespace),
    }
}
