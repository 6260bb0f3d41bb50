//! # xmlmap
//!
//! Command-line front end for the `xmlmap` mapping engine.
//!
//! ## Usage
//!
//! ```bash
//! # Check well-formedness and count elements
//! xmlmap check presets.xml
//!
//! # Validate against a schema, injecting a namespace into unqualified elements
//! xmlmap validate presets.xml --schema tagging-preset.xsd \
//!     --namespace http://josm.openstreetmap.de/tagging-preset-1.0
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
