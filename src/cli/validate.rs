use anyhow::Result;
use log::info;
use std::path::PathBuf;

use super::survey::{open, record_parser, survey};
use xmlmap::ParserConfig;

/// Validate a document, mapping it along the way
pub fn run(
    input: PathBuf,
    config: ParserConfig,
    schema: Option<String>,
    namespace: Option<String>,
) -> Result<()> {
    let configured = config.validation.clone();
    let Some(schema) = schema.or_else(|| configured.as_ref().map(|v| v.schema.clone())) else {
        anyhow::bail!("No schema given: pass --schema or set [validation] in the config file");
    };
    let namespace = namespace
        .or_else(|| configured.map(|v| v.default_namespace))
        .unwrap_or_default();

    info!("Validating {} against {}", input.display(), schema);
    let tags = survey(&input)?;
    let parser = record_parser(config, tags.keys());

    match parser.start_with_validation(open(&input)?, &namespace, &schema) {
        Ok(objects) => {
            #[cfg(feature = "colorized_output")]
            {
                println!(
                    "{} {} ({} elements)",
                    console::style("OK").green().bold(),
                    input.display(),
                    objects.len()
                );
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                println!("OK {} ({} elements)", input.display(), objects.len());
            }
            Ok(())
        }
        Err(e) => {
            #[cfg(feature = "colorized_output")]
            {
                eprintln!(
                    "{} {}: {}",
                    console::style("INVALID").red().bold(),
                    input.display(),
                    e
                );
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                eprintln!("INVALID {}: {}", input.display(), e);
            }
            std::process::exit(1);
        }
    }
}
