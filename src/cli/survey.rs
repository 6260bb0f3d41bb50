//! Generic element record used by the subcommands, and the tag survey that
//! registers it for every element name in a document.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use xmlmap::prelude::*;
use xmlmap::tokenizer::Tokenizer;

/// Any element: its common naming attributes and its text.
#[derive(Debug, Default)]
pub struct Record {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Mapped for Record {
    fn describe(members: &mut Members<Self>) {
        members
            .field("id", |r: &mut Record, v: String| r.id = Some(v))
            .field("name", |r: &mut Record, v: String| r.name = Some(v));
    }
}

/// Counts start tags per element name.
#[derive(Default)]
struct TagCounter {
    counts: BTreeMap<String, usize>,
}

impl ContentHandler for TagCounter {
    fn start_element(&mut self, element: StartElement) -> Result<(), Failure> {
        *self.counts.entry(element.name).or_default() += 1;
        Ok(())
    }

    fn end_element(&mut self, _element: EndElement) -> Result<(), Failure> {
        Ok(())
    }

    fn characters(&mut self, _text: &str) -> Result<(), Failure> {
        Ok(())
    }
}

pub fn open(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Element names of the document at `path`, with occurrence counts.
pub fn survey(path: &Path) -> Result<BTreeMap<String, usize>> {
    let mut counter = TagCounter::default();
    Tokenizer::new(open(path)?)
        .run(&mut counter)
        .with_context(|| format!("{} is not well-formed", path.display()))?;
    Ok(counter.counts)
}

/// Parser mapping every tag in `tags` to [`Record`].
pub fn record_parser<'t>(
    config: ParserConfig,
    tags: impl IntoIterator<Item = &'t String>,
) -> XmlObjectParser {
    let mut parser = XmlObjectParser::with_config(config);
    for tag in tags {
        parser.map::<Record>(tag);
    }
    parser
}
