//! Push-style tokenizer driver backed by quick-xml.
//!
//! quick-xml is a pull parser; [`Tokenizer::run`] pulls events, resolves
//! namespaces, and pushes [`StartElement`]/[`EndElement`]/character events
//! into a [`ContentHandler`]. It also enforces the document-level rules a
//! pull parser leaves to its caller (a single root element, no stray text
//! outside it, every element closed, every prefix bound) and attaches a
//! line/column location to every failure.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{Failure, ParseError, ParseLocation};
use crate::events::{Attribute, ContentHandler, EndElement, StartElement};

mod locator;

use locator::LineTracker;

/// Drives a [`ContentHandler`] from a character stream.
pub struct Tokenizer<R> {
    reader: NsReader<LineTracker<R>>,
    open: Vec<String>,
    root_closed: bool,
}

impl<R: BufRead> Tokenizer<R> {
    /// Tokenizer over `input`
    pub fn new(input: R) -> Self {
        let mut reader = NsReader::from_reader(LineTracker::new(input));
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;
        config.trim_text(false);

        Self {
            reader,
            open: Vec::new(),
            root_closed: false,
        }
    }

    /// Location just past the last event read
    pub fn location(&self) -> ParseLocation {
        self.locate(self.reader.buffer_position() as u64)
    }

    fn error_location(&self) -> ParseLocation {
        self.locate(self.reader.error_position() as u64)
    }

    fn locate(&self, offset: u64) -> ParseLocation {
        self.reader.get_ref().locate(offset)
    }

    /// Tokenize the whole input, pushing every event into `handler`.
    ///
    /// Stops at the first failure, whether raised by the tokenizer or by the
    /// handler.
    pub fn run<H: ContentHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let mut buf = Vec::new();
        loop {
            let (namespace, event) = match self.reader.read_resolved_event_into(&mut buf) {
                Ok((resolved, event)) => (owned_namespace(resolved), event),
                Err(e) => return Err(Failure::Xml(e).at(self.error_location())),
            };

            let finished = self
                .dispatch(namespace, event, handler)
                .map_err(|failure| failure.at(self.location()))?;
            if finished {
                return Ok(());
            }
            buf.clear();
        }
    }

    fn dispatch<H: ContentHandler>(
        &mut self,
        namespace: Result<String, Failure>,
        event: Event<'_>,
        handler: &mut H,
    ) -> Result<bool, Failure> {
        match event {
            Event::Start(e) => {
                if self.root_closed {
                    return Err(Failure::Structure(
                        "content after the root element".to_string(),
                    ));
                }
                let element = self.start_element(namespace?, &e)?;
                self.open.push(element.name.clone());
                handler.start_element(element)?;
            }
            Event::End(e) => {
                let name = std::str::from_utf8(e.name().as_ref())?.to_owned();
                self.open.pop();
                if self.open.is_empty() {
                    self.root_closed = true;
                }
                handler.end_element(EndElement {
                    name,
                    namespace: namespace?,
                })?;
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                self.characters(&text, handler)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e)?;
                self.characters(text, handler)?;
            }
            Event::Eof => {
                if let Some(name) = self.open.last() {
                    return Err(Failure::Structure(format!(
                        "unexpected end of input, element <{name}> is not closed"
                    )));
                }
                if !self.root_closed {
                    return Err(Failure::Structure("no root element".to_string()));
                }
                handler.end_document()?;
                return Ok(true);
            }
            // Declarations, comments and processing instructions carry no
            // content; DOCTYPE is skipped and no external DTD is ever loaded.
            _ => {}
        }
        Ok(false)
    }

    fn characters<H: ContentHandler>(&self, text: &str, handler: &mut H) -> Result<(), Failure> {
        if self.open.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(Failure::Structure(
                "text outside the root element".to_string(),
            ));
        }
        handler.characters(text)
    }

    fn start_element(
        &self,
        namespace: String,
        e: &BytesStart<'_>,
    ) -> Result<StartElement, Failure> {
        let name = std::str::from_utf8(e.name().as_ref())?.to_owned();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| Failure::Xml(quick_xml::Error::from(e)))?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let name = std::str::from_utf8(attr.key.as_ref())?.to_owned();
            let value = attr
                .decode_and_unescape_value(self.reader.decoder())?
                .into_owned();
            attributes.push(Attribute { name, value });
        }
        Ok(StartElement {
            name,
            namespace,
            attributes,
        })
    }
}

/// Copy a namespace resolution out of the reader's namespace buffer.
fn owned_namespace(resolved: ResolveResult<'_>) -> Result<String, Failure> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(Failure::Structure(format!(
            "namespace prefix `{}` is not bound",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}
