//! # Schema Validation Pipeline
//!
//! Optional stage between the tokenizer and the object builder. A schema is
//! fetched by logical name through a [`ResourceLoader`], compiled by a
//! [`SchemaFactory`], and every event is checked by a fresh
//! [`SchemaValidator`] before it reaches the next handler:
//!
//! ```text
//! Tokenizer -> NamespaceInjector -> ValidatingHandler -> ObjectBuilder
//! ```
//!
//! Violations abort the parse through the same error path as tokenizer
//! errors.
//!
//! The built-in [`XsdSubset`] factory understands the parts of W3C XML Schema
//! that decide which elements and attributes may appear; plug in another
//! [`SchemaFactory`] for full content-model validation.

use std::io::Read;

use log::debug;

use crate::error::{BoxError, Failure, ParseError};
use crate::events::{ContentHandler, EndElement, StartElement};

mod resources;
mod xsd;

pub use resources::{CachedResources, ResourceLoader};
pub use xsd::{XsdSchema, XsdSubset, XSD_NAMESPACE};

/// Per-parse validator produced by a compiled [`Schema`].
///
/// Each method returns a human-readable violation message on failure.
pub trait SchemaValidator {
    /// Check a start tag
    fn start_element(&mut self, element: &StartElement) -> Result<(), String>;

    /// Check an end tag
    fn end_element(&mut self, element: &EndElement) -> Result<(), String>;

    /// Check character data
    fn characters(&mut self, _text: &str) -> Result<(), String> {
        Ok(())
    }

    /// Check the document as a whole once the root element has closed
    fn end_document(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// A compiled schema.
pub trait Schema {
    /// Fresh validator for one document
    fn validator(&self) -> Box<dyn SchemaValidator>;
}

/// Compiles schema documents.
pub trait SchemaFactory {
    /// Compile the schema read from `source`
    fn compile(&self, source: &mut dyn Read) -> Result<Box<dyn Schema>, BoxError>;
}

/// Fetch and compile the schema named by `locator`.
///
/// The resource stream is closed before this returns, on success and on
/// failure alike.
pub fn load_schema(
    loader: &dyn ResourceLoader,
    factory: &dyn SchemaFactory,
    locator: &str,
) -> Result<Box<dyn Schema>, ParseError> {
    let unavailable = |source: BoxError| {
        ParseError::unlocated(Failure::SchemaLoad {
            locator: locator.to_owned(),
            source,
        })
    };

    let mut source = loader.open(locator).map_err(|e| unavailable(e.into()))?;
    let schema = factory.compile(&mut *source);
    drop(source);

    let schema = schema.map_err(unavailable)?;
    debug!("Compiled schema {}", locator);
    Ok(schema)
}

/// Handler that validates every event before forwarding it.
pub struct ValidatingHandler<H> {
    validator: Box<dyn SchemaValidator>,
    inner: H,
}

impl<H: ContentHandler> ValidatingHandler<H> {
    /// Validate with `validator`, then forward to `inner`
    pub fn new(validator: Box<dyn SchemaValidator>, inner: H) -> Self {
        Self { validator, inner }
    }

    /// Unwrap the handler
    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: ContentHandler> ContentHandler for ValidatingHandler<H> {
    fn start_element(&mut self, element: StartElement) -> Result<(), Failure> {
        self.validator
            .start_element(&element)
            .map_err(Failure::Schema)?;
        self.inner.start_element(element)
    }

    fn end_element(&mut self, element: EndElement) -> Result<(), Failure> {
        self.validator.end_element(&element).map_err(Failure::Schema)?;
        self.inner.end_element(element)
    }

    fn characters(&mut self, text: &str) -> Result<(), Failure> {
        self.validator.characters(text).map_err(Failure::Schema)?;
        self.inner.characters(text)
    }

    fn end_document(&mut self) -> Result<(), Failure> {
        self.validator.end_document().map_err(Failure::Schema)?;
        self.inner.end_document()
    }
}
