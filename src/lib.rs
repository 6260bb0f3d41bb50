//! # xmlmap - Declarative Streaming XML-to-Object Mapping
//!
//! `xmlmap` turns an XML document into a sequence of Rust values in a single
//! streaming pass. Callers register which element names map to which types;
//! attributes and text content are assigned to members by name, converted
//! to the member's declared type on the way.
//!
//! ## Key Features
//!
//! - **Declarative registration**: `map`, `map_on_start` and `map_both` bind a
//!   tag to a type and choose when its instance is emitted.
//!
//! - **Explicit member tables**: types describe their fields and setters via
//!   [`Mapped`]; no runtime reflection. Unknown names are silently ignored.
//!
//! - **Typed conversions**: a [`ConversionRegistry`] keyed by `TypeId`, with
//!   lenient boolean parsing (`"no"`, `"off"`, `"false"`, `"0"` are false).
//!
//! - **Optional schema validation**: inject a default namespace into
//!   unqualified documents and check every event before it is mapped.
//!
//! - **Located errors**: every failure carries the line and column of the
//!   event that caused it.
//!
//! ## Quick Start
//!
//! ```rust
//! use xmlmap::{Mapped, Members, XmlObjectParser};
//!
//! #[derive(Default)]
//! struct Key {
//!     key: String,
//!     value: String,
//! }
//!
//! impl Mapped for Key {
//!     fn describe(members: &mut Members<Self>) {
//!         members
//!             .field("key", |k: &mut Key, v: String| k.key = v)
//!             .field("value", |k: &mut Key, v: String| k.value = v);
//!     }
//! }
//!
//! let mut parser = XmlObjectParser::new();
//! parser.map::<Key>("key");
//!
//! let xml = r#"<item><key key="amenity" value="bench"/></item>"#;
//! for object in &parser.start(xml.as_bytes())? {
//!     let key = object.borrow::<Key>().unwrap();
//!     println!("{}={}", key.key, key.value);
//! }
//! # Ok::<(), xmlmap::ParseError>(())
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! quick-xml -> Tokenizer -> [NamespaceInjector -> ValidatingHandler] -> ObjectBuilder
//!                                                                        |
//!                                   TagRegistry + FieldBinder  ----------+
//! ```
//!
//! The bracketed stages only run for
//! [`XmlObjectParser::start_with_validation`].

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod binding;
pub mod builder;
pub mod config;
pub mod conversion;
pub mod error;
pub mod events;
pub mod filter;
pub mod parser;
pub mod registry;
pub mod sequence;
pub mod tokenizer;
pub mod validation;

pub use binding::{Mapped, Members};
pub use config::{ParserConfig, ValidationConfig};
pub use conversion::ConversionRegistry;
pub use error::{ErrorKind, ParseError, ParseLocation};
pub use parser::XmlObjectParser;
pub use registry::Lifecycle;
pub use sequence::{MappedObject, ResultSequence};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::binding::{Mapped, Members};
    pub use crate::config::{ParserConfig, ValidationConfig};
    pub use crate::conversion::{parse_lenient_bool, ConversionRegistry};
    pub use crate::error::{BoxError, ErrorKind, Failure, ParseError, ParseLocation};
    pub use crate::events::{ContentHandler, EndElement, StartElement};
    pub use crate::parser::XmlObjectParser;
    pub use crate::registry::{Lifecycle, TagRegistry};
    pub use crate::sequence::{MappedObject, ResultSequence};
    pub use crate::validation::{
        CachedResources, ResourceLoader, Schema, SchemaFactory, SchemaValidator, XsdSubset,
    };
}
