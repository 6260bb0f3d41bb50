//! The parser facade: tag registration and the parse entry points.

use std::fmt;
use std::io::BufRead;

use log::{debug, error};

use crate::binding::{FieldBinder, Mapped};
use crate::builder::ObjectBuilder;
use crate::config::ParserConfig;
use crate::conversion::ConversionRegistry;
use crate::error::{BoxError, ErrorKind, ParseError};
use crate::events::ContentHandler;
use crate::filter::NamespaceInjector;
use crate::registry::{Lifecycle, TagRegistry};
use crate::sequence::ResultSequence;
use crate::tokenizer::Tokenizer;
use crate::validation::{
    load_schema, CachedResources, ResourceLoader, SchemaFactory, ValidatingHandler, XsdSubset,
};

/// Maps XML elements onto Rust values while streaming a document.
///
/// Register a type for each tag of interest, then call [`start`](Self::start)
/// (or [`start_with_validation`](Self::start_with_validation)). Every call
/// builds fresh per-parse state, so one parser serves any number of
/// sequential parses. The registry and the memoized member resolutions are
/// shared between them.
///
/// ```
/// use xmlmap::{Mapped, Members, XmlObjectParser};
///
/// #[derive(Default)]
/// struct Item {
///     name: String,
///     deleted: bool,
/// }
///
/// impl Mapped for Item {
///     fn describe(members: &mut Members<Self>) {
///         members
///             .field("name", |item: &mut Item, v: String| item.name = v)
///             .field("deleted", |item: &mut Item, v: bool| item.deleted = v);
///     }
/// }
///
/// let mut parser = XmlObjectParser::new();
/// parser.map::<Item>("item");
///
/// let xml = r#"<list><item name="a" deleted="no"/><item name="b"/></list>"#;
/// let items = parser.start(xml.as_bytes())?;
/// assert_eq!(items.len(), 2);
/// let first = items.as_slice()[0].borrow::<Item>().unwrap();
/// assert_eq!(first.name, "a");
/// assert!(!first.deleted);
/// # Ok::<(), xmlmap::ParseError>(())
/// ```
pub struct XmlObjectParser {
    registry: TagRegistry,
    binder: FieldBinder,
    config: ParserConfig,
    resources: Box<dyn ResourceLoader>,
    schema_factory: Box<dyn SchemaFactory>,
}

impl XmlObjectParser {
    /// Parser with default conversions and no locale prefix
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Parser configured by `config`.
    ///
    /// Schemas are read from local files through [`CachedResources`] and
    /// compiled by [`XsdSubset`] unless replaced.
    pub fn with_config(config: ParserConfig) -> Self {
        let binder = FieldBinder::new(
            ConversionRegistry::with_defaults(),
            config.locale_prefix.clone(),
        );
        Self {
            registry: TagRegistry::new(),
            binder,
            config,
            resources: Box::new(CachedResources::new()),
            schema_factory: Box::new(XsdSubset),
        }
    }

    /// Fetch schema resources through `loader`
    pub fn with_resources(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.resources = Box::new(loader);
        self
    }

    /// Compile schemas with `factory`
    pub fn with_schema_factory(mut self, factory: impl SchemaFactory + 'static) -> Self {
        self.schema_factory = Box::new(factory);
        self
    }

    /// Map `tag` to `T`, emitted when the element closes.
    ///
    /// Re-registering a tag replaces its binding.
    pub fn map<T: Mapped + Default>(&mut self, tag: &str) -> &mut Self {
        self.registry.insert::<T>(tag, Lifecycle::OnEnd);
        self
    }

    /// Map `tag` to `T`, emitted as soon as the element opens
    pub fn map_on_start<T: Mapped + Default>(&mut self, tag: &str) -> &mut Self {
        self.registry.insert::<T>(tag, Lifecycle::OnStart);
        self
    }

    /// Map `tag` to `T`, emitted both when the element opens and when it closes
    pub fn map_both<T: Mapped + Default>(&mut self, tag: &str) -> &mut Self {
        self.registry.insert::<T>(tag, Lifecycle::Both);
        self
    }

    /// Map `tag` to `T` built by a fallible constructor
    pub fn map_with<T, F>(&mut self, tag: &str, lifecycle: Lifecycle, construct: F) -> &mut Self
    where
        T: Mapped,
        F: Fn() -> Result<T, BoxError> + 'static,
    {
        self.registry.insert_with(tag, lifecycle, construct);
        self
    }

    /// Registered tag bindings
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Conversions used for attribute and text values.
    pub fn conversions_mut(&mut self) -> &mut ConversionRegistry {
        self.binder.conversions_mut()
    }

    /// The member binder shared by all parses
    pub fn binder(&self) -> &FieldBinder {
        &self.binder
    }

    /// Active configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `input` without validation.
    pub fn start<R: BufRead>(&self, input: R) -> Result<ResultSequence, ParseError> {
        debug!("Parsing with {} registered tags", self.registry.len());
        let mut builder = ObjectBuilder::new(&self.registry, &self.binder);
        self.drive(input, &mut builder)?;
        Ok(finish(builder))
    }

    /// Parse `input`, validating every event against the schema named by
    /// `schema_locator`.
    ///
    /// Unqualified elements are placed in `default_namespace` before they
    /// are validated. Nothing is mapped until the schema has compiled, and
    /// a violation anywhere in the document means no objects are returned.
    pub fn start_with_validation<R: BufRead>(
        &self,
        input: R,
        default_namespace: &str,
        schema_locator: &str,
    ) -> Result<ResultSequence, ParseError> {
        let schema = load_schema(&*self.resources, &*self.schema_factory, schema_locator)
            .inspect_err(|e| error!("{}", e))?;

        debug!(
            "Parsing with {} registered tags, validating against {}",
            self.registry.len(),
            schema_locator
        );
        let builder = ObjectBuilder::new(&self.registry, &self.binder);
        let mut pipeline = NamespaceInjector::new(
            default_namespace,
            ValidatingHandler::new(schema.validator(), builder),
        );
        self.drive(input, &mut pipeline)?;
        Ok(finish(pipeline.into_inner().into_inner()))
    }

    /// Parse `input`, validating when the configuration names a schema.
    pub fn parse<R: BufRead>(&self, input: R) -> Result<ResultSequence, ParseError> {
        match &self.config.validation {
            Some(validation) => {
                self.start_with_validation(input, &validation.default_namespace, &validation.schema)
            }
            None => self.start(input),
        }
    }

    fn drive<R: BufRead, H: ContentHandler>(
        &self,
        input: R,
        handler: &mut H,
    ) -> Result<(), ParseError> {
        Tokenizer::new(input).run(handler).inspect_err(|e| match e.kind() {
            ErrorKind::ConstructionFailure | ErrorKind::BindingFailure => error!("{}", e),
            _ => debug!("Parse aborted: {}", e),
        })
    }
}

fn finish(builder: ObjectBuilder<'_>) -> ResultSequence {
    let objects = builder.into_sequence();
    debug!("Parse finished, {} objects emitted", objects.len());
    objects
}

impl Default for XmlObjectParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for XmlObjectParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlObjectParser")
            .field("registry", &self.registry)
            .field("binder", &self.binder)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
