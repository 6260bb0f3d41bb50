//! Error types shared by every stage of a parse.
//!
//! All failures surface as a single [`ParseError`]: an enclosed [`Failure`]
//! (the cause) plus the [`ParseLocation`] the tokenizer reported when the
//! failure was raised. Callers branch on [`ParseError::kind`] without losing
//! the underlying detail.

use std::fmt;

/// Boxed error used at the seams where callers plug in their own code
/// (constructors, setters, conversions, schema compilers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Position in the input at the moment a failure was raised.
///
/// Both coordinates are 1-based. The column counts bytes from the start of
/// the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseLocation {
    /// Line number
    pub line: u64,
    /// Column number
    pub column: u64,
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Discriminant of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Well-formedness violation detected by the tokenizer
    MalformedInput,
    /// Content rejected by the schema validator
    SchemaViolation,
    /// A mapped type could not be constructed
    ConstructionFailure,
    /// A resolved field or setter rejected its value
    BindingFailure,
    /// The schema resource could not be loaded or compiled
    SchemaUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedInput => "malformed input",
            ErrorKind::SchemaViolation => "schema violation",
            ErrorKind::ConstructionFailure => "construction failure",
            ErrorKind::BindingFailure => "binding failure",
            ErrorKind::SchemaUnavailable => "schema unavailable",
        };
        f.write_str(name)
    }
}

/// The cause enclosed by a [`ParseError`].
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// Error reported by the XML tokenizer
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error while reading the character stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Name or text that is not valid UTF-8
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Structural well-formedness violation found by the driver
    #[error("Invalid document structure: {0}")]
    Structure(String),

    /// Schema validation error
    #[error("Schema violation: {0}")]
    Schema(String),

    /// The constructor of a mapped type failed
    #[error("Cannot construct `{type_name}`: {source}")]
    Construction {
        /// Name of the type being constructed
        type_name: &'static str,
        /// Error raised by the constructor
        source: BoxError,
    },

    /// A field or setter rejected the value
    #[error("Cannot assign `{member}` on `{type_name}`: {source}")]
    Binding {
        /// Field or setter name
        member: String,
        /// Name of the target type
        type_name: &'static str,
        /// Error raised during assignment
        source: BoxError,
    },

    /// A registered conversion function failed
    #[error("Cannot convert {value:?} to `{type_name}`: {source}")]
    Conversion {
        /// Target value type
        type_name: &'static str,
        /// Raw input
        value: String,
        /// Error raised by the conversion
        source: BoxError,
    },

    /// The schema resource could not be fetched or compiled
    #[error("Failed to load XML schema `{locator}`: {source}")]
    SchemaLoad {
        /// Logical name of the schema resource
        locator: String,
        /// Underlying load or compile error
        source: BoxError,
    },
}

impl Failure {
    /// The [`ErrorKind`] this cause is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Failure::Xml(_) | Failure::Io(_) | Failure::Utf8(_) | Failure::Structure(_) => {
                ErrorKind::MalformedInput
            }
            Failure::Schema(_) => ErrorKind::SchemaViolation,
            Failure::Construction { .. } => ErrorKind::ConstructionFailure,
            Failure::Binding { .. } | Failure::Conversion { .. } => ErrorKind::BindingFailure,
            Failure::SchemaLoad { .. } => ErrorKind::SchemaUnavailable,
        }
    }

    /// Attach the position at which this failure was raised.
    pub fn at(self, location: ParseLocation) -> ParseError {
        ParseError {
            failure: self,
            location: Some(location),
        }
    }
}

/// Error returned by the parse entry points.
#[derive(Debug, thiserror::Error)]
pub struct ParseError {
    #[source]
    failure: Failure,
    location: Option<ParseLocation>,
}

impl ParseError {
    /// Error not tied to any input position (schema setup happens before the
    /// first event).
    pub fn unlocated(failure: Failure) -> Self {
        Self {
            failure,
            location: None,
        }
    }

    /// Discriminant of this error
    pub fn kind(&self) -> ErrorKind {
        self.failure.kind()
    }

    /// Position reported by the tokenizer, if the failure happened during
    /// tokenization.
    pub fn location(&self) -> Option<ParseLocation> {
        self.location
    }

    /// The enclosed cause
    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    /// Consume the error, returning the enclosed cause
    pub fn into_failure(self) -> Failure {
        self.failure
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} at {}: {}", self.kind(), location, self.failure),
            None => write!(f, "{}: {}", self.kind(), self.failure),
        }
    }
}
