//! Default-namespace injection for documents written without namespace
//! declarations.

use crate::error::Failure;
use crate::events::{ContentHandler, EndElement, StartElement};

/// Pass-through handler that puts unqualified start tags into a default
/// namespace before forwarding them.
///
/// Only start tags are rewritten; end tags and character data pass
/// unchanged.
#[derive(Debug)]
pub struct NamespaceInjector<H> {
    namespace: String,
    inner: H,
}

impl<H: ContentHandler> NamespaceInjector<H> {
    /// Forward to `inner`, injecting `namespace` where none is set
    pub fn new(namespace: impl Into<String>, inner: H) -> Self {
        Self {
            namespace: namespace.into(),
            inner,
        }
    }

    /// The injected namespace URI
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The wrapped handler
    pub fn inner(&self) -> &H {
        &self.inner
    }

    /// Unwrap the filter
    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: ContentHandler> ContentHandler for NamespaceInjector<H> {
    fn start_element(&mut self, mut element: StartElement) -> Result<(), Failure> {
        if element.namespace.is_empty() {
            element.namespace.clone_from(&self.namespace);
        }
        self.inner.start_element(element)
    }

    fn end_element(&mut self, element: EndElement) -> Result<(), Failure> {
        self.inner.end_element(element)
    }

    fn characters(&mut self, text: &str) -> Result<(), Failure> {
        self.inner.characters(text)
    }

    fn end_document(&mut self) -> Result<(), Failure> {
        self.inner.end_document()
    }
}
