//! Push-style XML events and the handler chain they flow through.
//!
//! The tokenizer driver turns the input into [`StartElement`], [`EndElement`]
//! and character events and pushes them into a [`ContentHandler`]. Filters
//! are handlers that forward to an inner handler, so the validating pipeline
//! is `NamespaceInjector<ValidatingHandler<ObjectBuilder>>`.

use crate::error::Failure;

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (`prefix:local` or `local`)
    pub name: String,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    /// Local part of the name
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Prefix of the name, if qualified
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }
}

/// A start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Qualified name as written
    pub name: String,
    /// Resolved namespace URI, empty when the element is unqualified
    pub namespace: String,
    /// Attributes, excluding namespace declarations
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    /// Local part of the name
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Value of the attribute with the given qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// An end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement {
    /// Qualified name as written
    pub name: String,
    /// Resolved namespace URI, empty when the element is unqualified
    pub namespace: String,
}

impl EndElement {
    /// Local part of the name
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }
}

/// Receiver of push-style XML events.
///
/// Callbacks run synchronously in document order. Returning an error aborts
/// the parse; the driver attaches the current location.
pub trait ContentHandler {
    /// An element opened
    fn start_element(&mut self, element: StartElement) -> Result<(), Failure>;

    /// An element closed
    fn end_element(&mut self, element: EndElement) -> Result<(), Failure>;

    /// Character data (text or CDATA), already unescaped
    fn characters(&mut self, text: &str) -> Result<(), Failure>;

    /// The input ended after a complete root element
    fn end_document(&mut self) -> Result<(), Failure> {
        Ok(())
    }
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn start_element(&mut self, element: StartElement) -> Result<(), Failure> {
        (**self).start_element(element)
    }

    fn end_element(&mut self, element: EndElement) -> Result<(), Failure> {
        (**self).end_element(element)
    }

    fn characters(&mut self, text: &str) -> Result<(), Failure> {
        (**self).characters(text)
    }

    fn end_document(&mut self) -> Result<(), Failure> {
        (**self).end_document()
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_names() {
        let element = StartElement {
            name: "tp:item".into(),
            namespace: "http://josm.openstreetmap.de/tagging-preset-1.0".into(),
            attributes: vec![
                Attribute {
                    name: "xml:lang".into(),
                    value: "de".into(),
                },
                Attribute {
                    name: "name".into(),
                    value: "Hydrant".into(),
                },
            ],
        };
        assert_eq!(element.local_name(), "item");
        assert_eq!(element.attributes[0].local_name(), "lang");
        assert_eq!(element.attributes[0].prefix(), Some("xml"));
        assert_eq!(element.attributes[1].prefix(), None);
        assert_eq!(element.attribute("name"), Some("Hydrant"));
        assert_eq!(element.attribute("lang"), None);
    }
}
