//! Attribute-level W3C XML Schema support.
//!
//! [`XsdSubset`] compiles the declarations that decide which elements and
//! attributes may appear in a document:
//!
//! - `targetNamespace`
//! - global and local `xs:element` declarations, typed by name or inline
//! - named and anonymous `xs:complexType`, including attributes inherited
//!   through `xs:extension`/`xs:restriction` bases
//! - `xs:attributeGroup` definitions and references
//! - `use="required"`, `use="prohibited"` and `xs:anyAttribute`
//!
//! Content models (`xs:sequence`, occurrence bounds) and simple-type facets
//! are not checked. Declarations sharing an element name are merged.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{BufReader, Read};
use std::sync::Arc;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use super::{Schema, SchemaFactory, SchemaValidator};
use crate::error::BoxError;
use crate::events::{EndElement, StartElement};

/// Namespace of W3C XML Schema documents
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// [`SchemaFactory`] for the attribute-level XML Schema subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct XsdSubset;

impl SchemaFactory for XsdSubset {
    fn compile(&self, source: &mut dyn Read) -> Result<Box<dyn Schema>, BoxError> {
        Ok(Box::new(XsdSchema::from_reader(source)?))
    }
}

#[derive(Debug, Default)]
struct ElementRule {
    allowed: HashSet<String>,
    required: BTreeSet<String>,
    any_attribute: bool,
}

#[derive(Debug)]
struct Rules {
    target_namespace: String,
    elements: HashMap<String, ElementRule>,
}

/// A compiled schema document.
#[derive(Debug, Clone)]
pub struct XsdSchema {
    rules: Arc<Rules>,
}

impl XsdSchema {
    /// Compile the schema document read from `source`
    pub fn from_reader<R: Read>(source: R) -> Result<Self, BoxError> {
        let mut reader = NsReader::from_reader(BufReader::new(source));
        reader.config_mut().expand_empty_elements = true;
        let decoder = reader.decoder();

        let mut collector = Collector::default();
        let mut buf = Vec::new();
        let mut saw_schema = false;
        loop {
            match reader.read_resolved_event_into(&mut buf)? {
                (ResolveResult::Bound(ns), Event::Start(e))
                    if ns.as_ref() == XSD_NAMESPACE.as_bytes() =>
                {
                    saw_schema |= e.local_name().as_ref() == b"schema";
                    collector.start(&e, decoder)?;
                }
                (_, Event::Start(_)) => collector.scopes.push(Scope::Other),
                (_, Event::End(_)) => collector.end(),
                (_, Event::Eof) => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_schema {
            return Err("document is not an XML Schema (no xs:schema element)".into());
        }
        Ok(Self {
            rules: Arc::new(collector.finish()),
        })
    }

    /// Namespace the declared elements belong to; empty when none is set
    pub fn target_namespace(&self) -> &str {
        &self.rules.target_namespace
    }

    /// Whether an element with this local name is declared
    pub fn declares(&self, element: &str) -> bool {
        self.rules.elements.contains_key(element)
    }
}

impl Schema for XsdSchema {
    fn validator(&self) -> Box<dyn SchemaValidator> {
        Box::new(XsdValidator {
            rules: Arc::clone(&self.rules),
        })
    }
}

struct XsdValidator {
    rules: Arc<Rules>,
}

impl SchemaValidator for XsdValidator {
    fn start_element(&mut self, element: &StartElement) -> Result<(), String> {
        let undeclared = || {
            format!(
                "cvc-elt.1.a: Cannot find the declaration of element '{}'.",
                element.name
            )
        };
        if element.namespace != self.rules.target_namespace {
            return Err(undeclared());
        }
        let rule = self
            .rules
            .elements
            .get(element.local_name())
            .ok_or_else(undeclared)?;

        for attribute in &element.attributes {
            if rule.any_attribute
                || attribute.prefix() == Some("xsi")
                || rule.allowed.contains(&attribute.name)
            {
                continue;
            }
            return Err(format!(
                "cvc-complex-type.3.2.2: Attribute '{}' is not allowed to appear in element '{}'.",
                attribute.name, element.name
            ));
        }
        for required in &rule.required {
            if element.attribute(required).is_none() {
                return Err(format!(
                    "cvc-complex-type.4: Attribute '{}' must appear on element '{}'.",
                    required, element.name
                ));
            }
        }
        Ok(())
    }

    fn end_element(&mut self, _element: &EndElement) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Named(String),
    Inline(String),
    Group(String),
    /// `xs:anyType`, the type of an element declared without one
    Any,
}

#[derive(Debug, Default)]
struct TypeDef {
    attributes: Vec<(String, bool)>,
    groups: Vec<String>,
    base: Option<String>,
    any_attribute: bool,
}

enum Scope {
    Element { name: String, typed: bool },
    Type(TypeKey),
    /// complexContent, simpleContent, extension, restriction
    Derivation,
    Other,
}

#[derive(Default)]
struct Collector {
    target_namespace: String,
    declarations: HashMap<String, Vec<TypeKey>>,
    types: HashMap<TypeKey, TypeDef>,
    scopes: Vec<Scope>,
}

impl Collector {
    fn start(&mut self, e: &BytesStart<'_>, decoder: Decoder) -> Result<(), BoxError> {
        let scope = match e.local_name().as_ref() {
            b"schema" => {
                self.target_namespace =
                    attribute(e, decoder, "targetNamespace")?.unwrap_or_default();
                Scope::Other
            }
            b"element" => match attribute(e, decoder, "name")? {
                Some(name) => {
                    let typed = match attribute(e, decoder, "type")? {
                        Some(type_name) => {
                            self.declare(&name, TypeKey::Named(local(&type_name).to_owned()));
                            true
                        }
                        None => false,
                    };
                    Scope::Element { name, typed }
                }
                None => Scope::Other,
            },
            b"complexType" => {
                let key = match (attribute(e, decoder, "name")?, self.scopes.last_mut()) {
                    (Some(name), _) => Some(TypeKey::Named(name)),
                    (None, Some(Scope::Element { name, typed })) => {
                        *typed = true;
                        Some(TypeKey::Inline(name.clone()))
                    }
                    _ => None,
                };
                match key {
                    Some(key) => {
                        if let TypeKey::Inline(name) = &key {
                            let name = name.clone();
                            self.declare(&name, key.clone());
                        }
                        self.types.entry(key.clone()).or_default();
                        Scope::Type(key)
                    }
                    None => Scope::Other,
                }
            }
            b"simpleType" => {
                if let Some(Scope::Element { typed, .. }) = self.scopes.last_mut() {
                    *typed = true;
                }
                Scope::Other
            }
            b"attributeGroup" => {
                if let Some(name) = attribute(e, decoder, "name")? {
                    let key = TypeKey::Group(name);
                    self.types.entry(key.clone()).or_default();
                    Scope::Type(key)
                } else {
                    if let Some(reference) = attribute(e, decoder, "ref")? {
                        if let Some(def) = self.current_type() {
                            def.groups.push(local(&reference).to_owned());
                        }
                    }
                    Scope::Other
                }
            }
            b"attribute" => {
                let name = match attribute(e, decoder, "name")? {
                    Some(name) => Some(name),
                    None => attribute(e, decoder, "ref")?,
                };
                let usage = attribute(e, decoder, "use")?;
                if let (Some(name), Some(def)) = (name, self.current_type()) {
                    match usage.as_deref() {
                        Some("prohibited") => {}
                        Some("required") => def.attributes.push((name, true)),
                        _ => def.attributes.push((name, false)),
                    }
                }
                Scope::Other
            }
            b"anyAttribute" => {
                if let Some(def) = self.current_type() {
                    def.any_attribute = true;
                }
                Scope::Other
            }
            b"extension" | b"restriction" => {
                if let Some(base) = attribute(e, decoder, "base")? {
                    if let Some(def) = self.current_type() {
                        def.base = Some(local(&base).to_owned());
                    }
                }
                Scope::Derivation
            }
            b"complexContent" | b"simpleContent" => Scope::Derivation,
            _ => Scope::Other,
        };
        self.scopes.push(scope);
        Ok(())
    }

    fn end(&mut self) {
        if let Some(Scope::Element { name, typed: false }) = self.scopes.pop() {
            self.declare(&name, TypeKey::Any);
        }
    }

    fn declare(&mut self, element: &str, key: TypeKey) {
        self.declarations
            .entry(element.to_owned())
            .or_default()
            .push(key);
    }

    /// The type definition an attribute declaration at this point belongs to.
    fn current_type(&mut self) -> Option<&mut TypeDef> {
        let key = self
            .scopes
            .iter()
            .rev()
            .find(|scope| !matches!(scope, Scope::Derivation))
            .and_then(|scope| match scope {
                Scope::Type(key) => Some(key.clone()),
                _ => None,
            })?;
        self.types.get_mut(&key)
    }

    fn finish(self) -> Rules {
        let elements = self
            .declarations
            .iter()
            .map(|(name, keys)| {
                let mut rule = ElementRule::default();
                let mut visited = HashSet::new();
                for key in keys {
                    self.collect(key, &mut rule, &mut visited);
                }
                (name.clone(), rule)
            })
            .collect();
        Rules {
            target_namespace: self.target_namespace,
            elements,
        }
    }

    fn collect(&self, key: &TypeKey, rule: &mut ElementRule, visited: &mut HashSet<TypeKey>) {
        if *key == TypeKey::Any {
            rule.any_attribute = true;
            return;
        }
        if !visited.insert(key.clone()) {
            return;
        }
        // Built-in simple types have no entry and contribute nothing.
        let Some(def) = self.types.get(key) else {
            return;
        };
        for (name, required) in &def.attributes {
            rule.allowed.insert(name.clone());
            if *required {
                rule.required.insert(name.clone());
            }
        }
        rule.any_attribute |= def.any_attribute;
        for group in &def.groups {
            self.collect(&TypeKey::Group(group.clone()), rule, visited);
        }
        if let Some(base) = &def.base {
            self.collect(&TypeKey::Named(base.clone()), rule, visited);
        }
    }
}

fn attribute(e: &BytesStart<'_>, decoder: Decoder, name: &str) -> Result<Option<String>, BoxError> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.decode_and_unescape_value(decoder)?.into_owned())),
        None => Ok(None),
    }
}

fn local(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Attribute;

    const PRESETS_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="urn:presets" targetNamespace="urn:presets"
           elementFormDefault="qualified">
  <xs:attributeGroup name="labelled">
    <xs:attribute name="name" type="xs:string" use="required"/>
    <xs:attribute name="de.name" type="xs:string"/>
  </xs:attributeGroup>
  <xs:complexType name="base">
    <xs:attribute name="icon" type="xs:string"/>
  </xs:complexType>
  <xs:complexType name="item">
    <xs:complexContent>
      <xs:extension base="tns:base">
        <xs:sequence>
          <xs:element name="label">
            <xs:complexType>
              <xs:simpleContent>
                <xs:extension base="xs:string">
                  <xs:attribute name="text" type="xs:string"/>
                </xs:extension>
              </xs:simpleContent>
            </xs:complexType>
          </xs:element>
        </xs:sequence>
        <xs:attributeGroup ref="tns:labelled"/>
        <xs:attribute name="type">
          <xs:simpleType>
            <xs:restriction base="xs:string"/>
          </xs:simpleType>
        </xs:attribute>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:element name="presets">
    <xs:complexType>
      <xs:anyAttribute/>
    </xs:complexType>
  </xs:element>
  <xs:element name="item" type="tns:item"/>
  <xs:element name="note" type="xs:string"/>
  <xs:element name="free"/>
</xs:schema>"#;

    fn schema() -> XsdSchema {
        XsdSchema::from_reader(PRESETS_XSD.as_bytes()).unwrap()
    }

    fn element(name: &str, namespace: &str, attributes: &[(&str, &str)]) -> StartElement {
        StartElement {
            name: name.into(),
            namespace: namespace.into(),
            attributes: attributes
                .iter()
                .map(|(n, v)| Attribute {
                    name: (*n).into(),
                    value: (*v).into(),
                })
                .collect(),
        }
    }

    fn check(element: StartElement) -> Result<(), String> {
        schema().validator().start_element(&element)
    }

    #[test]
    fn test_declarations_collected() {
        let schema = schema();
        assert_eq!(schema.target_namespace(), "urn:presets");
        for name in ["presets", "item", "label", "note", "free"] {
            assert!(schema.declares(name), "{name}");
        }
        assert!(!schema.declares("base"));
    }

    #[test]
    fn test_inherited_and_grouped_attributes() {
        let item = element(
            "item",
            "urn:presets",
            &[("name", "Bench"), ("de.name", "Bank"), ("icon", "b.png"), ("type", "node")],
        );
        assert!(check(item).is_ok());
    }

    #[test]
    fn test_required_attribute() {
        let err = check(element("item", "urn:presets", &[("icon", "b.png")])).unwrap_err();
        assert!(err.contains("Attribute 'name' must appear on element 'item'"), "{err}");
    }

    #[test]
    fn test_undeclared_attribute() {
        let err = check(element("item", "urn:presets", &[("name", "a"), ("colour", "red")]))
            .unwrap_err();
        assert!(err.starts_with("cvc-complex-type.3.2.2"), "{err}");

        let err = check(element("note", "urn:presets", &[("lang", "en")])).unwrap_err();
        assert!(err.contains("'lang'"), "{err}");
    }

    #[test]
    fn test_any_attribute_and_any_type() {
        assert!(check(element("presets", "urn:presets", &[("author", "x")])).is_ok());
        assert!(check(element("free", "urn:presets", &[("whatever", "1")])).is_ok());
        assert!(check(element("label", "urn:presets", &[("text", "t")])).is_ok());
    }

    #[test]
    fn test_namespace_and_unknown_element() {
        let err = check(element("presets", "", &[])).unwrap_err();
        assert!(err.starts_with("cvc-elt.1.a"), "{err}");
        assert!(check(element("group", "urn:presets", &[])).is_err());
        assert!(check(element("p:item", "urn:presets", &[("name", "a")])).is_ok());
    }

    #[test]
    fn test_not_a_schema() {
        assert!(XsdSchema::from_reader("<presets/>".as_bytes()).is_err());
        assert!(XsdSchema::from_reader("<xs:schema".as_bytes()).is_err());
    }
}
