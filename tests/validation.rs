//! Validating parses against schemas stored on disk.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use xmlmap::validation::CachedResources;
use xmlmap::{ErrorKind, Mapped, Members, ParserConfig, XmlObjectParser};

const NAMESPACE: &str = "http://josm.openstreetmap.de/tagging-preset-1.0";

const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<schema xmlns="http://www.w3.org/2001/XMLSchema"
        xmlns:tns="http://josm.openstreetmap.de/tagging-preset-1.0"
        targetNamespace="http://josm.openstreetmap.de/tagging-preset-1.0"
        elementFormDefault="qualified">
  <element name="presets">
    <complexType>
      <sequence>
        <element ref="tns:item" minOccurs="0" maxOccurs="unbounded"/>
      </sequence>
      <attribute name="author" type="string"/>
    </complexType>
  </element>
  <element name="item">
    <complexType>
      <sequence>
        <element name="key" maxOccurs="unbounded">
          <complexType>
            <attribute name="key" type="string" use="required"/>
            <attribute name="value" type="string"/>
          </complexType>
        </element>
      </sequence>
      <attribute name="name" type="string" use="required"/>
      <attribute name="deprecated" type="string"/>
    </complexType>
  </element>
</schema>
"#;

#[derive(Debug, Default)]
struct Item {
    name: String,
    deprecated: bool,
}

impl Mapped for Item {
    fn describe(members: &mut Members<Self>) {
        members
            .field("name", |i: &mut Item, v: String| i.name = v)
            .field("deprecated", |i: &mut Item, v: bool| i.deprecated = v);
    }
}

#[derive(Debug, Default)]
struct Key {
    key: String,
}

impl Mapped for Key {
    fn describe(members: &mut Members<Self>) {
        members.field("key", |k: &mut Key, v: String| k.key = v);
    }
}

fn schema_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagging-preset.xsd");
    fs::write(&path, SCHEMA).unwrap();
    (dir, path)
}

fn parser() -> XmlObjectParser {
    let mut parser = XmlObjectParser::new();
    parser.map::<Item>("item").map::<Key>("key");
    parser
}

#[test]
fn test_unqualified_document_validates_after_injection() {
    let (_dir, schema) = schema_dir();
    let xml = r#"<presets author="someone">
  <item name="Bench" deprecated="off"><key key="amenity" value="bench"/></item>
  <item name="Table"><key key="leisure"/></item>
</presets>"#;

    let objects = parser()
        .start_with_validation(xml.as_bytes(), NAMESPACE, schema.to_str().unwrap())
        .unwrap();
    assert_eq!(objects.len(), 4);
    assert_eq!(objects.of_type::<Item>().count(), 2);
    let bench = objects.as_slice()[1].borrow::<Item>().unwrap();
    assert_eq!(bench.name, "Bench");
    assert!(!bench.deprecated);
}

#[test]
fn test_forbidden_attribute_rejected_before_output() {
    let (_dir, schema) = schema_dir();
    let xml = r#"<presets>
  <item name="Bench"><key key="amenity"/></item>
  <item name="Table" colour="brown"><key key="leisure"/></item>
</presets>"#;

    let err = parser()
        .start_with_validation(xml.as_bytes(), NAMESPACE, schema.to_str().unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    assert_eq!(err.location().unwrap().line, 3);
    assert!(err.to_string().contains("'colour'"), "{err}");
}

#[test]
fn test_missing_required_attribute() {
    let (_dir, schema) = schema_dir();
    let err = parser()
        .start_with_validation(
            r#"<presets><item><key key="a"/></item></presets>"#.as_bytes(),
            NAMESPACE,
            schema.to_str().unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaViolation);
}

#[test]
fn test_wrong_namespace_rejected() {
    let (_dir, schema) = schema_dir();
    let err = parser()
        .start_with_validation(
            r#"<presets xmlns="urn:elsewhere"/>"#.as_bytes(),
            NAMESPACE,
            schema.to_str().unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    assert_eq!(err.location().unwrap().line, 1);
}

#[test]
fn test_same_document_without_validation_is_permissive() {
    let xml = r#"<presets><item name="Table" colour="brown"/></presets>"#;
    assert_eq!(parser().start(xml.as_bytes()).unwrap().len(), 1);
}

#[test]
fn test_schema_resolved_against_base_dir_from_config() {
    let (dir, _schema) = schema_dir();
    let config = ParserConfig::default().with_validation(NAMESPACE, "tagging-preset.xsd");
    let mut parser = XmlObjectParser::with_config(config)
        .with_resources(CachedResources::new().with_base_dir(dir.path()));
    parser.map::<Item>("item");

    let objects = parser
        .parse(r#"<presets><item name="Bench"/></presets>"#.as_bytes())
        .unwrap();
    assert_eq!(objects.len(), 1);

    // The schema is cached after the first load.
    fs::remove_file(dir.path().join("tagging-preset.xsd")).unwrap();
    assert!(parser
        .parse(r#"<presets><item name="Table"/></presets>"#.as_bytes())
        .is_ok());
}

#[test]
fn test_unreadable_schema_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xsd");
    fs::write(&path, "<schema").unwrap();

    let err = parser()
        .start_with_validation("<presets/>".as_bytes(), NAMESPACE, path.to_str().unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaUnavailable);
    assert!(err.location().is_none());

    let err = parser()
        .start_with_validation(
            "<presets/>".as_bytes(),
            NAMESPACE,
            dir.path().join("missing.xsd").to_str().unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaUnavailable);
}
