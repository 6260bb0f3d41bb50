#![no_main]

use libfuzzer_sys::fuzz_target;
use xmlmap::validation::CachedResources;
use xmlmap::{Lifecycle, Mapped, Members, XmlObjectParser};

#[derive(Default)]
struct Node {
    name: String,
    count: i32,
    flag: bool,
    text: String,
}

impl Mapped for Node {
    fn describe(members: &mut Members<Self>) {
        members
            .field("name", |n: &mut Node, v: String| n.name = v)
            .field("count", |n: &mut Node, v: i32| n.count = v)
            .field("flag", |n: &mut Node, v: bool| n.flag = v)
            .setter("setNode", |n: &mut Node, v: String| n.text = v);
    }
}

const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    targetNamespace="urn:fuzz">
  <xs:element name="node">
    <xs:complexType><xs:attribute name="name"/><xs:attribute name="count"/></xs:complexType>
  </xs:element>
  <xs:element name="root"/>
</xs:schema>"#;

fuzz_target!(|data: &[u8]| {
    let resources = CachedResources::new();
    resources.insert("fuzz.xsd", SCHEMA);
    let mut parser = XmlObjectParser::new().with_resources(resources);
    parser
        .map::<Node>("node")
        .map_on_start::<Node>("item")
        .map_with("both", Lifecycle::Both, || Ok(Node::default()));

    // Either outcome is fine; the parser must never panic.
    if let Ok(objects) = parser.start(data) {
        for object in &objects {
            let _ = object.with(|n: &Node| n.name.len() + n.text.len());
        }
    }
    let _ = parser.start_with_validation(data, "urn:fuzz", "fuzz.xsd");
});
