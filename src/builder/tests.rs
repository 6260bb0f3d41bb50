use super::*;
use crate::binding::{Mapped, Members};
use crate::error::ErrorKind;
use crate::events::Attribute;

#[derive(Debug, Default)]
struct Item {
    name: String,
    text: String,
}

impl Mapped for Item {
    fn describe(members: &mut Members<Self>) {
        members
            .field("name", |i: &mut Self, v: String| i.name = v)
            .field("item", |i: &mut Self, v: String| i.text = v);
    }
}

#[derive(Debug, Default)]
struct Key {
    key: String,
    value: String,
}

impl Mapped for Key {
    fn describe(members: &mut Members<Self>) {
        members
            .field("key", |k: &mut Self, v: String| k.key = v)
            .field("value", |k: &mut Self, v: String| k.value = v);
    }
}

#[derive(Debug)]
struct Broken;

impl Mapped for Broken {
    fn describe(_: &mut Members<Self>) {}
}

fn start(name: &str, attributes: &[(&str, &str)]) -> StartElement {
    StartElement {
        name: name.into(),
        namespace: String::new(),
        attributes: attributes
            .iter()
            .map(|(name, value)| Attribute {
                name: (*name).into(),
                value: (*value).into(),
            })
            .collect(),
    }
}

fn end(name: &str) -> EndElement {
    EndElement {
        name: name.into(),
        namespace: String::new(),
    }
}

#[test]
fn test_on_end_emits_at_close_with_text() {
    let mut registry = TagRegistry::new();
    registry.insert::<Item>("item", Lifecycle::OnEnd);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.start_element(start("item", &[("name", "Bench")])).unwrap();
    assert_eq!(builder.emitted(), 0);
    assert_eq!(builder.depth(), 1);
    builder.characters("  wooden ").unwrap();
    builder.characters("bench ").unwrap();
    builder.end_element(end("item")).unwrap();
    assert_eq!(builder.depth(), 0);

    let objects = builder.into_sequence().into_vec();
    assert_eq!(objects.len(), 1);
    let item = objects[0].borrow::<Item>().unwrap();
    assert_eq!(item.name, "Bench");
    assert_eq!(item.text, "wooden bench");
}

#[test]
fn test_on_start_emits_before_children() {
    let mut registry = TagRegistry::new();
    registry.insert::<Item>("item", Lifecycle::OnStart);
    registry.insert::<Key>("key", Lifecycle::OnEnd);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.start_element(start("item", &[("name", "Shop")])).unwrap();
    assert_eq!(builder.emitted(), 1);
    builder.start_element(start("key", &[("key", "shop")])).unwrap();
    builder.end_element(end("key")).unwrap();
    builder.end_element(end("item")).unwrap();

    let objects = builder.into_sequence().into_vec();
    assert_eq!(objects.len(), 2);
    assert!(objects[0].is::<Item>());
    assert!(objects[1].is::<Key>());
}

#[test]
fn test_on_start_text_reaches_emitted_instance() {
    let mut registry = TagRegistry::new();
    registry.insert::<Item>("item", Lifecycle::OnStart);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.start_element(start("item", &[])).unwrap();
    builder.characters("\n  Playground\n").unwrap();
    builder.end_element(end("item")).unwrap();

    let objects = builder.into_sequence().into_vec();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].with(|i: &Item| i.text.clone()).unwrap(), "Playground");
}

#[test]
fn test_both_emits_same_instance_twice() {
    let mut registry = TagRegistry::new();
    registry.insert::<Item>("item", Lifecycle::Both);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.start_element(start("item", &[("name", "Road")])).unwrap();
    assert_eq!(builder.emitted(), 1);
    builder.characters("motorway").unwrap();
    builder.end_element(end("item")).unwrap();

    let objects = builder.into_sequence().into_vec();
    assert_eq!(objects.len(), 2);
    assert!(objects[0].ptr_eq(&objects[1]));
    // The open-time entry aliases the final state.
    assert_eq!(objects[0].with(|i: &Item| i.text.clone()).unwrap(), "motorway");
}

#[test]
fn test_unregistered_elements_are_transparent() {
    let mut registry = TagRegistry::new();
    registry.insert::<Item>("item", Lifecycle::OnEnd);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.characters("outside").unwrap();
    builder.start_element(start("group", &[("name", "ignored")])).unwrap();
    builder.start_element(start("item", &[("icon", "x.svg")])).unwrap();
    builder.start_element(start("label", &[("text", "ignored")])).unwrap();
    builder.characters("inner").unwrap();
    builder.end_element(end("label")).unwrap();
    assert_eq!(builder.depth(), 1);
    builder.end_element(end("item")).unwrap();
    builder.end_element(end("group")).unwrap();

    let objects = builder.into_sequence().into_vec();
    assert_eq!(objects.len(), 1);
    let item = objects[0].borrow::<Item>().unwrap();
    assert_eq!(item.name, "");
    assert_eq!(item.text, "inner");
}

#[test]
fn test_nested_frames_keep_their_own_text() {
    let mut registry = TagRegistry::new();
    registry.insert::<Item>("item", Lifecycle::OnEnd);
    registry.insert::<Key>("value", Lifecycle::OnEnd);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.start_element(start("item", &[])).unwrap();
    builder.characters("outer ").unwrap();
    builder.start_element(start("value", &[])).unwrap();
    builder.characters("inner").unwrap();
    builder.end_element(end("value")).unwrap();
    builder.characters("text").unwrap();
    builder.end_element(end("item")).unwrap();

    let objects = builder.into_sequence().into_vec();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].with(|k: &Key| k.value.clone()).unwrap(), "inner");
    assert_eq!(objects[1].with(|i: &Item| i.text.clone()).unwrap(), "outer text");
}

#[test]
fn test_failing_constructor_is_construction_failure() {
    let mut registry = TagRegistry::new();
    registry.insert_with::<Broken, _>("broken", Lifecycle::OnEnd, || {
        Err("no zero-argument constructor".into())
    });
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    let err = builder.start_element(start("broken", &[])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstructionFailure);
    assert!(err.to_string().contains("no zero-argument constructor"));
}

#[derive(Debug, Default)]
struct Flag {
    flag: bool,
}

impl Mapped for Flag {
    fn describe(members: &mut Members<Self>) {
        members.field("flag", |f: &mut Self, v: bool| f.flag = v);
    }
}

#[test]
fn test_whitespace_only_text_binds_empty_value() {
    let mut registry = TagRegistry::new();
    registry.insert::<Flag>("flag", Lifecycle::OnStart);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.start_element(start("flag", &[("flag", "off")])).unwrap();
    builder.characters("   ").unwrap();
    builder.end_element(end("flag")).unwrap();

    let objects = builder.into_sequence().into_vec();
    assert_eq!(objects.len(), 1);
    assert!(objects[0].borrow::<Flag>().unwrap().flag);
}

#[test]
fn test_empty_element_leaves_attribute_value() {
    let mut registry = TagRegistry::new();
    registry.insert::<Flag>("flag", Lifecycle::OnStart);
    let binder = FieldBinder::default();
    let mut builder = ObjectBuilder::new(&registry, &binder);

    builder.start_element(start("flag", &[("flag", "off")])).unwrap();
    builder.end_element(end("flag")).unwrap();

    let objects = builder.into_sequence().into_vec();
    assert!(!objects[0].borrow::<Flag>().unwrap().flag);
}
