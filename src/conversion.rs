//! String-to-value conversions keyed by target type.
//!
//! Every field or setter declared by a [`Mapped`](crate::binding::Mapped) type
//! names its value type; the binder asks this registry for a conversion of
//! the raw attribute or text string into that type. A missing conversion is
//! not an error: it tells the binder to fall back to setter dispatch or to the
//! raw string.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, Failure};

/// A converted value, ready to be downcast by the receiving slot.
pub type Value = Box<dyn Any>;

type ParseFn = Arc<dyn Fn(&str) -> Result<Value, BoxError>>;

struct Conversion {
    type_name: &'static str,
    parse: ParseFn,
}

/// Registry of string-to-value conversion functions.
#[derive(Clone)]
pub struct ConversionRegistry {
    conversions: HashMap<TypeId, Arc<Conversion>>,
}

impl ConversionRegistry {
    /// Empty registry with no conversions at all
    pub fn empty() -> Self {
        Self {
            conversions: HashMap::new(),
        }
    }

    /// Registry seeded with the scalar, string and lenient boolean conversions
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool, _>(|s| Ok(parse_lenient_bool(Some(s))));
        registry.register::<String, _>(|s| Ok(s.to_owned()));
        registry.register::<char, _>(parse_char);
        registry.register_from_str::<i8>();
        registry.register_from_str::<i16>();
        registry.register_from_str::<i32>();
        registry.register_from_str::<i64>();
        registry.register_from_str::<u8>();
        registry.register_from_str::<u16>();
        registry.register_from_str::<u32>();
        registry.register_from_str::<u64>();
        registry.register_from_str::<isize>();
        registry.register_from_str::<usize>();
        registry.register_from_str::<f32>();
        registry.register_from_str::<f64>();
        registry
    }

    /// Add or override the conversion for `T`.
    pub fn register<T, F>(&mut self, parse: F) -> &mut Self
    where
        T: Any,
        F: Fn(&str) -> Result<T, BoxError> + 'static,
    {
        let parse: ParseFn = Arc::new(move |s| parse(s).map(|v| Box::new(v) as Value));
        self.conversions.insert(
            TypeId::of::<T>(),
            Arc::new(Conversion {
                type_name: std::any::type_name::<T>(),
                parse,
            }),
        );
        self
    }

    /// Register `T` through its `FromStr` implementation, ignoring surrounding
    /// whitespace.
    pub fn register_from_str<T>(&mut self) -> &mut Self
    where
        T: std::str::FromStr + Any,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.register::<T, _>(|s| s.trim().parse::<T>().map_err(BoxError::from))
    }

    /// Whether a conversion is registered for the given type
    pub fn supports(&self, type_id: TypeId) -> bool {
        self.conversions.contains_key(&type_id)
    }

    /// Convert `raw` into the type identified by `type_id`.
    ///
    /// Returns `Ok(None)` when no conversion is registered for that type, and
    /// a [`Failure::Conversion`] when the registered conversion rejects the input.
    pub fn try_parse(&self, type_id: TypeId, raw: &str) -> Result<Option<Value>, Failure> {
        let Some(conversion) = self.conversions.get(&type_id) else {
            return Ok(None);
        };
        (conversion.parse)(raw)
            .map(Some)
            .map_err(|source| Failure::Conversion {
                type_name: conversion.type_name,
                value: raw.to_owned(),
                source,
            })
    }
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.conversions.values().map(|c| c.type_name).collect();
        names.sort_unstable();
        f.debug_struct("ConversionRegistry")
            .field("types", &names)
            .finish()
    }
}

/// Lenient boolean used for flag-like attributes.
///
/// Absence, the empty string and anything else count as `true`, except `"0"`
/// and values starting with `off`, `false` or `no` (case-sensitive).
pub fn parse_lenient_bool(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(s) => {
            s != "0" && !s.starts_with("off") && !s.starts_with("false") && !s.starts_with("no")
        }
    }
}

fn parse_char(s: &str) -> Result<char, BoxError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!(
            "expected a single character, found {} characters",
            s.chars().count()
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse<T: Any + Copy>(registry: &ConversionRegistry, raw: &str) -> T {
        let value = registry
            .try_parse(TypeId::of::<T>(), raw)
            .unwrap()
            .expect("conversion registered");
        *value.downcast::<T>().unwrap()
    }

    #[test]
    fn test_lenient_bool_false_tokens() {
        for raw in ["no", "off", "false", "0", "nope", "offline", "falsey"] {
            assert!(!parse_lenient_bool(Some(raw)), "{raw} should be false");
        }
    }

    #[test]
    fn test_lenient_bool_true_tokens() {
        for raw in ["yes", "on", "true", "1", "", "False", "NO", "00"] {
            assert!(parse_lenient_bool(Some(raw)), "{raw:?} should be true");
        }
        assert!(parse_lenient_bool(None));
    }

    #[test]
    fn test_default_scalars() {
        let registry = ConversionRegistry::with_defaults();
        assert_eq!(parse::<i32>(&registry, " 42 "), 42);
        assert_eq!(parse::<u8>(&registry, "255"), 255);
        assert!((parse::<f64>(&registry, "1.5") - 1.5).abs() < f64::EPSILON);
        assert_eq!(parse::<char>(&registry, "x"), 'x');
        assert!(!parse::<bool>(&registry, "off"));

        let text = registry
            .try_parse(TypeId::of::<String>(), " kept verbatim ")
            .unwrap()
            .unwrap();
        assert_eq!(*text.downcast::<String>().unwrap(), " kept verbatim ");
    }

    #[test]
    fn test_unsupported_type_is_absent() {
        struct Opaque;
        let registry = ConversionRegistry::with_defaults();
        assert!(registry.try_parse(TypeId::of::<Opaque>(), "x").unwrap().is_none());
        assert!(!registry.supports(TypeId::of::<Opaque>()));
    }

    #[test]
    fn test_rejected_input_is_a_conversion_failure() {
        let registry = ConversionRegistry::with_defaults();
        let err = registry.try_parse(TypeId::of::<i32>(), "twelve").unwrap_err();
        match err {
            Failure::Conversion { type_name, value, .. } => {
                assert_eq!(type_name, "i32");
                assert_eq!(value, "twelve");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert!(registry.try_parse(TypeId::of::<char>(), "ab").is_err());
    }

    #[test]
    fn test_register_overrides_default() {
        let mut registry = ConversionRegistry::with_defaults();
        registry.register::<bool, _>(|s| Ok(s == "yes"));
        assert!(!parse::<bool>(&registry, "on"));
        assert!(parse::<bool>(&registry, "yes"));
    }

    proptest! {
        #[test]
        fn prop_bool_true_unless_false_token(s in "[a-z0-9]{0,8}") {
            let expected = !(s == "0"
                || s.starts_with("off")
                || s.starts_with("false")
                || s.starts_with("no"));
            prop_assert_eq!(parse_lenient_bool(Some(&s)), expected);
        }
    }
}
