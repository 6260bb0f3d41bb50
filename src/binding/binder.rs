use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use super::{MappedType, MemberKind, MemberType};
use crate::conversion::{ConversionRegistry, Value};
use crate::error::Failure;

/// Attribute names that collide with reserved words and are bound to a
/// member carrying a trailing `_`.
const RESERVED_NAMES: [&str; 5] = ["class", "default", "throw", "new", "null"];

/// Field-family prefix that locale-qualified names collapse onto.
const LOCALE_FIELD_PREFIX: &str = "locale_";

/// A member found for a normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    /// Member name as declared in the type's [`Members`](super::Members) table
    pub name: String,
    /// Declared value type
    pub value_type: MemberType,
}

/// Result of resolving one normalized name against one mapped type.
///
/// Both sides may be absent; a resolution with neither is a cached negative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberResolution {
    /// Field-like slot, preferred when a conversion exists for its type
    pub field: Option<ResolvedMember>,
    /// Single-argument setter
    pub setter: Option<ResolvedMember>,
}

impl MemberResolution {
    /// Whether neither a field nor a setter matched
    pub fn is_missing(&self) -> bool {
        self.field.is_none() && self.setter.is_none()
    }
}

/// Normalize an attribute or tag name into a member name.
///
/// Reserved words get a trailing `_` and namespace colons become `_`, so
/// `class` binds to `class_` and `xml:lang` to `xml_lang`.
pub fn normalize_name(name: &str) -> Cow<'_, str> {
    let mut name = Cow::Borrowed(name);
    if RESERVED_NAMES.contains(&name.as_ref()) {
        name = Cow::Owned(format!("{name}_"));
    }
    if name.contains(':') {
        name = Cow::Owned(name.replace(':', "_"));
    }
    name
}

/// Setter name for a member: `set` followed by the capitalized name.
pub fn setter_name(base: &str) -> String {
    let mut chars = base.chars();
    let mut setter = String::with_capacity(base.len() + 3);
    setter.push_str("set");
    if let Some(first) = chars.next() {
        setter.extend(first.to_uppercase());
        setter.push_str(chars.as_str());
    }
    setter
}

/// Resolves names to members of mapped types and assigns converted values.
///
/// Resolutions are pure in `(type, name)` and memoized for the lifetime of
/// the binder, missing members included.
#[derive(Debug)]
pub struct FieldBinder {
    conversions: ConversionRegistry,
    locale_prefix: Option<String>,
    resolved: RefCell<HashMap<TypeId, HashMap<String, Rc<MemberResolution>>>>,
}

impl FieldBinder {
    /// Binder using the given conversions and optional locale prefix
    /// (for example `"de."`, so that `de.name` reaches `locale_name`).
    pub fn new(conversions: ConversionRegistry, locale_prefix: Option<String>) -> Self {
        Self {
            conversions,
            locale_prefix: locale_prefix.filter(|p| !p.is_empty()),
            resolved: RefCell::new(HashMap::new()),
        }
    }

    /// Conversions consulted for field and setter types
    pub fn conversions(&self) -> &ConversionRegistry {
        &self.conversions
    }

    /// Mutable access to the conversions
    pub fn conversions_mut(&mut self) -> &mut ConversionRegistry {
        &mut self.conversions
    }

    /// Configured locale prefix
    pub fn locale_prefix(&self) -> Option<&str> {
        self.locale_prefix.as_deref()
    }

    /// Number of memoized resolutions.
    pub fn cached_resolutions(&self) -> usize {
        self.resolved.borrow().values().map(HashMap::len).sum()
    }

    fn strip_locale<'n>(&self, name: &'n str) -> Option<&'n str> {
        self.locale_prefix
            .as_deref()
            .and_then(|prefix| name.strip_prefix(prefix))
    }

    /// Resolve a normalized name, consulting the memo first.
    pub(crate) fn resolve(&self, ty: &dyn MappedType, name: &str) -> Rc<MemberResolution> {
        if let Some(hit) = self
            .resolved
            .borrow()
            .get(&ty.target_type())
            .and_then(|names| names.get(name))
        {
            return Rc::clone(hit);
        }

        let resolution = Rc::new(self.resolve_uncached(ty, name));
        self.resolved
            .borrow_mut()
            .entry(ty.target_type())
            .or_default()
            .insert(name.to_owned(), Rc::clone(&resolution));
        resolution
    }

    fn resolve_uncached(&self, ty: &dyn MappedType, name: &str) -> MemberResolution {
        let localized = self.strip_locale(name);

        let lookup = |kind: MemberKind, member: String| {
            ty.member(kind, &member).map(|value_type| ResolvedMember {
                name: member,
                value_type,
            })
        };

        let field = lookup(MemberKind::Field, name.to_owned()).or_else(|| {
            localized.and_then(|rest| {
                lookup(MemberKind::Field, format!("{LOCALE_FIELD_PREFIX}{rest}"))
            })
        });
        let setter = lookup(MemberKind::Setter, setter_name(localized.unwrap_or(name)));

        MemberResolution { field, setter }
    }

    /// Bind `raw` to the member `name` resolves to on `target`.
    ///
    /// Returns `Ok(false)` when no member matched; the value is dropped.
    pub(crate) fn bind(
        &self,
        ty: &dyn MappedType,
        target: &mut dyn Any,
        name: &str,
        raw: &str,
    ) -> Result<bool, Failure> {
        let normalized = normalize_name(name);
        let resolution = self.resolve(ty, &normalized);

        if let Some(field) = &resolution.field {
            if let Some(value) = self.conversions.try_parse(field.value_type.id, raw)? {
                self.assign(ty, target, MemberKind::Field, &field.name, value)?;
                return Ok(true);
            }
        }

        if let Some(setter) = &resolution.setter {
            let value = self
                .conversions
                .try_parse(setter.value_type.id, raw)?
                .unwrap_or_else(|| Box::new(raw.to_owned()) as Value);
            self.assign(ty, target, MemberKind::Setter, &setter.name, value)?;
            return Ok(true);
        }

        trace!("Ignoring `{}` on `{}`", name, ty.type_name());
        Ok(false)
    }

    fn assign(
        &self,
        ty: &dyn MappedType,
        target: &mut dyn Any,
        kind: MemberKind,
        member: &str,
        value: Value,
    ) -> Result<(), Failure> {
        ty.assign(target, kind, member, value)
            .map_err(|source| Failure::Binding {
                member: member.to_owned(),
                type_name: ty.type_name(),
                source,
            })
    }
}

impl Default for FieldBinder {
    fn default() -> Self {
        Self::new(ConversionRegistry::with_defaults(), None)
    }
}
