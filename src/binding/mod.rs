//! Member descriptors for mapped types and the field binder that drives them.
//!
//! A type becomes mappable by implementing [`Mapped`] and listing its
//! assignable members in [`Mapped::describe`]:
//!
//! ```rust
//! use xmlmap::binding::{Mapped, Members};
//!
//! #[derive(Debug, Default)]
//! struct Item {
//!     name: String,
//!     deprecated: bool,
//!     kind: String,
//! }
//!
//! impl Item {
//!     fn set_type(&mut self, kind: String) {
//!         self.kind = kind.to_lowercase();
//!     }
//! }
//!
//! impl Mapped for Item {
//!     fn describe(members: &mut Members<Self>) {
//!         members
//!             .field("name", |item: &mut Self, v: String| item.name = v)
//!             .field("deprecated", |item: &mut Self, v: bool| item.deprecated = v)
//!             .setter("setType", |item: &mut Self, v: String| item.set_type(v));
//!     }
//! }
//! ```
//!
//! Fields are preferred over setters. A setter is looked up by the name
//! `set` + the capitalized attribute name, so the attribute `type` above
//! reaches `setType`.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::conversion::Value;
use crate::error::BoxError;

mod binder;


pub use binder::{normalize_name, setter_name, FieldBinder, MemberResolution, ResolvedMember};

/// A type whose instances can be built from XML elements.
pub trait Mapped: Any {
    /// Register the fields and setters attributes and text may be bound to.
    fn describe(members: &mut Members<Self>)
    where
        Self: Sized;
}

type Assign<T> = Box<dyn Fn(&mut T, Value) -> Result<(), BoxError>>;

/// One assignable member: its declared value type and how to assign it.
struct Slot<T> {
    value_type: TypeId,
    value_type_name: &'static str,
    assign: Assign<T>,
}

impl<T: 'static> Slot<T> {
    fn new<V, F>(assign: F) -> Self
    where
        V: Any,
        F: Fn(&mut T, V) -> Result<(), BoxError> + 'static,
    {
        Self {
            value_type: TypeId::of::<V>(),
            value_type_name: std::any::type_name::<V>(),
            assign: Box::new(move |target: &mut T, value: Value| match value.downcast::<V>() {
                Ok(v) => assign(target, *v),
                Err(_) => {
                    Err(format!("expected a `{}` argument", std::any::type_name::<V>()).into())
                }
            }),
        }
    }
}

/// The two kinds of assignable members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Field-like slot, assigned directly
    Field,
    /// Single-argument setter
    Setter,
}

/// Declared value type of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberType {
    /// Type identifier used to find a conversion
    pub id: TypeId,
    /// Type name for diagnostics
    pub name: &'static str,
}

/// Field and setter table of a mapped type.
pub struct Members<T> {
    fields: HashMap<String, Slot<T>>,
    setters: HashMap<String, Slot<T>>,
}

impl<T: 'static> Members<T> {
    fn new() -> Self {
        Self {
            fields: HashMap::new(),
            setters: HashMap::new(),
        }
    }

    /// Declare a field-like slot. `name` is the normalized attribute name
    /// (reserved words carry a trailing `_`, colons become `_`).
    pub fn field<V, F>(&mut self, name: &str, assign: F) -> &mut Self
    where
        V: Any,
        F: Fn(&mut T, V) + 'static,
    {
        let slot = Slot::new(move |target: &mut T, v: V| {
            assign(target, v);
            Ok(())
        });
        self.fields.insert(name.to_owned(), slot);
        self
    }

    /// Declare a single-argument setter under its full name, e.g. `setName`.
    pub fn setter<V, F>(&mut self, name: &str, set: F) -> &mut Self
    where
        V: Any,
        F: Fn(&mut T, V) + 'static,
    {
        self.try_setter(name, move |target: &mut T, v: V| {
            set(target, v);
            Ok(())
        })
    }

    /// Declare a setter that may reject its argument.
    pub fn try_setter<V, F>(&mut self, name: &str, set: F) -> &mut Self
    where
        V: Any,
        F: Fn(&mut T, V) -> Result<(), BoxError> + 'static,
    {
        self.setters.insert(name.to_owned(), Slot::new(set));
        self
    }

    fn table(&self, kind: MemberKind) -> &HashMap<String, Slot<T>> {
        match kind {
            MemberKind::Field => &self.fields,
            MemberKind::Setter => &self.setters,
        }
    }
}

/// Type-erased view of a mapped type, held by tag bindings.
pub(crate) trait MappedType {
    fn target_type(&self) -> TypeId;

    fn type_name(&self) -> &'static str;

    fn construct(&self) -> Result<Rc<RefCell<dyn Any>>, BoxError>;

    fn member(&self, kind: MemberKind, name: &str) -> Option<MemberType>;

    fn assign(
        &self,
        target: &mut dyn Any,
        kind: MemberKind,
        name: &str,
        value: Value,
    ) -> Result<(), BoxError>;
}

type Constructor<T> = Box<dyn Fn() -> Result<T, BoxError>>;

/// Members and constructor of one mapped type.
pub(crate) struct TypeDescriptor<T> {
    members: Members<T>,
    construct: Constructor<T>,
}

impl<T: Mapped> TypeDescriptor<T> {
    pub(crate) fn new<F>(construct: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + 'static,
    {
        let mut members = Members::new();
        T::describe(&mut members);
        Self {
            members,
            construct: Box::new(construct),
        }
    }
}

impl<T: Mapped> MappedType for TypeDescriptor<T> {
    fn target_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn construct(&self) -> Result<Rc<RefCell<dyn Any>>, BoxError> {
        let instance: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new((self.construct)()?));
        Ok(instance)
    }

    fn member(&self, kind: MemberKind, name: &str) -> Option<MemberType> {
        self.members.table(kind).get(name).map(|slot| MemberType {
            id: slot.value_type,
            name: slot.value_type_name,
        })
    }

    fn assign(
        &self,
        target: &mut dyn Any,
        kind: MemberKind,
        name: &str,
        value: Value,
    ) -> Result<(), BoxError> {
        let target = target
            .downcast_mut::<T>()
            .ok_or_else(|| format!("instance is not a `{}`", self.type_name()))?;
        let slot = self
            .members
            .table(kind)
            .get(name)
            .ok_or_else(|| format!("no member `{name}`"))?;
        (slot.assign)(target, value)
    }
}

impl<T> fmt::Debug for Members<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<_> = self.fields.keys().collect();
        let mut setters: Vec<_> = self.setters.keys().collect();
        fields.sort_unstable();
        setters.sort_unstable();
        f.debug_struct("Members")
            .field("fields", &fields)
            .field("setters", &setters)
            .finish()
    }
}
