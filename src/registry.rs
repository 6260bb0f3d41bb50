//! Tag name to mapped type bindings.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::binding::{Mapped, MappedType, TypeDescriptor};
use crate::error::BoxError;

/// When an element's instance is emitted into the result sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    /// Emitted once, when the element closes
    #[default]
    OnEnd,
    /// Emitted once, as soon as the element opens
    OnStart,
    /// Emitted when the element opens and again when it closes
    Both,
}

/// Binding of one tag name to a target type and lifecycle.
#[derive(Clone)]
pub struct TypeBinding {
    tag: Rc<str>,
    lifecycle: Lifecycle,
    target: Rc<dyn MappedType>,
}

impl TypeBinding {
    /// Tag name the binding is registered under
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn shared_tag(&self) -> Rc<str> {
        Rc::clone(&self.tag)
    }

    /// Lifecycle mode
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Name of the target type
    pub fn type_name(&self) -> &'static str {
        self.target.type_name()
    }

    pub(crate) fn target(&self) -> &dyn MappedType {
        self.target.as_ref()
    }
}

impl fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBinding")
            .field("tag", &self.tag)
            .field("lifecycle", &self.lifecycle)
            .field("type", &self.type_name())
            .finish()
    }
}

/// Registry of tag bindings, consulted read-only while parsing.
#[derive(Debug, Default, Clone)]
pub struct TagRegistry {
    bindings: HashMap<String, TypeBinding>,
}

impl TagRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag` to `T`, built with its `Default` implementation.
    pub fn insert<T>(&mut self, tag: &str, lifecycle: Lifecycle)
    where
        T: Mapped + Default,
    {
        self.insert_with(tag, lifecycle, || Ok(T::default()));
    }

    /// Bind `tag` to `T`, built by `construct`. An error returned by the
    /// constructor aborts the parse with a construction failure.
    ///
    /// Any previous binding for `tag` is replaced.
    pub fn insert_with<T, F>(&mut self, tag: &str, lifecycle: Lifecycle, construct: F)
    where
        T: Mapped,
        F: Fn() -> Result<T, BoxError> + 'static,
    {
        let binding = TypeBinding {
            tag: Rc::from(tag),
            lifecycle,
            target: Rc::new(TypeDescriptor::new(construct)),
        };
        self.bindings.insert(tag.to_owned(), binding);
    }

    /// Remove the binding for `tag`, returning it
    pub fn remove(&mut self, tag: &str) -> Option<TypeBinding> {
        self.bindings.remove(tag)
    }

    /// Binding registered for `tag`
    pub fn get(&self, tag: &str) -> Option<&TypeBinding> {
        self.bindings.get(tag)
    }

    /// Whether `tag` is registered
    pub fn contains(&self, tag: &str) -> bool {
        self.bindings.contains_key(tag)
    }

    /// Number of registered tags
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no tag is registered
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered tag names, in no particular order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
