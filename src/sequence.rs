//! Objects produced by a parse and the sequence they are returned in.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Shared handle to one constructed instance.
///
/// Clones refer to the same instance. An element bound with
/// [`Lifecycle::Both`](crate::registry::Lifecycle::Both) appears twice in a
/// [`ResultSequence`] as two handles to one instance, so the open-time entry
/// shows the final state once the parse has finished.
#[derive(Clone)]
pub struct MappedObject {
    instance: Rc<RefCell<dyn Any>>,
    tag: Rc<str>,
    type_name: &'static str,
}

impl MappedObject {
    pub(crate) fn new(
        instance: Rc<RefCell<dyn Any>>,
        tag: Rc<str>,
        type_name: &'static str,
    ) -> Self {
        Self {
            instance,
            tag,
            type_name,
        }
    }

    /// Tag name of the element this instance was built from
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Name of the instance's type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the instance is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.instance.borrow().is::<T>()
    }

    /// Borrow the instance as a `T`, or `None` if it is another type.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently mutably borrowed.
    pub fn borrow<T: Any>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.instance.borrow(), |any| any.downcast_ref::<T>()).ok()
    }

    /// Mutably borrow the instance as a `T`, or `None` if it is another type.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently borrowed.
    pub fn borrow_mut<T: Any>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.instance.borrow_mut(), |any| any.downcast_mut::<T>()).ok()
    }

    /// Apply `f` to the instance as a `T`
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.borrow::<T>().map(|value| f(&*value))
    }

    /// Whether both handles refer to the same instance
    pub fn ptr_eq(&self, other: &MappedObject) -> bool {
        Rc::ptr_eq(&self.instance, &other.instance)
    }

    pub(crate) fn instance(&self) -> &RefCell<dyn Any> {
        &self.instance
    }
}

impl fmt::Debug for MappedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedObject")
            .field("tag", &self.tag)
            .field("type", &self.type_name)
            .finish()
    }
}

/// Finite, fully materialized sequence of the objects a parse produced, in
/// emission order.
///
/// The sequence doubles as a forward-only cursor ([`has_next`](Self::has_next)
/// and [`Iterator::next`]); [`iter`](Self::iter) walks the same objects
/// again from the start without touching the cursor.
#[derive(Debug, Clone)]
pub struct ResultSequence {
    objects: Rc<[MappedObject]>,
    cursor: usize,
}

impl ResultSequence {
    pub(crate) fn new(objects: Vec<MappedObject>) -> Self {
        Self {
            objects: objects.into(),
            cursor: 0,
        }
    }

    /// Whether the cursor has another object
    pub fn has_next(&self) -> bool {
        self.cursor < self.objects.len()
    }

    /// Fresh iterator over every object, independent of the cursor
    pub fn iter(&self) -> std::slice::Iter<'_, MappedObject> {
        self.objects.iter()
    }

    /// Objects of type `T`, in order
    pub fn of_type<T: Any>(&self) -> impl Iterator<Item = &MappedObject> + '_ {
        self.objects.iter().filter(|object| object.is::<T>())
    }

    /// All objects as a slice
    pub fn as_slice(&self) -> &[MappedObject] {
        &self.objects
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the parse produced nothing
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Copy the objects into a vector
    pub fn into_vec(self) -> Vec<MappedObject> {
        self.objects.to_vec()
    }
}

impl Iterator for ResultSequence {
    type Item = MappedObject;

    fn next(&mut self) -> Option<Self::Item> {
        let object = self.objects.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(object)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.objects.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a ResultSequence {
    type Item = &'a MappedObject;
    type IntoIter = std::slice::Iter<'a, MappedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
