//! Event-driven object construction.
//!
//! [`ObjectBuilder`] is the terminal [`ContentHandler`] of every pipeline. It
//! keeps a stack of frames, one per open *registered* element; unregistered
//! elements are transparent and push nothing. Instances are emitted into the
//! production queue according to their binding's [`Lifecycle`]:
//!
//! | Lifecycle | emitted at open | emitted at close |
//! |-----------|-----------------|------------------|
//! | `OnEnd`   | -               | yes              |
//! | `OnStart` | yes             | -                |
//! | `Both`    | yes             | yes (same instance) |
//!
//! Character data accumulates on the innermost frame. When a registered
//! element closes with non-blank text, the trimmed text is bound to its own
//! instance using the tag name as the member name, before any close-time
//! emission.

use crate::binding::FieldBinder;
use crate::error::Failure;
use crate::events::{ContentHandler, EndElement, StartElement};
use crate::registry::{Lifecycle, TagRegistry, TypeBinding};
use crate::sequence::{MappedObject, ResultSequence};

#[cfg(test)]
mod tests;

/// One open registered element.
struct Frame<'p> {
    binding: &'p TypeBinding,
    object: MappedObject,
    text: String,
}

/// Builds mapped objects from XML events.
///
/// The builder is per-parse state: construct one for each document and turn
/// it into a [`ResultSequence`] once the input has been consumed.
pub struct ObjectBuilder<'p> {
    registry: &'p TagRegistry,
    binder: &'p FieldBinder,
    frames: Vec<Frame<'p>>,
    queue: Vec<MappedObject>,
}

impl<'p> ObjectBuilder<'p> {
    /// Builder mapping the tags in `registry`, assigning members via `binder`
    pub fn new(registry: &'p TagRegistry, binder: &'p FieldBinder) -> Self {
        Self {
            registry,
            binder,
            frames: Vec::new(),
            queue: Vec::new(),
        }
    }

    /// Number of registered elements currently open
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of objects emitted so far (a `Both` element counts twice)
    pub fn emitted(&self) -> usize {
        self.queue.len()
    }

    /// Finish the parse and expose the production queue
    pub fn into_sequence(self) -> ResultSequence {
        ResultSequence::new(self.queue)
    }

    fn bind(
        &self,
        binding: &TypeBinding,
        object: &MappedObject,
        name: &str,
        raw: &str,
    ) -> Result<bool, Failure> {
        let mut target = object.instance().borrow_mut();
        self.binder.bind(binding.target(), &mut *target, name, raw)
    }
}

impl ContentHandler for ObjectBuilder<'_> {
    fn start_element(&mut self, element: StartElement) -> Result<(), Failure> {
        let registry = self.registry;
        let Some(binding) = registry.get(&element.name) else {
            return Ok(());
        };

        let instance = binding
            .target()
            .construct()
            .map_err(|source| Failure::Construction {
                type_name: binding.type_name(),
                source,
            })?;
        let object = MappedObject::new(instance, binding.shared_tag(), binding.type_name());

        for attribute in &element.attributes {
            self.bind(binding, &object, &attribute.name, &attribute.value)?;
        }

        match binding.lifecycle() {
            Lifecycle::OnStart | Lifecycle::Both => self.queue.push(object.clone()),
            Lifecycle::OnEnd => {}
        }

        self.frames.push(Frame {
            binding,
            object,
            text: String::new(),
        });
        Ok(())
    }

    fn end_element(&mut self, element: EndElement) -> Result<(), Failure> {
        if !self.registry.contains(&element.name) {
            return Ok(());
        }
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        debug_assert_eq!(frame.binding.tag(), element.name);

        if !frame.text.is_empty() {
            self.bind(frame.binding, &frame.object, &element.name, frame.text.trim())?;
        }

        if frame.binding.lifecycle() != Lifecycle::OnStart {
            self.queue.push(frame.object);
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), Failure> {
        if let Some(frame) = self.frames.last_mut() {
            frame.text.push_str(text);
        }
        Ok(())
    }
}
