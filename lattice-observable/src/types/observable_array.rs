//! Observable Arrays
//!
//! A reactive ordered sequence. Every element written goes through the
//! array's enhancer; reads and structural changes share one atom.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::modifiers::Enhancer;
use crate::error::{ObservableError, Result};
use crate::reactive::{next_debug_id, Atom};
use crate::value::Value;

struct ArrayInner {
    atom: Atom,
    enhancer: Enhancer,
    items: RwLock<Vec<Value>>,
}

/// A reactive sequence. Clones share the same array.
#[derive(Clone)]
pub struct ObservableArray {
    inner: Arc<ArrayInner>,
}

impl ObservableArray {
    /// Create an array from initial items, enhancing each of them.
    pub fn new(initial: Vec<Value>, enhancer: Enhancer, name: Option<String>) -> Result<Self> {
        let name = name.unwrap_or_else(|| format!("ObservableArray@{}", next_debug_id()));
        let element_name = format!("{name}[..]");
        let items = initial
            .into_iter()
            .map(|item| enhancer.enhance(item, &Value::Undefined, &element_name))
            .collect::<Result<Vec<_>>>()?;
        tracing::trace!(%name, len = items.len(), enhancer = enhancer.name(), "created observable array");

        Ok(Self {
            inner: Arc::new(ArrayInner {
                atom: Atom::new(name),
                enhancer,
                items: RwLock::new(items),
            }),
        })
    }

    pub fn name(&self) -> &str {
        self.inner.atom.name()
    }

    /// The policy applied to elements.
    pub fn enhancer(&self) -> Enhancer {
        self.inner.enhancer
    }

    fn element_name(&self) -> String {
        format!("{}[..]", self.name())
    }

    pub fn len(&self) -> usize {
        self.inner.atom.report_observed();
        self.inner.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.atom.report_observed();
        self.inner.items.read().get(index).cloned()
    }

    /// Snapshot of all elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.atom.report_observed();
        self.inner.items.read().clone()
    }

    /// Append an element.
    pub fn push(&self, value: Value) -> Result<()> {
        let value = self
            .inner
            .enhancer
            .enhance(value, &Value::Undefined, &self.element_name())?;
        self.inner.items.write().push(value);
        self.inner.atom.report_changed();
        Ok(())
    }

    /// Replace the element at `index`. Writing at `len()` appends.
    pub fn set(&self, index: usize, value: Value) -> Result<()> {
        let (old, len) = {
            let items = self.inner.items.read();
            (items.get(index).cloned(), items.len())
        };

        let Some(old) = old else {
            if index == len {
                return self.push(value);
            }
            return Err(ObservableError::IndexOutOfBounds {
                name: self.name().to_owned(),
                index,
                len,
            });
        };

        let new = self.inner.enhancer.enhance(value, &old, &self.element_name())?;
        if new == old {
            return Ok(());
        }

        if let Some(slot) = self.inner.items.write().get_mut(index) {
            *slot = new;
        }
        self.inner.atom.report_changed();
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<Value> {
        let popped = self.inner.items.write().pop();
        if popped.is_some() {
            self.inner.atom.report_changed();
        }
        popped
    }

    /// Remove and return the element at `index`.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let removed = {
            let mut items = self.inner.items.write();
            (index < items.len()).then(|| items.remove(index))
        };
        if removed.is_some() {
            self.inner.atom.report_changed();
        }
        removed
    }

    /// Remove every element.
    pub fn clear(&self) {
        let had_items = {
            let mut items = self.inner.items.write();
            let had_items = !items.is_empty();
            items.clear();
            had_items
        };
        if had_items {
            self.inner.atom.report_changed();
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.atom.observer_count()
    }

    /// True if both handles refer to the same array.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl fmt::Debug for ObservableArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableArray")
            .field("name", &self.name())
            .field("enhancer", &self.enhancer())
            .field("items", &*self.inner.items.read())
            .finish()
    }
}
