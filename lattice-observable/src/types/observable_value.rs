//! Boxed Values
//!
//! An [`ObservableValue`] holds a single value. It is what `observable.box`
//! returns and what every member of an [`ObservableObject`] is stored in.
//!
//! [`ObservableObject`]: super::ObservableObject

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::modifiers::Enhancer;
use crate::error::Result;
use crate::reactive::{next_debug_id, Atom};
use crate::value::Value;

struct ValueInner {
    atom: Atom,
    enhancer: Enhancer,
    value: RwLock<Value>,
}

/// A reactive box around one value.
///
/// Clones share the same box.
#[derive(Clone)]
pub struct ObservableValue {
    inner: Arc<ValueInner>,
}

impl ObservableValue {
    /// Create a box. The initial value goes through `enhancer`.
    pub fn new(value: Value, enhancer: Enhancer, name: Option<String>) -> Result<Self> {
        let name = name.unwrap_or_else(|| format!("ObservableValue@{}", next_debug_id()));
        let value = enhancer.enhance(value, &Value::Undefined, &name)?;
        tracing::trace!(%name, enhancer = enhancer.name(), "created observable value");

        Ok(Self {
            inner: Arc::new(ValueInner {
                atom: Atom::new(name),
                enhancer,
                value: RwLock::new(value),
            }),
        })
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        self.inner.atom.name()
    }

    /// The policy applied on writes.
    pub fn enhancer(&self) -> Enhancer {
        self.inner.enhancer
    }

    /// Read the value, registering a dependency with the running reaction.
    pub fn get(&self) -> Value {
        self.inner.atom.report_observed();
        self.get_untracked()
    }

    /// Read the value without tracking.
    pub fn get_untracked(&self) -> Value {
        self.inner.value.read().clone()
    }

    /// Replace the value.
    ///
    /// Returns whether a change was reported. Writing a value equal to the
    /// stored one (after enhancement) is not a change.
    pub fn set(&self, value: Value) -> Result<bool> {
        let old = self.get_untracked();
        let new = self.inner.enhancer.enhance(value, &old, self.name())?;
        if new == old {
            return Ok(false);
        }

        *self.inner.value.write() = new;
        self.inner.atom.report_changed();
        Ok(true)
    }

    /// Number of reactions observing this box.
    pub fn observer_count(&self) -> usize {
        self.inner.atom.observer_count()
    }

    /// True if both handles refer to the same box.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl fmt::Debug for ObservableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("name", &self.name())
            .field("enhancer", &self.enhancer())
            .field("value", &self.get_untracked())
            .finish()
    }
}
