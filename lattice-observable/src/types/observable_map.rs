//! Observable Maps
//!
//! A reactive associative map with string keys. Iteration follows
//! insertion order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::modifiers::Enhancer;
use crate::error::Result;
use crate::reactive::{next_debug_id, Atom};
use crate::value::Value;

struct MapInner {
    atom: Atom,
    enhancer: Enhancer,
    entries: RwLock<IndexMap<String, Value>>,
}

/// A reactive map. Clones share the same map.
#[derive(Clone)]
pub struct ObservableMap {
    inner: Arc<MapInner>,
}

impl ObservableMap {
    /// Create a map from initial entries, enhancing every value.
    pub fn new(
        initial: IndexMap<String, Value>,
        enhancer: Enhancer,
        name: Option<String>,
    ) -> Result<Self> {
        let name = name.unwrap_or_else(|| format!("ObservableMap@{}", next_debug_id()));
        let entries = initial
            .into_iter()
            .map(|(key, value)| -> Result<(String, Value)> {
                let value = enhancer.enhance(value, &Value::Undefined, &format!("{name}.{key}"))?;
                Ok((key, value))
            })
            .collect::<Result<IndexMap<_, _>>>()?;
        tracing::trace!(%name, len = entries.len(), enhancer = enhancer.name(), "created observable map");

        Ok(Self {
            inner: Arc::new(MapInner {
                atom: Atom::new(name),
                enhancer,
                entries: RwLock::new(entries),
            }),
        })
    }

    pub fn name(&self) -> &str {
        self.inner.atom.name()
    }

    /// The policy applied to values.
    pub fn enhancer(&self) -> Enhancer {
        self.inner.enhancer
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.atom.report_observed();
        self.inner.entries.read().get(key).cloned()
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.atom.report_observed();
        self.inner.entries.read().contains_key(key)
    }

    /// Insert or replace the value under `key`.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        let old = self.inner.entries.read().get(&key).cloned();
        let new = self.inner.enhancer.enhance(
            value,
            old.as_ref().unwrap_or(&Value::Undefined),
            &format!("{}.{key}", self.name()),
        )?;
        if old.as_ref() == Some(&new) {
            return Ok(());
        }

        self.inner.entries.write().insert(key, new);
        self.inner.atom.report_changed();
        Ok(())
    }

    /// Remove `key`. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.inner.entries.write().shift_remove(key).is_some();
        if removed {
            self.inner.atom.report_changed();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.atom.report_observed();
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.atom.report_observed();
        self.inner.entries.read().keys().cloned().collect()
    }

    /// Snapshot of all entries in insertion order.
    pub fn entries(&self) -> IndexMap<String, Value> {
        self.inner.atom.report_observed();
        self.inner.entries.read().clone()
    }

    pub fn clear(&self) {
        let had_entries = {
            let mut entries = self.inner.entries.write();
            let had_entries = !entries.is_empty();
            entries.clear();
            had_entries
        };
        if had_entries {
            self.inner.atom.report_changed();
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.atom.observer_count()
    }

    /// True if both handles refer to the same map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl fmt::Debug for ObservableMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableMap")
            .field("name", &self.name())
            .field("enhancer", &self.enhancer())
            .field("entries", &*self.inner.entries.read())
            .finish()
    }
}
