//! Observable Objects
//!
//! A dynamically extensible reactive structure. Each member lives in its
//! own [`ObservableValue`] with its own enhancer; the set of keys is
//! tracked by a separate atom, so adding or removing a member notifies
//! anyone who read the key set.
//!
//! Members are registered explicitly:
//!
//! - [`define_property`](ObservableObject::define_property) stores an
//!   initial value through the given enhancer.
//! - [`declare_property`](ObservableObject::declare_property) only records
//!   the enhancer; the first [`set`](ObservableObject::set) is enhanced
//!   and creates the member.
//! - [`set`](ObservableObject::set) on an unknown key adds a member that
//!   uses the object's default enhancer.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::modifiers::Enhancer;
use super::observable_value::ObservableValue;
use crate::error::Result;
use crate::reactive::{next_debug_id, Atom};
use crate::value::Value;

#[derive(Clone)]
enum Member {
    /// Declared with an enhancer, not written yet.
    Declared(Enhancer),
    Value(ObservableValue),
}

impl Member {
    fn enhancer(&self) -> Enhancer {
        match self {
            Member::Declared(enhancer) => *enhancer,
            Member::Value(boxed) => boxed.enhancer(),
        }
    }
}

struct ObjectInner {
    name: String,
    default_enhancer: Enhancer,
    keys_atom: Atom,
    members: RwLock<IndexMap<String, Member>>,
}

/// A reactive structure. Clones share the same object.
#[derive(Clone)]
pub struct ObservableObject {
    inner: Arc<ObjectInner>,
}

impl ObservableObject {
    /// Create an empty object. Members added later through
    /// [`set`](Self::set) use `default_enhancer`.
    pub fn new(default_enhancer: Enhancer, name: Option<String>) -> Self {
        let name = name.unwrap_or_else(|| format!("ObservableObject@{}", next_debug_id()));
        tracing::trace!(%name, enhancer = default_enhancer.name(), "created observable object");

        Self {
            inner: Arc::new(ObjectInner {
                keys_atom: Atom::new(format!("{name}.keys")),
                name,
                default_enhancer,
                members: RwLock::new(IndexMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Enhancer used for members added after creation.
    pub fn default_enhancer(&self) -> Enhancer {
        self.inner.default_enhancer
    }

    fn member(&self, key: &str) -> Option<Member> {
        self.inner.members.read().get(key).cloned()
    }

    /// Enhancer governing `key`, if the key is registered.
    pub fn enhancer_of(&self, key: &str) -> Option<Enhancer> {
        self.member(key).map(|member| member.enhancer())
    }

    /// Register `key` with an initial value passed through `enhancer`.
    ///
    /// An existing member under the same key is replaced.
    pub fn define_property(&self, key: &str, initial: Value, enhancer: Enhancer) -> Result<()> {
        let boxed = ObservableValue::new(initial, enhancer, Some(format!("{}.{key}", self.name())))?;
        self.inner
            .members
            .write()
            .insert(key.to_owned(), Member::Value(boxed));
        self.inner.keys_atom.report_changed();
        Ok(())
    }

    /// Register `key` without a value. The first write goes through
    /// `enhancer`.
    ///
    /// Returns false and leaves the member alone if `key` already exists.
    pub fn declare_property(&self, key: &str, enhancer: Enhancer) -> bool {
        let added = {
            let mut members = self.inner.members.write();
            if members.contains_key(key) {
                false
            } else {
                members.insert(key.to_owned(), Member::Declared(enhancer));
                true
            }
        };
        if added {
            self.inner.keys_atom.report_changed();
        }
        added
    }

    /// Read a member. Missing and not-yet-written members read as
    /// `Undefined`.
    pub fn get(&self, key: &str) -> Value {
        self.inner.keys_atom.report_observed();
        match self.member(key) {
            Some(Member::Value(boxed)) => boxed.get(),
            Some(Member::Declared(_)) | None => Value::Undefined,
        }
    }

    /// Write a member, adding it if the object does not have it yet.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        match self.member(key) {
            Some(Member::Value(boxed)) => boxed.set(value).map(|_| ()),
            Some(Member::Declared(enhancer)) => self.define_property(key, value, enhancer),
            None => self.define_property(key, value, self.inner.default_enhancer),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.keys_atom.report_observed();
        self.inner.members.read().contains_key(key)
    }

    /// Registered keys in definition order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.keys_atom.report_observed();
        self.inner.members.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.keys_atom.report_observed();
        self.inner.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a member. Returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.inner.members.write().shift_remove(key).is_some();
        if removed {
            self.inner.keys_atom.report_changed();
        }
        removed
    }

    /// Snapshot of every written member, in definition order.
    pub fn entries(&self) -> IndexMap<String, Value> {
        self.inner.keys_atom.report_observed();
        let members: Vec<(String, Member)> = self
            .inner
            .members
            .read()
            .iter()
            .map(|(k, m)| (k.clone(), m.clone()))
            .collect();

        members
            .into_iter()
            .filter_map(|(key, member)| match member {
                Member::Value(boxed) => Some((key, boxed.get())),
                Member::Declared(_) => None,
            })
            .collect()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.keys_atom.observer_count()
    }

    /// True if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl fmt::Debug for ObservableObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.inner.members.read().keys().cloned().collect();
        f.debug_struct("ObservableObject")
            .field("name", &self.name())
            .field("default_enhancer", &self.default_enhancer())
            .field("keys", &keys)
            .finish()
    }
}
