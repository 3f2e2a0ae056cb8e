//! Atoms
//!
//! An atom is the tracking half of a reactive container. Containers own
//! their data; the atom only knows how to report that the data was read
//! or changed.
//!
//! # How Atoms Work
//!
//! 1. A container calls [`Atom::report_observed`] on every read. If a
//!    reaction is running, the atom becomes one of its dependencies.
//!
//! 2. After a write the container calls [`Atom::report_changed`], which
//!    notifies every reaction that read the atom.
//!
//! Containers must release their own locks before reporting a change,
//! because observers run synchronously and will read the container again.

use std::fmt;

use super::context::ReactiveContext;
use super::id::AtomId;
use super::runtime::Runtime;

/// Tracking handle for one piece of observable state.
pub struct Atom {
    id: AtomId,
    name: String,
}

impl Atom {
    /// Create an atom with a debug name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AtomId::new(),
            name: name.into(),
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> AtomId {
        self.id
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a read with the running reaction, if any.
    ///
    /// Returns true when a dependency was recorded.
    pub fn report_observed(&self) -> bool {
        let Some(reaction) = ReactiveContext::current_reaction() else {
            return false;
        };
        ReactiveContext::track(self.id);
        Runtime::add_dependency(self.id, reaction);
        true
    }

    /// Notify observers that the state behind this atom changed.
    pub fn report_changed(&self) {
        tracing::trace!(atom = %self.name, "report changed");
        Runtime::notify_atom_change(self.id);
    }

    /// Number of reactions currently observing this atom.
    pub fn observer_count(&self) -> usize {
        Runtime::observer_count(self.id)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("observer_count", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::id::ReactionId;

    #[test]
    fn observed_outside_reaction_records_nothing() {
        let atom = Atom::new("lonely");
        assert!(!atom.report_observed());
        assert_eq!(atom.observer_count(), 0);
    }

    #[test]
    fn observed_inside_context_adds_edge() {
        let atom = Atom::new("tracked");
        let reaction = ReactionId::new();

        {
            let _ctx = ReactiveContext::enter(reaction);
            assert!(atom.report_observed());
            assert_eq!(ReactiveContext::observed(), vec![atom.id()]);
        }

        assert_eq!(atom.observer_count(), 1);
        Runtime::clear_dependencies(reaction);
        assert_eq!(atom.observer_count(), 0);
    }
}
