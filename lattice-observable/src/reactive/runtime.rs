//! Reactive Runtime
//!
//! The runtime connects atoms to the reactions that read them.
//!
//! # How It Works
//!
//! 1. A reaction registers itself and receives an [`ObserverHandle`].
//!
//! 2. While the reaction runs, every atom it reads calls
//!    [`Runtime::add_dependency`].
//!
//! 3. When an atom changes, [`Runtime::notify_atom_change`] looks up its
//!    observers and tells each one it became stale. Observers react
//!    synchronously; there is no scheduler or batching.
//!
//! The registry only holds weak references, so dropping the last handle
//! to a reaction is enough to stop it from being notified.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;
use smallvec::SmallVec;

use super::id::{AtomId, ReactionId};

/// Something that can be told that an atom it observed has changed.
pub trait Observer: Send + Sync {
    /// Identifier used for dependency edges.
    fn reaction_id(&self) -> ReactionId;

    /// Called after an observed atom reported a change.
    fn on_became_stale(&self);
}

/// Registration of an observer with the runtime.
///
/// Dropping the handle unregisters the observer and its edges.
#[derive(Debug)]
pub struct ObserverHandle {
    reaction: ReactionId,
}

impl ObserverHandle {
    /// The registered reaction.
    pub fn reaction_id(&self) -> ReactionId {
        self.reaction
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.reaction);
    }
}

type ObserverList = SmallVec<[ReactionId; 4]>;

static OBSERVERS: OnceLock<DashMap<ReactionId, Weak<dyn Observer>>> = OnceLock::new();
static EDGES: OnceLock<DashMap<AtomId, ObserverList>> = OnceLock::new();

fn observers() -> &'static DashMap<ReactionId, Weak<dyn Observer>> {
    OBSERVERS.get_or_init(DashMap::new)
}

fn edges() -> &'static DashMap<AtomId, ObserverList> {
    EDGES.get_or_init(DashMap::new)
}

/// The global dependency registry.
pub struct Runtime;

impl Runtime {
    /// Register an observer. Keep the handle alive as long as the
    /// observer should receive notifications.
    pub fn register(observer: Arc<dyn Observer>) -> ObserverHandle {
        let reaction = observer.reaction_id();
        observers().insert(reaction, Arc::downgrade(&observer));
        ObserverHandle { reaction }
    }

    fn unregister(reaction: ReactionId) {
        observers().remove(&reaction);
        Self::clear_dependencies(reaction);
    }

    /// Record that `reaction` read `atom`.
    pub fn add_dependency(atom: AtomId, reaction: ReactionId) {
        let mut list = edges().entry(atom).or_default();
        if !list.contains(&reaction) {
            list.push(reaction);
        }
    }

    /// Drop every edge pointing at `reaction`.
    ///
    /// Called before a reaction re-runs so stale dependencies disappear.
    pub fn clear_dependencies(reaction: ReactionId) {
        edges().retain(|_, list| {
            list.retain(|r| *r != reaction);
            !list.is_empty()
        });
    }

    /// Number of reactions currently observing `atom`.
    pub fn observer_count(atom: AtomId) -> usize {
        edges().get(&atom).map(|list| list.len()).unwrap_or(0)
    }

    /// Notify every observer of `atom` that it changed.
    pub fn notify_atom_change(atom: AtomId) {
        // Copy the list out so no map guard is held while observers run.
        let Some(list) = edges().get(&atom).map(|list| list.value().clone()) else {
            return;
        };

        let stale: Vec<Arc<dyn Observer>> = list
            .iter()
            .filter_map(|id| observers().get(id).and_then(|weak| weak.upgrade()))
            .collect();

        tracing::trace!(%atom, observers = stale.len(), "atom changed");

        for observer in stale {
            observer.on_became_stale();
        }
    }
}
