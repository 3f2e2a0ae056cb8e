//! Reaction Implementation
//!
//! A Reaction is a side-effecting computation that re-runs whenever an
//! atom it read during its last run reports a change.
//!
//! # How Reactions Work
//!
//! 1. When created, the reaction runs once to establish its dependencies.
//!
//! 2. Each run clears the previous dependencies and collects new ones, so
//!    branches that stop reading an atom stop depending on it.
//!
//! 3. A change notification that arrives while the reaction is already
//!    running is ignored. A reaction writing to state it reads therefore
//!    does not recurse.
//!
//! Re-runs happen synchronously inside the write that triggered them.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::context::ReactiveContext;
use super::id::{next_debug_id, ReactionId};
use super::runtime::{Observer, ObserverHandle, Runtime};

struct ReactionInner {
    id: ReactionId,
    name: String,
    run: Box<dyn Fn() + Send + Sync>,
    disposed: AtomicBool,
    running: AtomicBool,
    run_count: AtomicUsize,
    dependency_count: AtomicUsize,
    handle: Mutex<Option<ObserverHandle>>,
}

impl ReactionInner {
    fn track(&self) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::trace!(reaction = %self.name, "skipping re-entrant run");
            return;
        }
        let _running = RunningGuard(&self.running);

        Runtime::clear_dependencies(self.id);
        let observed = {
            let _ctx = ReactiveContext::enter(self.id);
            (self.run)();
            ReactiveContext::observed()
        };

        self.dependency_count.store(observed.len(), Ordering::SeqCst);
        self.run_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Clears the running flag when a run ends, including by panic.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Observer for ReactionInner {
    fn reaction_id(&self) -> ReactionId {
        self.id
    }

    fn on_became_stale(&self) {
        self.track();
    }
}

/// A side-effecting computation that re-runs when its dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let count = OBSERVABLE.boxed(0.into(), OptionsArg::Absent)?;
///
/// let reaction = autorun({
///     let count = count.clone();
///     move || println!("count is {:?}", count.get())
/// });
///
/// count.set(5.into())?;  // prints "count is Number(5.0)"
/// ```
#[derive(Clone)]
pub struct Reaction {
    inner: Arc<ReactionInner>,
}

impl Reaction {
    /// Create a reaction and run it immediately.
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = Arc::new(ReactionInner {
            id: ReactionId::new(),
            name: name.into(),
            run: Box::new(run),
            disposed: AtomicBool::new(false),
            running: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
            dependency_count: AtomicUsize::new(0),
            handle: Mutex::new(None),
        });

        let observer: Arc<dyn Observer> = inner.clone();
        *inner.handle.lock() = Some(Runtime::register(observer));

        inner.track();
        Self { inner }
    }

    /// Reaction id.
    pub fn id(&self) -> ReactionId {
        self.inner.id
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Stop the reaction. It will not run again.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(reaction = %self.inner.name, "disposing reaction");
        // Dropping the handle unregisters the observer and its edges.
        self.inner.handle.lock().take();
    }

    /// Whether [`dispose`](Self::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    /// Number of atoms read during the last run.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependency_count.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reaction")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Create an anonymous reaction that runs `run` now and after every
/// change to what it read.
pub fn autorun<F>(run: F) -> Reaction
where
    F: Fn() + Send + Sync + 'static,
{
    Reaction::new(format!("Autorun@{}", next_debug_id()), run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::atom::Atom;

    #[test]
    fn reaction_runs_on_creation() {
        let reaction = autorun(|| {});
        assert_eq!(reaction.run_count(), 1);
        assert_eq!(reaction.dependency_count(), 0);
    }

    #[test]
    fn reaction_reruns_when_observed_atom_changes() {
        let atom = Arc::new(Atom::new("counter"));
        let reaction = autorun({
            let atom = atom.clone();
            move || {
                atom.report_observed();
            }
        });

        assert_eq!(reaction.dependency_count(), 1);
        atom.report_changed();
        assert_eq!(reaction.run_count(), 2);
    }

    #[test]
    fn disposed_reaction_stops_running() {
        let atom = Arc::new(Atom::new("counter"));
        let reaction = autorun({
            let atom = atom.clone();
            move || {
                atom.report_observed();
            }
        });

        reaction.dispose();
        assert!(reaction.is_disposed());
        assert_eq!(atom.observer_count(), 0);

        atom.report_changed();
        assert_eq!(reaction.run_count(), 1);
    }

    #[test]
    fn self_triggering_reaction_does_not_recurse() {
        let atom = Arc::new(Atom::new("loop"));
        let reaction = autorun({
            let atom = atom.clone();
            move || {
                atom.report_observed();
                atom.report_changed();
            }
        });

        assert_eq!(reaction.run_count(), 1);
    }

    #[test]
    fn panicking_run_does_not_wedge_the_reaction() {
        let atom = Arc::new(Atom::new("fragile"));
        let fail = Arc::new(AtomicBool::new(false));
        let reaction = autorun({
            let atom = atom.clone();
            let fail = fail.clone();
            move || {
                atom.report_observed();
                if fail.load(Ordering::SeqCst) {
                    panic!("reaction failed");
                }
            }
        });

        fail.store(true, Ordering::SeqCst);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            atom.report_changed();
        }));
        assert!(result.is_err());
        assert_eq!(reaction.run_count(), 1);

        fail.store(false, Ordering::SeqCst);
        atom.report_changed();
        assert_eq!(reaction.run_count(), 2);
    }

    #[test]
    fn clone_shares_state() {
        let first = autorun(|| {});
        let second = first.clone();

        assert_eq!(first.id(), second.id());
        first.dispose();
        assert!(second.is_disposed());
    }
}
