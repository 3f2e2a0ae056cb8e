//! Reactive Context
//!
//! The reactive context records which reaction is currently running so
//! that atoms read during the run can register it as an observer.
//!
//! # Implementation
//!
//! A thread-local stack of frames. Running a reaction pushes a frame that
//! names the reaction; `untracked` pushes an anonymous frame so reads
//! inside it are not attributed to the enclosing reaction. Frames are
//! popped by the guard's `Drop`, so the stack stays balanced on panic.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::id::{AtomId, ReactionId};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug)]
struct Frame {
    /// `None` for an untracked scope.
    reaction: Option<ReactionId>,
    /// Atoms read while this frame was on top, in first-read order.
    observed: SmallVec<[AtomId; 8]>,
}

/// Guard for an entered frame. Dropping it pops the frame.
pub struct ReactiveContext {
    reaction: Option<ReactionId>,
}

impl ReactiveContext {
    /// Enter a tracking frame for `reaction`.
    pub fn enter(reaction: ReactionId) -> Self {
        Self::push(Some(reaction))
    }

    fn push(reaction: Option<ReactionId>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(Frame {
                reaction,
                observed: SmallVec::new(),
            });
        });
        Self { reaction }
    }

    /// True when a reaction (not an untracked scope) is on top of the stack.
    pub fn is_active() -> bool {
        Self::current_reaction().is_some()
    }

    /// The reaction currently collecting dependencies, if any.
    pub fn current_reaction() -> Option<ReactionId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|frame| frame.reaction))
    }

    /// Record that `atom` was read in the current frame.
    ///
    /// Returns false when there is no tracking frame.
    pub fn track(atom: AtomId) -> bool {
        CONTEXT_STACK.with(|stack| match stack.borrow_mut().last_mut() {
            Some(frame) if frame.reaction.is_some() => {
                if !frame.observed.contains(&atom) {
                    frame.observed.push(atom);
                }
                true
            }
            _ => false,
        })
    }

    /// Atoms observed so far in the current frame.
    pub fn observed() -> Vec<AtomId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|frame| frame.observed.to_vec())
                .unwrap_or_default()
        })
    }

    /// Run `f` without attributing its reads to the running reaction.
    pub fn untracked<T>(f: impl FnOnce() -> T) -> T {
        let _scope = Self::push(None);
        f()
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.reaction, self.reaction,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.reaction, frame.reaction
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_tracks_reaction() {
        let id = ReactionId::new();
        assert!(!ReactiveContext::is_active());

        {
            let _ctx = ReactiveContext::enter(id);
            assert!(ReactiveContext::is_active());
            assert_eq!(ReactiveContext::current_reaction(), Some(id));
        }

        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_reaction().is_none());
    }

    #[test]
    fn observed_atoms_are_deduplicated() {
        let _ctx = ReactiveContext::enter(ReactionId::new());
        let a = AtomId::new();
        let b = AtomId::new();

        assert!(ReactiveContext::track(a));
        assert!(ReactiveContext::track(b));
        assert!(ReactiveContext::track(a));

        assert_eq!(ReactiveContext::observed(), vec![a, b]);
    }

    #[test]
    fn untracked_hides_reads_from_reaction() {
        let outer = ReactionId::new();
        let _ctx = ReactiveContext::enter(outer);
        let atom = AtomId::new();

        let tracked = ReactiveContext::untracked(|| {
            assert!(ReactiveContext::current_reaction().is_none());
            ReactiveContext::track(atom)
        });

        assert!(!tracked);
        assert_eq!(ReactiveContext::current_reaction(), Some(outer));
        assert!(ReactiveContext::observed().is_empty());
    }

    #[test]
    fn track_outside_reaction_is_ignored() {
        assert!(!ReactiveContext::track(AtomId::new()));
    }
}
