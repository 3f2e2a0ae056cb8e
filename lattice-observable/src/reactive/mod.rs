//! Dependency Tracking
//!
//! The minimal tracking layer the observable containers report into.
//!
//! # Concepts
//!
//! ## Atoms
//!
//! An [`Atom`] is owned by every reactive container. Reads call
//! `report_observed`, writes call `report_changed`.
//!
//! ## Reactions
//!
//! A [`Reaction`] runs a closure inside a [`ReactiveContext`]. Every atom
//! read during the run becomes a dependency, and a change to any of them
//! re-runs the closure.
//!
//! # Implementation Notes
//!
//! The running reaction is kept on a thread-local stack; the atom to
//! reaction edges live in a process-wide [`Runtime`] registry. There is no
//! batching or scheduling: notifications are delivered synchronously.

mod atom;
mod context;
mod id;
mod reaction;
mod runtime;

pub use atom::Atom;
pub use context::ReactiveContext;
pub use id::{AtomId, ReactionId};
pub(crate) use id::next_debug_id;
pub use reaction::{autorun, Reaction};
pub use runtime::{Observer, ObserverHandle, Runtime};
