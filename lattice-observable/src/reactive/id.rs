//! Identifiers for atoms and reactions.
//!
//! Both are drawn from process-wide atomic counters so they stay unique
//! across threads.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter shared by every named observable (`ObservableValue@3`, ...).
static DEBUG_NAME_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Next number used to build a default debug name.
pub(crate) fn next_debug_id() -> u64 {
    DEBUG_NAME_COUNTER.fetch_add(1, Ordering::Relaxed)
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Allocate a fresh identifier.
            pub fn new() -> Self {
                static COUNTER: AtomicU64 = AtomicU64::new(0);
                Self(COUNTER.fetch_add(1, Ordering::Relaxed))
            }

            /// Raw counter value.
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifies an atom: the smallest unit of observable state.
    AtomId,
    "atom"
);

define_id!(
    /// Identifies a reaction that observes atoms.
    ReactionId,
    "reaction"
);
