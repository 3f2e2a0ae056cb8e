//! One-time deprecation notices.
//!
//! Each distinct message is logged once per process. The set of emitted
//! messages is a concurrent set, so check-and-insert is atomic.

use std::sync::OnceLock;

use dashmap::DashSet;

static EMITTED: OnceLock<DashSet<String>> = OnceLock::new();

fn emitted() -> &'static DashSet<String> {
    EMITTED.get_or_init(DashSet::new)
}

/// Warn that `old` is deprecated in favour of `replacement`.
///
/// Returns true if the notice was logged by this call, false if the same
/// message had already been logged.
pub fn deprecated(old: &str, replacement: &str) -> bool {
    let message = format!("'{old}' is deprecated, use '{replacement}' instead.");
    if !emitted().insert(message.clone()) {
        return false;
    }
    tracing::warn!(target: "lattice_observable::deprecation", "{message}");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_message_is_emitted_once() {
        assert!(deprecated("test.oldApi", "test.newApi()"));
        assert!(!deprecated("test.oldApi", "test.newApi()"));
        assert!(!deprecated("test.oldApi", "test.newApi()"));
    }

    #[test]
    fn distinct_messages_are_tracked_separately() {
        assert!(deprecated("test.first", "test.replacement()"));
        assert!(deprecated("test.second", "test.replacement()"));
    }
}
