//! Observability interface consumed by store installation.
//!
//! The store itself owns no change-tracking machinery; it notifies a
//! [`Reactivity`] implementation at the two points where the shape of the
//! state tree is established: once per non-root module when its slice is
//! mounted, and once when the completed root tree is placed under
//! observation. Host integrations implement the trait to wire the tree into
//! their own tracking; [`ChangeFeed`] is the built-in implementation that
//! records the notifications into a channel.

mod feed;
mod sink;

pub use feed::{ChangeFeed, StateChange};
pub use sink::{ChangeSink, MemorySink, StdOutSink};

use serde_json::Value;

/// Hooks invoked while the state tree is assembled.
///
/// Both methods default to no-ops so implementations can track only what
/// they care about.
pub trait Reactivity: Send + Sync {
    /// Called exactly once per store, when the completed root state tree is
    /// placed under observation.
    fn observe_root(&self, root: &Value) {
        let _ = root;
    }

    /// Called exactly once per non-root module, when its slice is mounted
    /// under `key` of the object at `parent_path`.
    fn define(&self, parent_path: &[String], key: &str, value: &Value) {
        let _ = (parent_path, key, value);
    }
}

/// Reactivity implementation that ignores every notification. The default
/// for stores built with [`Store::new`](crate::store::Store::new).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReactivity;

impl Reactivity for NullReactivity {}
