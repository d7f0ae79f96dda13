//! Channel-backed recording of state-shape changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sink::ChangeSink;
use super::Reactivity;

/// One observed change to the shape of a store's state tree.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum StateChange {
    /// The completed root tree was placed under observation.
    RootObserved { at: DateTime<Utc> },
    /// A module slice was mounted at `path`.
    SliceMounted { path: Vec<String>, at: DateTime<Utc> },
}

impl StateChange {
    pub(crate) fn root_observed() -> Self {
        StateChange::RootObserved { at: Utc::now() }
    }

    pub(crate) fn slice_mounted(path: Vec<String>) -> Self {
        StateChange::SliceMounted { path, at: Utc::now() }
    }

    /// The mount path for slice mounts, `None` for root observation.
    pub fn path(&self) -> Option<&[String]> {
        match self {
            StateChange::RootObserved { .. } => None,
            StateChange::SliceMounted { path, .. } => Some(path),
        }
    }
}

/// [`Reactivity`] implementation that records every notification into an
/// unbounded channel.
///
/// The feed is cheap to clone; clones share the same channel, so a clone
/// handed to [`Store::with_reactivity`](crate::store::Store::with_reactivity)
/// leaves the original usable for draining:
///
/// ```rust
/// use std::sync::Arc;
/// use canopy_store::module::ModuleDef;
/// use canopy_store::reactive::ChangeFeed;
/// use canopy_store::store::Store;
/// use serde_json::json;
///
/// let feed = ChangeFeed::new();
/// let options = ModuleDef::new()
///     .with_module("a", ModuleDef::new().with_state(json!({"x": 1})));
/// let _store = Store::with_reactivity(options, Arc::new(feed.clone())).unwrap();
///
/// let changes = feed.drain();
/// // one mount for module "a", then the root observation
/// assert_eq!(changes.len(), 2);
/// assert_eq!(changes[0].path(), Some(&["a".to_string()][..]));
/// ```
#[derive(Clone)]
pub struct ChangeFeed {
    tx: flume::Sender<StateChange>,
    rx: flume::Receiver<StateChange>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    /// Removes and returns every change recorded so far.
    pub fn drain(&self) -> Vec<StateChange> {
        self.rx.try_iter().collect()
    }

    /// A receiver for consuming changes as they arrive (e.g. from an async
    /// task via `recv_async`).
    pub fn subscribe(&self) -> flume::Receiver<StateChange> {
        self.rx.clone()
    }

    /// Drains every recorded change into `sink`, returning how many were
    /// forwarded. Sink failures stop the drain.
    pub fn drain_into(&self, sink: &mut dyn ChangeSink) -> std::io::Result<usize> {
        let mut forwarded = 0;
        for change in self.rx.try_iter() {
            sink.handle(&change)?;
            forwarded += 1;
        }
        Ok(forwarded)
    }
}

impl Reactivity for ChangeFeed {
    fn observe_root(&self, _root: &Value) {
        let _ = self.tx.send(StateChange::root_observed());
    }

    fn define(&self, parent_path: &[String], key: &str, _value: &Value) {
        let mut path = parent_path.to_vec();
        path.push(key.to_string());
        let _ = self.tx.send(StateChange::slice_mounted(path));
    }
}
