use std::io::{self, Result as IoResult, Stdout, Write};
use std::sync::{Arc, Mutex};

use super::feed::StateChange;
use crate::telemetry::{ChangeFormatter, PlainFormatter};

/// Abstraction over an output target that consumes state changes.
pub trait ChangeSink: Send + Sync {
    /// Handle one change. The sink decides how to serialize/format it.
    fn handle(&mut self, change: &StateChange) -> IoResult<()>;
}

/// Stdout sink with optional formatting.
pub struct StdOutSink<F: ChangeFormatter = PlainFormatter> {
    handle: Stdout,
    formatter: F,
}

impl Default for StdOutSink {
    fn default() -> Self {
        Self {
            handle: io::stdout(),
            formatter: PlainFormatter::new(),
        }
    }
}

impl<F: ChangeFormatter> StdOutSink<F> {
    pub fn with_formatter(formatter: F) -> Self {
        Self {
            handle: io::stdout(),
            formatter,
        }
    }
}

impl<F: ChangeFormatter> ChangeSink for StdOutSink<F> {
    fn handle(&mut self, change: &StateChange) -> IoResult<()> {
        let rendered = self.formatter.render(change);
        self.handle.write_all(rendered.as_bytes())?;
        self.handle.flush()
    }
}

/// In-memory sink for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<StateChange>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured changes.
    pub fn snapshot(&self) -> Vec<StateChange> {
        self.entries.lock().expect("sink poisoned").clone()
    }

    /// Clear all captured changes.
    pub fn clear(&self) {
        self.entries.lock().expect("sink poisoned").clear();
    }
}

impl ChangeSink for MemorySink {
    fn handle(&mut self, change: &StateChange) -> IoResult<()> {
        self.entries
            .lock()
            .expect("sink poisoned")
            .push(change.clone());
        Ok(())
    }
}
