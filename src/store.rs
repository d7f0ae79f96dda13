//! The store facade: one mounted state tree plus the global handler tables.
//!
//! [`Store`] owns the root state tree behind a lock, the getter/mutation/
//! action tables built at installation, and the commit/dispatch protocol
//! that resolves a name to its registered handlers. A `Store` is a cheap
//! clone handle over shared internals, so `commit` and `dispatch` can be
//! passed around as first-class values without losing their receiver.
//!
//! # Examples
//!
//! ```rust
//! use canopy_store::module::ModuleDef;
//! use canopy_store::store::Store;
//! use serde_json::{json, Value};
//!
//! let options = ModuleDef::new()
//!     .with_state(json!({"count": 0}))
//!     .with_mutation("inc", |state: &mut Value, args: &[Value]| {
//!         let n = args.first().and_then(Value::as_i64).unwrap_or(1);
//!         state["count"] = json!(state["count"].as_i64().unwrap_or(0) + n);
//!         Ok(())
//!     })
//!     .with_module(
//!         "a",
//!         ModuleDef::new()
//!             .with_state(json!({"x": 1}))
//!             .with_getter("getX", |slice: &Value| Ok(slice["x"].clone())),
//!     );
//!
//! let store = Store::new(options)?;
//! store.commit("inc", &[json!(5)])?;
//!
//! assert_eq!(store.snapshot()["count"], json!(5));
//! assert_eq!(store.snapshot()["a"]["x"], json!(1));
//! assert_eq!(store.getter("getX")?, json!(1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::instrument;
use uuid::Uuid;

use crate::install::{HandlerTables, Installer};
use crate::module::{HandlerError, ModuleDef};
use crate::reactive::{NullReactivity, Reactivity};
use crate::registry::{ConfigError, ModuleRegistry};
use crate::utils::json_path;

/// Errors surfaced by `commit`, `dispatch`, and getter reads.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    /// `commit` was called with a name no module declared.
    #[error("no mutation registered for '{0}'")]
    #[diagnostic(
        code(canopy::store::unknown_mutation),
        help("Declare the mutation on the root options or one of its modules.")
    )]
    UnknownMutation(String),

    /// `dispatch` was called with a name no module declared.
    #[error("no action registered for '{0}'")]
    #[diagnostic(code(canopy::store::unknown_action))]
    UnknownAction(String),

    /// A getter read was attempted for a name no module declared.
    #[error("no getter registered for '{0}'")]
    #[diagnostic(code(canopy::store::unknown_getter))]
    UnknownGetter(String),

    /// A getter's declaring module can no longer be reached in the live
    /// tree (a mutation removed or replaced the slice).
    #[error("getter '{name}' cannot reach its module state at '{path}'")]
    #[diagnostic(code(canopy::store::getter_detached))]
    GetterDetached { name: String, path: String },

    /// A mutation handler failed; later handlers for the name did not run.
    #[error("mutation '{name}' failed")]
    #[diagnostic(code(canopy::store::mutation))]
    Mutation {
        name: String,
        #[source]
        source: HandlerError,
    },

    /// A getter handler failed.
    #[error("getter '{name}' failed")]
    #[diagnostic(code(canopy::store::getter))]
    Getter {
        name: String,
        #[source]
        source: HandlerError,
    },

    /// An action handler failed; reported by [`DispatchHandle::join`].
    #[error("action '{name}' failed")]
    #[diagnostic(code(canopy::store::action))]
    Action {
        name: String,
        #[source]
        source: HandlerError,
    },

    /// An action handler panicked or its task was cancelled before
    /// completing; reported by [`DispatchHandle::join`].
    #[error("action '{name}' panicked or was cancelled")]
    #[diagnostic(code(canopy::store::action_join))]
    ActionJoin { name: String },
}

/// Handle over the spawned handlers of one dispatch call.
///
/// `dispatch` never waits for its handlers; this handle lets the caller
/// choose. Dropping it detaches the handlers (fire-and-forget), while
/// [`join`](Self::join) awaits them all and surfaces the first failure.
#[derive(Debug)]
pub struct DispatchHandle {
    name: String,
    handles: Vec<JoinHandle<Result<(), HandlerError>>>,
}

impl DispatchHandle {
    /// Number of handlers this dispatch spawned.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Awaits every handler in registration order, returning the first
    /// failure (later handlers still run to completion on the runtime).
    pub async fn join(self) -> Result<(), StoreError> {
        let mut first_failure = None;
        for handle in self.handles {
            let outcome = match handle.await {
                Ok(Ok(())) => None,
                Ok(Err(source)) => Some(StoreError::Action {
                    name: self.name.clone(),
                    source,
                }),
                Err(_) => Some(StoreError::ActionJoin {
                    name: self.name.clone(),
                }),
            };
            if first_failure.is_none() {
                first_failure = outcome;
            }
        }
        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct StoreInner {
    id: Uuid,
    state: RwLock<Value>,
    tables: HandlerTables,
    modules: ModuleRegistry,
}

/// The public facade over a fully installed module tree.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Builds a store from the root options with no observability attached.
    ///
    /// Registration and installation run synchronously here; the module
    /// tree and handler tables are immutable afterwards.
    pub fn new(options: ModuleDef) -> Result<Self, ConfigError> {
        Self::with_reactivity(options, Arc::new(NullReactivity))
    }

    /// Builds a store, routing slice mounts and the final root observation
    /// through `reactivity`.
    pub fn with_reactivity(
        options: ModuleDef,
        reactivity: Arc<dyn Reactivity>,
    ) -> Result<Self, ConfigError> {
        let modules = ModuleRegistry::new(options)?;
        let mut root_state = modules.root().state().clone();
        let tables = Installer::new(reactivity.as_ref()).install(&mut root_state, modules.root())?;
        reactivity.observe_root(&root_state);

        let id = Uuid::new_v4();
        tracing::debug!(
            store_id = %id,
            modules = modules.root().count(),
            getters = tables.getters.len(),
            mutations = tables.mutations.len(),
            actions = tables.actions.len(),
            "store installed"
        );
        Ok(Self {
            inner: Arc::new(StoreInner {
                id,
                state: RwLock::new(root_state),
                tables,
                modules,
            }),
        })
    }

    /// Unique id of this store instance, carried in tracing spans.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The normalized module tree this store was built from.
    pub fn modules(&self) -> &ModuleRegistry {
        &self.inner.modules
    }

    /// Point-in-time deep clone of the live root state tree.
    pub fn snapshot(&self) -> Value {
        self.inner.state.read().clone()
    }

    /// Invokes every mutation registered under `name`, in registration
    /// order, synchronously, before returning. All handlers receive the
    /// root state tree. The first handler failure aborts the remainder.
    #[instrument(skip(self, args), fields(store_id = %self.inner.id), err)]
    pub fn commit(&self, name: &str, args: &[Value]) -> Result<(), StoreError> {
        let handlers = self
            .inner
            .tables
            .mutations
            .get(name)
            .ok_or_else(|| StoreError::UnknownMutation(name.to_string()))?;
        let mut state = self.inner.state.write();
        for handler in handlers {
            handler
                .apply(&mut state, args)
                .map_err(|source| StoreError::Mutation {
                    name: name.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Spawns every action registered under `name` onto the Tokio runtime,
    /// in registration order, and returns without waiting for any of them.
    ///
    /// Each handler receives a clone of this store plus `args`. Must be
    /// called from within a Tokio runtime.
    ///
    /// ```rust
    /// # use canopy_store::module::{ActionFuture, ModuleDef};
    /// # use canopy_store::store::Store;
    /// # use futures_util::FutureExt;
    /// # use serde_json::{json, Value};
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let options = ModuleDef::new()
    ///     .with_state(json!({"ready": false}))
    ///     .with_mutation("mark_ready", |state: &mut Value, _: &[Value]| {
    ///         state["ready"] = json!(true);
    ///         Ok(())
    ///     })
    ///     .with_action("prepare", |store: Store, _: Vec<Value>| -> ActionFuture {
    ///         async move {
    ///             store.commit("mark_ready", &[])?;
    ///             Ok(())
    ///         }
    ///         .boxed()
    ///     });
    ///
    /// let store = Store::new(options)?;
    /// store.dispatch("prepare", vec![])?.join().await?;
    /// assert_eq!(store.snapshot()["ready"], json!(true));
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, args), fields(store_id = %self.inner.id), err)]
    pub fn dispatch(&self, name: &str, args: Vec<Value>) -> Result<DispatchHandle, StoreError> {
        let handlers = self
            .inner
            .tables
            .actions
            .get(name)
            .ok_or_else(|| StoreError::UnknownAction(name.to_string()))?;
        let mut handles = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let handler = Arc::clone(handler);
            let store = self.clone();
            let args = args.clone();
            handles.push(tokio::spawn(
                async move { handler.run(store, args).await },
            ));
        }
        Ok(DispatchHandle {
            name: name.to_string(),
            handles,
        })
    }

    /// Evaluates the getter registered under `name` against the live tree.
    ///
    /// The handler sees its declaring module's state slice and runs fresh
    /// on every read; nothing is memoized.
    #[instrument(skip(self), fields(store_id = %self.inner.id), err)]
    pub fn getter(&self, name: &str) -> Result<Value, StoreError> {
        let slot = self
            .inner
            .tables
            .getters
            .get(name)
            .ok_or_else(|| StoreError::UnknownGetter(name.to_string()))?;
        let state = self.inner.state.read();
        let slice =
            json_path::walk(&state, &slot.path).ok_or_else(|| StoreError::GetterDetached {
                name: name.to_string(),
                path: slot.path.join("."),
            })?;
        slot.getter.read(slice).map_err(|source| StoreError::Getter {
            name: name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("getters", &self.inner.tables.getters.len())
            .field("mutations", &self.inner.tables.mutations.len())
            .field("actions", &self.inner.tables.actions.len())
            .finish()
    }
}
