//! Module configuration: the raw building blocks of a store.
//!
//! A [`ModuleDef`] describes one unit of configuration: an optional state
//! slice plus the getters, mutations, actions, and nested modules it
//! declares. Definitions are assembled with a fluent builder and handed to
//! [`Store::new`](crate::store::Store::new), which normalizes them into a
//! module tree and flattens that tree into the store's global tables.
//!
//! # Handlers
//!
//! Handlers are trait objects. Each trait has a blanket implementation for
//! closures of the matching shape, so simple configurations can be written
//! inline:
//!
//! - [`Getter`]: computed read over the declaring module's state slice
//! - [`Mutation`]: synchronous write against the **root** state tree
//! - [`Action`]: async handler receiving the full store facade
//!
//! # Examples
//!
//! ```rust
//! use canopy_store::module::ModuleDef;
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
//!         "session",
//!         ModuleDef::new()
//!             .with_state(json!({"user": "anon"}))
//!             .with_getter("user", |slice: &Value| Ok(slice["user"].clone())),
//!     );
//!
//! assert_eq!(options.module_names(), vec!["session"]);
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::store::Store;

/// Error returned by getter, mutation, and action handler bodies.
///
/// Handler failures are wrapped by the store into the matching
/// [`StoreError`](crate::store::StoreError) variant and surfaced to the
/// caller of `commit`/`dispatch`/`getter`; the store performs no recovery.
#[derive(Debug, Error, Diagnostic)]
pub enum HandlerError {
    /// Free-form handler failure.
    #[error("{0}")]
    #[diagnostic(code(canopy::handler::message))]
    Message(String),

    /// JSON (de)serialization failure inside a handler.
    #[error(transparent)]
    #[diagnostic(code(canopy::handler::serde_json))]
    Serde(#[from] serde_json::Error),

    /// A nested store call (commit/dispatch/getter) failed inside a handler.
    #[error("store call failed")]
    #[diagnostic(code(canopy::handler::store))]
    Store(#[source] Box<crate::store::StoreError>),
}

impl HandlerError {
    /// Convenience constructor for free-form failures.
    pub fn message(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }
}

impl From<crate::store::StoreError> for HandlerError {
    fn from(err: crate::store::StoreError) -> Self {
        HandlerError::Store(Box::new(err))
    }
}

/// Computed read over a module's state slice.
///
/// Getters are evaluated fresh on every read; nothing is memoized. The
/// `slice` argument is the declaring module's state as currently mounted in
/// the root tree, never the whole tree (unless declared on the root module,
/// whose slice *is* the root).
pub trait Getter: Send + Sync {
    fn read(&self, slice: &Value) -> Result<Value, HandlerError>;
}

impl<F> Getter for F
where
    F: Fn(&Value) -> Result<Value, HandlerError> + Send + Sync,
{
    fn read(&self, slice: &Value) -> Result<Value, HandlerError> {
        (self)(slice)
    }
}

/// Synchronous state-changing handler, invoked only via
/// [`Store::commit`](crate::store::Store::commit).
///
/// `state` is always the **root** state tree, regardless of which module
/// declared the mutation; handlers address nested slices by key.
pub trait Mutation: Send + Sync {
    fn apply(&self, state: &mut Value, args: &[Value]) -> Result<(), HandlerError>;
}

impl<F> Mutation for F
where
    F: Fn(&mut Value, &[Value]) -> Result<(), HandlerError> + Send + Sync,
{
    fn apply(&self, state: &mut Value, args: &[Value]) -> Result<(), HandlerError> {
        (self)(state, args)
    }
}

/// Boxed future returned by closure-based [`Action`] handlers.
///
/// Annotating the closure's return type keeps inference happy when the body
/// uses `?`:
///
/// ```rust
/// use canopy_store::module::{ActionFuture, ModuleDef};
/// use canopy_store::store::Store;
/// use futures_util::FutureExt;
/// use serde_json::{json, Value};
///
/// let options = ModuleDef::new()
///     .with_state(json!({"count": 0}))
///     .with_mutation("inc", |state: &mut Value, _args: &[Value]| {
///         state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1);
///         Ok(())
///     })
///     .with_action("inc_later", |store: Store, _args: Vec<Value>| -> ActionFuture {
///         async move {
///             store.commit("inc", &[])?;
///             Ok(())
///         }
///         .boxed()
///     });
/// ```
pub type ActionFuture = BoxFuture<'static, Result<(), HandlerError>>;

/// Possibly-asynchronous handler, invoked only via
/// [`Store::dispatch`](crate::store::Store::dispatch).
///
/// Actions receive a clone of the store facade and therefore have access to
/// `commit`, `dispatch`, `snapshot`, and `getter` — not just their module's
/// slice. Typical actions compose one or more commits around awaited work.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(&self, store: Store, args: Vec<Value>) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F> Action for F
where
    F: Fn(Store, Vec<Value>) -> ActionFuture + Send + Sync,
{
    async fn run(&self, store: Store, args: Vec<Value>) -> Result<(), HandlerError> {
        (self)(store, args).await
    }
}

/// Raw configuration for one module.
///
/// The same shape recursively describes the root options passed to
/// [`Store::new`](crate::store::Store::new) and every nested module. All
/// collections preserve declaration order; nested-module order determines
/// handler registration order for same-name mutations and actions.
#[derive(Clone, Default)]
pub struct ModuleDef {
    pub(crate) state: Option<Value>,
    pub(crate) getters: Vec<(String, Arc<dyn Getter>)>,
    pub(crate) mutations: Vec<(String, Arc<dyn Mutation>)>,
    pub(crate) actions: Vec<(String, Arc<dyn Action>)>,
    pub(crate) modules: Vec<(String, ModuleDef)>,
}

impl ModuleDef {
    /// Creates an empty module definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module's state slice. Defaults to an empty JSON object when
    /// never called.
    #[must_use]
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Declares a named getter on this module.
    ///
    /// Getter names are global: if two modules declare the same name, the
    /// most-recently-installed definition wins (unlike mutations and
    /// actions, which accumulate).
    #[must_use]
    pub fn with_getter(mut self, name: impl Into<String>, getter: impl Getter + 'static) -> Self {
        self.getters.push((name.into(), Arc::new(getter)));
        self
    }

    /// Declares a named mutation on this module.
    #[must_use]
    pub fn with_mutation(
        mut self,
        name: impl Into<String>,
        mutation: impl Mutation + 'static,
    ) -> Self {
        self.mutations.push((name.into(), Arc::new(mutation)));
        self
    }

    /// Declares a named action on this module.
    #[must_use]
    pub fn with_action(mut self, name: impl Into<String>, action: impl Action + 'static) -> Self {
        self.actions.push((name.into(), Arc::new(action)));
        self
    }

    /// Declares a nested module under `name`.
    #[must_use]
    pub fn with_module(mut self, name: impl Into<String>, module: ModuleDef) -> Self {
        self.modules.push((name.into(), module));
        self
    }

    /// Names of the directly nested modules, in declaration order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl fmt::Debug for ModuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn names<T>(entries: &[(String, T)]) -> Vec<&str> {
            entries.iter().map(|(name, _)| name.as_str()).collect()
        }
        f.debug_struct("ModuleDef")
            .field("state", &self.state)
            .field("getters", &names(&self.getters))
            .field("mutations", &names(&self.mutations))
            .field("actions", &names(&self.actions))
            .field("modules", &names(&self.modules))
            .finish()
    }
}
