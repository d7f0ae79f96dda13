//! # Canopy: Modular State Container
//!
//! Canopy is a centralized state container for component-tree applications:
//! a single mounted state tree, computed read paths ("getters"), and two
//! classes of state-changing entry points — synchronous **mutations**
//! invoked via `commit`, and possibly-asynchronous **actions** invoked via
//! `dispatch`. State may be organized as a tree of independently-defined
//! modules that are merged into one global namespace.
//!
//! ## Core Concepts
//!
//! - **Modules**: Named, optionally nested units of configuration declaring
//!   a state slice and local getters/mutations/actions
//! - **Registration**: Recursive normalization of raw configuration into a
//!   module tree
//! - **Installation**: The one-time flattening of that tree into global
//!   handler tables and a mounted state tree
//! - **Store**: The facade owning the live tree and the commit/dispatch
//!   protocol
//!
//! ## Quick Start
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
//!         "session",
//!         ModuleDef::new()
//!             .with_state(json!({"user": "anon"}))
//!             .with_getter("user", |slice: &Value| Ok(slice["user"].clone())),
//!     );
//!
//! let store = Store::new(options)?;
//! store.commit("inc", &[json!(2)])?;
//!
//! // Module state is mounted at the module's path in the root tree.
//! assert_eq!(store.snapshot()["count"], json!(2));
//! assert_eq!(store.snapshot()["session"]["user"], json!("anon"));
//! assert_eq!(store.getter("user")?, json!("anon"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Name Resolution
//!
//! All handler names flatten into one global namespace regardless of the
//! declaring module. Mutations and actions registered under the same name
//! from different modules **accumulate** and all run on invocation, in
//! parent-before-child, configuration order. Getters are the documented
//! exception: a later registration silently replaces the earlier one.
//!
//! ## Module Guide
//!
//! - [`module`] - Raw module configuration and the handler traits
//! - [`registry`] - Normalization of configuration into a module tree
//! - [`store`] - The store facade: commit, dispatch, snapshots, getters
//! - [`reactive`] - Observability hooks and the built-in change feed
//! - [`inject`] - Component-tree injection of a store reference
//! - [`telemetry`] - Tracing bootstrap and change-feed rendering
//! - [`utils`] - Path-based JSON helpers

pub mod inject;
mod install;
pub mod module;
pub mod reactive;
pub mod registry;
pub mod store;
pub mod telemetry;
pub mod utils;
