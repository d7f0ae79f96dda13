//! Flattening the module tree into the store's global tables.
//!
//! The installer walks the [`ModuleNode`] tree once, pre-order (parent
//! strictly before children). Each visit mounts the node's state slice into
//! the root tree and registers its handlers into the global tables. Names
//! are global: same-name mutations and actions accumulate in traversal
//! order, while a same-name getter replaces the earlier registration.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::module::{Action, Getter, Mutation};
use crate::reactive::Reactivity;
use crate::registry::{ConfigError, ModuleNode};
use crate::utils::json_path;

/// A getter plus the mount path of the module that declared it; the path is
/// resolved against the live tree on every read.
pub(crate) struct GetterSlot {
    pub(crate) path: Vec<String>,
    pub(crate) getter: Arc<dyn Getter>,
}

/// The global lookup tables, built once at installation and immutable for
/// the store's lifetime.
#[derive(Default)]
pub(crate) struct HandlerTables {
    pub(crate) getters: FxHashMap<String, GetterSlot>,
    pub(crate) mutations: FxHashMap<String, Vec<Arc<dyn Mutation>>>,
    pub(crate) actions: FxHashMap<String, Vec<Arc<dyn Action>>>,
}

impl std::fmt::Debug for HandlerTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTables")
            .field("getters", &self.getters.len())
            .field("mutations", &self.mutations.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}

pub(crate) struct Installer<'a> {
    reactivity: &'a dyn Reactivity,
    tables: HandlerTables,
}

impl<'a> Installer<'a> {
    pub(crate) fn new(reactivity: &'a dyn Reactivity) -> Self {
        Self {
            reactivity,
            tables: HandlerTables::default(),
        }
    }

    /// Walks the tree rooted at `root`, mounting slices into `root_state`
    /// and collecting the handler tables.
    pub(crate) fn install(
        mut self,
        root_state: &mut Value,
        root: &ModuleNode,
    ) -> Result<HandlerTables, ConfigError> {
        let mut path = Vec::new();
        self.install_module(root_state, &mut path, root)?;
        Ok(self.tables)
    }

    fn install_module(
        &mut self,
        root_state: &mut Value,
        path: &mut Vec<String>,
        node: &ModuleNode,
    ) -> Result<(), ConfigError> {
        // The root module's state IS the root tree; only descendants mount.
        if let Some((key, ancestors)) = path.split_last() {
            let parent = json_path::walk_mut(root_state, ancestors).ok_or_else(|| {
                ConfigError::MissingMountPoint {
                    path: path.join("."),
                }
            })?;
            let slot = parent
                .as_object_mut()
                .ok_or_else(|| ConfigError::MountTargetNotObject {
                    path: path.join("."),
                })?;
            if slot.contains_key(key) {
                tracing::warn!(
                    path = %path.join("."),
                    "module state replaces an existing key of its parent slice"
                );
            }
            self.reactivity.define(ancestors, key, &node.state);
            slot.insert(key.clone(), node.state.clone());
        }

        for (name, getter) in &node.definition.getters {
            let slot = GetterSlot {
                path: path.clone(),
                getter: Arc::clone(getter),
            };
            if self.tables.getters.insert(name.clone(), slot).is_some() {
                tracing::warn!(
                    getter = %name,
                    "getter replaces an earlier registration of the same name"
                );
            }
        }
        for (name, mutation) in &node.definition.mutations {
            self.tables
                .mutations
                .entry(name.clone())
                .or_default()
                .push(Arc::clone(mutation));
        }
        for (name, action) in &node.definition.actions {
            self.tables
                .actions
                .entry(name.clone())
                .or_default()
                .push(Arc::clone(action));
        }

        for (name, child) in &node.children {
            path.push(name.clone());
            self.install_module(root_state, path, child)?;
            path.pop();
        }
        Ok(())
    }
}
