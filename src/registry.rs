//! Normalization of raw configuration into a module tree.
//!
//! [`ModuleRegistry::new`] recursively converts a possibly-nested
//! [`ModuleDef`] into a tree of [`ModuleNode`]s addressable by path. The
//! tree is built strictly top-down from the root definition, so every
//! non-root node is reachable by exactly one path and cycles cannot arise.
//! Registration is the first of the two construction phases; the second
//! (flattening the tree into the store's global tables) lives in the
//! installer.

use miette::Diagnostic;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

use crate::module::ModuleDef;

/// Fatal configuration errors raised while building or installing the
/// module tree. Store construction aborts on the first one.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A module path walked through a name with no registered module.
    #[error("module path '{path}' references missing ancestor '{segment}'")]
    #[diagnostic(
        code(canopy::config::missing_ancestor),
        help("Register parent modules before their children.")
    )]
    MissingAncestor { path: String, segment: String },

    /// Two sibling modules were declared under the same name.
    #[error("module '{path}' is declared twice")]
    #[diagnostic(code(canopy::config::duplicate_module))]
    DuplicateModule { path: String },

    /// The state tree has no slice at the mount path's ancestor. Can only
    /// happen when registry invariants were violated.
    #[error("cannot mount module state at '{path}': ancestor slice is missing")]
    #[diagnostic(code(canopy::config::missing_mount_point))]
    MissingMountPoint { path: String },

    /// The parent slice a module should mount into is not a JSON object.
    #[error("cannot mount module state at '{path}': parent slice is not an object")]
    #[diagnostic(
        code(canopy::config::mount_target_not_object),
        help("A module that declares nested modules must use an object for its state.")
    )]
    MountTargetNotObject { path: String },
}

/// One normalized module: its definition (handler lists kept verbatim), its
/// ordered children, and the state slice later reachable at its mount path.
#[derive(Debug)]
pub struct ModuleNode {
    pub(crate) definition: ModuleDef,
    pub(crate) children: Vec<(String, ModuleNode)>,
    pub(crate) state: Value,
}

impl ModuleNode {
    /// The state slice declared by this module.
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Direct children in configuration order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &ModuleNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Total number of modules in this subtree, the node itself included.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|(_, child)| child.count())
            .sum::<usize>()
    }
}

/// The module tree, rooted at the top-level configuration object.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    root: Option<ModuleNode>,
}

impl ModuleRegistry {
    /// Builds the full tree from the root options.
    pub fn new(options: ModuleDef) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        registry.register(Vec::new(), options)?;
        Ok(registry)
    }

    /// The tree root.
    ///
    /// Invariant: set by construction — `new` registers the root before
    /// returning, and an empty-path `register` call replaces it.
    pub fn root(&self) -> &ModuleNode {
        self.root
            .as_ref()
            .expect("registry has a root after construction")
    }

    /// Registers `raw` at `path` (empty path = root), then recursively
    /// registers its nested modules in declaration order.
    #[instrument(skip(self, raw), err)]
    pub fn register(&mut self, path: Vec<String>, mut raw: ModuleDef) -> Result<(), ConfigError> {
        let nested = std::mem::take(&mut raw.modules);
        let state = raw
            .state
            .take()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let node = ModuleNode {
            definition: raw,
            children: Vec::new(),
            state,
        };

        match path.split_last() {
            None => self.root = Some(node),
            Some((name, ancestors)) => {
                let parent = self.resolve_mut(ancestors, &path)?;
                if parent.children.iter().any(|(existing, _)| existing == name) {
                    return Err(ConfigError::DuplicateModule { path: path.join(".") });
                }
                parent.children.push((name.clone(), node));
            }
        }

        for (name, child) in nested {
            let mut child_path = path.clone();
            child_path.push(name);
            self.register(child_path, child)?;
        }
        Ok(())
    }

    fn resolve_mut(
        &mut self,
        ancestors: &[String],
        full_path: &[String],
    ) -> Result<&mut ModuleNode, ConfigError> {
        let missing = |segment: &str| ConfigError::MissingAncestor {
            path: full_path.join("."),
            segment: segment.to_string(),
        };
        let mut node = self.root.as_mut().ok_or_else(|| missing("<root>"))?;
        for segment in ancestors {
            node = node
                .children
                .iter_mut()
                .find(|(name, _)| name == segment)
                .map(|(_, child)| child)
                .ok_or_else(|| missing(segment))?;
        }
        Ok(node)
    }
}
