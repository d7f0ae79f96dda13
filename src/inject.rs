//! Component-tree injection: one store reachable from every descendant.
//!
//! The store core does not traverse component trees itself. It registers a
//! single construction hook with a [`Host`] — the explicit initialization
//! context standing in for a host framework's plugin loader — and the hook
//! resolves each component's store as it is constructed: a root component
//! carries its own store in its options, descendants inherit the nearest
//! ancestor's.
//!
//! Registration is idempotent: [`install`] is a no-op once the hook is
//! present. The flag lives on the `Host` rather than in process-global
//! state so tests can [`reset`](Host::reset) it.
//!
//! # Examples
//!
//! ```rust
//! use canopy_store::inject::{install, Component, ComponentOptions, Host};
//! use canopy_store::module::ModuleDef;
//! use canopy_store::store::Store;
//!
//! let mut host = Host::new();
//! assert!(install(&mut host));
//! assert!(!install(&mut host)); // repeated installs are no-ops
//!
//! let store = Store::new(ModuleDef::new())?;
//! let root = Component::new(&host, &ComponentOptions::new().with_store(store.clone()), None);
//! let leaf = root.child(&host).child(&host);
//! assert_eq!(leaf.store().map(Store::id), Some(store.id()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::store::Store;

/// Hook resolving a component's store from its options and parent.
pub type StoreHook = fn(&ComponentOptions, Option<&Component>) -> Option<Store>;

/// Initialization context for the host integration; owns the idempotency
/// flag for hook registration.
#[derive(Default)]
pub struct Host {
    store_hook: Option<StoreHook>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self) -> bool {
        self.store_hook.is_some()
    }

    /// Clears the registered hook so a test can install again.
    pub fn reset(&mut self) {
        self.store_hook = None;
    }
}

/// Registers the store-injection hook with `host`. Returns whether the
/// hook was newly installed; repeated calls are no-ops.
pub fn install(host: &mut Host) -> bool {
    if host.store_hook.is_some() {
        return false;
    }
    host.store_hook = Some(inherit_store);
    tracing::debug!("store injection hook installed");
    true
}

fn inherit_store(options: &ComponentOptions, parent: Option<&Component>) -> Option<Store> {
    options
        .store
        .clone()
        .or_else(|| parent.and_then(|p| p.store.clone()))
}

/// Construction options for one component. Only root components set a
/// store explicitly.
#[derive(Clone, Default)]
pub struct ComponentOptions {
    store: Option<Store>,
}

impl ComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }
}

/// One node of a component tree, holding whatever store the host's hook
/// resolved at construction time.
pub struct Component {
    store: Option<Store>,
}

impl Component {
    /// Constructs a component through the host, running the injection hook
    /// if one is installed.
    pub fn new(host: &Host, options: &ComponentOptions, parent: Option<&Component>) -> Self {
        let store = host
            .store_hook
            .and_then(|hook| hook(options, parent));
        Self { store }
    }

    /// Constructs a child of this component with default options.
    pub fn child(&self, host: &Host) -> Component {
        Component::new(host, &ComponentOptions::default(), Some(self))
    }

    /// The store this component resolved, if any.
    pub fn store(&self) -> Option<&Store> {
        self.store.as_ref()
    }
}
