//! Host command registries.
//!
//! Grafting asks the host for permission before linking a command name at
//! the target root. [`HostRegistry`] is that seam; [`MemoryRegistry`] is
//! the in-process implementation for embedders without a real host, and
//! for tests, which season it with pre-claimed and refused names.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use trellis_tree::NodeId;

/// Receipt for one accepted name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// The accepted name.
    pub name: String,
    /// Whether the bare (un-namespaced) key may be linked. Hosts answer
    /// `false` when another owner already answers to the name; the
    /// namespaced key still goes through.
    pub bare: bool,
    /// The node the name resolves to.
    pub node: NodeId,
}

/// A host's authority over command names.
pub trait HostRegistry {
    /// Ask to register `name` for `node`. `None` is a veto: the caller
    /// must drop the command silently.
    fn register(&mut self, name: &str, node: NodeId) -> Option<Registration>;

    /// Release `name`, returning the registration it held.
    fn unregister(&mut self, name: &str) -> Option<Registration>;
}

/// In-memory [`HostRegistry`].
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    registered: HashMap<String, Registration>,
    claimed: HashSet<String>,
    refused: HashSet<String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as owned by something else: registrations for it still
    /// succeed, but the bare key stays with the current owner.
    pub fn with_claimed(mut self, name: impl Into<String>) -> Self {
        self.claimed.insert(name.into());
        self
    }

    /// Veto `name` outright.
    pub fn with_refused(mut self, name: impl Into<String>) -> Self {
        self.refused.insert(name.into());
        self
    }

    /// Whether `name` currently holds a registration.
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// The registration held under `name`.
    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.registered.get(name)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

impl HostRegistry for MemoryRegistry {
    fn register(&mut self, name: &str, node: NodeId) -> Option<Registration> {
        if self.refused.contains(name) || self.registered.contains_key(name) {
            return None;
        }
        let registration = Registration {
            name: name.to_string(),
            bare: !self.claimed.contains(name),
            node,
        };
        self.registered
            .insert(name.to_string(), registration.clone());
        Some(registration)
    }

    fn unregister(&mut self, name: &str) -> Option<Registration> {
        self.registered.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::CommandTree;

    fn some_node() -> NodeId {
        let mut t: CommandTree<()> = CommandTree::new();
        t.literal("x").unwrap()
    }

    #[test]
    fn test_register_and_unregister() {
        let mut host = MemoryRegistry::new();
        let node = some_node();
        let reg = host.register("tp", node).expect("should accept");
        assert!(reg.bare);
        assert_eq!(reg.node, node);
        assert!(host.is_registered("tp"));

        let released = host.unregister("tp").expect("was registered");
        assert_eq!(released.name, "tp");
        assert!(host.is_empty());
    }

    #[test]
    fn test_claimed_names_lose_the_bare_key() {
        let mut host = MemoryRegistry::new().with_claimed("home");
        let reg = host.register("home", some_node()).expect("should accept");
        assert!(!reg.bare);
    }

    #[test]
    fn test_refused_names_are_vetoed() {
        let mut host = MemoryRegistry::new().with_refused("op");
        assert!(host.register("op", some_node()).is_none());
        assert!(!host.is_registered("op"));
    }

    #[test]
    fn duplicate_registration_is_vetoed() {
        let mut host = MemoryRegistry::new();
        assert!(host.register("tp", some_node()).is_some());
        assert!(host.register("tp", some_node()).is_none());
        assert_eq!(host.len(), 1);
    }
}
