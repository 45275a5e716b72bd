//! Root linking.
//!
//! The root's child list doubles as a registration table: one command
//! node may be linked under several keys (its bare name plus
//! `namespace:name` forms), and unlinking a command removes every key of
//! its whole alias group at once. Below-root rules do not apply here --
//! duplicate keys are refused instead of merged, and only literals may
//! be linked.

use tracing::debug;

use crate::arena::{CommandTree, NodeId};
use crate::error::TreeError;
use crate::node::{validate_name, ChildEntry, NodeName};

/// What one root unlink removed.
#[derive(Debug)]
pub struct RootUnlink {
    /// The unlinked command's primary node (the alias group's anchor).
    pub primary: NodeId,
    /// Every `(key, node)` entry that was removed, in link order.
    pub entries: Vec<(NodeName, NodeId)>,
}

/// Check a root key: either a plain name or a single `namespace:name`
/// pair, both halves named like nodes.
pub fn validate_root_key(key: &str) -> Result<(), TreeError> {
    match key.split_once(':') {
        Some((namespace, name)) => {
            validate_name(namespace)?;
            validate_name(name)
        }
        None => validate_name(key),
    }
}

impl<C> CommandTree<C> {
    /// Link `node` at `root` under an explicit `key`. Only literals may
    /// be linked and a duplicate key is refused; nothing merges at the
    /// root.
    pub fn link_root_key(
        &mut self,
        root: NodeId,
        key: &str,
        node: NodeId,
    ) -> Result<(), TreeError> {
        if !self.node(root).is_root() {
            return Err(TreeError::NotARoot {
                name: self.node(root).name().to_string(),
            });
        }
        if !self.node(node).is_literal() {
            return Err(TreeError::RootNotLiteral {
                name: self.node(node).name().to_string(),
            });
        }
        validate_root_key(key)?;
        if self.child(root, key).is_some() {
            return Err(TreeError::DuplicateRootKey {
                key: key.to_string(),
            });
        }
        self.node_mut(root).children.push(ChildEntry {
            key: NodeName::new(key),
            node,
        });
        debug!(key, node = %self.node(node).name(), "root key linked");
        Ok(())
    }

    /// Unlink whatever command answers to `key` at `root`, removing every
    /// key of its alias group in one pass. Returns what was removed, or
    /// `None` when the key resolves to nothing.
    pub fn unlink_root(&mut self, root: NodeId, key: &str) -> Option<RootUnlink> {
        if !self.node(root).is_root() {
            return None;
        }
        let node = self.child(root, key)?;
        let primary = self.node(node).alias_of().unwrap_or(node);
        let mut group = vec![primary];
        group.extend(self.named_aliases(primary));

        let mut entries = Vec::new();
        self.node_mut(root).children.retain(|e| {
            if group.contains(&e.node) {
                entries.push((e.key.clone(), e.node));
                false
            } else {
                true
            }
        });
        debug!(key, removed = entries.len(), "root command unlinked");
        Some(RootUnlink { primary, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_refuses_duplicates_and_arguments() {
        let mut t: CommandTree<()> = CommandTree::new();
        let root = t.root();
        let tp = t.literal("tp").unwrap();
        t.link_root_key(root, "tp", tp).unwrap();

        let other = t.literal("other").unwrap();
        let err = t.link_root_key(root, "tp", other).unwrap_err();
        assert!(
            matches!(err, TreeError::DuplicateRootKey { .. }),
            "expected duplicate key, got: {err}"
        );

        let amount = t.argument("amount", crate::parser::integer()).unwrap();
        let err = t.link_root_key(root, "amount", amount).unwrap_err();
        assert!(matches!(err, TreeError::RootNotLiteral { .. }));
    }

    #[test]
    fn test_one_node_under_many_keys() {
        let mut t: CommandTree<()> = CommandTree::new();
        let root = t.root();
        let tp = t.literal("tp").unwrap();
        t.link_root_key(root, "tp", tp).unwrap();
        t.link_root_key(root, "acme:tp", tp).unwrap();

        assert_eq!(t.child(root, "tp"), Some(tp));
        assert_eq!(t.child(root, "acme:tp"), Some(tp));
    }

    #[test]
    fn test_root_key_validation() {
        assert!(validate_root_key("tp").is_ok());
        assert!(validate_root_key("acme:tp").is_ok());
        assert!(validate_root_key(":tp").is_err());
        assert!(validate_root_key("acme:").is_err());
        assert!(validate_root_key("a:b:c").is_err());
        assert!(validate_root_key("has space").is_err());
    }

    #[test]
    fn test_unlink_removes_the_whole_alias_group() {
        let mut t: CommandTree<()> = CommandTree::new();
        let root = t.root();
        let tp = t.literal("teleport").unwrap();
        let short = t.alias(tp, "tp").unwrap();
        t.link_root_key(root, "teleport", tp).unwrap();
        t.link_root_key(root, "acme:teleport", tp).unwrap();
        t.link_root_key(root, "tp", short).unwrap();
        t.link_root_key(root, "acme:tp", short).unwrap();
        let bystander = t.literal("spawn").unwrap();
        t.link_root_key(root, "spawn", bystander).unwrap();

        // unlinking through an alias key removes primary and alias keys alike
        let unlinked = t.unlink_root(root, "acme:tp").expect("should resolve");
        assert_eq!(unlinked.primary, tp);
        assert_eq!(unlinked.entries.len(), 4);
        assert!(t.child(root, "teleport").is_none());
        assert!(t.child(root, "acme:teleport").is_none());
        assert!(t.child(root, "tp").is_none());
        assert!(t.child(root, "acme:tp").is_none());
        assert_eq!(t.child(root, "spawn"), Some(bystander));
    }

    #[test]
    fn unlink_of_unknown_key_is_none() {
        let mut t: CommandTree<()> = CommandTree::new();
        let root = t.root();
        assert!(t.unlink_root(root, "ghost").is_none());
    }
}
