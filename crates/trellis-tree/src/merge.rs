//! Merge-on-insert child attachment.
//!
//! Attaching a child under a key the parent already has does not error.
//! Like-kinded nodes are unioned: the incoming node's children fold in
//! recursively, and its handler, redirect, and requirement land on the
//! survivor when present. Unlike-kinded nodes follow the tree's
//! [`MergePolicy`].
//!
//! Inserts are also where alias lockstep is maintained: a node pushed
//! under an aliased parent is copied into every subtree of the parent's
//! alias group, and each copy is registered as a mirror of the new node
//! so that later mutations of the node find their way into the alias
//! subtrees too. Folds need no such pass -- the survivor already carries
//! its mirror registrations, so the fold's own child inserts and
//! behavior setters re-apply through them.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::arena::{CommandTree, NodeId};
use crate::error::TreeError;
use crate::node::{ChildEntry, NodeKind, Suggestions};

/// How a kind collision on one key is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The incoming node replaces the incumbent wholesale.
    #[default]
    LastWins,
    /// A kind collision is a [`TreeError::KindConflict`].
    Strict,
}

impl<C> CommandTree<C> {
    /// Attach `child` under `parent`, merging with an incumbent of the
    /// same key per the tree's policy. Returns the surviving node:
    /// `child` itself when attached or replacing, the incumbent when
    /// content folded into it.
    ///
    /// Root-kind parents take the strict root path instead: literals
    /// only, duplicate keys refused, no merging.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, TreeError> {
        if self.node(child).is_root() {
            return Err(TreeError::RootAsChild);
        }
        if self.node(parent).is_root() {
            let key = self.node(child).name().clone();
            self.link_root_key(parent, key.as_str(), child)?;
            return Ok(child);
        }
        self.merge_insert(parent, child)
    }

    /// Remove the child linked under `key`, returning it. Mirrored onto
    /// the parent's whole alias group. On a root-kind parent this removes
    /// the resolved command's every key at once.
    pub fn remove_child(&mut self, parent: NodeId, key: &str) -> Option<NodeId> {
        if self.node(parent).is_root() {
            return self.unlink_root(parent, key).map(|u| u.primary);
        }
        let removed = self.detach_entry(parent, key)?;
        for pa in self.alias_group(parent).into_iter().skip(1) {
            self.detach_entry(pa, key);
        }
        Some(removed)
    }

    pub(crate) fn detach_entry(&mut self, parent: NodeId, key: &str) -> Option<NodeId> {
        let pos = self
            .node(parent)
            .children()
            .iter()
            .position(|e| e.key == key)?;
        Some(self.node_mut(parent).children.remove(pos).node)
    }

    fn merge_insert(&mut self, parent: NodeId, incoming: NodeId) -> Result<NodeId, TreeError> {
        let key = self.node(incoming).name().clone();
        let Some(existing) = self.child(parent, key.as_str()) else {
            self.attach_mirrored(parent, incoming);
            return Ok(incoming);
        };
        if self.kinds_compatible(existing, incoming) {
            self.fold_into(existing, incoming)?;
            return Ok(existing);
        }
        match self.policy() {
            MergePolicy::Strict => Err(TreeError::KindConflict {
                name: key.to_string(),
                existing: self.node(existing).kind_name(),
                incoming: self.node(incoming).kind_name(),
            }),
            MergePolicy::LastWins => {
                warn!(
                    name = %key,
                    existing = self.node(existing).kind_name(),
                    incoming = self.node(incoming).kind_name(),
                    "kind collision, incoming node replaces the incumbent"
                );
                self.detach_entry(parent, key.as_str());
                for pa in self.alias_group(parent).into_iter().skip(1) {
                    self.detach_entry(pa, key.as_str());
                }
                self.attach_mirrored(parent, incoming);
                Ok(incoming)
            }
        }
    }

    /// Push `incoming` under `parent` (whose child list must be free of
    /// the key) and a registered mirror copy under every node of the
    /// parent's alias group.
    fn attach_mirrored(&mut self, parent: NodeId, incoming: NodeId) {
        let key = self.node(incoming).name().clone();
        self.node_mut(parent).children.push(ChildEntry {
            key: key.clone(),
            node: incoming,
        });
        for pa in self.alias_group(parent).into_iter().skip(1) {
            let copy = self.copy_mirror(incoming);
            self.node_mut(copy).alias_of = Some(incoming);
            self.node_mut(incoming).aliases.push(copy);
            self.node_mut(pa).children.push(ChildEntry {
                key: key.clone(),
                node: copy,
            });
        }
    }

    fn kinds_compatible(&self, a: NodeId, b: NodeId) -> bool {
        match (self.node(a).kind(), self.node(b).kind()) {
            (NodeKind::Literal, NodeKind::Literal) => true,
            (NodeKind::Argument { parser: pa, .. }, NodeKind::Argument { parser: pb, .. }) => {
                pa.family() == pb.family()
            }
            _ => false,
        }
    }

    /// Fold a like-kinded `incoming` into `existing`: children re-insert
    /// one at a time (recursively, with full merging and mirroring),
    /// behavior lands when the incoming node carries it, and incoming
    /// alias names without a peer become aliases of the survivor.
    fn fold_into(&mut self, existing: NodeId, incoming: NodeId) -> Result<(), TreeError> {
        let entries = std::mem::take(&mut self.node_mut(incoming).children);
        for entry in entries {
            self.merge_insert(existing, entry.node)?;
        }
        if let Some(handler) = self.node(incoming).handler().cloned() {
            self.set_handler(existing, handler);
        }
        if let Some(redirect) = self.node(incoming).redirect() {
            self.set_redirect(existing, redirect);
        }
        if let Some(requirement) = self.node(incoming).requirement().cloned() {
            self.set_requirement(existing, requirement);
        }
        if let Some(suggestions) = self.node(incoming).suggestions().cloned() {
            self.put_suggestions(existing, suggestions);
        }
        if !self.node(existing).is_alias() {
            self.fold_aliases(existing, incoming)?;
        }
        Ok(())
    }

    /// Merge the incoming node's named aliases into the survivor's group.
    /// A name-matched peer absorbs the incoming alias's content directly;
    /// an unmatched incoming alias is adopted as a new alias of the
    /// survivor and twin-linked so it both equals the survivor and tracks
    /// it from then on.
    fn fold_aliases(&mut self, existing: NodeId, incoming: NodeId) -> Result<(), TreeError> {
        let existing_name = self.node(existing).name().clone();
        for ia in self.node(incoming).aliases().to_vec() {
            let ia_name = self.node(ia).name().clone();
            if ia_name == existing_name {
                // a same-named entry is a mirror registration, not an alias
                continue;
            }
            let peer = self
                .node(existing)
                .aliases()
                .iter()
                .copied()
                .find(|&ea| self.node(ea).name() == &ia_name);
            match peer {
                Some(ea) => self.fold_into(ea, ia)?,
                None => {
                    self.adopt_alias(existing, ia)?;
                    self.twin_link(existing, ia);
                }
            }
        }
        Ok(())
    }

    /// Make `copy`'s subtree a registered value twin of `original`'s:
    /// same-key, like-kinded children pair up (registering the pair as
    /// original and mirror, then recursing), children the copy lacks
    /// arrive as fresh mirror copies, and behavior the original carries
    /// lands on the copy.
    fn twin_link(&mut self, original: NodeId, copy: NodeId) {
        if let Some(handler) = self.node(original).handler().cloned() {
            self.node_mut(copy).handler = Some(handler);
        }
        if let Some(target) = self.node(original).redirect() {
            self.node_mut(copy).redirect = Some(target);
        }
        if let Some(requirement) = self.node(original).requirement().cloned() {
            self.node_mut(copy).requirement = Some(requirement);
        }
        if let Some(suggestions) = self.node(original).suggestions().cloned() {
            if let NodeKind::Argument {
                suggestions: slot, ..
            } = &mut self.node_mut(copy).kind
            {
                *slot = Some(suggestions);
            }
        }
        for entry in self.node(original).children().to_vec() {
            let paired = match self.child(copy, entry.key.as_str()) {
                Some(cc) if self.kinds_compatible(entry.node, cc) => Some(cc),
                Some(_) => {
                    // kind clash: the twin takes a fresh mirror copy
                    self.detach_entry(copy, entry.key.as_str());
                    None
                }
                None => None,
            };
            match paired {
                Some(cc) => {
                    if !self.node(entry.node).aliases().contains(&cc) {
                        self.node_mut(cc).alias_of = Some(entry.node);
                        self.node_mut(entry.node).aliases.push(cc);
                    }
                    self.twin_link(entry.node, cc);
                }
                None => {
                    let mirror = self.copy_mirror(entry.node);
                    self.node_mut(mirror).alias_of = Some(entry.node);
                    self.node_mut(entry.node).aliases.push(mirror);
                    self.node_mut(copy).children.push(ChildEntry {
                        key: entry.key,
                        node: mirror,
                    });
                }
            }
        }
    }

    /// Set completions on an argument node and its alias group. No-op on
    /// other kinds.
    fn put_suggestions(&mut self, id: NodeId, suggestions: Suggestions<C>) {
        for target in self.alias_group(id) {
            if let NodeKind::Argument {
                suggestions: slot, ..
            } = &mut self.node_mut(target).kind
            {
                *slot = Some(suggestions.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::node::Handler;
    use crate::parser::{integer, word};

    fn tree() -> CommandTree<()> {
        CommandTree::new()
    }

    #[test]
    fn test_same_key_literals_union() {
        let mut t = tree();
        let base = t.literal("region").unwrap();
        t.add_child(t.root(), base).unwrap();

        let first = t.literal("region").unwrap();
        let claim = t.literal("claim").unwrap();
        t.add_child(first, claim).unwrap();

        let second = t.literal("region").unwrap();
        let release = t.literal("release").unwrap();
        t.add_child(second, release).unwrap();

        let hub = t.literal("hub").unwrap();
        let a = t.add_child(hub, first).unwrap();
        let b = t.add_child(hub, second).unwrap();
        assert_eq!(a, b, "same-key literals should merge into one node");
        assert!(t.find_path(hub, &["region", "claim"]).is_some());
        assert!(t.find_path(hub, &["region", "release"]).is_some());
        assert_eq!(t.children(hub).len(), 1);
    }

    #[test]
    fn test_incoming_handler_overwrites_absent_keeps() {
        let mut t = tree();
        let parent = t.literal("parent").unwrap();

        let original: Handler<()> = Arc::new(|_, _| Ok(1));
        let first = t.literal("cmd").unwrap();
        t.set_handler(first, original.clone());
        let survivor = t.add_child(parent, first).unwrap();

        // bare incoming keeps the incumbent handler
        let bare = t.literal("cmd").unwrap();
        t.add_child(parent, bare).unwrap();
        assert!(Arc::ptr_eq(
            t.node(survivor).handler().unwrap(),
            &original
        ));

        // incoming with a handler overwrites
        let replacement: Handler<()> = Arc::new(|_, _| Ok(2));
        let carrier = t.literal("cmd").unwrap();
        t.set_handler(carrier, replacement.clone());
        t.add_child(parent, carrier).unwrap();
        assert!(Arc::ptr_eq(
            t.node(survivor).handler().unwrap(),
            &replacement
        ));
    }

    #[test]
    fn test_argument_families_gate_merging() {
        let mut t = tree();
        let parent = t.literal("parent").unwrap();

        let a = t.argument("amount", integer()).unwrap();
        let kept = t.add_child(parent, a).unwrap();
        let b = t.argument("amount", integer()).unwrap();
        assert_eq!(t.add_child(parent, b).unwrap(), kept);

        // different family: last-wins replacement
        let c = t.argument("amount", word()).unwrap();
        let replaced = t.add_child(parent, c).unwrap();
        assert_eq!(replaced, c);
        assert_eq!(t.child(parent, "amount"), Some(c));
        assert_eq!(t.children(parent).len(), 1);
    }

    #[test]
    fn test_strict_policy_rejects_kind_conflicts() {
        let mut t: CommandTree<()> = CommandTree::with_policy(MergePolicy::Strict);
        let parent = t.literal("parent").unwrap();
        let lit = t.literal("x").unwrap();
        t.add_child(parent, lit).unwrap();
        let arg = t.argument("x", word()).unwrap();
        let err = t.add_child(parent, arg).unwrap_err();
        assert!(
            matches!(err, TreeError::KindConflict { .. }),
            "expected kind conflict, got: {err}"
        );
        // incumbent untouched
        assert_eq!(t.child(parent, "x"), Some(lit));
    }

    #[test]
    fn test_double_insert_is_idempotent() {
        let mut t = tree();
        let parent = t.literal("parent").unwrap();
        for _ in 0..2 {
            let cmd = t.literal("cmd").unwrap();
            let sub = t.literal("sub").unwrap();
            t.add_child(cmd, sub).unwrap();
            t.add_child(parent, cmd).unwrap();
        }
        assert_eq!(t.children(parent).len(), 1);
        let cmd = t.child(parent, "cmd").unwrap();
        assert_eq!(t.children(cmd).len(), 1);
    }

    #[test]
    fn test_replacement_mirrors_onto_aliased_parents() {
        let mut t = tree();
        let give = t.literal("give").unwrap();
        let g = t.alias(give, "g").unwrap();

        let lit = t.literal("amount").unwrap();
        t.add_child(give, lit).unwrap();
        assert!(t.child(g, "amount").is_some());

        // kind clash: the argument replaces the literal on both subtrees
        let arg = t.argument("amount", integer()).unwrap();
        t.add_child(give, arg).unwrap();
        let mirrored = t.child(g, "amount").expect("alias keeps the key");
        assert!(t.node(mirrored).is_argument());
        assert_eq!(t.children(g).len(), 1);
    }

    #[test]
    fn remove_child_returns_the_node() {
        let mut t = tree();
        let parent = t.literal("parent").unwrap();
        let child = t.literal("child").unwrap();
        t.add_child(parent, child).unwrap();
        assert_eq!(t.remove_child(parent, "child"), Some(child));
        assert_eq!(t.remove_child(parent, "child"), None);
        assert!(t.children(parent).is_empty());
    }
}
