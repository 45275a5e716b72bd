//! Arena storage for command trees.
//!
//! [`CommandTree`] owns every node in a `Vec`; a [`NodeId`] is an index
//! into that arena and doubles as the node's identity. Identity is what
//! aliasing and cross-tree mapping key on, so slots are never reused:
//! unlinked nodes simply stop being reachable from the root.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::merge::MergePolicy;
use crate::node::{
    validate_name, ChildEntry, Handler, Node, NodeKind, NodeName, Requirement,
};
use crate::parser::ValueParser;

/// Identity of a node within one [`CommandTree`].
///
/// Ids are minted by the owning tree and are only meaningful there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An arena of command nodes with a distinguished root.
///
/// `C` is the context type handlers run against and requirements inspect.
/// Not synchronized: mutation from one writer at a time is the caller's
/// obligation.
pub struct CommandTree<C> {
    nodes: Vec<Node<C>>,
    root: NodeId,
    policy: MergePolicy,
}

impl<C> CommandTree<C> {
    /// Create a tree holding only a root node, with the last-wins merge
    /// policy.
    pub fn new() -> Self {
        Self::with_policy(MergePolicy::default())
    }

    /// Create a tree with an explicit merge policy.
    pub fn with_policy(policy: MergePolicy) -> Self {
        let nodes = vec![Node::new(NodeName::empty(), NodeKind::Root)];
        Self {
            nodes,
            root: NodeId::from_index(0),
            policy,
        }
    }

    /// The tree's root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// How kind collisions on one key are resolved.
    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Number of arena slots ever allocated, unreachable ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node, `None` when the id was minted by another tree.
    pub fn get(&self, id: NodeId) -> Option<&Node<C>> {
        self.nodes.get(id.index())
    }

    /// Borrow a node. Ids are only minted by this tree, so an
    /// out-of-range id is a caller bug; use [`CommandTree::get`] for
    /// untrusted ids.
    pub fn node(&self, id: NodeId) -> &Node<C> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<C> {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn push(&mut self, node: Node<C>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Minting
    // ------------------------------------------------------------------

    /// Mint a detached literal node. Link it with
    /// [`CommandTree::add_child`].
    pub fn literal(&mut self, name: &str) -> Result<NodeId, TreeError> {
        validate_name(name)?;
        Ok(self.push(Node::new(NodeName::new(name), NodeKind::Literal)))
    }

    /// Mint a detached argument node.
    pub fn argument(
        &mut self,
        name: &str,
        parser: Arc<dyn ValueParser>,
    ) -> Result<NodeId, TreeError> {
        validate_name(name)?;
        Ok(self.push(Node::new(
            NodeName::new(name),
            NodeKind::Argument {
                parser,
                suggestions: None,
            },
        )))
    }

    /// Mint a detached root-kind node. Mapping machinery uses this to
    /// build a container mirroring another tree's root.
    pub fn detached_root(&mut self) -> NodeId {
        self.push(Node::new(NodeName::empty(), NodeKind::Root))
    }

    /// Mint a detached node from parts already known to be valid. Mapping
    /// machinery uses this; command authors want [`CommandTree::literal`]
    /// and [`CommandTree::argument`], which validate names.
    pub fn mint(&mut self, name: NodeName, kind: NodeKind<C>) -> NodeId {
        self.push(Node::new(name, kind))
    }

    /// Link `child` under `parent` under an explicit key with no merge, no
    /// mirroring, and no checks. Mapping machinery building fresh trees
    /// uses this; everything else wants [`CommandTree::add_child`].
    pub fn attach_keyed(&mut self, parent: NodeId, key: NodeName, child: NodeId) {
        self.node_mut(parent).children.push(ChildEntry { key, node: child });
    }

    // ------------------------------------------------------------------
    // Behavior
    // ------------------------------------------------------------------

    /// Set or replace the node's handler. Mirrored onto its aliases.
    pub fn set_handler(&mut self, id: NodeId, handler: Handler<C>) {
        for target in self.alias_group(id) {
            self.node_mut(target).handler = Some(handler.clone());
        }
    }

    /// Set or replace the node's requirement. Mirrored onto its aliases.
    pub fn set_requirement(&mut self, id: NodeId, requirement: Requirement<C>) {
        for target in self.alias_group(id) {
            self.node_mut(target).requirement = Some(requirement.clone());
        }
    }

    /// Point the node's matching at `target`'s children. Mirrored onto
    /// aliases; mirrors share the same target, which is what value
    /// equality means for a redirect.
    pub fn set_redirect(&mut self, id: NodeId, target: NodeId) {
        for t in self.alias_group(id) {
            self.node_mut(t).redirect = Some(target);
        }
    }

    /// Drop the node's redirect, restoring its own children. Mirrored
    /// onto aliases.
    pub fn clear_redirect(&mut self, id: NodeId) {
        for t in self.alias_group(id) {
            self.node_mut(t).redirect = None;
        }
    }

    /// The node plus everything registered to track it, transitively: its
    /// named aliases, their mirrors, and its own mirrors inside enclosing
    /// alias subtrees. Mutations apply across the whole group.
    pub(crate) fn alias_group(&self, id: NodeId) -> Vec<NodeId> {
        let mut group = vec![id];
        let mut i = 0;
        while i < group.len() {
            for &a in self.node(group[i]).aliases() {
                if !group.contains(&a) {
                    group.push(a);
                }
            }
            i += 1;
        }
        group
    }

    /// Aliases of `id` that answer to their own name: the user-created
    /// alias group, without the mirror copies registration adds inside
    /// enclosing alias subtrees.
    pub fn named_aliases(&self, id: NodeId) -> Vec<NodeId> {
        let name = self.node(id).name().clone();
        self.node(id)
            .aliases()
            .iter()
            .copied()
            .filter(|&a| self.node(a).name() != &name)
            .collect()
    }

    /// Whether `ctx` clears the node's requirement. Nodes without one are
    /// usable by every context.
    pub fn can_use(&self, id: NodeId, ctx: &C) -> bool {
        match self.node(id).requirement() {
            Some(req) => req(ctx),
            None => true,
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// The child of `parent` linked under `key`.
    pub fn child(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.node)
    }

    /// Walk a path of child keys down from `from`.
    pub fn find_path(&self, from: NodeId, path: &[&str]) -> Option<NodeId> {
        let mut cur = from;
        for key in path {
            cur = self.child(cur, key)?;
        }
        Some(cur)
    }

    /// Child edges of `parent` in insertion order.
    pub fn children(&self, parent: NodeId) -> &[ChildEntry] {
        self.node(parent).children()
    }

    // ------------------------------------------------------------------
    // Copying
    // ------------------------------------------------------------------

    /// Copy one node's parts into a fresh slot, children and aliases left
    /// empty. Parsers, handlers, and requirements are shared through
    /// their `Arc`s; the redirect keeps the same target, which is what
    /// value equality means for a redirect.
    fn copy_parts(&mut self, src: NodeId) -> NodeId {
        let (name, kind, handler, requirement, redirect) = {
            let n = self.node(src);
            (
                n.name.clone(),
                n.kind.clone(),
                n.handler.clone(),
                n.requirement.clone(),
                n.redirect,
            )
        };
        self.push(Node {
            name,
            kind,
            handler,
            requirement,
            redirect,
            children: Vec::new(),
            aliases: Vec::new(),
            alias_of: None,
        })
    }

    /// Deep-copy the subtree at `src`, recording every copied descendant
    /// as a mirror of its original (in the original's alias list). A
    /// later mutation anywhere below `src` is then re-applied inside the
    /// copy by the same mechanism that mirrors mutations of `src` itself.
    /// The copy's own top-level registration is the caller's job.
    pub(crate) fn copy_mirror(&mut self, src: NodeId) -> NodeId {
        let copy = self.copy_parts(src);
        let entries = self.node(src).children.clone();
        for entry in entries {
            let child_copy = self.copy_mirror(entry.node);
            self.node_mut(child_copy).alias_of = Some(entry.node);
            self.node_mut(entry.node).aliases.push(child_copy);
            self.node_mut(copy).children.push(ChildEntry {
                key: entry.key,
                node: child_copy,
            });
        }
        copy
    }
}

impl<C> Default for CommandTree<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for CommandTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTree")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("policy", &self.policy)
            .finish()
    }
}
