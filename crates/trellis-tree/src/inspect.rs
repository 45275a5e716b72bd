//! Read-only tree outlines.
//!
//! [`NodeSummary`] is a serializable snapshot of a subtree: names, kinds,
//! handlers, redirect targets, aliases. Sync reporting and tests lean on
//! summaries instead of poking at arena internals.

use serde::{Deserialize, Serialize};

use crate::arena::{CommandTree, NodeId};

/// A serializable outline of one node and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// The key this node answers to where it is linked. Equals the node's
    /// own name everywhere below the root; root entries show their bare
    /// or namespaced key.
    pub name: String,
    /// `"root"`, `"literal"`, or `"argument"`.
    pub kind: String,
    /// Parser family, for argument nodes.
    pub parser: Option<String>,
    pub has_handler: bool,
    /// Name of the redirect target, `"<root>"` for a root-kind target.
    pub redirect: Option<String>,
    /// Names of this node's aliases.
    pub aliases: Vec<String>,
    pub children: Vec<NodeSummary>,
}

/// Snapshot the subtree at `id`.
pub fn summarize<C>(tree: &CommandTree<C>, id: NodeId) -> NodeSummary {
    let node = tree.node(id);
    NodeSummary {
        name: node.name().to_string(),
        kind: node.kind_name().to_string(),
        parser: node.parser().map(|p| p.family().to_string()),
        has_handler: node.handler().is_some(),
        redirect: node.redirect().map(|target| {
            let t = tree.node(target);
            if t.is_root() {
                "<root>".to_string()
            } else {
                t.name().to_string()
            }
        }),
        aliases: tree
            .named_aliases(id)
            .iter()
            .map(|&a| tree.node(a).name().to_string())
            .collect(),
        children: node
            .children()
            .iter()
            .map(|entry| {
                let mut child = summarize(tree, entry.node);
                child.name = entry.key.to_string();
                child
            })
            .collect(),
    }
}
