//! Recursive subtree mapping.
//!
//! [`map_subtree`] copies a subtree from one tree into another, kind by
//! kind, translating behavior through a [`TreeMapper`] and dropping
//! everything a caller context cannot use. A memo keyed on source
//! identity keeps shared structure shared: a node reached twice (say,
//! through two redirects) maps to one target node. Denials are not
//! memoized; only produced nodes are identities worth caching.

use std::collections::HashMap;

use tracing::trace;

use trellis_tree::{CommandTree, NodeId, NodeKind};

use crate::mapper::TreeMapper;

/// Map the subtree at `node` into `target`, returning the mapped node, or
/// `None` when `caller` fails the node's requirement.
///
/// With `caller = None` no requirement is evaluated and every node maps.
pub fn map_subtree<S, T, M>(
    source: &CommandTree<S>,
    node: NodeId,
    target: &mut CommandTree<T>,
    mapper: &M,
    caller: Option<&S>,
) -> Option<NodeId>
where
    M: TreeMapper<S, T> + ?Sized,
{
    let mut memo = HashMap::new();
    map_with_memo(source, node, target, mapper, caller, &mut memo)
}

/// [`map_subtree`] with an external memo, letting several entry points
/// share one identity space. A batch sync maps many commands into one
/// target and wants a redirect from one command into another to land on
/// the node already mapped for it.
///
/// The memo maps source ids to target ids; seeding it (say, source root
/// to live target root) steers where those references resolve.
pub fn map_with_memo<S, T, M>(
    source: &CommandTree<S>,
    node: NodeId,
    target: &mut CommandTree<T>,
    mapper: &M,
    caller: Option<&S>,
    memo: &mut HashMap<NodeId, NodeId>,
) -> Option<NodeId>
where
    M: TreeMapper<S, T> + ?Sized,
{
    // requirement before memo: a denied node stays invisible
    if let Some(ctx) = caller {
        if !source.can_use(node, ctx) {
            trace!(node = %source.node(node).name(), "subtree dropped, requirement failed");
            return None;
        }
    }
    if let Some(&mapped) = memo.get(&node) {
        return Some(mapped);
    }

    let src = source.node(node);
    let mapped = match src.kind() {
        NodeKind::Root => target.detached_root(),
        NodeKind::Literal => target.mint(src.name().clone(), NodeKind::Literal),
        NodeKind::Argument { parser, .. } => target.mint(
            src.name().clone(),
            NodeKind::Argument {
                parser: mapper.map_parser(src, parser),
                suggestions: mapper.map_suggestions(src),
            },
        ),
    };
    if let Some(handler) = mapper.map_handler(src) {
        target.set_handler(mapped, handler);
    }
    if let Some(requirement) = mapper.map_requirement(src) {
        target.set_requirement(mapped, requirement);
    }

    // identity lands before recursion so cycles close on it
    memo.insert(node, mapped);

    if let Some(redirect) = src.redirect() {
        match map_with_memo(source, redirect, target, mapper, caller, memo) {
            Some(mapped_target) => target.set_redirect(mapped, mapped_target),
            // denied target: the redirect is dropped, the node dead-ends
            None => trace!(node = %src.name(), "redirect target denied, dropping redirect"),
        }
    }

    for entry in src.children() {
        if let Some(child) = map_with_memo(source, entry.node, target, mapper, caller, memo) {
            target.attach_keyed(mapped, entry.key.clone(), child);
        }
    }
    Some(mapped)
}
