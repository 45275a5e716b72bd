//! Shared helpers for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use trellis::{
    build, word, CommandTree, Handler, Node, NodeId, NodeSummary, Requirement, SyncOptions,
    TreeMapper,
};

/// Authoring-side context: a player session holding capability flags and
/// a log of what ran.
#[derive(Debug, Default)]
pub struct GameCtx {
    pub caps: HashSet<String>,
    pub log: Vec<String>,
}

impl GameCtx {
    /// A session holding the given capabilities.
    pub fn with_caps(caps: &[&str]) -> Self {
        Self {
            caps: caps.iter().map(|c| c.to_string()).collect(),
            log: Vec::new(),
        }
    }
}

/// Host-side context: the console the synced tree runs against.
#[derive(Debug, Default)]
pub struct HostCtx {
    pub log: Vec<String>,
}

/// Requirement passing only sessions that hold `cap`.
pub fn needs(cap: &'static str) -> Requirement<GameCtx> {
    Arc::new(move |ctx: &GameCtx| ctx.caps.contains(cap))
}

/// Handler appending `tag` to the session log.
pub fn log_handler(tag: &str) -> Handler<GameCtx> {
    let tag = tag.to_string();
    Arc::new(move |ctx: &mut GameCtx, _inv| {
        ctx.log.push(tag.clone());
        Ok(0)
    })
}

/// Mapper bridging game commands onto the host console: a runnable source
/// node maps to a handler that logs the node's name into [`HostCtx`].
pub struct ConsoleBridge;

impl TreeMapper<GameCtx, HostCtx> for ConsoleBridge {
    fn map_handler(&self, source: &Node<GameCtx>) -> Option<Handler<HostCtx>> {
        source.handler()?;
        let name = source.name().to_string();
        Some(Arc::new(move |ctx: &mut HostCtx, _inv| {
            ctx.log.push(name.clone());
            Ok(0)
        }))
    }
}

/// A source tree with the commands most tests want:
///
/// - `teleport <target>` (alias `tp`), gated on the "teleport" capability
/// - `spawn`, open to everyone
/// - `admin reload`, gated on "admin"
///
/// Returns the tree plus the three primary nodes in that order.
pub fn game_tree() -> (CommandTree<GameCtx>, Vec<NodeId>) {
    let mut tree: CommandTree<GameCtx> = CommandTree::new();
    let root = tree.root();

    let teleport = build::literal("teleport")
        .requires(|ctx: &GameCtx| ctx.caps.contains("teleport"))
        .child(
            build::argument("target", word()).handler(|ctx: &mut GameCtx, inv| {
                ctx.log
                    .push(format!("teleport {}", inv.arg("target").unwrap_or("?")));
                Ok(0)
            }),
        )
        .alias("tp")
        .attach(&mut tree, root)
        .expect("should build teleport");

    let spawn = build::literal("spawn")
        .handler(|ctx: &mut GameCtx, _inv| {
            ctx.log.push("spawn".into());
            Ok(0)
        })
        .attach(&mut tree, root)
        .expect("should build spawn");

    let admin = build::literal("admin")
        .requires(|ctx: &GameCtx| ctx.caps.contains("admin"))
        .child(
            build::literal("reload").handler(|ctx: &mut GameCtx, _inv| {
                ctx.log.push("reload".into());
                Ok(0)
            }),
        )
        .attach(&mut tree, root)
        .expect("should build admin");

    (tree, vec![teleport, spawn, admin])
}

/// Sync options under the "acme" namespace.
pub fn acme() -> SyncOptions {
    SyncOptions::new("acme")
}

/// Assert that two nodes are value twins: same children recursively, same
/// handler and redirect shape. Names and alias bookkeeping may differ.
pub fn assert_twins<C>(tree: &CommandTree<C>, a: NodeId, b: NodeId) {
    let mut left = trellis::summarize(tree, a);
    let mut right = trellis::summarize(tree, b);
    left.name = String::new();
    right.name = String::new();
    scrub_aliases(&mut left);
    scrub_aliases(&mut right);
    assert_eq!(left, right, "nodes {a} and {b} should be value twins");
}

fn scrub_aliases(summary: &mut NodeSummary) {
    summary.aliases.clear();
    for child in &mut summary.children {
        scrub_aliases(child);
    }
}
