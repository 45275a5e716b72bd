//! The synchronizer: full pruning resyncs and selective overlays.
//!
//! Both entry points map command subtrees out of a source tree and graft
//! the results at the target root, linking each command (and each of its
//! aliases) under a namespaced key plus, host willing, its bare name. A
//! [`HostRegistry`] may veto any name; vetoed commands are dropped
//! silently and show up in the [`SyncReport`] rather than as errors.
//!
//! [`prune`] is the canonical rebuild: stale target entries for each
//! command go away first, and no capability filter applies. [`add`]
//! overlays one caller's view: subtrees the caller cannot use are
//! pruned during the walk, an extra filter picks which commands even
//! try, and nothing already in the target is touched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use trellis_tree::{CommandTree, Node, NodeId, TreeError};

use crate::engine::map_with_memo;
use crate::mapper::TreeMapper;
use crate::registry::HostRegistry;
use crate::report::SyncReport;

/// Namespace used when the embedder does not configure one.
pub const DEFAULT_NAMESPACE: &str = "trellis";

/// Knobs shared by both sync flavors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Namespace for the `namespace:name` key every command is linked
    /// under.
    pub namespace: String,
    /// Whether bare keys are linked at all. With `false`, commands are
    /// reachable only through their namespaced form, host willing or not.
    pub register_bare: bool,
}

impl SyncOptions {
    /// Options under `namespace`, bare keys enabled.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            register_bare: true,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// Rebuild `target`'s entries for `roots` from `source`.
///
/// For each command: stale target entries of the same name (and their
/// whole alias groups) are unlinked and unregistered, the subtree is
/// mapped with no capability filter, and the result is grafted. The
/// memo is seeded with `source root -> target root`, so a source
/// redirect to the root comes out pointing at the live target root.
pub fn prune<S, T, M>(
    source: &CommandTree<S>,
    roots: &[NodeId],
    target: &mut CommandTree<T>,
    host: &mut dyn HostRegistry,
    mapper: &M,
    options: &SyncOptions,
) -> Result<SyncReport, TreeError>
where
    M: TreeMapper<S, T> + ?Sized,
{
    let mut report = SyncReport::new();
    let mut memo = HashMap::new();
    memo.insert(source.root(), target.root());

    for &root in roots {
        let name = source.node(root).name().to_string();
        if !source.node(root).is_literal() {
            return Err(TreeError::RootNotLiteral { name });
        }
        remove_stale(target, &name, options, Some(&mut *host), &mut report);
        let Some(mapped) = map_with_memo(source, root, target, mapper, None, &mut memo) else {
            continue;
        };
        graft(
            source, root, target, mapped, Some(&mut *host), mapper, None, options, &mut memo,
            &mut report,
        )?;
    }
    info!(
        namespace = %options.namespace,
        synced = report.synced.len(),
        refused = report.refused.len(),
        removed = report.removed.len(),
        "prune sync complete"
    );
    Ok(report)
}

/// Overlay onto `overlay` every command in `roots` that passes
/// `extra_filter`, as `caller` sees it.
///
/// The filter picks commands out of the batch; it is not consulted for
/// redirect targets reached during the walk. The caller's capabilities
/// prune within the walk, redirect targets included. Nothing already in
/// the overlay is removed or replaced; a key collision at the overlay
/// root is an error. Without a host every name is accepted.
#[allow(clippy::too_many_arguments)]
pub fn add<S, T, M, F>(
    source: &CommandTree<S>,
    roots: &[NodeId],
    overlay: &mut CommandTree<T>,
    mut host: Option<&mut dyn HostRegistry>,
    mapper: &M,
    caller: &S,
    extra_filter: F,
    options: &SyncOptions,
) -> Result<SyncReport, TreeError>
where
    M: TreeMapper<S, T> + ?Sized,
    F: Fn(&Node<S>) -> bool,
{
    let mut report = SyncReport::new();
    let mut memo = HashMap::new();
    memo.insert(source.root(), overlay.root());

    for &root in roots {
        let name = source.node(root).name().to_string();
        if !source.node(root).is_literal() {
            return Err(TreeError::RootNotLiteral { name });
        }
        if !extra_filter(source.node(root)) {
            debug!(command = %name, "skipped by filter");
            continue;
        }
        let Some(mapped) =
            map_with_memo(source, root, overlay, mapper, Some(caller), &mut memo)
        else {
            debug!(command = %name, "dropped, caller requirement failed");
            continue;
        };
        graft(
            source,
            root,
            overlay,
            mapped,
            host.as_deref_mut(),
            mapper,
            Some(caller),
            options,
            &mut memo,
            &mut report,
        )?;
    }
    info!(
        namespace = %options.namespace,
        synced = report.synced.len(),
        refused = report.refused.len(),
        "overlay sync complete"
    );
    Ok(report)
}

/// Link one mapped command (and its aliases) at the target root.
///
/// The primary registers first; a veto drops the whole group. Each alias
/// is then mapped and registered independently -- a vetoed alias is
/// skipped without touching the rest.
#[allow(clippy::too_many_arguments)]
fn graft<S, T, M>(
    source: &CommandTree<S>,
    src_primary: NodeId,
    target: &mut CommandTree<T>,
    mapped: NodeId,
    mut host: Option<&mut (dyn HostRegistry + '_)>,
    mapper: &M,
    caller: Option<&S>,
    options: &SyncOptions,
    memo: &mut HashMap<NodeId, NodeId>,
    report: &mut SyncReport,
) -> Result<(), TreeError>
where
    M: TreeMapper<S, T> + ?Sized,
{
    let troot = target.root();
    let name = source.node(src_primary).name().to_string();

    let bare_granted = match host.as_deref_mut() {
        Some(h) => match h.register(&name, mapped) {
            Some(registration) => registration.bare,
            None => {
                warn!(command = %name, "host refused registration, dropping");
                report.refused.push(name);
                return Ok(());
            }
        },
        None => true,
    };
    target.link_root_key(troot, &namespaced(&options.namespace, &name), mapped)?;
    if bare_granted && options.register_bare {
        target.link_root_key(troot, &name, mapped)?;
    }
    debug!(command = %name, bare = bare_granted && options.register_bare, "command linked");
    report.synced.push(name.clone());

    for alias in source.named_aliases(src_primary) {
        let alias_name = source.node(alias).name().to_string();
        let Some(mapped_alias) = map_with_memo(source, alias, target, mapper, caller, memo)
        else {
            debug!(alias = %alias_name, "alias dropped, requirement failed");
            continue;
        };
        let alias_bare = match host.as_deref_mut() {
            Some(h) => match h.register(&alias_name, mapped_alias) {
                Some(registration) => registration.bare,
                None => {
                    warn!(alias = %alias_name, command = %name, "host refused alias");
                    report.refused.push(alias_name);
                    continue;
                }
            },
            None => true,
        };
        target.link_root_key(
            troot,
            &namespaced(&options.namespace, &alias_name),
            mapped_alias,
        )?;
        if alias_bare && options.register_bare {
            target.link_root_key(troot, &alias_name, mapped_alias)?;
        }
        target.adopt_alias(mapped, mapped_alias)?;
    }
    Ok(())
}

/// Unlink the target's entries for `name` (bare spelling first, then the
/// namespaced one) and release the unlinked names with the host.
fn remove_stale<T>(
    target: &mut CommandTree<T>,
    name: &str,
    options: &SyncOptions,
    mut host: Option<&mut dyn HostRegistry>,
    report: &mut SyncReport,
) {
    let troot = target.root();
    let namespaced_key = namespaced(&options.namespace, name);
    let key = if target.child(troot, name).is_some() {
        name
    } else if target.child(troot, &namespaced_key).is_some() {
        namespaced_key.as_str()
    } else {
        return;
    };
    let Some(unlinked) = target.unlink_root(troot, key) else {
        return;
    };
    let mut seen: Vec<NodeId> = Vec::new();
    for (_, node) in &unlinked.entries {
        if seen.contains(node) {
            continue;
        }
        seen.push(*node);
        let node_name = target.node(*node).name().to_string();
        if let Some(h) = host.as_deref_mut() {
            h.unregister(&node_name);
        }
        report.removed.push(node_name);
    }
    debug!(command = name, entries = unlinked.entries.len(), "stale entries unlinked");
}

fn namespaced(namespace: &str, name: &str) -> String {
    format!("{namespace}:{name}")
}
