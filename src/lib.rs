//! Command tree routing and host synchronization.
//!
//! `trellis` re-exports the two crates that make up the library:
//!
//! - [`trellis_tree`]: the arena-backed node model -- literals,
//!   arguments, aliases, merge-on-insert, redirects, and dispatch.
//! - [`trellis_sync`]: cross-tree mapping and the synchronizer that
//!   grafts mapped commands into a host-registered target tree.
//!
//! Build commands with [`build`], route input with [`execute`], and move
//! trees between contexts with [`prune`] and [`add`].

pub use trellis_tree::{
    build, execute, integer, suggest, summarize, validate_name, validate_root_key, word, ArgValue,
    ChildEntry, CommandTree, DispatchError, Handler, Integer, Invocation, MergePolicy, Node,
    NodeId, NodeKind, NodeName, NodeSummary, Requirement, RootUnlink, SuggestionSource,
    Suggestions, TreeError, ValueParser, Word, MAX_NAME_LEN,
};

pub use trellis_sync::{
    add, map_subtree, map_with_memo, noop_handler, prune, BaseMapper, HostRegistry,
    MemoryRegistry, Registration, SyncOptions, SyncReport, TreeMapper, DEFAULT_NAMESPACE,
};
