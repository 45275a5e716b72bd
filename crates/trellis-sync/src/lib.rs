//! Tree-to-tree command synchronization.
//!
//! One program's command tree rarely lives alone: the authoring side
//! builds commands against its own context type, while the hosting side
//! routes input with a different one. This crate carries commands across
//! that boundary. The [`engine`] maps subtrees between trees with
//! different context types, translating behavior through a
//! [`TreeMapper`] and pruning what a caller cannot use; the [`sync`]
//! entry points graft the mapped commands at the target root under
//! namespaced and bare keys, with a [`HostRegistry`] vetoing names and a
//! [`SyncReport`] telling the story afterwards.

pub mod engine;
pub mod mapper;
pub mod registry;
pub mod report;
pub mod sync;

pub use engine::{map_subtree, map_with_memo};
pub use mapper::{noop_handler, BaseMapper, TreeMapper};
pub use registry::{HostRegistry, MemoryRegistry, Registration};
pub use report::SyncReport;
pub use sync::{add, prune, SyncOptions, DEFAULT_NAMESPACE};
