//! Arena-backed command trees.
//!
//! Commands form a tree below a root: literal nodes match their own name,
//! argument nodes capture a token their parser accepts, and every node
//! may carry a handler, a per-context requirement, aliases, and a
//! redirect. One [`CommandTree`] owns all of its nodes; [`NodeId`]s are
//! stable identities that mutation, aliasing, and cross-tree mapping key
//! on.
//!
//! Inserting under an occupied key merges instead of erroring (see
//! [`MergePolicy`]), aliases are value copies kept in lockstep with their
//! primary, and the root's child list doubles as a registration table
//! where one command may answer to several keys. [`execute`] routes an
//! input line through all of it.

pub mod arena;
pub mod build;
pub mod dispatch;
pub mod error;
pub mod inspect;
pub mod merge;
pub mod node;
pub mod parser;
pub mod root;

mod alias;

pub use arena::{CommandTree, NodeId};
pub use dispatch::{execute, suggest, ArgValue, Invocation};
pub use error::{DispatchError, TreeError};
pub use inspect::{summarize, NodeSummary};
pub use merge::MergePolicy;
pub use node::{
    validate_name, ChildEntry, Handler, Node, NodeKind, NodeName, Requirement, SuggestionSource,
    Suggestions, MAX_NAME_LEN,
};
pub use parser::{integer, word, Integer, ValueParser, Word};
pub use root::{validate_root_key, RootUnlink};
