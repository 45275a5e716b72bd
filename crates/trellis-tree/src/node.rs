//! Command node model.
//!
//! A tree is made of three node kinds:
//!
//! - [`NodeKind::Root`]: the anchor commands hang off. Matches nothing and
//!   carries no behavior of its own.
//! - [`NodeKind::Literal`]: matches its own name verbatim.
//! - [`NodeKind::Argument`]: matches any token its [`ValueParser`] accepts
//!   and captures the token under the node's name.
//!
//! Behavior hangs off nodes as cheaply-cloneable `Arc`s: an optional
//! [`Handler`] run when input ends at the node, an optional [`Requirement`]
//! gating per-context visibility, and an optional redirect that makes
//! another node's children act as this node's own.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::arena::NodeId;
use crate::dispatch::Invocation;
use crate::error::TreeError;
use crate::parser::ValueParser;

/// Longest accepted node name, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// A node's name. Uses `Arc<str>` internally so cloning is an atomic
/// increment instead of a heap allocation. The root carries the empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeName(Arc<str>);

impl NodeName {
    /// Create a new NodeName from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The empty name, reserved for root nodes.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::ops::Deref for NodeName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<String> for NodeName {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == other.as_str()
    }
}

impl std::borrow::Borrow<str> for NodeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for NodeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeName::new(s))
    }
}

/// Check that `name` can be used for a literal, argument, or alias.
///
/// Names must be non-empty, fit in [`MAX_NAME_LEN`] bytes, and stay clear
/// of whitespace (the token separator), control characters, and `:` (the
/// namespace separator in root keys).
pub fn validate_name(name: &str) -> Result<(), TreeError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.len() > MAX_NAME_LEN {
        Some("name is longer than 64 bytes")
    } else if name.contains(':') {
        Some("':' is reserved for namespaced root keys")
    } else if name.chars().any(char::is_whitespace) {
        Some("whitespace is not allowed")
    } else if name.chars().any(char::is_control) {
        Some("control characters are not allowed")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(TreeError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Handler invoked when dispatch lands on a node with no input left.
/// Returns an exit code on success.
pub type Handler<C> = Arc<dyn Fn(&mut C, &Invocation) -> anyhow::Result<i32> + Send + Sync>;

/// Per-context visibility gate. Nodes without one are visible to every
/// context.
pub type Requirement<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

/// Completion source for argument nodes.
pub trait SuggestionSource<C>: Send + Sync {
    /// Suggest completions for a partially typed token.
    fn suggest(&self, ctx: &C, prefix: &str) -> Vec<String>;
}

/// Shared handle to a [`SuggestionSource`].
pub type Suggestions<C> = Arc<dyn SuggestionSource<C>>;

/// What a node matches.
pub enum NodeKind<C> {
    /// Tree anchor. Never matches input.
    Root,
    /// Matches the node's own name verbatim.
    Literal,
    /// Matches whatever the parser accepts; the token is captured under
    /// the node's name.
    Argument {
        parser: Arc<dyn ValueParser>,
        suggestions: Option<Suggestions<C>>,
    },
}

impl<C> NodeKind<C> {
    /// Short name of the kind, used in errors and summaries.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Literal => "literal",
            NodeKind::Argument { .. } => "argument",
        }
    }
}

impl<C> Clone for NodeKind<C> {
    fn clone(&self) -> Self {
        match self {
            NodeKind::Root => NodeKind::Root,
            NodeKind::Literal => NodeKind::Literal,
            NodeKind::Argument {
                parser,
                suggestions,
            } => NodeKind::Argument {
                parser: Arc::clone(parser),
                suggestions: suggestions.clone(),
            },
        }
    }
}

impl<C> fmt::Debug for NodeKind<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => f.write_str("Root"),
            NodeKind::Literal => f.write_str("Literal"),
            NodeKind::Argument {
                parser,
                suggestions,
            } => f
                .debug_struct("Argument")
                .field("parser", &parser.family())
                .field("suggestions", &suggestions.is_some())
                .finish(),
        }
    }
}

/// A child edge: the key it is linked under plus the node it points at.
///
/// Below the root the key always equals the child's name. At the root one
/// node may be linked under several keys (bare and namespaced forms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub key: NodeName,
    pub node: NodeId,
}

/// A single node in a [`crate::CommandTree`].
///
/// Fields are private: structure is mutated through the owning tree so
/// that alias mirroring and root bookkeeping stay consistent.
pub struct Node<C> {
    pub(crate) name: NodeName,
    pub(crate) kind: NodeKind<C>,
    pub(crate) handler: Option<Handler<C>>,
    pub(crate) requirement: Option<Requirement<C>>,
    pub(crate) redirect: Option<NodeId>,
    pub(crate) children: Vec<ChildEntry>,
    pub(crate) aliases: Vec<NodeId>,
    pub(crate) alias_of: Option<NodeId>,
}

impl<C> Node<C> {
    pub(crate) fn new(name: NodeName, kind: NodeKind<C>) -> Self {
        Self {
            name,
            kind,
            handler: None,
            requirement: None,
            redirect: None,
            children: Vec::new(),
            aliases: Vec::new(),
            alias_of: None,
        }
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind<C> {
        &self.kind
    }

    /// Short name of the node's kind: `"root"`, `"literal"`, or
    /// `"argument"`.
    pub fn kind_name(&self) -> &'static str {
        self.kind.kind_name()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal)
    }

    pub fn is_argument(&self) -> bool {
        matches!(self.kind, NodeKind::Argument { .. })
    }

    pub fn handler(&self) -> Option<&Handler<C>> {
        self.handler.as_ref()
    }

    pub fn requirement(&self) -> Option<&Requirement<C>> {
        self.requirement.as_ref()
    }

    pub fn redirect(&self) -> Option<NodeId> {
        self.redirect
    }

    /// Child edges in insertion order.
    pub fn children(&self) -> &[ChildEntry] {
        &self.children
    }

    /// Nodes kept in lockstep with this one: its named aliases plus the
    /// mirror copies registered for it inside enclosing alias subtrees.
    /// Mirrors share this node's name; named aliases never do. See
    /// [`crate::CommandTree::named_aliases`] for just the named ones.
    pub fn aliases(&self) -> &[NodeId] {
        &self.aliases
    }

    /// Whether this node is a copy tracking another: a named alias, or a
    /// mirror inside an alias subtree.
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    /// The node this one is a copy of, if any.
    pub fn alias_of(&self) -> Option<NodeId> {
        self.alias_of
    }

    /// The argument parser, for argument nodes.
    pub fn parser(&self) -> Option<&Arc<dyn ValueParser>> {
        match &self.kind {
            NodeKind::Argument { parser, .. } => Some(parser),
            _ => None,
        }
    }

    /// The completion source, for argument nodes that carry one.
    pub fn suggestions(&self) -> Option<&Suggestions<C>> {
        match &self.kind {
            NodeKind::Argument { suggestions, .. } => suggestions.as_ref(),
            _ => None,
        }
    }
}

impl<C> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("handler", &self.handler.is_some())
            .field("requirement", &self.requirement.is_some())
            .field("redirect", &self.redirect)
            .field("children", &self.children.len())
            .field("aliases", &self.aliases.len())
            .field("alias_of", &self.alias_of)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_plain_words() {
        assert!(validate_name("teleport").is_ok());
        assert!(validate_name("tp2").is_ok());
        assert!(validate_name("give-item").is_ok());
        assert!(validate_name("x").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_bad_input() {
        for (name, fragment) in [
            ("", "empty"),
            ("two words", "whitespace"),
            ("ns:name", "reserved"),
            ("tab\there", "whitespace"),
            ("bell\u{7}", "control"),
        ] {
            let err = validate_name(name).unwrap_err();
            assert!(
                err.to_string().contains(fragment),
                "expected {fragment:?} in error for {name:?}, got: {err}"
            );
        }
    }

    #[test]
    fn test_validate_name_enforces_length() {
        let long = "x".repeat(MAX_NAME_LEN);
        assert!(validate_name(&long).is_ok());
        let too_long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(&too_long).is_err());
    }

    #[test]
    fn node_name_compares_with_strings() {
        let name = NodeName::new("spawn");
        assert_eq!(name, "spawn");
        assert_eq!(name.as_str(), "spawn");
        assert_eq!(name.to_string(), "spawn");
    }
}
