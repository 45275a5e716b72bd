//! Fluent authoring.
//!
//! [`literal`] and [`argument`] start declarative node specs; nesting,
//! behavior, and aliases chain on, and [`NodeSpec::attach`] mints the
//! whole thing into a tree under a parent in one go. Attachment goes
//! through the tree's normal insert path, so same-key specs merge and
//! aliases stay mirrored like any hand-built node.

use std::sync::Arc;

use crate::arena::{CommandTree, NodeId};
use crate::dispatch::Invocation;
use crate::error::TreeError;
use crate::node::{Handler, NodeKind, Requirement, SuggestionSource, Suggestions};
use crate::parser::ValueParser;

/// A node under construction.
pub struct NodeSpec<C> {
    name: String,
    parser: Option<Arc<dyn ValueParser>>,
    handler: Option<Handler<C>>,
    requirement: Option<Requirement<C>>,
    suggestions: Option<Suggestions<C>>,
    children: Vec<NodeSpec<C>>,
    aliases: Vec<String>,
}

/// Start a literal spec.
pub fn literal<C>(name: impl Into<String>) -> NodeSpec<C> {
    NodeSpec {
        name: name.into(),
        parser: None,
        handler: None,
        requirement: None,
        suggestions: None,
        children: Vec::new(),
        aliases: Vec::new(),
    }
}

/// Start an argument spec.
pub fn argument<C>(name: impl Into<String>, parser: Arc<dyn ValueParser>) -> NodeSpec<C> {
    let mut spec = literal(name);
    spec.parser = Some(parser);
    spec
}

impl<C> NodeSpec<C> {
    /// Nest a child spec.
    pub fn child(mut self, spec: NodeSpec<C>) -> Self {
        self.children.push(spec);
        self
    }

    /// Run `f` when input ends on this node.
    pub fn handler(
        mut self,
        f: impl Fn(&mut C, &Invocation) -> anyhow::Result<i32> + Send + Sync + 'static,
    ) -> Self {
        self.handler = Some(Arc::new(f));
        self
    }

    /// Hide this node (and everything under it) from contexts failing `f`.
    pub fn requires(mut self, f: impl Fn(&C) -> bool + Send + Sync + 'static) -> Self {
        self.requirement = Some(Arc::new(f));
        self
    }

    /// Complete this argument's token from `source`.
    pub fn suggests(mut self, source: impl SuggestionSource<C> + 'static) -> Self {
        self.suggestions = Some(Arc::new(source));
        self
    }

    /// Also answer to `name`: a full value copy kept in lockstep, linked
    /// beside this node.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.push(name.into());
        self
    }

    /// Mint this spec into `tree` and link it under `parent`. Aliases are
    /// created once the subtree is complete, then linked beside it under
    /// the same parent. Returns the surviving node (the incumbent when
    /// the spec merged into one).
    pub fn attach(mut self, tree: &mut CommandTree<C>, parent: NodeId) -> Result<NodeId, TreeError> {
        let alias_names = std::mem::take(&mut self.aliases);
        let node = self.build(tree)?;
        let linked = tree.add_child(parent, node)?;
        for name in alias_names {
            // when the spec merged into an incumbent, reuse its alias
            let alias = match tree
                .named_aliases(linked)
                .into_iter()
                .find(|&a| tree.node(a).name() == name.as_str())
            {
                Some(existing) => existing,
                None => tree.alias(linked, &name)?,
            };
            if tree.child(parent, &name).is_none() {
                tree.add_child(parent, alias)?;
            }
        }
        Ok(linked)
    }

    fn build(self, tree: &mut CommandTree<C>) -> Result<NodeId, TreeError> {
        let node = match self.parser {
            Some(parser) => tree.argument(&self.name, parser)?,
            None => tree.literal(&self.name)?,
        };
        if let Some(suggestions) = self.suggestions {
            if let NodeKind::Argument {
                suggestions: slot, ..
            } = &mut tree.node_mut(node).kind
            {
                *slot = Some(suggestions);
            }
        }
        if let Some(handler) = self.handler {
            tree.set_handler(node, handler);
        }
        if let Some(requirement) = self.requirement {
            tree.set_requirement(node, requirement);
        }
        for child in self.children {
            child.attach(tree, node)?;
        }
        Ok(node)
    }
}
