//! Input routing.
//!
//! [`execute`] splits an input line on whitespace and walks the tree one
//! token at a time: literal children are tried first (exact key match),
//! then argument children in insertion order, first accepting parser
//! wins. A node's redirect swaps in the target's children for the step.
//! When input ends, the landing node's own handler runs -- a redirect
//! never stands in for a missing handler.
//!
//! Nodes whose requirement the context fails are skipped as if they were
//! not linked, so denial and absence look the same to the caller. Every
//! step consumes a token, which keeps redirect cycles from looping a
//! dispatch forever.

use tracing::trace;

use crate::arena::{CommandTree, NodeId};
use crate::error::DispatchError;
use crate::node::{NodeKind, NodeName};

/// One captured argument token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgValue {
    /// Name of the argument node that captured the token.
    pub name: NodeName,
    /// The raw token as typed.
    pub raw: String,
    /// The parser's normalized rendering of the token.
    pub value: String,
}

/// Everything a handler gets to see about one call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The full input line as given.
    pub input: String,
    /// Keys matched on the way down, alias and namespaced spellings as
    /// typed.
    pub path: Vec<NodeName>,
    /// Captured argument values in match order.
    pub args: Vec<ArgValue>,
}

impl Invocation {
    /// Normalized value captured by the argument node called `name`.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Route `input` through the tree under `root` and run the handler it
/// lands on, returning the handler's exit code.
pub fn execute<C>(
    tree: &CommandTree<C>,
    root: NodeId,
    input: &str,
    ctx: &mut C,
) -> Result<i32, DispatchError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(DispatchError::EmptyInput);
    }

    let mut cur = root;
    let mut path: Vec<NodeName> = Vec::new();
    let mut args: Vec<ArgValue> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let base = tree.node(cur).redirect().unwrap_or(cur);
        let Some(step) = match_child(tree, base, token, ctx) else {
            return Err(if i == 0 {
                DispatchError::UnknownCommand {
                    token: token.to_string(),
                }
            } else {
                DispatchError::Unmatched {
                    token: token.to_string(),
                    path: join(&path),
                }
            });
        };
        if let Some(value) = step.value {
            args.push(ArgValue {
                name: tree.node(step.node).name().clone(),
                raw: token.to_string(),
                value,
            });
        }
        path.push(step.key);
        cur = step.node;
    }

    let Some(handler) = tree.node(cur).handler() else {
        return Err(DispatchError::NoHandler { path: join(&path) });
    };
    let invocation = Invocation {
        input: input.to_string(),
        path,
        args,
    };
    trace!(command = %join(&invocation.path), "dispatching");
    handler(ctx, &invocation).map_err(|source| DispatchError::HandlerFailed {
        path: join(&invocation.path),
        source,
    })
}

/// Complete the final token of `input` against the tree under `root`.
///
/// All complete tokens are walked first (requirement-gated, exactly as
/// [`execute`] walks them); candidates are literal keys starting with the
/// trailing partial token plus whatever argument completion sources
/// offer. Sorted and deduplicated.
pub fn suggest<C>(tree: &CommandTree<C>, root: NodeId, input: &str, ctx: &C) -> Vec<String> {
    let mut tokens: Vec<&str> = input.split_whitespace().collect();
    let prefix = if input.ends_with(char::is_whitespace) || input.is_empty() {
        ""
    } else {
        tokens.pop().unwrap_or("")
    };

    let mut cur = root;
    for token in tokens {
        let base = tree.node(cur).redirect().unwrap_or(cur);
        match match_child(tree, base, token, ctx) {
            Some(step) => cur = step.node,
            None => return Vec::new(),
        }
    }

    let base = tree.node(cur).redirect().unwrap_or(cur);
    let mut out = Vec::new();
    for entry in tree.node(base).children() {
        if !tree.can_use(entry.node, ctx) {
            continue;
        }
        match tree.node(entry.node).kind() {
            NodeKind::Literal => {
                if entry.key.starts_with(prefix) {
                    out.push(entry.key.to_string());
                }
            }
            NodeKind::Argument {
                suggestions: Some(source),
                ..
            } => out.extend(source.suggest(ctx, prefix)),
            _ => {}
        }
    }
    out.sort();
    out.dedup();
    out
}

struct Step {
    key: NodeName,
    node: NodeId,
    /// Parsed value when an argument matched.
    value: Option<String>,
}

/// Match one token against a parent's children: literals by exact key
/// first, then arguments in insertion order. Requirement-gated children
/// the context fails are invisible.
fn match_child<C>(tree: &CommandTree<C>, parent: NodeId, token: &str, ctx: &C) -> Option<Step> {
    let children = tree.node(parent).children();
    for entry in children {
        if tree.node(entry.node).is_literal()
            && entry.key == token
            && tree.can_use(entry.node, ctx)
        {
            return Some(Step {
                key: entry.key.clone(),
                node: entry.node,
                value: None,
            });
        }
    }
    for entry in children {
        if let NodeKind::Argument { parser, .. } = tree.node(entry.node).kind() {
            if !tree.can_use(entry.node, ctx) {
                continue;
            }
            if let Some(value) = parser.parse(token) {
                return Some(Step {
                    key: entry.key.clone(),
                    node: entry.node,
                    value: Some(value),
                });
            }
        }
    }
    None
}

fn join(path: &[NodeName]) -> String {
    path.iter()
        .map(NodeName::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
