//! Context translation for tree mapping.
//!
//! A [`TreeMapper`] says how source-context behavior crosses into the
//! target context: what happens to handlers, requirements, completions,
//! and parsers. [`BaseMapper`] is the neutral translation -- execution
//! intent survives as a no-op marker, context-bound callbacks are
//! dropped, parsers are shared.

use std::sync::Arc;

use trellis_tree::{Handler, Node, Requirement, Suggestions, ValueParser};

/// Behavior translation hooks, every one with a neutral default.
pub trait TreeMapper<S, T> {
    /// Handler for the mapped node. The default preserves *whether* the
    /// source runs something, not *what* it runs: a source with a handler
    /// maps to a no-op succeeding handler, a source without stays bare.
    fn map_handler(&self, source: &Node<S>) -> Option<Handler<T>> {
        source.handler().map(|_| noop_handler())
    }

    /// Requirement for the mapped node. Dropped by default -- a source
    /// check cannot be evaluated against the target context.
    fn map_requirement(&self, source: &Node<S>) -> Option<Requirement<T>> {
        let _ = source;
        None
    }

    /// Completion source for a mapped argument. Dropped by default.
    fn map_suggestions(&self, source: &Node<S>) -> Option<Suggestions<T>> {
        let _ = source;
        None
    }

    /// Parser for a mapped argument. Shared by default; substitute here
    /// when the target host wants a different value family.
    fn map_parser(&self, source: &Node<S>, parser: &Arc<dyn ValueParser>) -> Arc<dyn ValueParser> {
        let _ = source;
        Arc::clone(parser)
    }
}

/// The neutral mapper.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseMapper;

impl<S, T> TreeMapper<S, T> for BaseMapper {}

/// A handler that accepts and does nothing, exit code zero. What
/// [`BaseMapper`] puts on mapped nodes whose source is runnable.
pub fn noop_handler<T>() -> Handler<T> {
    Arc::new(|_ctx, _inv| Ok(0))
}
