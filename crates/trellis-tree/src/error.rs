//! Error types for tree construction, mutation, and dispatch.

/// Errors raised by tree construction and mutation.
///
/// Contract violations are reported as errors rather than panics so that
/// embedders can surface them to command authors: bad names, duplicate
/// root keys, aliasing an alias, and kind collisions under the strict
/// merge policy.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("invalid node name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("root commands must be literals, {name:?} is an argument")]
    RootNotLiteral { name: String },

    #[error("root key {key:?} is already linked")]
    DuplicateRootKey { key: String },

    #[error("{name:?} is an alias and cannot be aliased again")]
    AliasOfAlias { name: String },

    #[error("the root node cannot be aliased")]
    AliasOfRoot,

    #[error("the root node cannot be attached as a child")]
    RootAsChild,

    #[error("node {name:?} is not a root")]
    NotARoot { name: String },

    #[error("{name:?} is already linked as {existing} and cannot merge with {incoming}")]
    KindConflict {
        name: String,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Errors raised while routing an input line through a tree.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown command {token:?}")]
    UnknownCommand { token: String },

    #[error("no match for {token:?} after \"{path}\"")]
    Unmatched { token: String, path: String },

    #[error("\"{path}\" is not runnable on its own")]
    NoHandler { path: String },

    #[error("command \"{path}\" failed")]
    HandlerFailed {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}
