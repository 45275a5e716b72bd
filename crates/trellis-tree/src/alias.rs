//! Alias creation.
//!
//! A named alias is a value copy of its primary under another name, kept
//! in lockstep from then on: every mutation of the primary, or of any
//! node below it, is re-applied to the alias subtree through mirror
//! registrations made when the copy is taken. Aliasing is flat --
//! aliasing an alias is refused, and an alias name must differ from the
//! primary's own.

use tracing::debug;

use crate::arena::{CommandTree, NodeId};
use crate::error::TreeError;
use crate::node::{validate_name, NodeName};

impl<C> CommandTree<C> {
    /// Create `name` as an alias of `primary`. The alias is a detached
    /// value copy of the primary's entire subtree; link it wherever the
    /// primary's callers should find it. Returns the alias node.
    pub fn alias(&mut self, primary: NodeId, name: &str) -> Result<NodeId, TreeError> {
        validate_name(name)?;
        self.check_alias_target(primary)?;
        if self.node(primary).name() == name {
            return Err(TreeError::InvalidName {
                name: name.to_string(),
                reason: "alias name equals the primary's",
            });
        }
        let copy = self.copy_mirror(primary);
        self.node_mut(copy).name = NodeName::new(name);
        self.node_mut(copy).alias_of = Some(primary);
        self.node_mut(primary).aliases.push(copy);
        debug!(primary = %self.node(primary).name(), alias = name, "alias created");
        Ok(copy)
    }

    /// Record an already-built node as an alias of `primary` without
    /// copying anything. The caller is responsible for the node already
    /// being a value twin of the primary -- merge folding and mapping
    /// machinery use this; everything else wants [`CommandTree::alias`].
    pub fn adopt_alias(&mut self, primary: NodeId, alias: NodeId) -> Result<(), TreeError> {
        if self.node(alias).is_root() {
            return Err(TreeError::AliasOfRoot);
        }
        self.check_alias_target(primary)?;
        if self.node(alias).name() == self.node(primary).name() {
            return Err(TreeError::InvalidName {
                name: self.node(alias).name().to_string(),
                reason: "alias name equals the primary's",
            });
        }
        self.node_mut(alias).alias_of = Some(primary);
        if !self.node(primary).aliases().contains(&alias) {
            self.node_mut(primary).aliases.push(alias);
        }
        Ok(())
    }

    fn check_alias_target(&self, primary: NodeId) -> Result<(), TreeError> {
        if self.node(primary).is_root() {
            return Err(TreeError::AliasOfRoot);
        }
        if self.node(primary).is_alias() {
            return Err(TreeError::AliasOfAlias {
                name: self.node(primary).name().to_string(),
            });
        }
        Ok(())
    }
}
