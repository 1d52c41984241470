//! The parser passes over the token list.
//!
//! Order matters: refinements are substituted first, brackets are validated,
//! the top-down structurer carves the flat list along obvious delimiter
//! boundaries, and the bottom-up reducer (driving the tag resolver per scope)
//! folds the rest of the grammar.

pub mod brackets;
pub mod format;
pub mod reduce;
pub mod refinement;
pub mod structure;
pub mod tags;

use crate::syntax::{Location, NodeId};
use crate::{Context, FatalError};

/// Recursion guard shared by the structural passes.
pub(crate) const MAX_DEPTH: usize = 1000;

/// Structure and reduce a bracket-checked token list into a
/// `ParticularProgram` tree.
pub fn parse(context: &mut Context, tokens: NodeId) -> Result<NodeId, FatalError> {
    let root = structure::build(context, tokens)?;
    let standard = tags::standard_environment(context);
    reduce::program(context, root, standard)?;
    Ok(root)
}

/// Fold the inclusive run `first ..= last` under a new node, re-anchoring the
/// parent's child link when the run began the level.
pub(crate) fn fold_level(
    context: &mut Context,
    parent: NodeId,
    first: NodeId,
    last: NodeId,
    attribute: crate::syntax::Attribute,
) -> NodeId {
    let at_head = context.arena.prev(first).is_none();
    let folded = context.arena.fold(first, last, attribute);
    if at_head {
        context.arena.get_mut(parent).sub = Some(folded);
    }
    folded
}

pub(crate) fn error_at(context: &mut Context, at: Location, message: impl Into<String>) {
    let path = context.interner.resolve(at.path).to_string();
    context.diagnostics.error(&path, at.line, at.column, message);
}

pub(crate) fn warning_at(context: &mut Context, at: Location, message: impl Into<String>) {
    let path = context.interner.resolve(at.path).to_string();
    context.diagnostics.warning(&path, at.line, at.column, message);
}
