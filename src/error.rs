use thiserror::Error;

use crate::cfg::{BlockId, EdgeId};
use crate::mir::VariableName;

/// A violated structural or SSA invariant of a control-flow graph.
///
/// None of these are user errors: a graph in this state cannot be optimized further,
/// so the public graph operations panic with the error once a check fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CfgError {
    #[error("stale block handle {0}")]
    StaleBlock(BlockId),

    #[error("stale edge handle {0}")]
    StaleEdge(EdgeId),

    #[error("block in slot {slot} records id {recorded}")]
    IdMismatch { slot: usize, recorded: BlockId },

    #[error("edge {edge} is listed by {block} but does not connect to it")]
    DanglingEdge { edge: EdgeId, block: BlockId },

    #[error("edge {0} is not listed exactly once by both its endpoints")]
    UnlistedEdge(EdgeId),

    #[error("{0} is not the {1} block")]
    WrongTerminal(BlockId, &'static str),

    #[error("entry block {0} has predecessors")]
    EntryHasPredecessors(BlockId),

    #[error("exit block {0} has successors")]
    ExitHasSuccessors(BlockId),

    #[error("branch block {0} needs exactly one true and one false successor edge")]
    MalformedBranch(BlockId),

    #[error("block {block} has {count} successor edges, expected one unconditional edge")]
    BadOutDegree { block: BlockId, count: usize },

    #[error("block {0} has no predecessors")]
    NoPredecessors(BlockId),

    #[error("phi for {var} in {block} has an argument for edge {edge}, which does not enter it")]
    DanglingPhiArg {
        block: BlockId,
        var: String,
        edge: EdgeId,
    },

    #[error("variable {var} in {block} carries no SSA version")]
    MissingVersion { block: BlockId, var: VariableName },
}
