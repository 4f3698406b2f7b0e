//! Control-flow graph of a single procedure.
//!
//! Blocks and edges live in two arenas addressed by [`BlockId`] and [`EdgeId`].
//! Slots are never reused, so a handle to a removed block stays invalid forever
//! and looking it up panics instead of silently aliasing a newer block.

mod block;
mod build;
mod check;
mod cleanup;
mod edge;
mod edit;
mod order;
mod phi;

use std::fmt;

use static_assertions::assert_impl_all;

pub use block::{BasicBlock, BlockKind};
pub use edge::{Direction, Edge};
pub use edit::{Editor, Replacement};
pub use phi::{Phi, PhiNodes};

use crate::def_use::DefUseWeb;
use crate::dominance::Dominance;
use crate::error::CfgError;
use crate::name_scope::NameScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

assert_impl_all!(BlockId: Copy, Ord, std::hash::Hash, Send, Sync);
assert_impl_all!(EdgeId: Copy, Ord, std::hash::Hash, Send, Sync);
assert_impl_all!(Cfg: Send);

pub struct Cfg {
    name: String,
    blocks: Vec<Option<BasicBlock>>,
    edges: Vec<Option<Edge>>,
    entry: BlockId,
    exit: BlockId,
    pub(crate) dominance: Option<Dominance>,
    pub(crate) def_use: Option<DefUseWeb>,
    /// Source of temporaries; survives conversions so names never clash.
    pub(crate) scope: NameScope,
}

impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Cfg {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }

    pub fn exit(&self) -> BlockId {
        self.exit
    }

    /// The single edge leaving the entry block.
    pub fn entry_edge(&self) -> EdgeId {
        self.successor_edge(self.entry)
    }

    pub fn try_block(&self, id: BlockId) -> Result<&BasicBlock, CfgError> {
        self.blocks
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(CfgError::StaleBlock(id))
    }

    pub fn try_edge(&self, id: EdgeId) -> Result<&Edge, CfgError> {
        self.edges
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(CfgError::StaleEdge(id))
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        match self.try_block(id) {
            Ok(b) => b,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        match self.try_edge(id) {
            Ok(e) => e,
            Err(e) => panic!("{}", e),
        }
    }

    /**
     * Mutable access to a block's statement or branch.
     * Invalidates the def-use web; the graph structure cannot be changed through it.
     */
    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        self.def_use = None;
        self.block_mut_raw(id)
    }

    pub fn is_live(&self, id: BlockId) -> bool {
        self.try_block(id).is_ok()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.blocks.iter().filter_map(Option::as_ref)
    }

    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks().map(|b| b.id).collect()
    }

    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter_map(Option::as_ref)
    }

    pub fn successor_edges(&self, id: BlockId) -> Vec<EdgeId> {
        self.block(id).succs.clone()
    }

    pub fn predecessor_edges(&self, id: BlockId) -> Vec<EdgeId> {
        self.block(id).preds.clone()
    }

    pub fn successors(&self, id: BlockId) -> Vec<BlockId> {
        self.block(id)
            .succs
            .iter()
            .map(|e| self.edge(*e).target)
            .collect()
    }

    pub fn predecessors(&self, id: BlockId) -> Vec<BlockId> {
        self.block(id)
            .preds
            .iter()
            .map(|e| self.edge(*e).source)
            .collect()
    }

    /// The only outgoing edge of a non-branch block.
    pub fn successor_edge(&self, id: BlockId) -> EdgeId {
        let succs = &self.block(id).succs;
        assert_eq!(succs.len(), 1, "{} does not have a single successor", id);
        succs[0]
    }

    pub fn successor(&self, id: BlockId) -> BlockId {
        self.edge(self.successor_edge(id)).target
    }

    pub fn true_successor(&self, id: BlockId) -> BlockId {
        self.edge(self.directed_edge(id, Direction::True)).target
    }

    pub fn false_successor(&self, id: BlockId) -> BlockId {
        self.edge(self.directed_edge(id, Direction::False)).target
    }

    fn directed_edge(&self, id: BlockId, direction: Direction) -> EdgeId {
        let block = self.block(id);
        assert!(block.kind.is_branch(), "{} is not a branch block", id);
        block
            .succs
            .iter()
            .copied()
            .find(|e| self.edge(*e).direction == direction)
            .unwrap_or_else(|| panic!("branch {} has no {:?} edge", id, direction))
    }

    /// First edge from `from` to `to`, if any.
    pub fn find_edge(&self, from: BlockId, to: BlockId) -> Option<EdgeId> {
        self.block(from)
            .succs
            .iter()
            .copied()
            .find(|e| self.edge(*e).target == to)
    }

    pub fn get_edge(&self, from: BlockId, to: BlockId) -> EdgeId {
        self.find_edge(from, to)
            .unwrap_or_else(|| panic!("no edge from {} to {}", from, to))
    }

    /// Whether a conditional edge is the true outcome of its branch.
    pub fn is_true_edge(&self, id: EdgeId) -> bool {
        match self.edge(id).direction {
            Direction::True => true,
            Direction::False => false,
            Direction::Unconditional => panic!("{} is not a conditional edge", id),
        }
    }

    pub(crate) fn block_mut_raw(&mut self, id: BlockId) -> &mut BasicBlock {
        match self.blocks.get_mut(id.0).and_then(Option::as_mut) {
            Some(b) => b,
            None => panic!("{}", CfgError::StaleBlock(id)),
        }
    }

    pub(crate) fn edge_mut_raw(&mut self, id: EdgeId) -> &mut Edge {
        match self.edges.get_mut(id.0).and_then(Option::as_mut) {
            Some(e) => e,
            None => panic!("{}", CfgError::StaleEdge(id)),
        }
    }

    /// Drop all derived data after a structural change.
    pub(crate) fn invalidate(&mut self) {
        self.dominance = None;
        self.def_use = None;
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "bb{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for Cfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        writeln!(f, "cfg {}:", self.name)?;
        for block in self.blocks() {
            writeln!(f, "{}", block)?;
            for e in &block.succs {
                let edge = self.edge(*e);
                writeln!(f, "    {} -> {}{}", e, edge.target, edge.direction)?;
            }
        }
        Ok(())
    }
}
