use std::collections::BTreeSet;
use std::fmt::Formatter;

use crate::mir::{Branch, Statement};

use super::{BlockId, EdgeId, PhiNodes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Entry,
    Exit,
    Statement(Statement),
    Branch(Branch),
    Empty,
}

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub(crate) id: BlockId,
    pub(crate) kind: BlockKind,
    pub(crate) phis: PhiNodes,
    pub(crate) frontier: BTreeSet<BlockId>,
    pub(crate) idom: Option<BlockId>,
    pub(crate) preds: Vec<EdgeId>,
    pub(crate) succs: Vec<EdgeId>,
}

impl BlockKind {
    pub fn is_branch(&self) -> bool {
        matches!(self, BlockKind::Branch(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BlockKind::Entry | BlockKind::Exit)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Entry => "entry",
            BlockKind::Exit => "exit",
            BlockKind::Statement(_) => "statement",
            BlockKind::Branch(_) => "branch",
            BlockKind::Empty => "empty",
        }
    }
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            phis: PhiNodes::new(),
            frontier: BTreeSet::new(),
            idom: None,
            preds: Vec::new(),
            succs: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn statement(&self) -> Option<&Statement> {
        match &self.kind {
            BlockKind::Statement(s) => Some(s),
            _ => None,
        }
    }

    pub fn statement_mut(&mut self) -> Option<&mut Statement> {
        match &mut self.kind {
            BlockKind::Statement(s) => Some(s),
            _ => None,
        }
    }

    pub fn branch(&self) -> Option<&Branch> {
        match &self.kind {
            BlockKind::Branch(b) => Some(b),
            _ => None,
        }
    }

    pub fn branch_mut(&mut self) -> Option<&mut Branch> {
        match &mut self.kind {
            BlockKind::Branch(b) => Some(b),
            _ => None,
        }
    }

    pub fn phis(&self) -> &PhiNodes {
        &self.phis
    }

    pub fn predecessor_edges(&self) -> &[EdgeId] {
        &self.preds
    }

    pub fn successor_edges(&self) -> &[EdgeId] {
        &self.succs
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            BlockKind::Entry => f.write_str("ENTRY"),
            BlockKind::Exit => f.write_str("EXIT"),
            BlockKind::Statement(s) => write!(f, "{}", s),
            BlockKind::Branch(b) => write!(f, "if ({})", b.cond),
            BlockKind::Empty => Ok(()),
        }
    }
}

impl std::fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{} ({}):", self.id, self.kind.name())?;
        for phi in self.phis.iter() {
            write!(f, "\n    {}", phi)?;
        }
        match &self.kind {
            BlockKind::Statement(_) | BlockKind::Branch(_) => write!(f, "\n    {}", self.kind),
            _ => Ok(()),
        }
    }
}
