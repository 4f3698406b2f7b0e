use std::fmt::Formatter;

use super::{BlockId, EdgeId};

/// Which outcome of a branch an edge stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    True,
    False,
    Unconditional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) source: BlockId,
    pub(crate) target: BlockId,
    pub(crate) direction: Direction,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> BlockId {
        self.source
    }

    pub fn target(&self) -> BlockId {
        self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Direction::True => f.write_str(" [T]"),
            Direction::False => f.write_str(" [F]"),
            Direction::Unconditional => Ok(()),
        }
    }
}
