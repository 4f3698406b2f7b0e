use crate::error::CfgError;
use crate::mir::VariableName;

use super::{BlockKind, Cfg, Direction};

impl Cfg {
    /**
     * Verify the structural invariants of the graph:
     * handles match their slots, adjacency lists agree with the edge arena,
     * the terminal blocks are in place and every block has the out-degree its kind demands.
     */
    pub fn check_structure(&self) -> Result<(), CfgError> {
        for (slot, block) in self.blocks.iter().enumerate() {
            let block = match block {
                Some(b) => b,
                None => continue,
            };
            if block.id.0 != slot {
                return Err(CfgError::IdMismatch {
                    slot,
                    recorded: block.id,
                });
            }
            for e in &block.preds {
                let edge = self.try_edge(*e)?;
                if edge.target != block.id {
                    return Err(CfgError::DanglingEdge {
                        edge: *e,
                        block: block.id,
                    });
                }
            }
            for e in &block.succs {
                let edge = self.try_edge(*e)?;
                if edge.source != block.id {
                    return Err(CfgError::DanglingEdge {
                        edge: *e,
                        block: block.id,
                    });
                }
            }
            for phi in block.phis.iter() {
                for (e, _) in phi.args() {
                    if !block.preds.contains(&e) {
                        return Err(CfgError::DanglingPhiArg {
                            block: block.id,
                            var: phi.lhs.name.clone(),
                            edge: e,
                        });
                    }
                }
            }
        }

        for edge in self.edges() {
            let source = self.try_block(edge.source)?;
            let target = self.try_block(edge.target)?;
            let listed_out = source.succs.iter().filter(|e| **e == edge.id).count();
            let listed_in = target.preds.iter().filter(|e| **e == edge.id).count();
            if listed_out != 1 || listed_in != 1 {
                return Err(CfgError::UnlistedEdge(edge.id));
            }
        }

        let entry = self.try_block(self.entry)?;
        if entry.kind != BlockKind::Entry {
            return Err(CfgError::WrongTerminal(self.entry, "entry"));
        }
        if !entry.preds.is_empty() {
            return Err(CfgError::EntryHasPredecessors(self.entry));
        }
        let exit = self.try_block(self.exit)?;
        if exit.kind != BlockKind::Exit {
            return Err(CfgError::WrongTerminal(self.exit, "exit"));
        }
        if !exit.succs.is_empty() {
            return Err(CfgError::ExitHasSuccessors(self.exit));
        }

        for block in self.blocks() {
            let directions: Vec<Direction> = block
                .succs
                .iter()
                .map(|e| self.edge(*e).direction)
                .collect();
            match block.kind {
                BlockKind::Exit => (),
                BlockKind::Branch(_) => {
                    let shape_ok = directions.len() == 2
                        && directions.contains(&Direction::True)
                        && directions.contains(&Direction::False);
                    if !shape_ok {
                        return Err(CfgError::MalformedBranch(block.id));
                    }
                }
                _ => {
                    if directions != [Direction::Unconditional] {
                        return Err(CfgError::BadOutDegree {
                            block: block.id,
                            count: directions.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// [`Cfg::check_structure`], plus every block but Entry and Exit has a predecessor.
    pub fn check_connected(&self) -> Result<(), CfgError> {
        self.check_structure()?;
        for block in self.blocks() {
            if !block.kind.is_terminal() && block.preds.is_empty() {
                return Err(CfgError::NoPredecessors(block.id));
            }
        }
        Ok(())
    }

    /// Every variable occurrence, phi nodes included, carries an SSA version.
    pub fn check_in_ssa(&self) -> Result<(), CfgError> {
        for block in self.blocks() {
            let missing = |var: &VariableName| CfgError::MissingVersion {
                block: block.id,
                var: var.clone(),
            };
            for phi in block.phis.iter() {
                if !phi.lhs.in_ssa() {
                    return Err(missing(&phi.lhs));
                }
                if let Some((_, v)) = phi.args().find(|(_, v)| !v.in_ssa()) {
                    return Err(missing(v));
                }
            }
            let vars = match &block.kind {
                BlockKind::Statement(s) => {
                    let mut vars = s.defs();
                    vars.extend(s.uses());
                    vars
                }
                BlockKind::Branch(b) => vec![&b.cond],
                _ => Vec::new(),
            };
            if let Some(v) = vars.into_iter().find(|v| !v.in_ssa()) {
                return Err(missing(v));
            }
        }
        Ok(())
    }

    pub fn assert_consistent(&self) {
        if let Err(e) = self.check_structure() {
            panic!("inconsistent cfg {}: {}\n{}", self.name, e, self);
        }
    }

    pub fn assert_connected(&self) {
        if let Err(e) = self.check_connected() {
            panic!("inconsistent cfg {}: {}\n{}", self.name, e, self);
        }
    }
}
