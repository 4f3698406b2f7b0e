use std::collections::BTreeSet;

use super::{BlockId, BlockKind, Cfg, Direction};

impl Cfg {
    /**
     * Remove dead and empty blocks until nothing changes.
     *
     * Unreachable blocks go first. Then every phi-free block that is empty, has no
     * predecessors or has no successors is dropped, routing its predecessors to its
     * successor. A block that jumps to itself is kept.
     * Returns the number of removed blocks.
     */
    pub fn tidy(&mut self) -> usize {
        let mut removed = self.remove_unreachable_raw();
        loop {
            let mut changed = false;
            for b in self.block_ids() {
                if self.is_live(b) && self.is_removable(b) {
                    self.remove_rerouting_raw(b);
                    removed += 1;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        if removed > 0 {
            log::debug!("tidy removed {} blocks from {}", removed, self.name);
        }
        self.invalidate();
        self.assert_connected();
        removed
    }

    /**
     * Resolve a branch with a known outcome.
     * The block becomes empty and keeps only the edge taken, then the graph is tidied.
     */
    pub fn fold_branch(&mut self, block: BlockId, outcome: bool) {
        let (taken, dropped) = if outcome {
            (Direction::True, Direction::False)
        } else {
            (Direction::False, Direction::True)
        };
        let keep = self.directed_edge(block, taken);
        let drop = self.directed_edge(block, dropped);
        let orphaned = self.edge(drop).target;
        log::trace!("folding {} to its {:?} edge", block, taken);

        self.remove_edge_raw(drop);
        self.edge_mut_raw(keep).direction = Direction::Unconditional;
        self.block_mut_raw(block).kind = BlockKind::Empty;
        self.fix_solo_phi_args_raw(orphaned);
        self.tidy();
    }

    /// A block whose only successor is itself, like `L: goto L;`.
    pub fn is_self_loop(&self, block: BlockId) -> bool {
        let b = self.block(block);
        b.succs.len() == 1 && self.edge(b.succs[0]).target == block
    }

    fn is_removable(&self, id: BlockId) -> bool {
        let b = self.block(id);
        if b.kind.is_terminal() || !b.phis.is_empty() || self.is_self_loop(id) {
            return false;
        }
        let dead = b.preds.is_empty() || b.succs.is_empty();
        if b.kind.is_branch() {
            assert!(!dead, "branch block {} lost its edges", id);
            return false;
        }
        dead || b.kind == BlockKind::Empty
    }

    /// Delete every block Entry cannot reach. Exit is kept even when it is unreachable.
    pub(crate) fn remove_unreachable_raw(&mut self) -> usize {
        let reachable = self.reachable_from_entry();
        let dead: Vec<BlockId> = self
            .blocks()
            .filter(|b| !b.kind.is_terminal() && !reachable.contains(&b.id))
            .map(|b| b.id)
            .collect();

        let mut touched = BTreeSet::new();
        for b in &dead {
            for s in self.successors(*b) {
                touched.insert(s);
            }
        }
        for b in &dead {
            log::trace!("removing unreachable {}", b);
            self.remove_block_raw(*b);
        }
        for b in touched {
            if self.is_live(b) {
                self.fix_solo_phi_args_raw(b);
            }
        }
        dead.len()
    }

    pub(crate) fn reachable_from_entry(&self) -> BTreeSet<BlockId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![self.entry];
        while let Some(b) = stack.pop() {
            if seen.insert(b) {
                stack.extend(self.successors(b));
            }
        }
        seen
    }
}
