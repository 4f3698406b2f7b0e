//! Dominator tree and dominance frontiers.
//!
//! Immediate dominators are found with the iterative algorithm of Cooper, Harvey and
//! Kennedy over reverse postorder. The results are stored in the blocks themselves and
//! stay valid until the next structural edit.

use std::collections::{BTreeMap, BTreeSet};

use crate::cfg::{BlockId, Cfg};

/// Derived dominance data that does not fit into a single block.
#[derive(Debug, Clone)]
pub struct Dominance {
    children: BTreeMap<BlockId, Vec<BlockId>>,
    /// Blocks reachable from Entry, in DFS postorder.
    postorder: Vec<BlockId>,
}

impl Dominance {
    pub fn postorder(&self) -> &[BlockId] {
        &self.postorder
    }
}

impl Cfg {
    pub fn compute_dominance(&mut self) {
        let postorder = self.postorder_from_entry();
        let mut rpo_index: BTreeMap<BlockId, usize> = BTreeMap::new();
        for (i, b) in postorder.iter().rev().enumerate() {
            rpo_index.insert(*b, i);
        }

        let mut idom: BTreeMap<BlockId, BlockId> = BTreeMap::new();
        idom.insert(self.entry(), self.entry());
        let mut changed = true;
        while changed {
            changed = false;
            for b in postorder.iter().rev().copied() {
                if b == self.entry() {
                    continue;
                }
                let mut new_idom: Option<BlockId> = None;
                for p in self.predecessors(b) {
                    if !idom.contains_key(&p) {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(other) => intersect(&idom, &rpo_index, p, other),
                    });
                }
                let new_idom = match new_idom {
                    Some(d) => d,
                    None => panic!("reachable block {} has no processed predecessor", b),
                };
                if idom.get(&b) != Some(&new_idom) {
                    idom.insert(b, new_idom);
                    changed = true;
                }
            }
        }

        for id in self.block_ids() {
            let block = self.block_mut_raw(id);
            block.idom = None;
            block.frontier.clear();
        }
        let mut children: BTreeMap<BlockId, Vec<BlockId>> = BTreeMap::new();
        for (b, d) in &idom {
            if b != d {
                self.block_mut_raw(*b).idom = Some(*d);
                children.entry(*d).or_default().push(*b);
            }
        }

        // Local frontiers.
        for x in postorder.iter().copied() {
            for y in self.successors(x) {
                if idom.get(&y) != Some(&x) {
                    self.block_mut_raw(x).frontier.insert(y);
                }
            }
        }
        // Frontiers of dominated children that X does not dominate either.
        // Postorder visits children before their dominators.
        let mut changed = true;
        while changed {
            changed = false;
            for x in postorder.iter().copied() {
                let mut inherited = BTreeSet::new();
                for c in children.get(&x).into_iter().flatten() {
                    for z in &self.block(*c).frontier {
                        if idom.get(z) != Some(&x) {
                            inherited.insert(*z);
                        }
                    }
                }
                let frontier = &mut self.block_mut_raw(x).frontier;
                let before = frontier.len();
                frontier.extend(inherited);
                changed |= frontier.len() != before;
            }
        }

        log::debug!(
            "computed dominance for {}: {} reachable blocks",
            self.name(),
            postorder.len()
        );
        self.dominance = Some(Dominance {
            children,
            postorder,
        });
    }

    /// Dominance data, computed on demand.
    pub fn dominance(&mut self) -> &Dominance {
        if self.dominance.is_none() {
            self.compute_dominance();
        }
        self.current_dominance()
    }

    pub fn immediate_dominator(&self, block: BlockId) -> Option<BlockId> {
        self.current_dominance();
        self.block(block).idom
    }

    pub fn dominance_frontier(&self, block: BlockId) -> &BTreeSet<BlockId> {
        self.current_dominance();
        &self.block(block).frontier
    }

    /// Children of a block in the dominator tree, in handle order.
    pub fn dominated_children(&self, block: BlockId) -> &[BlockId] {
        self.current_dominance()
            .children
            .get(&block)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether every path from Entry to `b` passes through `a`. A block dominates itself.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.current_dominance();
        let mut current = Some(b);
        while let Some(c) = current {
            if c == a {
                return true;
            }
            current = self.block(c).idom;
        }
        false
    }

    fn current_dominance(&self) -> &Dominance {
        match &self.dominance {
            Some(d) => d,
            None => panic!("dominance of {} is not computed or out of date", self.name()),
        }
    }

    fn postorder_from_entry(&self) -> Vec<BlockId> {
        let mut visited = BTreeSet::new();
        let mut postorder = Vec::new();
        let mut stack: Vec<(BlockId, usize)> = vec![(self.entry(), 0)];
        visited.insert(self.entry());
        while let Some((b, next)) = stack.pop() {
            let succs = self.successors(b);
            if next == succs.len() {
                postorder.push(b);
                continue;
            }
            stack.push((b, next + 1));
            let s = succs[next];
            if visited.insert(s) {
                stack.push((s, 0));
            }
        }
        postorder
    }
}

fn intersect(
    idom: &BTreeMap<BlockId, BlockId>,
    rpo_index: &BTreeMap<BlockId, usize>,
    mut a: BlockId,
    mut b: BlockId,
) -> BlockId {
    while a != b {
        while rpo_index[&a] > rpo_index[&b] {
            a = idom[&a];
        }
        while rpo_index[&b] > rpo_index[&a] {
            b = idom[&b];
        }
    }
    a
}
