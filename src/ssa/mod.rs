//! Conversion into and out of static single assignment form.
//!
//! Phi nodes are placed on iterated dominance frontiers, then variables are renamed
//! along the dominator tree. Leaving SSA form turns every phi into copies on the
//! incoming edges.

mod destroy;
mod rename;

use std::collections::{BTreeSet, VecDeque};

use crate::cfg::{BlockId, Cfg};
use crate::def_use::DefUseWeb;
use crate::mir::VariableName;

impl Cfg {
    /**
     * Rewrite the graph into SSA form.
     *
     * Blocks Entry cannot reach are removed first. Every variable occurrence gets a
     * version afterwards; a read with no reaching definition gets version 0.
     */
    pub fn convert_to_ssa_form(&mut self) {
        if self.remove_unreachable_raw() > 0 {
            self.invalidate();
            self.assert_consistent();
        }
        self.compute_dominance();
        let web = DefUseWeb::build(self);
        let added = self.insert_phi_nodes(&web);
        log::debug!("inserted {} phi nodes into {}", added, self.name());

        self.rename_variables();
        if let Err(e) = self.check_in_ssa() {
            panic!("{} is not in SSA form after renaming: {}\n{}", self.name(), e, self);
        }
        self.assert_consistent();
        self.rebuild_ssa_form();
    }

    /// Recompute the def-use web of a graph in SSA form.
    pub fn rebuild_ssa_form(&mut self) {
        self.def_use = None;
        self.def_use();
    }

    /// Place phi nodes for every variable on the iterated dominance frontier of its
    /// definitions. Returns the number of phi nodes added.
    fn insert_phi_nodes(&mut self, web: &DefUseWeb) -> usize {
        let mut added = 0;
        let mut worklist: VecDeque<BlockId> = self.blocks_top_down().into();
        while let Some(x) = worklist.pop_front() {
            let mut defined: BTreeSet<String> =
                web.get_block_defs(x).map(str::to_string).collect();
            defined.extend(self.block(x).phis().iter().map(|phi| phi.lhs.name.clone()));

            let frontier: Vec<BlockId> = self.dominance_frontier(x).iter().copied().collect();
            for y in frontier {
                let mut changed = false;
                for var in &defined {
                    let var = VariableName::new(var);
                    if self.block_mut_raw(y).phis.add_phi_function(&var) {
                        log::trace!("phi for {} in {}", var, y);
                        changed = true;
                        added += 1;
                    }
                }
                if changed {
                    worklist.push_back(y);
                }
            }
        }
        added
    }
}
