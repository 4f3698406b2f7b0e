use crate::mir::{Statement, VariableName};

use super::{BlockId, BlockKind, Cfg, Direction, Edge, EdgeId, Phi, PhiNodes};

/// One element of a replacement chain for [`Cfg::replace`].
#[derive(Debug, Clone)]
pub enum Replacement {
    /// The block being replaced, moved to this position of the chain.
    Original,
    Block(BlockKind),
}

/**
 * A batch of unchecked structural edits.
 *
 * The graph may be inconsistent while the batch runs; [`Cfg::edit`] checks it once
 * the batch is over.
 */
pub struct Editor<'a> {
    cfg: &'a mut Cfg,
}

impl<'a> Editor<'a> {
    pub fn cfg(&self) -> &Cfg {
        &*self.cfg
    }

    pub fn add_block(&mut self, kind: BlockKind) -> BlockId {
        assert!(
            !kind.is_terminal(),
            "a graph has exactly one entry and one exit"
        );
        self.cfg.add_block_raw(kind)
    }

    pub fn add_edge(&mut self, source: BlockId, target: BlockId) -> EdgeId {
        self.cfg
            .add_edge_raw(source, target, Direction::Unconditional)
    }

    pub fn add_conditional_edges(
        &mut self,
        source: BlockId,
        iftrue: BlockId,
        iffalse: BlockId,
    ) -> (EdgeId, EdgeId) {
        assert!(
            self.cfg.block(source).kind.is_branch(),
            "conditional edges must leave a branch block, {} is not one",
            source
        );
        let t = self.cfg.add_edge_raw(source, iftrue, Direction::True);
        let f = self.cfg.add_edge_raw(source, iffalse, Direction::False);
        (t, f)
    }

    pub fn remove_edge(&mut self, edge: EdgeId) {
        self.cfg.remove_edge_raw(edge);
    }

    pub fn remove_block(&mut self, block: BlockId) {
        assert!(
            !self.cfg.block(block).kind.is_terminal(),
            "entry and exit blocks are never removed"
        );
        self.cfg.remove_block_raw(block);
    }

    pub fn add_phi(&mut self, block: BlockId, var: &VariableName) -> bool {
        self.cfg.block_mut_raw(block).phis.add_phi_function(var)
    }

    pub fn set_phi_arg(
        &mut self,
        block: BlockId,
        var: &VariableName,
        edge: EdgeId,
        value: VariableName,
    ) {
        let phis = &mut self.cfg.block_mut_raw(block).phis;
        match phis.get_mut(&var.name) {
            Some(phi) => phi.set_arg(edge, value),
            None => panic!("{} has no phi for {}", block, var),
        }
    }
}

impl Cfg {
    /// Run a batch of edits, then check the graph once.
    pub fn edit<R, F: FnOnce(&mut Editor<'_>) -> R>(&mut self, f: F) -> R {
        let result = f(&mut Editor { cfg: self });
        self.invalidate();
        self.assert_consistent();
        result
    }

    /**
     * Split the edge from `source` to `target` with a new block.
     * The first half keeps the edge's direction, the second is unconditional.
     */
    pub fn insert_between(&mut self, source: BlockId, target: BlockId, kind: BlockKind) -> BlockId {
        let edge = self.get_edge(source, target);
        self.insert_on_edge(edge, kind)
    }

    /// Like [`Cfg::insert_between`], for one specific edge of a multigraph.
    pub fn insert_on_edge(&mut self, edge: EdgeId, kind: BlockKind) -> BlockId {
        let (block, _) = self.splice_raw(edge, kind);
        self.invalidate();
        self.assert_consistent();
        block
    }

    /**
     * Replace a block with a chain of blocks.
     *
     * An empty chain removes the block, routing its predecessors to its successor.
     * `[Replacement::Original]` leaves the graph as it is. Otherwise the first block of
     * the chain takes over the handle, incoming edges and phi nodes of `block`, the rest
     * follow it linearly and the last one flows into the old successor.
     * Returns the handles of the chain.
     */
    pub fn replace(&mut self, block: BlockId, replacements: Vec<Replacement>) -> Vec<BlockId> {
        if let [Replacement::Original] = replacements.as_slice() {
            return vec![block];
        }
        let chain = if replacements.is_empty() {
            self.remove_rerouting_raw(block);
            Vec::new()
        } else {
            self.replace_with_chain_raw(block, replacements)
        };
        self.invalidate();
        self.assert_consistent();
        chain
    }

    pub fn remove_phi_nodes(&mut self, block: BlockId) {
        self.block_mut_raw(block).phis = PhiNodes::new();
        self.invalidate();
    }

    /// Simplify the phi nodes of a block with a single predecessor into copies.
    pub fn fix_solo_phi_args(&mut self, block: BlockId) {
        self.fix_solo_phi_args_raw(block);
        self.invalidate();
        self.assert_consistent();
    }

    fn replace_with_chain_raw(&mut self, block: BlockId, replacements: Vec<Replacement>) -> Vec<BlockId> {
        let old = self.block(block);
        match old.kind {
            BlockKind::Entry | BlockKind::Exit | BlockKind::Branch(_) => {
                panic!("cannot replace {} block {} with a chain", old.kind.name(), block)
            }
            _ => (),
        }
        let succ_edge = self.successor_edge(block);
        let succ = self.edge(succ_edge).target;

        let mut original = Some(std::mem::replace(
            &mut self.block_mut_raw(block).kind,
            BlockKind::Empty,
        ));
        let mut kinds = Vec::with_capacity(replacements.len());
        for r in replacements {
            let kind = match r {
                Replacement::Original => original
                    .take()
                    .unwrap_or_else(|| panic!("{} appears twice in its replacement", block)),
                Replacement::Block(kind) => kind,
            };
            match kind {
                BlockKind::Branch(_) => panic!("a replacement chain cannot contain a branch"),
                BlockKind::Entry | BlockKind::Exit => {
                    panic!("a replacement chain cannot contain entry or exit blocks")
                }
                _ => kinds.push(kind),
            }
        }

        let mut kinds = kinds.into_iter();
        if let Some(front) = kinds.next() {
            self.block_mut_raw(block).kind = front;
        }
        let mut chain = vec![block];
        let mut prev = block;
        for kind in kinds {
            let b = self.add_block_raw(kind);
            self.add_edge_raw(prev, b, Direction::Unconditional);
            chain.push(b);
            prev = b;
        }
        if prev != block {
            let tail_edge = self.add_edge_raw(prev, succ, Direction::Unconditional);
            self.block_mut_raw(succ).phis.replace_edge(succ_edge, tail_edge);
            self.remove_edge_raw(succ_edge);
        }
        log::trace!("replaced {} with {:?}", block, chain);
        chain
    }

    /**
     * Remove a block, routing every predecessor to its single successor.
     *
     * Phi arguments of the successor along the removed edge are carried over to the new
     * edges. When such an argument is defined by a phi of the removed block, that phi's
     * argument for the matching predecessor is used instead. Phis moved over from the
     * removed block take their own lhs along the successor's other incoming edges.
     * A block without predecessors only loses its edge into the successor.
     * Either way the successor's phis are simplified if it is left with one
     * predecessor.
     */
    pub(crate) fn remove_rerouting_raw(&mut self, block: BlockId) {
        let old = self.block(block);
        match old.kind {
            BlockKind::Entry | BlockKind::Exit => panic!("{} cannot be removed", block),
            BlockKind::Branch(_) => panic!("branch block {} cannot be rerouted", block),
            _ => (),
        }
        if old.succs.is_empty() {
            log::trace!("removing dead end {}", block);
            self.remove_block_raw(block);
            return;
        }
        let succ_edge = self.successor_edge(block);
        let succ = self.edge(succ_edge).target;
        assert_ne!(succ, block, "{} is its own successor", block);

        let pred_edges = old.preds.clone();
        if pred_edges.is_empty() {
            log::trace!("removing orphan {}, successor {}", block, succ);
            self.remove_block_raw(block);
            self.fix_solo_phi_args_raw(succ);
            return;
        }
        let old_phis = self.block_mut_raw(block).phis.take();

        // Phis for variables the successor does not merge yet move over wholesale.
        let merged: Vec<String> = old_phis
            .iter()
            .filter(|phi| !self.block(succ).phis.has_phi_function(&phi.lhs))
            .map(|phi| phi.lhs.name.clone())
            .collect();
        for name in &merged {
            if let Some(phi) = old_phis.get(name) {
                self.block_mut_raw(succ)
                    .phis
                    .insert(Phi::new(phi.lhs.clone()));
            }
        }

        let mut rerouted = Vec::with_capacity(pred_edges.len());
        for pred_edge in pred_edges {
            let new_edge = self.reroute_raw(pred_edge, succ);
            rerouted.push(new_edge);
            for phi in self.block_mut_raw(succ).phis.iter_mut() {
                let from_block = old_phis.get(&phi.lhs.name);
                let value = if merged.contains(&phi.lhs.name) {
                    from_block.and_then(|p| p.arg(pred_edge)).cloned()
                } else {
                    match (phi.arg(succ_edge), from_block) {
                        (Some(arg), Some(p)) if p.lhs == *arg => {
                            Some(p.arg(pred_edge).unwrap_or(arg).clone())
                        }
                        (Some(arg), _) => Some(arg.clone()),
                        (None, _) => None,
                    }
                };
                if let Some(v) = value {
                    phi.set_arg(new_edge, v);
                }
            }
        }

        log::trace!("removing {}, successor {}", block, succ);
        // Strips the arguments along the removed edge from the successor.
        self.remove_block_raw(block);

        // Elsewhere a moved phi's variable reaches the successor under its own name.
        let others: Vec<EdgeId> = self
            .block(succ)
            .preds
            .iter()
            .copied()
            .filter(|e| !rerouted.contains(e))
            .collect();
        for phi in self.block_mut_raw(succ).phis.iter_mut() {
            if !merged.contains(&phi.lhs.name) {
                continue;
            }
            for &edge in &others {
                let lhs = phi.lhs.clone();
                phi.set_arg(edge, lhs);
            }
        }
        self.fix_solo_phi_args_raw(succ);
    }

    pub(crate) fn fix_solo_phi_args_raw(&mut self, block: BlockId) {
        let b = self.block(block);
        if b.preds.len() != 1 || b.phis.is_empty() {
            return;
        }
        let mut edge = b.preds[0];
        let phis = self.block_mut_raw(block).phis.take();
        for phi in phis.into_phis() {
            let arg = match phi.args.into_values().next() {
                Some(arg) => arg,
                None => continue,
            };
            if arg == phi.lhs {
                continue;
            }
            log::trace!("solo phi in {}: {} = {}", block, phi.lhs, arg);
            let copy = BlockKind::Statement(Statement::copy(phi.lhs, arg));
            let (_, out) = self.splice_raw(edge, copy);
            edge = out;
        }
    }

    pub(crate) fn add_edge_raw(&mut self, source: BlockId, target: BlockId, direction: Direction) -> EdgeId {
        let id = self.new_edge_raw(source, target, direction);
        self.block_mut_raw(source).succs.push(id);
        self.block_mut_raw(target).preds.push(id);
        id
    }

    /// Allocate an edge without listing it in its endpoints.
    fn new_edge_raw(&mut self, source: BlockId, target: BlockId, direction: Direction) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge {
            id,
            source,
            target,
            direction,
        }));
        id
    }

    /// Remove an edge along with the phi arguments that refer to it.
    pub(crate) fn remove_edge_raw(&mut self, id: EdgeId) {
        let edge = self.edge(id).clone();
        self.block_mut_raw(edge.source).succs.retain(|e| *e != id);
        let target = self.block_mut_raw(edge.target);
        target.preds.retain(|e| *e != id);
        target.phis.remove_arg_for_edge(id);
        self.edges[id.0] = None;
    }

    pub(crate) fn remove_block_raw(&mut self, id: BlockId) {
        let b = self.block(id);
        let incident: Vec<EdgeId> = b.preds.iter().chain(b.succs.iter()).copied().collect();
        for e in incident {
            // a self-loop is listed twice
            if self.try_edge(e).is_ok() {
                self.remove_edge_raw(e);
            }
        }
        self.blocks[id.0] = None;
    }

    /**
     * Point an edge at another target, keeping its source slot and direction.
     * The old edge handle becomes stale.
     */
    fn reroute_raw(&mut self, id: EdgeId, target: BlockId) -> EdgeId {
        let old = self.edge(id).clone();
        let new = self.new_edge_raw(old.source, target, old.direction);
        for e in self.block_mut_raw(old.source).succs.iter_mut() {
            if *e == id {
                *e = new;
            }
        }
        self.block_mut_raw(old.target).preds.retain(|e| *e != id);
        self.block_mut_raw(target).preds.push(new);
        self.edges[id.0] = None;
        new
    }

    /**
     * Split an edge with a new block of the given kind.
     * Returns the new block and the edge from it to the old target.
     */
    pub(crate) fn splice_raw(&mut self, id: EdgeId, kind: BlockKind) -> (BlockId, EdgeId) {
        assert!(
            !kind.is_branch() && !kind.is_terminal(),
            "only straight-line blocks can be spliced onto an edge"
        );
        let old = self.edge(id).clone();
        let block = self.add_block_raw(kind);

        let head = self.new_edge_raw(old.source, block, old.direction);
        for e in self.block_mut_raw(old.source).succs.iter_mut() {
            if *e == id {
                *e = head;
            }
        }
        self.block_mut_raw(block).preds.push(head);

        let tail = self.new_edge_raw(block, old.target, Direction::Unconditional);
        self.block_mut_raw(block).succs.push(tail);
        let target = self.block_mut_raw(old.target);
        for e in target.preds.iter_mut() {
            if *e == id {
                *e = tail;
            }
        }
        target.phis.replace_edge(id, tail);

        self.edges[id.0] = None;
        log::trace!("spliced {} onto {} -> {}", block, old.source, old.target);
        (block, tail)
    }
}
