use crate::graph::Graph;

use super::{BlockId, Cfg};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

impl Cfg {
    /**
     * All blocks, each one after its predecessors unless the predecessor is reached
     * through a back edge. Entry comes first.
     */
    pub fn blocks_top_down(&self) -> Vec<BlockId> {
        let forward = self.forward_graph();
        let mut order = match forward.inverse_topsort() {
            Ok(order) => order,
            Err(v) => panic!("bb{} is on a cycle of forward edges", v),
        };
        order.reverse();
        order
            .into_iter()
            .map(BlockId)
            .filter(|b| self.is_live(*b))
            .collect()
    }

    pub fn blocks_bottom_up(&self) -> Vec<BlockId> {
        let mut order = self.blocks_top_down();
        order.reverse();
        order
    }

    /**
     * The graph without its back edges, over block slots.
     *
     * Blocks Entry does not reach are searched afterwards in handle order; the roots of
     * those searches get an extra edge from Entry so it stays the only source.
     */
    fn forward_graph(&self) -> Graph {
        let mut g = Graph::with_nodes(self.blocks.len());
        let mut color = vec![Color::White; self.blocks.len()];
        let mut roots = vec![self.entry];
        roots.extend(self.block_ids().into_iter().filter(|b| *b != self.entry));

        for root in roots {
            if color[root.0] != Color::White {
                continue;
            }
            if root != self.entry {
                g.add_edge(self.entry.0, root.0);
            }
            color[root.0] = Color::Gray;
            let mut stack: Vec<(BlockId, usize)> = vec![(root, 0)];
            while let Some((b, next)) = stack.pop() {
                let succs = &self.block(b).succs;
                if next == succs.len() {
                    color[b.0] = Color::Black;
                    continue;
                }
                stack.push((b, next + 1));
                let s = self.edge(succs[next]).target;
                match color[s.0] {
                    // back edge
                    Color::Gray => (),
                    Color::Black => g.add_edge(b.0, s.0),
                    Color::White => {
                        g.add_edge(b.0, s.0);
                        color[s.0] = Color::Gray;
                        stack.push((s, 0));
                    }
                }
            }
        }
        g
    }
}
