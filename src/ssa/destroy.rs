use crate::cfg::{BlockKind, Cfg};
use crate::graph::ObjectGraph;
use crate::mir::{Statement, VariableName};
use crate::name_scope::NameScope;

impl Cfg {
    /**
     * Replace phi nodes with copies.
     *
     * The copies of every incoming edge are spliced onto that edge as a chain of
     * statement blocks, so critical edges are split along the way.
     */
    pub fn convert_out_of_ssa_form(&mut self) {
        let mut copy_count = 0;
        for b in self.block_ids() {
            if self.block(b).phis().is_empty() {
                continue;
            }
            let phis = self.block_mut_raw(b).phis.take();
            for edge in self.predecessor_edges(b) {
                let copies: Vec<(VariableName, VariableName)> = phis
                    .iter()
                    .map(|phi| match phi.arg(edge) {
                        Some(arg) => (phi.lhs.clone(), arg.clone()),
                        None => panic!("phi {} in {} has no argument for {}", phi, b, edge),
                    })
                    .collect();
                let mut tail = edge;
                for (dst, src) in sequentialize_copies(copies, &mut self.scope) {
                    log::trace!("copy on {}: {} = {}", edge, dst, src);
                    let copy = BlockKind::Statement(Statement::copy(dst, src));
                    let (_, out) = self.splice_raw(tail, copy);
                    tail = out;
                    copy_count += 1;
                }
            }
        }
        log::debug!(
            "{} left SSA form with {} copies",
            self.name(),
            copy_count
        );
        self.invalidate();
        self.assert_consistent();
    }
}

/**
 * Order parallel copies `dst := src` so that no copy overwrites a variable
 * another copy still has to read. Cycles are broken through a fresh temporary.
 */
pub(crate) fn sequentialize_copies(
    copies: Vec<(VariableName, VariableName)>,
    scope: &mut NameScope,
) -> Vec<(VariableName, VariableName)> {
    let mut g = ObjectGraph::new();
    for (dst, src) in &copies {
        if dst != src {
            g.add_edge(dst, src);
        }
    }
    // Every destination is written once, so each node has at most one outgoing edge
    // and a cycle has no edges leading out of it.
    let scc = g.find_strongly_connected();
    let order = match scc.inverse_topsort() {
        Ok(order) => order,
        Err(_) => panic!("components of a copy graph cannot form a cycle"),
    };

    let source_of = |var: &VariableName| -> Option<VariableName> {
        let idx = g.get_node_index(var)?;
        let src = g.get_edges_from_index(idx).next()?;
        g.get_object(src).cloned()
    };

    let mut result = Vec::new();
    for group in order.iter().rev() {
        if let [dst] = group.as_slice() {
            // the end of a chain has no source
            if let Some(src) = source_of(dst) {
                result.push((dst.clone(), src));
            }
            continue;
        }
        let tmp = scope.alloc_temp();
        let first = group[0].clone();
        result.push((tmp.clone(), first.clone()));
        let mut dst = first.clone();
        for _ in 0..(group.len() - 1) {
            let src = match source_of(&dst) {
                Some(src) => src,
                None => panic!("{} is on a copy cycle without a source", dst),
            };
            result.push((dst, src.clone()));
            dst = src;
        }
        result.push((dst, tmp));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name_scope::TEMP_NAME;

    fn v(name: &str, version: u32) -> VariableName {
        VariableName::with_version(name, version)
    }

    fn index_of(copies: &[(VariableName, VariableName)], dst: &VariableName) -> usize {
        copies.iter().position(|(d, _)| d == dst).unwrap()
    }

    #[test]
    fn test_chain_reads_before_writes() {
        let copies = vec![
            (v("a", 1), v("b", 1)),
            (v("b", 1), v("c", 1)),
            (v("c", 1), v("d", 1)),
        ];
        let seq = sequentialize_copies(copies, &mut NameScope::new());
        assert_eq!(seq.len(), 3);
        assert!(index_of(&seq, &v("a", 1)) < index_of(&seq, &v("b", 1)));
        assert!(index_of(&seq, &v("b", 1)) < index_of(&seq, &v("c", 1)));
    }

    #[test]
    fn test_self_copies_dropped() {
        let copies = vec![(v("a", 1), v("a", 1)), (v("b", 2), v("c", 0))];
        let seq = sequentialize_copies(copies, &mut NameScope::new());
        assert_eq!(seq, vec![(v("b", 2), v("c", 0))]);
    }

    #[test]
    fn test_swap() {
        let copies = vec![(v("a", 1), v("b", 1)), (v("b", 1), v("a", 1))];
        let seq = sequentialize_copies(copies, &mut NameScope::new());
        assert_eq!(seq.len(), 3);
        let tmp = v(TEMP_NAME, 1);
        assert_eq!(seq[0].0, tmp);
        assert_eq!(seq[2].1, tmp);

        // Run the copies and check that the values were swapped.
        let mut values = std::collections::HashMap::new();
        values.insert(v("a", 1), 1);
        values.insert(v("b", 1), 2);
        for (dst, src) in &seq {
            let x = values[src];
            values.insert(dst.clone(), x);
        }
        assert_eq!(values[&v("a", 1)], 2);
        assert_eq!(values[&v("b", 1)], 1);
    }

    #[test]
    fn test_cycle_with_reader() {
        // x reads a value of the cycle before the cycle rotates
        let copies = vec![
            (v("a", 1), v("b", 1)),
            (v("b", 1), v("c", 1)),
            (v("c", 1), v("a", 1)),
            (v("x", 1), v("a", 1)),
        ];
        let seq = sequentialize_copies(copies, &mut NameScope::new());
        assert_eq!(seq.len(), 5);
        let mut values = std::collections::HashMap::new();
        values.insert(v("a", 1), 1);
        values.insert(v("b", 1), 2);
        values.insert(v("c", 1), 3);
        values.insert(v("x", 1), 0);
        for (dst, src) in &seq {
            let x = values[src];
            values.insert(dst.clone(), x);
        }
        assert_eq!(values[&v("a", 1)], 2);
        assert_eq!(values[&v("b", 1)], 3);
        assert_eq!(values[&v("c", 1)], 1);
        assert_eq!(values[&v("x", 1)], 1);
    }
}
