use std::collections::{BTreeSet, HashMap};

use crate::cfg::{BlockId, BlockKind, Cfg};
use crate::mir::{Goto, Label, LabelName, Statement};
use crate::name_scope::NameScope;

impl Cfg {
    /**
     * Turn the graph back into a list of statements.
     *
     * Blocks are laid out in depth-first order from Entry, every block gets a label and
     * an explicit jump. Jumps to the next statement and labels nobody jumps to are
     * removed afterwards. Phi nodes are not emitted, so leave SSA form first.
     */
    pub fn linearize(&self) -> Vec<Statement> {
        let mut scope = NameScope::new();
        let labels: HashMap<BlockId, LabelName> = self
            .block_ids()
            .into_iter()
            .map(|b| (b, scope.alloc_label()))
            .collect();
        if self.blocks().any(|b| !b.phis().is_empty()) {
            log::warn!("linearizing {} with phi nodes, they are dropped", self.name());
        }

        let mut result = Vec::new();
        let mut visited = BTreeSet::new();
        let mut roots = vec![self.entry()];
        roots.extend(self.block_ids());
        for root in roots {
            let mut stack = vec![root];
            while let Some(b) = stack.pop() {
                if !visited.insert(b) {
                    continue;
                }
                self.emit_block(b, &labels, &mut result);
                for s in self.successors(b).into_iter().rev() {
                    if !visited.contains(&s) {
                        stack.push(s);
                    }
                }
            }
        }
        result.push(label(&labels[&self.exit()]));

        let result = remove_fallthrough_gotos(result);
        remove_unused_labels(result)
    }

    fn emit_block(
        &self,
        b: BlockId,
        labels: &HashMap<BlockId, LabelName>,
        result: &mut Vec<Statement>,
    ) {
        let block = self.block(b);
        match block.kind() {
            // placed last, so that nothing falls through into it
            BlockKind::Exit => return,
            BlockKind::Branch(branch) => {
                result.push(label(&labels[&b]));
                let mut branch = branch.clone();
                branch.iftrue = labels[&self.true_successor(b)].clone();
                branch.iffalse = labels[&self.false_successor(b)].clone();
                result.push(Statement::Branch(branch));
                return;
            }
            BlockKind::Statement(s) => {
                result.push(label(&labels[&b]));
                result.push(s.clone());
            }
            BlockKind::Entry | BlockKind::Empty => result.push(label(&labels[&b])),
        }
        result.push(Statement::Goto(Goto {
            label: labels[&self.successor(b)].clone(),
        }));
    }
}

fn label(name: &LabelName) -> Statement {
    Statement::Label(Label { name: name.clone() })
}

/// Drop every `goto L;` directly followed by `L:`.
fn remove_fallthrough_gotos(statements: Vec<Statement>) -> Vec<Statement> {
    let mut result: Vec<Statement> = Vec::with_capacity(statements.len());
    let mut iter = statements.into_iter().peekable();
    while let Some(s) = iter.next() {
        if let (Statement::Goto(g), Some(Statement::Label(l))) = (&s, iter.peek()) {
            if g.label == l.name {
                continue;
            }
        }
        result.push(s);
    }
    result
}

/// Drop labels mentioned only by their own declaration.
fn remove_unused_labels(statements: Vec<Statement>) -> Vec<Statement> {
    let mut counts: HashMap<LabelName, usize> = HashMap::new();
    for s in &statements {
        if let Statement::Label(l) = s {
            *counts.entry(l.name.clone()).or_default() += 1;
        }
        for l in s.label_refs() {
            *counts.entry(l.clone()).or_default() += 1;
        }
    }
    statements
        .into_iter()
        .filter(|s| match s {
            Statement::Label(l) => counts[&l.name] != 1,
            _ => true,
        })
        .collect()
}
