use std::collections::HashMap;

use crate::mir::{LabelName, Procedure, Statement};
use crate::name_scope::NameScope;

use super::{BasicBlock, BlockId, BlockKind, Cfg, Direction};

/// How control leaves a freshly created block.
enum Flow {
    FallThrough,
    Goto(LabelName),
    Branch(LabelName, LabelName),
}

impl Cfg {
    /**
     * Build the graph of a procedure.
     *
     * Label and goto statements are consumed: they only survive as edges.
     * The result is not tidied, call [`Cfg::tidy`] to drop empty and dead blocks.
     */
    pub fn new(procedure: Procedure) -> Self {
        let mut cfg = Self::with_terminals(procedure.name);
        cfg.add_statements(procedure.statements);
        log::debug!(
            "built cfg for {}: {} blocks, {} edges",
            cfg.name,
            cfg.block_count(),
            cfg.edges().count()
        );
        cfg.assert_consistent();
        cfg
    }

    fn with_terminals(name: String) -> Self {
        let mut cfg = Self {
            name,
            blocks: Vec::new(),
            edges: Vec::new(),
            entry: BlockId(0),
            exit: BlockId(0),
            dominance: None,
            def_use: None,
            scope: NameScope::new(),
        };
        cfg.entry = cfg.add_block_raw(BlockKind::Entry);
        cfg.exit = cfg.add_block_raw(BlockKind::Exit);
        cfg
    }

    fn add_statements(&mut self, statements: Vec<Statement>) {
        // Block for each label, to resolve gotos and branches in the second pass.
        let mut labels: HashMap<LabelName, BlockId> = HashMap::new();
        let mut nodes: Vec<(BlockId, Flow)> = Vec::with_capacity(statements.len());

        for s in statements {
            let node = match s {
                Statement::Label(l) => {
                    let b = self.add_block_raw(BlockKind::Empty);
                    if labels.insert(l.name.clone(), b).is_some() {
                        panic!("label {} is declared twice in {}", l.name, self.name);
                    }
                    (b, Flow::FallThrough)
                }
                Statement::Goto(g) => (self.add_block_raw(BlockKind::Empty), Flow::Goto(g.label)),
                Statement::Branch(br) => {
                    let flow = Flow::Branch(br.iftrue.clone(), br.iffalse.clone());
                    (self.add_block_raw(BlockKind::Branch(br)), flow)
                }
                other => (
                    self.add_block_raw(BlockKind::Statement(other)),
                    Flow::FallThrough,
                ),
            };
            nodes.push(node);
        }

        let lookup = |label: &LabelName| -> BlockId {
            match labels.get(label) {
                Some(b) => *b,
                None => panic!("jump to undeclared label {}", label),
            }
        };

        // The block control falls out of, if any.
        let mut parent = Some(self.entry);
        for (b, flow) in nodes {
            if let Some(p) = parent {
                self.add_edge_raw(p, b, Direction::Unconditional);
            }
            match flow {
                Flow::FallThrough => parent = Some(b),
                Flow::Goto(label) => {
                    self.add_edge_raw(b, lookup(&label), Direction::Unconditional);
                    parent = None;
                }
                Flow::Branch(iftrue, iffalse) => {
                    self.add_edge_raw(b, lookup(&iftrue), Direction::True);
                    self.add_edge_raw(b, lookup(&iffalse), Direction::False);
                    parent = None;
                }
            }
        }
        if let Some(p) = parent {
            self.add_edge_raw(p, self.exit, Direction::Unconditional);
        }
    }

    pub(crate) fn add_block_raw(&mut self, kind: BlockKind) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Some(BasicBlock::new(id, kind)));
        id
    }
}
