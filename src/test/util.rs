use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::Rng;

use crate::cfg::{BlockId, Cfg};
use crate::def_use::Site;
use crate::mir::{AssignVar, Expr, Literal, Procedure, Return, Rvalue, Statement, VariableName};

pub fn var(name: &str) -> VariableName {
    VariableName::new(name)
}

pub fn ssa_var(name: &str, version: u32) -> VariableName {
    VariableName::with_version(name, version)
}

/// `lhs = n;`
pub fn assign_int(lhs: &str, n: i64) -> Statement {
    Statement::AssignVar(AssignVar {
        lhs: var(lhs),
        is_ref: false,
        rhs: Expr::Lit(Literal::Int(n)),
    })
}

/// `lhs = left + right;`
pub fn assign_add(lhs: &str, left: &str, right: &str) -> Statement {
    Statement::AssignVar(AssignVar {
        lhs: var(lhs),
        is_ref: false,
        rhs: Expr::Bin {
            op: "+".to_string(),
            left: Rvalue::Var(var(left)),
            right: Rvalue::Var(var(right)),
        },
    })
}

pub fn ret(name: &str) -> Statement {
    Statement::Return(Return {
        value: Rvalue::Var(var(name)),
    })
}

pub fn procedure(statements: Vec<Statement>) -> Procedure {
    Procedure {
        name: "f".to_string(),
        statements,
    }
}

pub fn build(statements: Vec<Statement>) -> Cfg {
    Cfg::new(procedure(statements))
}

/**
 * Block of the n-th statement of a freshly built graph.
 * Entry and exit take the first two handles, statements follow in order.
 */
pub fn stmt_block(cfg: &Cfg, n: usize) -> BlockId {
    cfg.block_ids()[n + 2]
}

/// `if (c) goto A; else goto B; A: x = 1; goto J; B: x = 2; J: return x;`
pub fn diamond() -> Vec<Statement> {
    vec![
        Statement::branch(var("c"), "A", "B"),
        Statement::label("A"),
        assign_int("x", 1),
        Statement::goto("J"),
        Statement::label("B"),
        assign_int("x", 2),
        Statement::label("J"),
        ret("x"),
    ]
}

/// Handles of the branch, both assignments and the return of a tidied [`diamond`].
pub fn tidy_diamond() -> (Cfg, [BlockId; 4]) {
    let mut cfg = build(diamond());
    let blocks = [
        stmt_block(&cfg, 0),
        stmt_block(&cfg, 2),
        stmt_block(&cfg, 5),
        stmt_block(&cfg, 7),
    ];
    cfg.tidy();
    (cfg, blocks)
}

/// `i = 0; H: if (c) goto B; else goto X; B: i = i + 1; goto H; X: return i;`
pub fn counting_loop() -> Vec<Statement> {
    vec![
        assign_int("i", 0),
        Statement::label("H"),
        Statement::branch(var("c"), "B", "X"),
        Statement::label("B"),
        assign_add("i", "i", "one"),
        Statement::goto("H"),
        Statement::label("X"),
        ret("i"),
    ]
}

/// A random but well-formed procedure: every label is declared once and every jump
/// goes to a declared label.
pub fn random_procedure(rng: &mut StdRng) -> Procedure {
    let vars = ["a", "b", "c"];
    let label_count: usize = rng.gen_range(1..5);
    let length: usize = rng.gen_range(0..24);
    let mut declared = 0;
    let mut statements = Vec::new();
    for _ in 0..length {
        let v = vars[rng.gen_range(0..vars.len())];
        let w = vars[rng.gen_range(0..vars.len())];
        match rng.gen_range(0..7) {
            0 | 1 if declared < label_count => {
                statements.push(Statement::label(&format!("L{}", declared)));
                declared += 1;
            }
            2 => {
                let l = rng.gen_range(0..label_count);
                statements.push(Statement::goto(&format!("L{}", l)));
            }
            3 => {
                let t = rng.gen_range(0..label_count);
                let f = rng.gen_range(0..label_count);
                statements.push(Statement::branch(
                    var(v),
                    &format!("L{}", t),
                    &format!("L{}", f),
                ));
            }
            4 => statements.push(ret(v)),
            _ => statements.push(assign_add(v, v, w)),
        }
    }
    while declared < label_count {
        statements.push(Statement::label(&format!("L{}", declared)));
        declared += 1;
    }
    procedure(statements)
}

/// Every block together with its outgoing edges, for comparing graphs.
pub fn snapshot(cfg: &Cfg) -> BTreeMap<BlockId, Vec<(BlockId, String)>> {
    cfg.blocks()
        .map(|b| {
            let succs = b
                .successor_edges()
                .iter()
                .map(|e| {
                    let edge = cfg.edge(*e);
                    (edge.target(), format!("{:?}", edge.direction()))
                })
                .collect();
            (b.id(), succs)
        })
        .collect()
}

/**
 * Check that the graph is in SSA form: every version has at most one definition and
 * that definition dominates every use. A phi argument is used at the end of its
 * incoming edge's source block.
 */
pub fn assert_ssa_dominance(cfg: &mut Cfg) {
    cfg.check_in_ssa().unwrap();
    cfg.compute_dominance();
    let web = cfg.def_use().clone();

    let mut used: BTreeSet<VariableName> = BTreeSet::new();
    for block in cfg.blocks() {
        for phi in block.phis().iter() {
            for (_, arg) in phi.args() {
                used.insert(arg.clone());
            }
        }
        if let Some(s) = block.statement() {
            used.extend(s.uses().into_iter().cloned());
        }
        if let Some(b) = block.branch() {
            used.insert(b.cond.clone());
        }
    }

    for v in used {
        let def = match web.get_def(&v) {
            Some(def) => def.clone(),
            None => {
                assert_eq!(v.version, Some(0), "{} is used but never defined", v);
                continue;
            }
        };
        for site in web.get_uses(&v) {
            match site {
                Site::Phi(block, lhs) => {
                    let phi = cfg.block(*block).phis().get(&lhs.name).unwrap();
                    for (edge, arg) in phi.args() {
                        if *arg == v {
                            let pred = cfg.edge(edge).source();
                            assert!(
                                cfg.dominates(def.block(), pred),
                                "definition of {} in {} does not reach {}",
                                v,
                                def.block(),
                                pred
                            );
                        }
                    }
                }
                other => assert!(
                    cfg.dominates(def.block(), other.block()),
                    "definition of {} in {} does not dominate its use in {}",
                    v,
                    def.block(),
                    other.block()
                ),
            }
        }
    }
}
