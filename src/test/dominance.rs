use std::collections::BTreeSet;

use crate::cfg::BlockKind;
use crate::mir::Statement;

use super::util::*;

#[test]
fn test_diamond() {
    let (mut cfg, [br, a, b, join]) = tidy_diamond();
    cfg.compute_dominance();
    let (entry, exit) = (cfg.entry(), cfg.exit());

    assert_eq!(cfg.immediate_dominator(entry), None);
    assert_eq!(cfg.immediate_dominator(br), Some(entry));
    assert_eq!(cfg.immediate_dominator(a), Some(br));
    assert_eq!(cfg.immediate_dominator(b), Some(br));
    assert_eq!(cfg.immediate_dominator(join), Some(br));
    assert_eq!(cfg.immediate_dominator(exit), Some(join));

    assert_eq!(cfg.dominance_frontier(a), &BTreeSet::from([join]));
    assert_eq!(cfg.dominance_frontier(b), &BTreeSet::from([join]));
    assert!(cfg.dominance_frontier(br).is_empty());
    assert!(cfg.dominance_frontier(join).is_empty());

    assert_eq!(cfg.dominated_children(br), &[a, b, join]);
    assert_eq!(cfg.dominated_children(entry), &[br]);
    assert!(cfg.dominated_children(a).is_empty());

    assert!(cfg.dominates(br, join));
    assert!(cfg.dominates(join, join));
    assert!(cfg.dominates(entry, exit));
    assert!(!cfg.dominates(a, join));
    assert!(!cfg.dominates(join, br));
}

#[test]
fn test_loop() {
    let mut cfg = build(counting_loop());
    let init = stmt_block(&cfg, 0);
    let br = stmt_block(&cfg, 2);
    let body = stmt_block(&cfg, 4);
    let r = stmt_block(&cfg, 7);
    cfg.tidy();
    cfg.compute_dominance();

    assert_eq!(cfg.immediate_dominator(br), Some(init));
    assert_eq!(cfg.immediate_dominator(body), Some(br));
    assert_eq!(cfg.immediate_dominator(r), Some(br));
    assert_eq!(cfg.dominance_frontier(body), &BTreeSet::from([br]));
    assert_eq!(cfg.dominance_frontier(br), &BTreeSet::from([br]));
    assert!(cfg.dominance_frontier(init).is_empty());
    assert!(!cfg.dominates(body, br));
}

#[test]
fn test_unreachable_exit() {
    let mut cfg = build(vec![Statement::label("L"), Statement::goto("L")]);
    cfg.tidy();
    cfg.compute_dominance();
    let exit = cfg.exit();
    assert_eq!(cfg.immediate_dominator(exit), None);
    assert!(cfg.dominance_frontier(exit).is_empty());
    assert!(!cfg.dominates(cfg.entry(), exit));
    assert_eq!(cfg.dominance().postorder().len(), 2);
}

#[test]
fn test_blocks_top_down() {
    let (cfg, [br, a, b, join]) = tidy_diamond();
    let order = cfg.blocks_top_down();
    let pos = |x| order.iter().position(|y| *y == x).unwrap();
    assert_eq!(order.len(), 6);
    assert_eq!(order[0], cfg.entry());
    assert!(pos(br) < pos(a));
    assert!(pos(br) < pos(b));
    assert!(pos(a) < pos(join));
    assert!(pos(b) < pos(join));
    assert!(pos(join) < pos(cfg.exit()));

    let mut bottom_up = cfg.blocks_bottom_up();
    bottom_up.reverse();
    assert_eq!(bottom_up, order);
}

#[test]
fn test_blocks_top_down_ignores_back_edges() {
    let mut cfg = build(counting_loop());
    cfg.tidy();
    let order = cfg.blocks_top_down();
    assert_eq!(order.len(), cfg.block_count());
    assert_eq!(order[0], cfg.entry());
    for b in &order {
        if let BlockKind::Branch(_) = cfg.block(*b).kind() {
            let pos = |x| order.iter().position(|y| *y == x).unwrap();
            assert!(pos(*b) < pos(cfg.true_successor(*b)));
        }
    }
}

#[test]
fn test_blocks_top_down_includes_unreachable() {
    let cfg = build(vec![
        Statement::goto("L"),
        assign_int("dead", 1),
        Statement::label("L"),
        ret("x"),
    ]);
    let dead = stmt_block(&cfg, 1);
    let label = stmt_block(&cfg, 2);
    let order = cfg.blocks_top_down();
    let pos = |x| order.iter().position(|y| *y == x).unwrap();
    assert_eq!(order.len(), 6);
    assert_eq!(order[0], cfg.entry());
    assert!(pos(dead) < pos(label));
}

#[test]
#[should_panic(expected = "out of date")]
fn test_edit_invalidates_dominance() {
    let (mut cfg, [br, a, _, _]) = tidy_diamond();
    cfg.compute_dominance();
    cfg.insert_between(br, a, BlockKind::Empty);
    cfg.immediate_dominator(a);
}
