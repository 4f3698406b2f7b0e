use std::collections::BTreeSet;

use crate::cfg::BlockKind;
use crate::def_use::Site;

use super::util::*;

#[test]
fn test_diamond() {
    let (mut cfg, [br, a, b, join]) = tidy_diamond();
    let web = cfg.def_use();

    assert_eq!(
        web.get_defs(&var("x")),
        &[Site::Statement(a), Site::Statement(b)]
    );
    assert_eq!(web.get_uses(&var("x")), &[Site::Statement(join)]);
    assert_eq!(web.get_uses(&var("c")), &[Site::Branch(br)]);
    assert!(web.get_defs(&var("c")).is_empty());

    assert_eq!(web.get_block_defs(a).collect::<Vec<_>>(), ["x"]);
    assert_eq!(web.get_block_uses(join).collect::<Vec<_>>(), ["x"]);
    assert_eq!(web.get_block_uses(br).collect::<Vec<_>>(), ["c"]);
    assert_eq!(web.get_block_defs(br).count(), 0);

    let defined: BTreeSet<_> = web.defined_variables().cloned().collect();
    assert_eq!(defined, BTreeSet::from([var("x")]));
}

#[test]
#[should_panic(expected = "not in SSA form")]
fn test_single_definition_required() {
    let (mut cfg, _) = tidy_diamond();
    cfg.def_use().get_def(&var("x"));
}

#[test]
fn test_unused() {
    let mut cfg = build(vec![
        assign_int("x", 1),
        assign_add("y", "x", "x"),
        ret("x"),
    ]);
    let first = stmt_block(&cfg, 0);
    let second = stmt_block(&cfg, 1);
    let web = cfg.def_use();
    assert!(web.is_unused(&var("y")));
    assert!(!web.is_unused(&var("x")));
    // y = x + x reads x twice
    assert_eq!(web.get_uses(&var("x")).len(), 3);
    assert_eq!(web.get_def(&var("y")).map(Site::block), Some(second));
    assert_eq!(web.get_def(&var("x")), Some(&Site::Statement(first)));
}

#[test]
fn test_rebuilt_after_edit() {
    let (mut cfg, [br, a, _, _]) = tidy_diamond();
    assert!(cfg.def_use().get_defs(&var("y")).is_empty());
    let new = cfg.insert_between(br, a, BlockKind::Statement(assign_add("y", "c", "c")));
    let web = cfg.def_use();
    assert_eq!(web.get_defs(&var("y")), &[Site::Statement(new)]);
    assert_eq!(web.get_uses(&var("c")).len(), 3);
}
