use assert_cmd::Command;
use rand;
use std::{
    env::temp_dir,
    path::{Path, PathBuf},
};

/// `if (c) goto A; else goto B; A: x = 1; goto J; B: x = 2; J: return x;`
pub const DIAMOND_JSON: &str = r#"{
    "name": "diamond",
    "statements": [
        {"kind": "branch", "cond": {"name": "c"}, "iftrue": "A", "iffalse": "B"},
        {"kind": "label", "name": "A"},
        {"kind": "assign_var", "lhs": {"name": "x"}, "rhs": {"lit": {"int": 1}}},
        {"kind": "goto", "label": "J"},
        {"kind": "label", "name": "B"},
        {"kind": "assign_var", "lhs": {"name": "x"}, "rhs": {"lit": {"int": 2}}},
        {"kind": "label", "name": "J"},
        {"kind": "return", "value": {"var": {"name": "x"}}}
    ]
}"#;

/// `i = 0; H: if (c) goto B; else goto X; B: i = i + one; goto H; X: return i;`
pub const LOOP_JSON: &str = r#"{
    "name": "count",
    "statements": [
        {"kind": "assign_var", "lhs": {"name": "i"}, "rhs": {"lit": {"int": 0}}},
        {"kind": "label", "name": "H"},
        {"kind": "branch", "cond": {"name": "c"}, "iftrue": "B", "iffalse": "X"},
        {"kind": "label", "name": "B"},
        {"kind": "assign_var", "lhs": {"name": "i"}, "rhs": {"bin": {
            "op": "+", "left": {"var": {"name": "i"}}, "right": {"var": {"name": "one"}}
        }}},
        {"kind": "goto", "label": "H"},
        {"kind": "label", "name": "X"},
        {"kind": "return", "value": {"var": {"name": "i"}}}
    ]
}"#;

lazy_static! {
    pub static ref DIAMOND: PathBuf = write_input(DIAMOND_JSON);
    pub static ref LOOP: PathBuf = write_input(LOOP_JSON);
    pub static ref BOTH: PathBuf = write_input(&format!("[{}, {}]", DIAMOND_JSON, LOOP_JSON));
}

pub fn temp_file(extension: &str) -> PathBuf {
    let mut filename = temp_dir();
    filename.push(format!("{:016X}.{}", rand::random::<u64>(), extension));
    filename
}

pub fn write_input(json: &str) -> PathBuf {
    let filename = temp_file("json");
    std::fs::write(&filename, json).unwrap();
    filename
}

/// Run the optimizer and return what it printed.
pub fn optimize(input: &Path, args: &[&str]) -> String {
    let output = Command::cargo_bin("mir-cfg")
        .unwrap()
        .args(args)
        .arg(input)
        .unwrap();
    String::from_utf8(output.stdout).unwrap()
}

/// Run the optimizer expecting it to fail, return its error output.
pub fn reject(input: &Path) -> String {
    let output = Command::cargo_bin("mir-cfg")
        .unwrap()
        .arg(input)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    String::from_utf8(output.stderr).unwrap()
}
