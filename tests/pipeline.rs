use crate::run::{optimize, reject, temp_file, write_input, BOTH, DIAMOND, LOOP};

use mir_cfg::mir::Procedure;

mod run;

#[macro_use]
extern crate lazy_static;

#[test]
fn test_diamond() {
    let out = optimize(&DIAMOND, &[]);
    assert_eq!(
        out,
        "procedure diamond {
    if (c) goto L3; else goto L4;
    L3:
    x = 1;
    L5:
    return x;
    goto L1;
    L4:
    x = 2;
    goto L5;
    L1:
}
"
    );
}

#[test]
fn test_loop() {
    let out = optimize(&LOOP, &[]);
    assert_eq!(
        out,
        "procedure count {
    i = 0;
    L3:
    if (c) goto L4; else goto L5;
    L4:
    i = i + one;
    goto L3;
    L5:
    return i;
}
"
    );
}

#[test]
fn test_ssa_round_trip() {
    let out = optimize(&DIAMOND, &["--ssa"]);
    assert!(out.contains("if (c_0) goto"), "{}", out);
    assert!(out.contains("x_1 = 1;"), "{}", out);
    assert!(out.contains("x_3 = x_1;"), "{}", out);
    assert!(out.contains("x_3 = x_2;"), "{}", out);
    assert!(out.contains("return x_3;"), "{}", out);
    assert!(!out.contains("phi"), "{}", out);

    let out = optimize(&LOOP, &["--ssa"]);
    assert!(out.contains("i_3 = i_2 + one_0;"), "{}", out);
    assert!(out.contains("i_2 = i_3;"), "{}", out);
}

#[test]
fn test_json() {
    let out = optimize(&DIAMOND, &["--json"]);
    let p: Procedure = serde_json::from_str(&out).unwrap();
    assert_eq!(p.name, "diamond");
    assert_eq!(p.statements.len(), 10);
    assert_eq!(p.statements[0].to_string(), "if (c) goto L3; else goto L4;");

    // the output is valid input
    let again = optimize(&write_input(&out), &["--json"]);
    let q: Procedure = serde_json::from_str(&again).unwrap();
    assert_eq!(q.statements.len(), p.statements.len());
}

#[test]
fn test_many_procedures() {
    let out = optimize(&BOTH, &[]);
    assert!(out.starts_with("procedure diamond {\n"));
    assert!(out.contains("}\n\nprocedure count {\n"));

    let out = optimize(&BOTH, &["--json"]);
    let ps: Vec<Procedure> = serde_json::from_str(&out).unwrap();
    let names: Vec<&str> = ps.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["diamond", "count"]);
}

#[test]
fn test_output_file() {
    let path = temp_file("txt");
    let out = optimize(&LOOP, &["-o", path.to_str().unwrap()]);
    assert!(out.is_empty());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("procedure count {\n"));
}

#[test]
fn test_verbose() {
    let output = assert_cmd::Command::cargo_bin("mir-cfg")
        .unwrap()
        .arg("-v")
        .arg("--ssa")
        .arg(&*DIAMOND)
        .unwrap();
    let err = String::from_utf8(output.stderr).unwrap();
    for stage in ["BUILD CFG", "TIDY", "CONVERT TO SSA", "CONVERT OUT OF SSA", "LINEARIZE"] {
        assert!(err.contains(&format!("========== {} ===========", stage)), "{}", err);
    }
    // stages go to the error output only
    let out = String::from_utf8(output.stdout).unwrap();
    assert!(out.starts_with("procedure diamond {\n"));
}

#[test]
fn test_bad_input() {
    let err = reject(&write_input("{\"name\": \"f\", \"statements\": [{\"kind\": \"jump\"}]}"));
    assert!(err.contains("is not a valid procedure"), "{}", err);

    let err = reject(&temp_file("json"));
    assert!(err.contains("cannot read"), "{}", err);
}
