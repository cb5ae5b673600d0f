use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::common::TestWorkspace;

fn vecpipe_binary() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_vecpipe") {
        return PathBuf::from(path);
    }

    let manifest_dir = env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::current_dir().expect("current dir"));
    manifest_dir.join("target/debug/vecpipe")
}

fn run_cli(workspace: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(vecpipe_binary())
        .args(args)
        .current_dir(workspace)
        .env_remove("VP_CONFIG")
        .output()
        .expect("run vecpipe CLI");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (code, stdout, stderr)
}

#[test]
fn append_vectors_end_to_end_succeeds() {
    let ws = TestWorkspace::new();
    ws.add_file("a.txt", "u1 [ 1 2 ]\nu2 [ 3 ]\n");
    ws.add_file("b.txt", "u1 [ 10 ]\nu2 [ 20 21 ]\n");

    let (code, _, stderr) = run_cli(ws.path(), &["append-vectors", "a.txt", "b.txt", "ab.txt"]);

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stderr.contains("Done 2 utterances."));
    assert_eq!(ws.read("ab.txt"), "u1 [ 1 2 10 ]\nu2 [ 3 20 21 ]\n");
}

#[test]
fn append_vectors_mismatch_fails() {
    let ws = TestWorkspace::new();
    ws.add_file("a.txt", "u1 [ 1 ]\nu2 [ 2 ]\n");
    ws.add_file("b.txt", "u1 [ 1 ]\nu9 [ 2 ]\n");

    let (code, _, stderr) = run_cli(ws.path(), &["append-vectors", "a.txt", "b.txt", "ab.txt"]);

    assert_eq!(code, 2);
    assert!(stderr.contains("Mismatched utterances u2 and u9"));
}

#[test]
fn append_vectors_leftover_fails() {
    let ws = TestWorkspace::new();
    ws.add_file("a.txt", "u1 [ 1 ]\n");
    ws.add_file("b.txt", "u1 [ 1 ]\nu2 [ 2 ]\n");

    let (code, _, _) = run_cli(ws.path(), &["append-vectors", "a.txt", "b.txt", "ab.txt"]);

    assert_eq!(code, 1);
    assert_eq!(ws.read("ab.txt"), "u1 [ 1 1 ]\n");
}

#[test]
fn append_vectors_with_nothing_to_do_fails() {
    let ws = TestWorkspace::new();
    ws.add_file("a.txt", "");
    ws.add_file("b.txt", "");

    let (code, _, _) = run_cli(ws.path(), &["append-vectors", "a.txt", "b.txt", "ab.txt"]);

    assert_eq!(code, 1);
}

#[test]
fn dot_products_end_to_end_succeeds() {
    let ws = TestWorkspace::new();
    ws.add_file("groups.txt", "r1 a b\n");
    ws.add_file("vectors.txt", "a [ 1 0 ]\nb [ 0 1 ]\n");

    let (code, _, stderr) = run_cli(
        ws.path(),
        &["dot-products-dense", "groups.txt", "vectors.txt", "ark,t:scores.txt"],
    );

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stderr.contains("Processed 1 recordings, 0 had errors."));
    assert_eq!(ws.read("scores.txt"), "r1 [\n  1 0\n  0 1 ]\n");
}

#[test]
fn dot_products_missing_member_fails() {
    let ws = TestWorkspace::new();
    ws.add_file("groups.txt", "r1 a ghost\n");
    ws.add_file("vectors.txt", "a [ 1 0 ]\n");

    let (code, _, stderr) = run_cli(
        ws.path(),
        &["dot-products-dense", "groups.txt", "vectors.txt", "scores.txt"],
    );

    assert_eq!(code, 2);
    assert!(stderr.contains("ghost"));
}

#[test]
fn dot_products_only_empty_groups_fails() {
    let ws = TestWorkspace::new();
    ws.add_file("groups.txt", "r1\n");
    ws.add_file("vectors.txt", "a [ 1 0 ]\n");

    let (code, _, _) = run_cli(
        ws.path(),
        &["dot-products-dense", "groups.txt", "vectors.txt", "scores.txt"],
    );

    assert_eq!(code, 1);
}

#[test]
fn json_report_carries_summary() {
    let ws = TestWorkspace::new();
    ws.add_file("groups.txt", "r1 a\n");
    ws.add_file("vectors.txt", "a [ 3 4 ]\n");

    let (code, _, stderr) = run_cli(
        ws.path(),
        &[
            "--json",
            "--quiet",
            "dot-products-dense",
            "--normalize",
            "groups.txt",
            "vectors.txt",
            "ark,t:scores.txt",
        ],
    );

    assert_eq!(code, 0, "stderr: {stderr}");
    let report: serde_json::Value = serde_json::from_str(&stderr).expect("JSON report");
    assert_eq!(report["status"], "success");
    assert_eq!(report["data"]["num_done"], 1);
    assert_eq!(report["data"]["num_err"], 0);
    assert_eq!(report["exit_code"], 0);
    assert_eq!(ws.read("scores.txt"), "r1 [\n  1 ]\n");
}

#[test]
fn copy_converts_binary_to_text_on_stdout() {
    let ws = TestWorkspace::new();
    ws.add_file("v.txt", "u1 [ 0.5 -1 ]\n");

    let (code, _, stderr) = run_cli(ws.path(), &["copy", "v.txt", "ark:v.ark"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    let bytes = std::fs::read(ws.path().join("v.ark")).unwrap();
    assert_eq!(&bytes[..4], b"VPAK");

    let (code, stdout, _) = run_cli(ws.path(), &["--quiet", "copy", "ark:v.ark", "ark,t:-"]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "u1 [ 0.5 -1 ]\n");
}

#[test]
fn unsupported_locator_is_rejected() {
    let ws = TestWorkspace::new();
    ws.add_file("a.txt", "u1 [ 1 ]\n");

    let (code, _, stderr) = run_cli(ws.path(), &["append-vectors", "scp:a.scp", "a.txt", "o.txt"]);

    assert_eq!(code, 8);
    assert!(stderr.contains("scp:a.scp"));
}

#[test]
fn init_then_config_reflects_settings_file() {
    let ws = TestWorkspace::new();

    let (code, stdout, _) = run_cli(ws.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(".vecpipe"));
    assert!(ws.path().join(".vecpipe/settings.toml").exists());

    let (code, _, _) = run_cli(ws.path(), &["init"]);
    assert_ne!(code, 0);

    ws.add_file(".vecpipe/settings.toml", "[archive]\nbinary_by_default = true\n");
    let (code, stdout, _) = run_cli(ws.path(), &["config"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("binary_by_default = true"));

    // Bare paths are now written as binary.
    ws.add_file("v.txt", "u1 [ 1 ]\n");
    let (code, _, _) = run_cli(ws.path(), &["copy", "v.txt", "out.bin"]);
    assert_eq!(code, 0);
    let bytes = std::fs::read(ws.path().join("out.bin")).unwrap();
    assert_eq!(&bytes[..4], b"VPAK");
}
