use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn run_kiosk(cwd: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kiosk"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("kiosk command should run")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn sources_lists_the_builtin_registry() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_kiosk(dir.path(), &["sources"]);
    assert!(output.status.success());

    let text = stdout_of(&output);
    for id in ["clip:drift", "clip:pulse", "clip:lattice", "image:<path>", "video:<path>"] {
        assert!(text.contains(id), "missing {id} in sources output");
    }
}

#[test]
fn render_output_is_stable_across_runs() {
    let dir = tempdir().expect("tempdir should create");
    let args = [
        "render",
        "--source",
        "clip:drift",
        "--cols",
        "48",
        "--rows",
        "16",
        "--frames",
        "3",
        "--quiet",
    ];

    let first = run_kiosk(dir.path(), &args);
    assert!(first.status.success(), "stderr: {}", stderr_of(&first));
    let second = run_kiosk(dir.path(), &args);
    assert!(second.status.success());
    assert_eq!(first.stdout, second.stdout, "render output should be stable");
    assert!(stdout_of(&first).contains("sequence hash: 0x"));
}

#[test]
fn render_sidecar_reports_every_frame() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_kiosk(
        dir.path(),
        &[
            "render",
            "--source",
            "clip:pulse",
            "--cols",
            "40",
            "--rows",
            "12",
            "--frames",
            "4",
            "--quiet",
            "--sidecar",
            "hashes.json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let sidecar = fs::read_to_string(dir.path().join("hashes.json"))
        .expect("sidecar should be written");
    let parsed: Value = serde_json::from_str(&sidecar).expect("sidecar should be json");
    assert_eq!(parsed["cols"], 40);
    assert_eq!(parsed["rows"], 12);
    assert_eq!(parsed["theme"], "dark");
    let hashes = parsed["frame_hashes"].as_array().expect("frame_hashes array");
    assert_eq!(hashes.len(), 4);
    for hash in hashes {
        let text = hash.as_str().expect("hash string");
        assert!(text.starts_with("0x") && text.len() == 18, "bad hash {text}");
    }
    assert!(parsed["sequence_hash"].as_str().unwrap().starts_with("0x"));
}

#[test]
fn render_expected_hash_gates_the_run() {
    let dir = tempdir().expect("tempdir should create");
    let base = [
        "render", "--source", "clip:lattice", "--cols", "32", "--rows", "10", "--frames", "2",
        "--quiet",
    ];
    let first = run_kiosk(dir.path(), &base);
    assert!(first.status.success());

    let stdout = stdout_of(&first);
    let sequence = stdout
        .lines()
        .find_map(|line| line.strip_prefix("[kiosk] sequence hash: "))
        .expect("sequence hash line");

    let mut accept = base.to_vec();
    accept.extend(["--expected-hash", sequence]);
    let verified = run_kiosk(dir.path(), &accept);
    assert!(verified.status.success());
    assert!(stdout_of(&verified).contains("regression check passed"));

    let mut reject = base.to_vec();
    reject.extend(["--expected-hash", "0xdeadbeefdeadbeef"]);
    let failed = run_kiosk(dir.path(), &reject);
    assert!(!failed.status.success());
    assert!(stderr_of(&failed).contains("sequence hash mismatch"));
}

#[test]
fn render_validates_its_arguments() {
    let dir = tempdir().expect("tempdir should create");

    let zero_frames = run_kiosk(dir.path(), &["render", "--frames", "0"]);
    assert!(!zero_frames.status.success());

    let bad_zoom = run_kiosk(dir.path(), &["render", "--zoom", "5.0"]);
    assert!(!bad_zoom.status.success());
    assert!(stderr_of(&bad_zoom).contains("zoom"));

    let bad_theme = run_kiosk(dir.path(), &["render", "--theme", "sepia"]);
    assert!(!bad_theme.status.success());

    let bad_source = run_kiosk(dir.path(), &["render", "--source", "clip:nope"]);
    assert!(!bad_source.status.success());
    assert!(stderr_of(&bad_source).contains("unknown source"));
}

#[test]
fn themes_produce_different_sequences() {
    let dir = tempdir().expect("tempdir should create");
    let base = ["render", "--source", "clip:drift", "--cols", "40", "--rows", "12", "--quiet"];

    let mut dark = base.to_vec();
    dark.extend(["--theme", "dark"]);
    let mut light = base.to_vec();
    light.extend(["--theme", "light"]);

    let dark_out = run_kiosk(dir.path(), &dark);
    let light_out = run_kiosk(dir.path(), &light);
    assert!(dark_out.status.success() && light_out.status.success());
    // Light mode runs a denser grid; the glyph fields cannot match.
    assert_ne!(dark_out.stdout, light_out.stdout);
}

#[test]
fn check_accepts_a_valid_config() {
    let dir = tempdir().expect("tempdir should create");
    let config = dir.path().join("kiosk.yaml");
    fs::write(
        &config,
        "theme: dark\nsource: clip:pulse\ngame:\n  preset: arcade\n",
    )
    .expect("config should write");

    let output = run_kiosk(dir.path(), &["check", "kiosk.yaml"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let text = stdout_of(&output);
    assert!(text.starts_with("OK:"));
    assert!(text.contains("clip:pulse"));
    assert!(text.contains("arcade"));
}

#[test]
fn check_rejects_unknown_presets_and_keys() {
    let dir = tempdir().expect("tempdir should create");
    let config = dir.path().join("kiosk.yaml");

    fs::write(&config, "game:\n  preset: nightmare\n").expect("config should write");
    let output = run_kiosk(dir.path(), &["check", "kiosk.yaml"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("unknown game preset"));

    fs::write(&config, "sorce: clip:drift\n").expect("config should write");
    let output = run_kiosk(dir.path(), &["check", "kiosk.yaml"]);
    assert!(!output.status.success());
}

#[test]
fn check_without_config_file_uses_defaults() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_kiosk(dir.path(), &["check"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("clip:drift"));
}
