use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

fn run(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_farm-planner"))
        .arg("--state")
        .arg(state)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run farm-planner")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn place_then_reject_overlap() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");

    let placed = run(&state, &["place", "tree-2x2", "3", "3"]);
    assert!(placed.status.success(), "first placement should succeed");
    assert_eq!(stdout(&placed).trim(), "placed tree-2x2-1");

    let overlap = run(&state, &["place", "crop", "4", "4"]);
    assert!(!overlap.status.success(), "overlapping placement must fail");

    let listed = stdout(&run(&state, &["list"]));
    assert!(listed.contains("tree-2x2-1"));
    assert!(!listed.contains("crop-"));
}

#[test]
fn out_of_bounds_and_unknown_items_fail() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");

    assert!(!run(&state, &["place", "crop", "70", "0"]).status.success());
    assert!(!run(&state, &["place", "crop", "-1", "0"]).status.success());
    assert!(!run(&state, &["place", "windmill", "1", "1"]).status.success());
    assert!(!state.exists(), "failed commands must not write state");
}

#[test]
fn check_reports_without_placing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");

    let checked = run(&state, &["check", "sprinkler-5x5", "10", "10"]);
    assert!(checked.status.success());
    let text = stdout(&checked);
    assert!(text.contains("placeable"));
    assert!(text.contains("occupies 1×1"));
    assert!(text.contains("influences 5×5 from (8, 8)"));
    assert!(!state.exists());
}

#[test]
fn move_relocates_and_failed_move_keeps_original() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");

    assert!(run(&state, &["place", "crop", "0", "0"]).status.success());
    assert!(run(&state, &["place", "crop", "1", "0"]).status.success());

    let blocked = run(&state, &["move", "crop-1", "1", "0"]);
    assert!(!blocked.status.success(), "moving onto another instance must fail");
    assert!(stdout(&run(&state, &["list"])).contains("crop-1"));

    let moved = run(&state, &["move", "crop-1", "5", "5"]);
    assert!(moved.status.success());
    assert_eq!(stdout(&moved).trim(), "moved crop-1 to (5, 5) as crop-3");

    let listed = stdout(&run(&state, &["list"]));
    assert!(!listed.contains("crop-1 "));
    assert!(listed.contains("crop-3"));
    assert!(listed.contains("crop: 2"));
}

#[test]
fn remove_and_clear_empty_the_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");

    assert!(run(&state, &["place", "machine-2", "0", "0"]).status.success());
    assert!(run(&state, &["place", "crop", "5", "5"]).status.success());

    assert!(run(&state, &["remove", "machine-2-1"]).status.success());
    assert!(!run(&state, &["remove", "machine-2-1"]).status.success());

    let cleared = run(&state, &["clear"]);
    assert_eq!(stdout(&cleared).trim(), "removed 1 items");
    assert_eq!(stdout(&run(&state, &["list"])).trim(), "no items placed");
}

#[test]
fn export_import_transfers_layout() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("source.json");
    let target = dir.path().join("target.json");

    assert!(run(&source, &["place", "scarecrow-11x11", "20", "20"]).status.success());
    let exported = stdout(&run(&source, &["export"]));
    let layout = exported.trim();
    assert!(layout.starts_with("farm:v1:70x40:"));

    assert!(run(&target, &["import", layout]).status.success());
    assert!(stdout(&run(&target, &["list"])).contains("scarecrow-11x11-1"));

    assert!(!run(&target, &["import", "farm:v1:10x10:W10"]).status.success());
}

#[test]
fn migrate_rewrites_legacy_state() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");
    fs::write(
        &state,
        r##"[{"id":"sprinkler-5x5-2","name":"5×5 Sprinkler","itemType":"sprinkler","size":5,
             "color":"#60a5fa","icon":"💧","x":4,"y":4}]"##,
    )
    .expect("write legacy state");

    let migrated = run(&state, &["migrate"]);
    assert!(migrated.status.success());
    assert!(stdout(&migrated).contains("upgraded 1 legacy records"));

    let contents = fs::read_to_string(&state).expect("read migrated state");
    assert!(contents.contains("\"placementKind\": \"radius\""));
    assert!(contents.contains("\"radius\": 2"));
    assert!(!contents.contains("\"size\""));

    let placed = run(&state, &["place", "crop", "10", "10"]);
    assert_eq!(stdout(&placed).trim(), "placed crop-3");
}

#[test]
fn corrupt_state_is_treated_as_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");
    fs::write(&state, "{ not json").expect("write corrupt state");

    let listed = run(&state, &["list"]);
    assert!(listed.status.success());
    assert_eq!(stdout(&listed).trim(), "no items placed");
}

#[test]
fn check_reports_blocked_cells() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("placements.json");
    assert!(run(&state, &["place", "tree-3x3", "10", "10"]).status.success());

    let checked = run(&state, &["check", "crop", "12", "12"]);
    assert!(checked.status.success(), "check succeeds even when blocked");
    assert!(stdout(&checked).starts_with("crop at (12, 12): blocked"));
}
