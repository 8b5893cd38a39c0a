use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "town"])
        .status()
        .expect("failed to invoke cargo check for town CLI binary");

    assert!(status.success(), "cargo check --bin town should succeed");
}
