//! Runs the built binary.

use image_resizer::config::{ResizerConfig, parse_config};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn resizer(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_image-resizer"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn gen_config_ignores_broken_config_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("resizer.toml"), "[resize]\nsize = \"huge\"\n").unwrap();

    let out = resizer(tmp.path())
        .arg("gen-config")
        .output()
        .expect("failed to run image-resizer");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stock = String::from_utf8(out.stdout).unwrap();
    assert_eq!(parse_config(&stock).unwrap(), ResizerConfig::default());
}

#[test]
fn resize_reports_broken_config_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("resizer.toml"), "[resize]\nsize = \"huge\"\n").unwrap();

    let out = resizer(tmp.path())
        .args(["resize", "missing.png"])
        .output()
        .expect("failed to run image-resizer");
    assert!(!out.status.success());
}
