// Drives the compiled binary through a PTY: the real event loop, crossterm
// input and terminal setup/teardown.
//
// Notes:
// - Requires a TTY; expectrl allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use assert_cmd::Command;
use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn sign_in_switch_tabs_and_quit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("aimhq");
    let cmd = format!(
        "{} --db {} --config {}",
        bin.display(),
        dir.path().join("store.db").display(),
        dir.path().join("config.json").display()
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    // Sign in by phone: switch method, type the number, submit
    p.send("\x1b[C")?; // Right
    p.send("+1 555 010 4567")?;
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(300));

    p.send("2")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("3")?;
    std::thread::sleep(Duration::from_millis(100));

    p.send("q")?;
    p.expect(Eof)?;
    Ok(())
}

#[test]
fn reset_subcommand_runs_without_a_tty() {
    let dir = tempfile::tempdir().unwrap();
    let out = Command::cargo_bin("aimhq")
        .unwrap()
        .arg("--db")
        .arg(dir.path().join("store.db"))
        .arg("reset")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("all saved data erased"));
}

#[test]
fn tui_refuses_piped_stdin() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("aimhq")
        .unwrap()
        .arg("--db")
        .arg(dir.path().join("store.db"))
        .write_stdin("")
        .assert()
        .failure();
}
