// Drives the compiled binary through a PTY: onboarding, one item, quit.
//
// Notes:
// - Requires a TTY; expectrl allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn add_item_and_quit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("dikr");
    let cmd = format!(
        "{} --db {} --config {}",
        bin.display(),
        dir.path().join("dikr.db").display(),
        dir.path().join("config.json").display()
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    // leave onboarding, add an item through the prompt
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("a")?;
    p.send("subhanallah\r")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("q")?;
    p.expect(Eof)?;

    let out = assert_cmd::Command::cargo_bin("dikr")?
        .arg("--db")
        .arg(dir.path().join("dikr.db"))
        .arg("--config")
        .arg(dir.path().join("config.json"))
        .arg("export")
        .arg(dir.path().join("b.json"))
        .output()?;
    assert!(out.status.success());
    let text = std::fs::read_to_string(dir.path().join("b.json"))?;
    assert!(text.contains("subhanallah"));
    Ok(())
}
