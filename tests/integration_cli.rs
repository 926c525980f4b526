use std::fs;
use std::path::Path;

use assert_cmd::Command;

fn dikr(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dikr").unwrap();
    cmd.arg("--db")
        .arg(dir.join("dikr.db"))
        .arg("--config")
        .arg(dir.join("config.json"));
    cmd
}

const BACKUP: &str = r#"{
  "dikrs": [
    { "id": "d1", "name": "tasbih", "durationMs": 1000.0 },
    { "id": "d2", "name": "tahmid" }
  ],
  "history": [
    { "id": "s1", "dikrId": "d1", "dikrName": "tasbih", "date": 0,
      "durationMs": 33000.0, "count": 33, "mode": "target", "target": 33 },
    { "id": "s2", "dikrId": "d1", "dikrName": "tasbih", "date": 1000,
      "durationMs": 1000.0, "count": 1, "mode": "calibration" }
  ],
  "lang": "en"
}"#;

#[test]
fn tui_refuses_without_tty() {
    let dir = tempfile::tempdir().unwrap();
    let out = dikr(dir.path()).assert().failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("stdin must be a tty"), "{stderr}");
}

#[test]
fn import_then_export_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.json");
    fs::write(&input, BACKUP).unwrap();

    dikr(dir.path())
        .arg("import")
        .arg(&input)
        .assert()
        .success()
        .stdout("imported 2 items and 2 records\n");

    let output = dir.path().join("out.json");
    dikr(dir.path()).arg("export").arg(&output).assert().success();

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(exported["dikrs"][0]["name"], "tasbih");
    assert_eq!(exported["history"].as_array().unwrap().len(), 2);
    assert_eq!(exported["lang"], "en");
}

#[test]
fn import_rejects_bad_shape_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    let bad = dir.path().join("bad.json");
    fs::write(&good, BACKUP).unwrap();
    fs::write(&bad, r#"{"dikrs": []}"#).unwrap();

    dikr(dir.path()).arg("import").arg(&good).assert().success();
    let out = dikr(dir.path()).arg("import").arg(&bad).assert().failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).to_string();
    assert!(stderr.contains("InvalidShape"), "{stderr}");

    let csv = dir.path().join("history.csv");
    dikr(dir.path())
        .arg("export-csv")
        .arg(&csv)
        .assert()
        .success();
    let text = fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("date,dikr,mode,count,target,duration_ms\n"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn stats_excludes_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.json");
    fs::write(&input, BACKUP).unwrap();
    dikr(dir.path()).arg("import").arg(&input).assert().success();

    let out = dikr(dir.path()).arg("stats").assert().success();
    let text = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let all = text.lines().find(|l| l.starts_with("all")).unwrap();
    assert!(all.contains(" 33 reps"), "{all}");
    assert!(all.contains("1 targets"), "{all}");
}
