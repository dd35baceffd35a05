use tempfile::tempdir;

mod common;
use common::parley_cmd;

#[test]
fn once_replies_offline_and_writes_audit_log() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path().join("parley");

    parley_cmd(tmp.path(), &home)
        .args(["once", "--message", "ahoy there"])
        .assert()
        .success()
        .stdout(predicates::str::contains("(offline)"))
        .stdout(predicates::str::contains("ahoy there"))
        .stdout(predicates::str::contains("provider=offline"))
        .stdout(predicates::str::contains("admitted=true"));

    let audit = home.join("logs").join("audit.log");
    assert!(audit.is_file(), "audit log should exist at {}", audit.display());
    let raw = std::fs::read_to_string(&audit).expect("read audit log");
    assert!(raw.lines().any(|line| line.contains("\"event\":\"turn\"")));
}

#[test]
fn once_rejects_blank_message() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path().join("parley");

    parley_cmd(tmp.path(), &home)
        .args(["once", "--message", "   "])
        .assert()
        .failure()
        .stderr(predicates::str::contains("message cannot be empty"));
}

#[test]
fn once_reports_strategy_when_enabled() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path().join("parley");

    // The offline client never returns a known label, so the selector
    // must fall back to the default branch.
    parley_cmd(tmp.path(), &home)
        .env("PARLEY_STRATEGY_ENABLED", "1")
        .args(["once", "--message", "ahoy there"])
        .assert()
        .success()
        .stdout(predicates::str::contains("strategy=DIRECT"));
}
