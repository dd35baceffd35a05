use std::fs;
use tempfile::tempdir;

mod common;
use common::parley_cmd;

#[test]
fn status_prints_paths_config_and_provider() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path().join("parley");

    parley_cmd(tmp.path(), &home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicates::str::contains("parley_home="))
        .stdout(predicates::str::contains("memory.token_limit=3000"))
        .stdout(predicates::str::contains("memory.recent_messages=6"))
        .stdout(predicates::str::contains("rate_limit.max_requests=5"))
        .stdout(predicates::str::contains("provider=offline"));
}

#[test]
fn status_reads_config_file_overrides() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path().join("parley");
    fs::create_dir_all(&home).expect("mkdir home");
    fs::write(
        home.join("parley.toml"),
        "[memory]\ntoken_limit = 4500\nrecent_messages = 4\n",
    )
    .expect("write config");

    parley_cmd(tmp.path(), &home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicates::str::contains("memory.token_limit=4500"))
        .stdout(predicates::str::contains("memory.recent_messages=4"));
}

#[test]
fn status_flags_unknown_provider_setting() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path().join("parley");

    parley_cmd(tmp.path(), &home)
        .env("PARLEY_PROVIDER", "banana")
        .arg("status")
        .assert()
        .failure()
        .stderr(predicates::str::contains("unknown PARLEY_PROVIDER"));
}
