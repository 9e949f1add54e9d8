use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const FEED: &str = r#"
[[package]]
id = "App"
version = "1.0.0"
dependencies = { Logging = "[1.0, 2.0)", Json = "" }

[[package]]
id = "Logging"
version = "1.2.0"
dependencies = { App = "1.0.0" }

[[package]]
id = "Logging"
version = "2.0.0"

[[package]]
id = "Json"
version = "13.0.1"

[[package]]
id = "Json"
version = "14.0.0-rc.1"
"#;

#[allow(deprecated)]
fn depgather_cmd() -> Command {
    Command::cargo_bin("depgather").unwrap()
}

fn write_feed(tmp: &TempDir) -> std::path::PathBuf {
    let path = tmp.path().join("feed.toml");
    fs::write(&path, FEED).unwrap();
    path
}

#[test]
fn test_resolve_prints_sorted_closure() {
    let tmp = TempDir::new().unwrap();
    let feed = write_feed(&tmp);

    depgather_cmd()
        .current_dir(tmp.path())
        .arg("resolve")
        .arg("App@1.0.0")
        .arg("--feed")
        .arg(&feed)
        .assert()
        .success()
        .stdout(
            "App 1.0.0 -> Json, Logging [1.0.0,2.0.0)\n\
             Json 13.0.1\n\
             Logging 1.2.0 -> App 1.0.0\n",
        )
        .stderr(predicate::str::contains("Resolved 3 package(s) with 3 source queries"));
}

#[test]
fn test_resolve_with_prerelease() {
    let tmp = TempDir::new().unwrap();
    let feed = write_feed(&tmp);

    depgather_cmd()
        .current_dir(tmp.path())
        .args(["resolve", "Json", "--prerelease", "--feed"])
        .arg(&feed)
        .assert()
        .success()
        .stdout(predicate::str::contains("Json 14.0.0-rc.1"));
}

#[test]
fn test_resolve_feed_from_config() {
    let tmp = TempDir::new().unwrap();
    write_feed(&tmp);
    fs::write(
        tmp.path().join("depgather.toml"),
        "[resolve]\ninclude-prerelease = true\n\n[feed]\npath = \"feed.toml\"\n",
    )
    .unwrap();

    depgather_cmd()
        .current_dir(tmp.path())
        .args(["resolve", "Json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Json 13.0.1"))
        .stdout(predicate::str::contains("Json 14.0.0-rc.1"));
}

#[test]
fn test_resolve_json_output() {
    let tmp = TempDir::new().unwrap();
    let feed = write_feed(&tmp);

    depgather_cmd()
        .current_dir(tmp.path())
        .args(["resolve", "Logging@2.0.0", "--json", "--range-filter", "--feed"])
        .arg(&feed)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"Logging\""))
        .stdout(predicate::str::contains("\"version\": \"2.0.0\""));
}

#[test]
fn test_resolve_without_feed_fails() {
    let tmp = TempDir::new().unwrap();

    depgather_cmd()
        .current_dir(tmp.path())
        .env_remove("DEPGATHER_FEED")
        .args(["resolve", "App"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No feed given"));
}

#[test]
fn test_resolve_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let feed = write_feed(&tmp);

    depgather_cmd()
        .current_dir(tmp.path())
        .args(["resolve", "App", "--config", "missing.toml", "--feed"])
        .arg(&feed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_resolve_bad_feed_fails() {
    let tmp = TempDir::new().unwrap();
    let feed = tmp.path().join("feed.toml");
    fs::write(&feed, "[[package]]\nid = \"A\"\n").unwrap();

    depgather_cmd()
        .current_dir(tmp.path())
        .args(["resolve", "A", "--feed"])
        .arg(&feed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Feed error"));
}
