//! Server binary startup checks

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_server_refuses_to_start_without_api_key() {
  let data_dir = tempfile::TempDir::new().unwrap();

  Command::cargo_bin("lessons_server")
    .unwrap()
    .env_remove("OPENAI_API_KEY")
    .env("LESSONS_DATA_DIR", data_dir.path())
    .env("LESSONS_BIND", "127.0.0.1:0")
    .assert()
    .failure()
    .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_server_rejects_zero_top_k() {
  Command::cargo_bin("lessons_server")
    .unwrap()
    .env("OPENAI_API_KEY", "sk-test")
    .env("LESSONS_BIND", "127.0.0.1:0")
    .args(["--top-k", "0"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--top-k"));
}

#[test]
fn test_cli_help_lists_commands() {
  Command::cargo_bin("lessons")
    .unwrap()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("seed").and(predicate::str::contains("search")));
}
