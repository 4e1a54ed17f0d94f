use assert_cmd::Command;
use httpmock::{Method::GET, MockServer};
use predicates::prelude::*;

fn cmd() -> Command {
    let mut c = Command::cargo_bin("github-client").unwrap();
    c.arg("--log-level").arg("warn");
    c
}

#[test]
fn parse_date_prints_canonical() {
    cmd()
        .args(["parse-date", "2011/04/12 20:54:11 +0200"])
        .assert()
        .success()
        .stdout("2011-04-12T18:54:11Z\n");
}

#[test]
fn parse_date_rejects_unknown_format() {
    cmd()
        .args(["parse-date", "23-01-01T00:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Unable to parse the timestamp: 23-01-01T00:00Z",
        ));
}

#[test]
fn print_date_from_epoch() {
    cmd()
        .args(["print-date", "--epoch", "0"])
        .assert()
        .success()
        .stdout("1970-01-01T00:00:00Z\n");
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("github-client "));
}

#[test]
fn rate_limit_command() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rate_limit");
        then.status(200).json_body(serde_json::json!({
            "resources": {
                "core": {"limit": 60, "remaining": 59, "reset": 0}
            }
        }));
    });
    cmd()
        .arg("rate-limit")
        .env("GITHUB_API_URL", server.base_url())
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"remaining\":59"))
        .stdout(predicate::str::contains("\"reset\":\"1970-01-01T00:00:00Z\""))
        .stdout(predicate::str::contains("\"unknown\":true"));
}
