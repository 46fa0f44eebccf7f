use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;

fn deskapi(server: &Server) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("deskapi"));
    cmd.env_clear()
        .env("DESKAPI_ENDPOINT_URL", server.url())
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_get_prints_body() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/tickets/1.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ticket":{"id":1,"subject":"Hello"}}"#)
        .create();

    deskapi(&server)
        .args(["get", "/tickets/1.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""subject":"Hello""#));

    mock.assert();
}

#[test]
fn test_get_with_cursor_pagination() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/tickets.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page[size]".into(), "2".into()),
            Matcher::UrlEncoded("page[after]".into(), "abc".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"tickets":[],"meta":{"has_more":false}}"#)
        .create();

    deskapi(&server)
        .args(["get", "/tickets.json", "--page-size", "2", "--page-after", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has_more"));

    mock.assert();
}

#[test]
fn test_post_with_api_token() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/tickets.json")
        .match_header(
            "authorization",
            "Basic YWdlbnRAZXhhbXBsZS5jb20vdG9rZW46YWJjMTIz",
        )
        .match_body(Matcher::JsonString(r#"{"ticket":{"subject":"Help"}}"#.to_string()))
        .with_status(201)
        .with_body(r#"{"ticket":{"id":7}}"#)
        .create();

    deskapi(&server)
        .env("DESKAPI_EMAIL", "agent@example.com")
        .env("DESKAPI_TOKEN", "abc123")
        .args(["post", "/tickets.json", "--data", r#"{"ticket":{"subject":"Help"}}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id":7"#));

    mock.assert();
}

#[test]
fn test_delete_with_bearer_token() {
    let mut server = Server::new();
    let mock = server
        .mock("DELETE", "/tickets/7.json")
        .match_header("authorization", "Bearer oauth-token")
        .with_status(204)
        .create();

    deskapi(&server)
        .args(["--token", "oauth-token", "--bearer", "delete", "/tickets/7.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    mock.assert();
}

#[test]
fn test_api_error_exits_non_zero() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/tickets/404.json")
        .with_status(404)
        .with_body(r#"{"error":"RecordNotFound"}"#)
        .create();

    deskapi(&server)
        .args(["get", "/tickets/404.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404").and(predicate::str::contains("RecordNotFound")));

    mock.assert();
}

#[test]
fn test_throttled_request_is_retried() {
    let mut server = Server::new();
    let throttled = server
        .mock("GET", "/users/me.json")
        .with_status(429)
        .with_header("retry-after", "1")
        .expect(1)
        .create();
    let ok = server
        .mock("GET", "/users/me.json")
        .with_status(200)
        .with_body(r#"{"user":{"id":1}}"#)
        .expect(1)
        .create();

    deskapi(&server)
        .args(["get", "/users/me.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""user""#));

    throttled.assert();
    ok.assert();
}

#[test]
fn test_invalid_subdomain_is_rejected() {
    let mut cmd = Command::new(cargo::cargo_bin!("deskapi"));
    cmd.env_clear()
        .args(["--subdomain", "BAD", "get", "/tickets.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid subdomain"));
}

#[test]
fn test_invalid_json_body_is_rejected() {
    let mut server = Server::new();
    let mock = server.mock("POST", Matcher::Any).expect(0).create();

    deskapi(&server)
        .args(["post", "/tickets.json", "--data", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));

    mock.assert();
}

#[test]
fn test_huge_timeout_is_accepted() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/tickets/1.json")
        .with_status(200)
        .with_body(r#"{"ticket":{"id":1}}"#)
        .create();

    deskapi(&server)
        .args(["--timeout", "18446744073709551615", "get", "/tickets/1.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id":1"#));

    mock.assert();
}
