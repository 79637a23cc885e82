//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, Commands};
use clap::Parser;
use std::io::Write;

fn policy_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "allowedOrigins: [\"https://*.example.com\"]\n\
         allowedMethods: [PUT]\n\
         allowedHeaders: [X-Request-Id]\n\
         allowCredentials: true"
    )
    .unwrap();
    file
}

fn run(args: &[&str]) -> (bool, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let allowed = run_cli(&cli, &mut out).unwrap();
    (allowed, String::from_utf8(out).unwrap())
}

#[test]
fn test_check_command_parses() {
    let cli = Cli::try_parse_from([
        "brrtcors",
        "check",
        "--config",
        "cors.yaml",
        "--origin",
        "https://a.example.com",
        "--method",
        "PUT",
        "--headers",
        "x-request-id",
    ])
    .unwrap();

    match cli.command {
        Commands::Check { config, origin, method, headers, private_network } => {
            assert_eq!(config.to_string_lossy(), "cors.yaml");
            assert_eq!(origin, "https://a.example.com");
            assert_eq!(method.as_deref(), Some("PUT"));
            assert_eq!(headers.as_deref(), Some("x-request-id"));
            assert!(!private_network);
        }
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_headers_require_method() {
    assert!(Cli::try_parse_from([
        "brrtcors", "check", "--config", "c.yaml", "--origin", "https://a.example", "--headers", "x"
    ])
    .is_err());
}

#[test]
fn test_validate_ok() {
    let file = policy_file();
    let path = file.path().to_str().unwrap();
    let (ok, out) = run(&["brrtcors", "validate", "--config", path]);
    assert!(ok);
    assert!(out.ends_with(": ok\n"));
}

#[test]
fn test_check_preflight_allowed() {
    let file = policy_file();
    let path = file.path().to_str().unwrap();
    let (ok, out) = run(&[
        "brrtcors", "check", "--config", path, "--origin", "https://a.example.com",
        "--method", "PUT", "--headers", "x-request-id",
    ]);
    assert!(ok);
    assert!(out.starts_with("ALLOWED 204"));
    assert!(out.contains("access-control-allow-origin: https://a.example.com"));
    assert!(out.contains("access-control-allow-headers: x-request-id"));
}

#[test]
fn test_check_preflight_rejected() {
    let file = policy_file();
    let path = file.path().to_str().unwrap();
    let (ok, out) = run(&[
        "brrtcors", "check", "--config", path, "--origin", "https://example.org", "--method", "PUT",
    ]);
    assert!(!ok);
    assert!(out.starts_with("REJECTED 403"));
    assert!(!out.contains("access-control-allow-origin"));
}

#[test]
fn test_check_actual_request() {
    let file = policy_file();
    let path = file.path().to_str().unwrap();
    let (ok, out) = run(&["brrtcors", "check", "--config", path, "--origin", "https://b.example.com"]);
    assert!(ok);
    assert!(out.contains("vary: Origin"));
    assert!(out.contains("access-control-allow-credentials: true"));
}

#[test]
fn test_invalid_policy_is_an_error() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"allowedOrigins": ["*"], "allowCredentials": true}}"#).unwrap();
    let cli = Cli::try_parse_from(["brrtcors", "validate", "--config", file.path().to_str().unwrap()])
        .unwrap();
    let err = run_cli(&cli, &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("wildcard origin"));
}
