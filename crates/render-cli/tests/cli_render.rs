#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::process::Command;

use mockito::Matcher;
use tempfile::TempDir;

/// A `render-command` invocation isolated from the user's config and env.
fn render_command(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_render-command"));
    cmd.current_dir(home.path())
        .env("RENDER_COMMAND_HOME", home.path())
        .env_remove("AUTH_SALT")
        .env_remove("RENDER_COMMAND_URL")
        .env_remove("RENDER_COMMAND_WP_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn wp_site(wp_config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("wp-load.php"), "<?php\n").unwrap();
    std::fs::write(dir.path().join("wp-config.php"), wp_config).unwrap();
    dir
}

#[test]
fn http_code_format_prints_status() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/contact")
        .with_status(200)
        .with_body("<html>contact</html>")
        .create();

    let output = render_command(&home)
        .args(["--url", &server.url(), "render", "/contact", "--format=http_code"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "200\n");
    mock.assert();
}

#[test]
fn raw_format_is_the_default_and_prints_body() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/about-us/")
        .with_status(200)
        .with_body("<html>about</html>")
        .create();

    let output = render_command(&home)
        .args(["--url", &server.url(), "render", "/about-us/"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<html>about</html>\n"
    );
    mock.assert();
}

#[test]
fn non_success_status_is_not_an_error() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/gone/")
        .with_status(404)
        .with_body("not here")
        .create();

    let output = render_command(&home)
        .args(["--url", &server.url(), "render", "/gone/", "--format", "http_code"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "404");
    mock.assert();
}

#[test]
fn invalid_format_fails_before_any_request() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", Matcher::Any).expect(0).create();

    let output = render_command(&home)
        .args(["--url", &server.url(), "render", "/contact", "--format=bogus"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bogus"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
    mock.assert();
}

#[test]
fn zero_timeout_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", Matcher::Any).expect(0).create();

    let output = render_command(&home)
        .args(["--url", &server.url(), "render", "/", "--timeout", "0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--timeout"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
    mock.assert();
}

#[test]
fn missing_path_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    let output = render_command(&home)
        .args(["--url", "http://127.0.0.1:1", "render"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn transport_failure_is_fatal() {
    let home = TempDir::new().unwrap();
    let output = render_command(&home)
        .args(["--url", "http://127.0.0.1:1", "render", "/", "--timeout", "5"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not reach"), "stderr: {stderr}");
}

#[test]
fn missing_site_url_is_reported() {
    let home = TempDir::new().unwrap();
    let output = render_command(&home)
        .args(["render", "/"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no site URL configured"), "stderr: {stderr}");
}

#[test]
fn without_plugins_sends_token_from_wp_config_salt() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let site = wp_site(&format!(
        "<?php\ndefine( 'AUTH_SALT', 'test-salt' );\ndefine( 'WP_HOME', '{}' );\n",
        server.url()
    ));
    let mock = server
        .mock("GET", Matcher::Regex("^/$|^/\\?".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("exclude_plugins".into(), "jetpack,wordpress-seo".into()),
            Matcher::UrlEncoded(
                "exclusion_token".into(),
                "05e3ffdb084f8e9fcb3f432af3f1bc0a97b074a08e653ca3aeecadfea2e709b1".into(),
            ),
        ]))
        .with_status(200)
        .with_body("lean page")
        .create();

    let output = render_command(&home)
        .arg("--path")
        .arg(site.path())
        .args(["render", "/", "--without-plugins=jetpack,wordpress-seo"])
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "lean page\n");
    assert!(
        stderr.contains("requesting URL with plugin exclusion"),
        "stderr: {stderr}"
    );
    mock.assert();
}

#[test]
fn config_file_supplies_site_url() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/").with_status(204).create();
    std::fs::write(
        home.path().join("config.toml"),
        format!("site_url = \"{}\"\n", server.url()),
    )
    .unwrap();

    let output = render_command(&home)
        .args(["render", "/", "--format=http_code"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "204");
    mock.assert();
}

#[test]
fn malformed_config_file_is_fatal() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "site_url = [\n").unwrap();

    let output = render_command(&home)
        .args(["--url", "http://127.0.0.1:1", "render", "/"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"), "stderr: {stderr}");
}

#[test]
fn token_command_prints_token_for_env_salt() {
    let home = TempDir::new().unwrap();
    let output = render_command(&home)
        .env("AUTH_SALT", "test-salt")
        .arg("token")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "05e3ffdb084f8e9fcb3f432af3f1bc0a97b074a08e653ca3aeecadfea2e709b1"
    );
}

#[test]
fn token_command_warns_on_fallback_salt() {
    let home = TempDir::new().unwrap();
    let output = render_command(&home).arg("token").output().unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "2d437d958632d9ce53a4555ccc39c6eff3adcbd898ccaec3b4425cf3611b0427"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fallback salt"), "stderr: {stderr}");
}
