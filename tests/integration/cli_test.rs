use std::path::PathBuf;
use std::process::{Command, Output};

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get_beehive_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_beehive"))
}

/// Runs the binary with a blank session so the host environment cannot leak in.
fn beehive_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(get_beehive_binary());
    cmd.args(args)
        .env_remove("BEEHIVE_TOKEN")
        .env_remove("BEEHIVE_USER_ID")
        .env_remove("BEEHIVE_ROLE")
        .env_remove("BEEHIVE_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn run_beehive(args: &[&str]) -> Output {
    beehive_command(args)
        .output()
        .expect("Failed to execute beehive command")
}

fn run_beehive_with_env(args: &[&str], env_vars: Vec<(&str, String)>) -> Output {
    let mut cmd = beehive_command(args);
    for (key, value) in env_vars {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute beehive command")
}

fn output_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let output = run_beehive(&["version"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout.contains("beehive"), "output should contain 'beehive'");
        assert!(stdout.contains("0.1.0"), "output should contain version number");
    }

    #[test]
    fn test_version_command_detailed() {
        let output = run_beehive(&["version", "--detailed"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version --detailed should succeed");
        assert!(stdout.contains("Version"));
        assert!(stdout.contains("License"));
        assert!(stdout.contains("Apache-2.0"));
    }

    #[test]
    fn test_version_flag() {
        let output = run_beehive(&["--version"]);
        assert!(output.status.success());
        assert!(output_to_string(&output).contains("0.1.0"));
    }
}

mod help_command_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let output = run_beehive(&["--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        for command in ["chat", "notifications", "uploads", "admin", "routes", "config"] {
            assert!(stdout.contains(command), "help should list '{}'", command);
        }
    }

    #[test]
    fn test_subcommand_help() {
        let output = run_beehive(&["uploads", "--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("list"));
        assert!(stdout.contains("delete"));
    }
}

mod invalid_command_tests {
    use super::*;

    #[test]
    fn test_unknown_command_fails() {
        let output = run_beehive(&["frobnicate"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("frobnicate"));
    }

    #[test]
    fn test_invalid_sentiment_rejected() {
        let output = run_beehive(&[
            "uploads", "add", "a.png", "--title", "t", "--description", "d", "--sentiment",
            "ecstatic",
        ]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("ecstatic"));
    }

    #[test]
    fn test_missing_session_suggests_fix() {
        let output = run_beehive(&["chat", "show"]);
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success());
        assert!(stderr.contains("E2001"), "stderr was: {}", stderr);
        assert!(stderr.contains("BEEHIVE_TOKEN"));
    }
}

mod routes_command_tests {
    use super::*;

    #[test]
    fn test_routes_resolve_for_admin() {
        let output = run_beehive(&["routes", "--role", "admin", "--resolve", "/admin/users/u7/uploads"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("User Uploads"));
        assert!(stdout.contains("u7"));
    }

    #[test]
    fn test_routes_redirect_for_user() {
        let output = run_beehive(&["routes", "--role", "user", "--resolve", "/admin"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("/no-access"));
    }

    #[test]
    fn test_routes_redirect_anonymous() {
        let output = run_beehive(&["routes", "--anonymous", "--resolve", "/gallery"]);
        assert!(output_to_string(&output).contains("/sign-in"));
    }
}

mod verbose_flag_tests {
    use super::*;

    #[test]
    fn test_verbose_is_global() {
        let output = run_beehive(&["version", "--verbose"]);
        assert!(output.status.success());

        let output = run_beehive(&["-v", "version"]);
        assert!(output.status.success());
    }
}

mod backend_tests {
    use super::*;

    fn session_env(server: &MockServer, role: &str) -> Vec<(&'static str, String)> {
        vec![
            ("BEEHIVE_API_URL", format!("{}/api", server.uri())),
            ("BEEHIVE_TOKEN", "test-token".to_string()),
            ("BEEHIVE_USER_ID", "user-42".to_string()),
            ("BEEHIVE_ROLE", role.to_string()),
        ]
    }

    async fn run_async(args: &'static [&'static str], env: Vec<(&'static str, String)>) -> Output {
        tokio::task::spawn_blocking(move || run_beehive_with_env(args, env))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_send_posts_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "content": "hello admin",
                "to_role": "admin"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let output = run_async(&["chat", "send", "hello admin"], session_env(&server, "user")).await;
        assert!(output.status.success(), "stderr: {}", stderr_to_string(&output));
        assert!(output_to_string(&output).contains("Message sent"));
    }

    #[tokio::test]
    async fn test_blank_message_never_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let output = run_async(&["chat", "send", "   "], session_env(&server, "user")).await;
        assert!(!output.status.success());
    }

    #[tokio::test]
    async fn test_notifications_json_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/notifications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "notifications": [
                    {"id": "n1", "username": "mira", "title": "Sunset", "timestamp": "2024-02-01T12:30:00Z", "seen": false},
                    {"id": "n2", "username": "ola", "title": "Memo", "timestamp": "2024-02-01T12:31:00Z", "seen": false}
                ]
            })))
            .mount(&server)
            .await;

        let output = run_async(
            &["notifications", "--format", "json"],
            session_env(&server, "admin"),
        )
        .await;
        assert!(output.status.success(), "stderr: {}", stderr_to_string(&output));

        let parsed: serde_json::Value = serde_json::from_str(&output_to_string(&output)).unwrap();
        assert_eq!(parsed["badge"], 2);
        assert_eq!(parsed["notifications"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_user_cannot_read_notifications() {
        let server = MockServer::start().await;
        let output = run_async(&["notifications"], session_env(&server, "user")).await;
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("admins"));
    }
}
