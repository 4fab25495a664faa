use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const AGENT_ENV_VARS: &[&str] = &[
    "COMPANION_AGENT_ID",
    "COMPANION_AGENT_ALIAS_ID",
    "COMPANION_REGION",
    "COMPANION_ENDPOINT",
    "COMPANION_API_KEY",
];

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
        }
    }

    /// Write the default config file
    fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.xdg_config.join("companion/config.toml");
        fs::create_dir_all(path.parent().expect("missing config parent"))
            .expect("failed to create config dir");
        fs::write(&path, contents).expect("failed to write config");
        path
    }

    /// Config pointing at a loopback port nothing listens on
    fn write_unreachable_config(&self) -> PathBuf {
        self.write_config(
            r#"
[agent]
agent_id = "TLNTMJJLCH"
agent_alias_id = "HWKI11FXXR"
endpoint = "http://127.0.0.1:9"
api_key = "sk-test-abcdef9876"
timeout_secs = 5
connect_timeout_secs = 2
"#,
        )
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(assert_cmd::cargo::cargo_bin!("companion"));
        command
            .args(args)
            .env("HOME", &self.home)
            .env("XDG_CONFIG_HOME", &self.xdg_config)
            .env("XDG_STATE_HOME", &self.xdg_state)
            .env_remove("RUST_LOG");
        for var in AGENT_ENV_VARS {
            command.env_remove(var);
        }
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .unwrap_or_else(|e| panic!("failed to execute companion: {e}"))
    }

    fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap_or_else(|e| panic!("failed to spawn companion: {e}"));
        child
            .stdin
            .take()
            .expect("missing stdin")
            .write_all(stdin.as_bytes())
            .expect("failed to write stdin");
        child.wait_with_output().expect("failed to wait for companion")
    }
}

fn render_args(args: &[&str]) -> String {
    args.iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }
    panic!(
        "companion {} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        render_args(args),
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_failure(args: &[&str], output: &Output) {
    assert!(
        !output.status.success(),
        "companion {} unexpectedly succeeded\nstdout:\n{}",
        render_args(args),
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn surfaces_lists_catalogue() {
    let env = CliTestEnv::new();
    let args = ["surfaces"];

    let output = env.run(&args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in [
        "patient_assistant",
        "learner_chat",
        "learner_quiz",
        "provider_assistant",
        "visit_planner",
    ] {
        assert!(stdout.contains(id), "missing {id} in:\n{stdout}");
    }
}

#[test]
fn status_without_config_reports_missing_agent() {
    let env = CliTestEnv::new();
    let args = ["status"];

    let output = env.run(&args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(not found)"), "stdout:\n{stdout}");
    assert!(
        stdout.contains("Agent ID:     (not set)"),
        "stdout:\n{stdout}"
    );
    assert!(
        stdout.contains("Configuration: invalid"),
        "stdout:\n{stdout}"
    );
    assert!(
        stdout.contains("bedrock-agent-runtime.us-east-1.amazonaws.com"),
        "stdout:\n{stdout}"
    );
}

#[test]
fn status_masks_api_key_and_applies_surface_overrides() {
    let env = CliTestEnv::new();
    let config_path = env.write_config(
        r#"
[agent]
agent_id = "BASEAGENT"
agent_alias_id = "BASEALIAS"
api_key = "sk-live-secret-4321"

[surfaces.learner_quiz]
agent_id = "QUIZAGENT"
"#,
    );
    let config_arg = config_path.to_string_lossy().into_owned();
    let args = [
        "--config",
        config_arg.as_str(),
        "status",
        "--surface",
        "learner_quiz",
    ];

    let output = env.run(&args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("QUIZAGENT"), "stdout:\n{stdout}");
    assert!(stdout.contains("BASEALIAS"), "stdout:\n{stdout}");
    assert!(stdout.contains("****4321"), "stdout:\n{stdout}");
    assert!(
        !stdout.contains("sk-live-secret"),
        "secret leaked:\n{stdout}"
    );
    assert!(stdout.contains("Configuration: valid"), "stdout:\n{stdout}");
}

#[test]
fn env_overrides_fill_agent_config() {
    let env = CliTestEnv::new();
    let args = ["status"];

    let output = env
        .command(&args)
        .env("COMPANION_AGENT_ID", "ENVAGENT")
        .env("COMPANION_AGENT_ALIAS_ID", "ENVALIAS")
        .env("COMPANION_REGION", "eu-west-1")
        .output()
        .expect("failed to execute companion");
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ENVAGENT"), "stdout:\n{stdout}");
    assert!(
        stdout.contains("bedrock-agent-runtime.eu-west-1.amazonaws.com"),
        "stdout:\n{stdout}"
    );
}

#[test]
fn send_rejects_blank_text() {
    let env = CliTestEnv::new();
    let args = ["send", "   "];

    let output = env.run(&args);
    assert_failure(&args, &output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid input"), "stderr:\n{stderr}");
}

#[test]
fn send_without_agent_config_fails() {
    let env = CliTestEnv::new();
    let args = ["send", "hello"];

    let output = env.run(&args);
    assert_failure(&args, &output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("agent_id"), "stderr:\n{stderr}");
}

#[test]
fn unknown_surface_is_rejected() {
    let env = CliTestEnv::new();
    let args = ["send", "--surface", "billing", "hello"];

    let output = env.run(&args);
    assert_failure(&args, &output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("billing"), "stderr:\n{stderr}");
}

#[test]
fn send_to_unreachable_agent_prints_fallback() {
    let env = CliTestEnv::new();
    env.write_unreachable_config();
    let args = ["send", "--surface", "learner_chat", "train", "a", "model"];

    let output = env.run(&args);
    assert_failure(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Sorry, the Learner Agent failed to respond."),
        "stdout:\n{stdout}"
    );
}

#[test]
fn chat_session_records_history() {
    let env = CliTestEnv::new();
    env.write_unreachable_config();
    let args = ["chat", "--surface", "visit_planner"];

    let output = env.run_with_stdin(&args, "plan tomorrow\n\n/history\n/quit\n");
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Hello! I can help you plan or review patient visits."),
        "stdout:\n{stdout}"
    );
    assert!(
        stdout.contains("Sorry, I couldn't process that request."),
        "stdout:\n{stdout}"
    );
    assert!(
        stdout.contains("[you · just now] plan tomorrow"),
        "stdout:\n{stdout}"
    );
    assert_eq!(
        stdout.matches("[assistant · ").count(),
        2,
        "expected greeting and fallback in history:\n{stdout}"
    );
}

#[test]
fn chat_ends_on_eof() {
    let env = CliTestEnv::new();
    env.write_unreachable_config();
    let args = ["chat"];

    let output = env.run_with_stdin(&args, "");
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ask about patients"), "stdout:\n{stdout}");
}
