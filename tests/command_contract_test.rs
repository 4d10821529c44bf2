use std::process::Command;

fn get_binary() -> String {
    env!("CARGO_BIN_EXE_teamcity-bdd").to_string()
}

const EVENT_LOG: &str = r#"{"event": "beforeFeature", "payload": {"feature": {"title": "Shop", "file": "features/shop.feature"}}}
{"event": "beforeScenario", "payload": {"scenario": {"title": "Buy apples"}}}
{"event": "afterStep", "payload": {"scenario": {"title": "Buy apples"}, "step": {"text": "I pay"}, "result": 4, "exception": {"message": "card declined"}}}
{"event": "afterScenario", "payload": {"scenario": {"title": "Buy apples"}, "result": 4}}
{"event": "afterFeature", "payload": {"feature": {"title": "Shop", "file": "features/shop.feature"}}}
"#;

#[test]
fn test_replay_writes_service_messages_to_file() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let log = temp_dir.path().join("events.jsonl");
    let out = temp_dir.path().join("teamcity.log");
    std::fs::write(&log, EVENT_LOG).expect("Failed to write event log");

    let output = Command::new(get_binary())
        .current_dir(temp_dir.path())
        .args(["replay", "--schema", "v1", "-o"])
        .arg(&out)
        .arg(&log)
        .output()
        .expect("Failed to execute replay command");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let content = std::fs::read_to_string(&out).expect("Failed to read output");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "##teamcity[testSuiteStarted name='Shop' locationHint='file://features/shop.feature']",
            "##teamcity[testStarted name='Buy apples' captureStandardOutput='true']",
            "##teamcity[testFailed name='Buy apples' message='card declined']",
            "##teamcity[testFinished name='I pay']",
            "##teamcity[testFinished name='Buy apples']",
            "##teamcity[testSuiteFinished name='Shop' locationHint='file://features/shop.feature']",
        ]
    );
}

#[test]
fn test_log_file_keeps_stderr_for_service_messages() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let log = temp_dir.path().join("events.jsonl");
    let diagnostics = temp_dir.path().join("teamcity-bdd.log");
    std::fs::write(&log, EVENT_LOG).expect("Failed to write event log");

    let output = Command::new(get_binary())
        .current_dir(temp_dir.path())
        .env_remove("RUST_LOG")
        .args(["replay", "--schema", "v1", "--verbose", "--log-file"])
        .arg(&diagnostics)
        .arg(&log)
        .output()
        .expect("Failed to execute replay command");

    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.lines().count(), 6);
    assert!(stderr.lines().all(|line| line.starts_with("##teamcity[")));

    let logged = std::fs::read_to_string(&diagnostics).expect("Failed to read log file");
    assert!(logged.contains("DEBUG"));
}

#[test]
fn test_replay_rejects_unknown_event() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let log = temp_dir.path().join("events.jsonl");
    std::fs::write(&log, "{\"event\": \"beforeFeature\", \"payload\": {}}\n")
        .expect("Failed to write event log");

    let output = Command::new(get_binary())
        .current_dir(temp_dir.path())
        .args(["replay", "--schema", "v3", "-o", "stdout"])
        .arg(&log)
        .output()
        .expect("Failed to execute replay command");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_subscriptions_json_output() {
    let output = Command::new(get_binary())
        .args(["subscriptions", "--schema", "v2", "--format", "json"])
        .output()
        .expect("Failed to execute subscriptions command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");

    assert_eq!(json["schema"], "v2");
    assert_eq!(json["steps_as_tests"], false);
    assert_eq!(json["events"].as_array().map(Vec::len), Some(6));
}

#[test]
fn test_encode_to_stdout() {
    let output = Command::new(get_binary())
        .args([
            "encode",
            r#"{"event": "std_err", "name": "FeatureX.feature:12", "text": "assertion failed"}"#,
            "-o",
            "stdout",
        ])
        .output()
        .expect("Failed to execute encode command");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "##teamcity[testStdErr name='FeatureX.feature:12' out='assertion failed']\n"
    );
}
