// Tests for schema adapters - every generation must classify outcomes alike

use std::collections::HashMap;

use serde_json::{Value, json};
use teamcity_bdd::event::{CanonicalEvent, Outcome, StepStatus};
use teamcity_bdd::protocol::parse_line;
use teamcity_bdd::{
    Dispatcher, Encoder, EscapeMode, Formatter, Generation, OutputSink, ReportError,
    TeamCityFormatter,
};

/// Raw encoding of `status` in each generation's scenario result
fn scenario_result(generation: Generation, status: StepStatus) -> Value {
    let (v1_code, v2_code) = match status {
        StepStatus::Passed => (0, 0),
        StepStatus::Skipped => (1, 10),
        StepStatus::Pending => (2, 20),
        StepStatus::Undefined => (3, 30),
        StepStatus::Failed => (4, 99),
    };
    match generation {
        Generation::V1 => json!(v1_code),
        Generation::V2 => json!({"code": v2_code}),
        Generation::V3 => json!({"status": status.as_str()}),
    }
}

fn after_scenario(generation: Generation) -> &'static str {
    match generation {
        Generation::V1 => "afterScenario",
        _ => "tester.scenario_tested.after",
    }
}

/// Verdict events a generation attributes to scenario "Checkout" for `status`
fn scenario_verdict(generation: Generation, status: StepStatus) -> Vec<CanonicalEvent> {
    let result = scenario_result(generation, status);
    let (event, payload) = match generation {
        // V1 classifies the scenario from its steps
        Generation::V1 => (
            "afterStep",
            json!({"scenario": {"title": "Checkout"}, "step": {"text": "I pay"}, "result": result}),
        ),
        _ => (
            after_scenario(generation),
            json!({"scenario": {"title": "Checkout"}, "result": result}),
        ),
    };
    Dispatcher::new(generation)
        .dispatch(event, &payload)
        .expect("valid payload")
        .into_iter()
        .filter(|e| !matches!(e, CanonicalEvent::TestFinished { .. }))
        .collect()
}

#[test]
fn test_scenario_outcome_policy_is_identical_across_generations() {
    for status in StepStatus::ALL {
        // Act
        let outputs: Vec<_> = Generation::ALL
            .into_iter()
            .map(|generation| scenario_verdict(generation, status))
            .collect();

        // Assert
        assert!(outputs.windows(2).all(|w| w[0] == w[1]), "{:?}", status);
        let expected: Vec<_> = CanonicalEvent::verdict(Outcome::from(status), "Checkout", None)
            .into_iter()
            .collect();
        assert_eq!(outputs[0], expected, "{:?}", status);
    }
}

#[test]
fn test_v1_after_scenario_only_closes_the_scenario() {
    for status in StepStatus::ALL {
        // Arrange
        let payload = json!({
            "scenario": {"title": "Checkout"},
            "result": scenario_result(Generation::V1, status),
        });

        // Act
        let events = Dispatcher::new(Generation::V1)
            .dispatch("afterScenario", &payload)
            .expect("valid payload");

        // Assert
        assert_eq!(events, vec![CanonicalEvent::test_finished("Checkout")], "{:?}", status);
    }
}

#[test]
fn test_full_v1_scenario_has_one_verdict_per_entity() {
    // Arrange
    let (sink, buffer) = OutputSink::memory();
    let formatter = TeamCityFormatter::new(Generation::V1, Encoder::default(), sink);
    let scenario = json!({"title": "Checkout"});
    let events = [
        ("beforeScenario", json!({"scenario": scenario})),
        (
            "afterStep",
            json!({
                "scenario": scenario,
                "step": {"text": "I pay"},
                "result": 4,
                "exception": {"message": "card declined"}
            }),
        ),
        (
            "afterStep",
            json!({"scenario": scenario, "step": {"text": "I get a receipt"}, "result": 1}),
        ),
        ("afterScenario", json!({"scenario": scenario, "result": 4})),
    ];

    // Act
    for (event, payload) in &events {
        formatter.handle(event, payload).expect("valid event");
    }

    // Assert
    let contents = buffer.contents();
    let mut pending: HashMap<String, usize> = HashMap::new();
    for line in contents.lines() {
        let message = parse_line(line, EscapeMode::TeamCity).expect("service message");
        let name = message.get("name").unwrap_or_default().to_string();
        match message.kind.as_str() {
            "testFailed" | "testIgnored" => *pending.entry(name).or_default() += 1,
            "testFinished" => {
                let verdicts = pending.remove(&name).unwrap_or(0);
                assert!(verdicts <= 1, "{} got {} verdicts", name, verdicts);
            }
            _ => {}
        }
    }
    assert!(pending.is_empty(), "verdict without a finish: {:?}", pending);
    assert_eq!(
        contents
            .matches("testFailed name='Checkout' message='card declined'")
            .count(),
        1
    );
    assert!(!contents.contains("testIgnored"));
}

#[test]
fn test_undefined_step_fails_before_finishing_in_v1() {
    // Arrange
    let payload = json!({
        "scenario": {"title": "Checkout"},
        "step": {"text": "I pay with bitcoin", "keyword": "When"},
        "result": 3
    });

    // Act
    let events = Dispatcher::new(Generation::V1)
        .dispatch("afterStep", &payload)
        .expect("valid payload");

    // Assert
    let failed = events
        .iter()
        .position(|e| matches!(e, CanonicalEvent::TestFailed { .. }))
        .expect("TestFailed emitted");
    let finished = events
        .iter()
        .position(|e| matches!(e, CanonicalEvent::TestFinished { .. }))
        .expect("TestFinished emitted");
    assert!(failed < finished);
}

#[test]
fn test_step_exception_is_relayed_verbatim() {
    let message = "Failed asserting that 'a' matches\n  expected 'b'";
    for (generation, result) in [
        (Generation::V2, json!({"code": 99})),
        (Generation::V3, json!({"status": "failed"})),
    ] {
        // Arrange
        let mut result = result;
        result["exception"] = json!({"file": "FeatureX.feature", "line": 12, "message": message});
        let payload = json!({"step": {"text": "I check"}, "result": result});

        // Act
        let events = Dispatcher::new(generation)
            .dispatch("tester.step_tested.after", &payload)
            .expect("valid payload");

        // Assert
        assert_eq!(
            events,
            vec![
                CanonicalEvent::std_err("FeatureX.feature:12", message),
                CanonicalEvent::std_out("I check", "I check"),
            ]
        );
    }
}

#[test]
fn test_missing_titles_fail_loudly_everywhere() {
    let cases = [
        (Generation::V1, "beforeFeature", json!({"feature": {"file": "a.feature"}})),
        (Generation::V1, "afterStep", json!({"scenario": {"title": "S"}, "step": {}, "result": 0})),
        (Generation::V2, "tester.scenario_tested.before", json!({"scenario": {"title": ""}})),
        (Generation::V3, "tester.step_tested.after", json!({"step": {"text": " "}, "result": {"status": "passed"}})),
    ];

    for (generation, event, payload) in cases {
        let result = Dispatcher::new(generation).dispatch(event, &payload);
        assert!(
            matches!(result, Err(ReportError::MissingTitle { .. })),
            "{} {}",
            generation,
            event
        );
    }
}

#[test]
fn test_payload_of_wrong_shape_is_malformed() {
    let result = Dispatcher::new(Generation::V2).dispatch(
        "tester.scenario_tested.after",
        &json!({"scenario": {"title": "S"}, "result": {"status": "passed"}}),
    );
    assert!(matches!(result, Err(ReportError::MalformedPayload { .. })));
}

#[test]
fn test_titles_are_relayed_untrimmed() {
    // Arrange
    let payload = json!({"feature": {"title": " Shop "}});

    // Act
    let events = Dispatcher::new(Generation::V3)
        .dispatch("tester.feature_tested.before", &payload)
        .expect("valid payload");

    // Assert
    assert_eq!(events, vec![CanonicalEvent::suite_started(" Shop ", None)]);
}
