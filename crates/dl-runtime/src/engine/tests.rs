use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dl_compiler::compile;
use dl_core::{DlValue, EngineOutput, ErrorKind, Number, CALL_VAR, LAST_MATCH_VAR, RESPONSE_VAR};

use super::*;
use crate::host::FnHostCallRegistry;

fn engine_from_source(source: &str) -> DialogueEngine {
    let script = compile(source).expect("compile should pass");
    DialogueEngine::new(EngineOptions::new(Arc::new(script))).expect("engine should build")
}

fn started(source: &str) -> DialogueEngine {
    let mut engine = engine_from_source(source);
    engine.start().expect("start should pass");
    engine
}

fn prompt(text: &str) -> EngineOutput {
    EngineOutput::Prompt {
        text: text.to_string(),
    }
}

fn retry(text: &str) -> EngineOutput {
    EngineOutput::Retry {
        text: text.to_string(),
    }
}

const GREETING: &str = r#"start
    Hi $response$? ->
    "^y" -> q2
    $count$ <- !num {$counter$+1}

q2
    Count is $count$ on turn $counter$.
    REST -> end
"#;

#[test]
fn greeting_scenario_binds_count_and_renders_next_prompt() {
    let mut engine = engine_from_source(GREETING);
    assert_eq!(
        engine.start().expect("start should pass"),
        prompt("Hi $response$? ->")
    );

    let output = engine.respond("yes").expect("respond should pass");
    assert_eq!(output, prompt("Count is 2 on turn 2."));
    assert_eq!(engine.current_state(), "q2");
    assert_eq!(
        engine.environment().get("$count$"),
        Some(&DlValue::Number(Number::Int(2)))
    );
    assert_eq!(
        engine.environment().get(LAST_MATCH_VAR),
        Some(&DlValue::from("y"))
    );

    assert_eq!(engine.respond("anything").expect("respond should pass"), EngineOutput::End);
    assert!(engine.is_ended());
    assert_eq!(engine.current_output().expect("output should pass"), EngineOutput::End);
}

#[test]
fn unmatched_response_retries_with_default_prefix_and_keeps_state() {
    let mut engine = started(GREETING);
    let output = engine.respond("nope").expect("respond should pass");
    assert_eq!(output, retry("Sorry, I didn't get that. Hi nope? ->"));
    assert_eq!(engine.current_state(), "start");
    assert_eq!(engine.environment().counter(), 1);
    assert_eq!(engine.environment().get("$count$"), None);
    assert_eq!(
        engine.environment().get(RESPONSE_VAR),
        Some(&DlValue::from("nope"))
    );

    let diagnostics = engine.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::TransitionResolution);
    assert!(engine.take_diagnostics().is_empty());
    assert_eq!(engine.current_output().expect("output should pass"), output);
}

#[test]
fn retry_template_replaces_default_message() {
    let mut engine = started("start\n    Pick a colour.\n    \"red\" -> end\n    # Only red, $response$ won't do.\n");
    assert_eq!(
        engine.respond("blue").expect("respond should pass"),
        retry("Only red, blue won't do.")
    );
    assert_eq!(engine.respond("RED!").expect("respond should pass"), EngineOutput::End);
}

#[test]
fn wildcard_is_fallback_only() {
    let source = "start\n    Q\n    REST -> b\n    \"^y\" -> a\n\na\n    In A\n\nb\n    In B\n";
    let mut engine = started(source);
    assert_eq!(engine.respond("no").expect("respond should pass"), prompt("In B"));
    assert_eq!(
        engine.environment().get(LAST_MATCH_VAR),
        Some(&DlValue::from(""))
    );

    let mut engine = started(source);
    assert_eq!(engine.respond("yes").expect("respond should pass"), prompt("In A"));
}

#[test]
fn first_matching_transition_wins_in_declared_order() {
    let source = "start\n    Q\n    \"a\" -> one\n    \"ab\" -> two\n\none\n    One\n\ntwo\n    Two\n";
    let mut engine = started(source);
    assert_eq!(engine.respond("xab").expect("respond should pass"), prompt("One"));
}

#[test]
fn guards_see_current_variables_and_failures_do_not_match() {
    let source = r#"start
    Level?
    "up", $level$ > 1 -> high
    "up", $missing$ -> broken
    "up" -> low
    $level$ <- !num 2

high
    High
    "again" -> start

low
    Low
"#;
    let mut engine = started(source);
    assert_eq!(engine.respond("up").expect("respond should pass"), prompt("Low"));
    let codes: Vec<String> = engine
        .take_diagnostics()
        .into_iter()
        .map(|diagnostic| diagnostic.code)
        .collect();
    // the first guard cannot evaluate before $level$ exists
    assert_eq!(codes, vec!["ENGINE_GUARD_FAILED", "ENGINE_GUARD_FAILED"]);
}

#[test]
fn guard_passes_once_variable_is_bound() {
    let source = r#"start
    Level?
    "up", $level$ > 1 -> high
    "go" -> start
    $level$ <- !num {$counter$ + 1}

high
    High
"#;
    let mut engine = started(source);
    assert_eq!(engine.respond("go").expect("respond should pass"), prompt("Level?"));
    assert_eq!(engine.respond("up").expect("respond should pass"), prompt("High"));
}

#[test]
fn assignments_preserve_existing_types_and_default_to_text() {
    let source = r#"start
    Go
    "go" -> next
    $flag$ <- !bool 1 < 2
    $n$ <- !num 2.5
    $name$ <- Ada {1 + 1}
    $flag$ <- not $flag$
    $n$ <- $n$ * 2
    $name$ <- $name$!

next
    $flag$ $n$ $name$
"#;
    let mut engine = started(source);
    assert_eq!(
        engine.respond("go").expect("respond should pass"),
        prompt("false 5.0 Ada 2!")
    );
    assert!(engine.take_diagnostics().is_empty());
}

#[test]
fn bad_assignments_are_skipped_with_diagnostics() {
    let source = r#"start
    Go
    "go" -> next
    $n$ <- !num 1
    $n$ <- hello
    $b$ <- !bool 3
    $counter$ <- 99
    $call$ <- nothing

next
    n=$n$ b=$b$ turn=$counter$
"#;
    let mut engine = started(source);
    assert_eq!(
        engine.respond("go").expect("respond should pass"),
        prompt("n=1 b=$b$ turn=2")
    );
    let diagnostics = engine.take_diagnostics();
    let codes: Vec<&str> = diagnostics
        .iter()
        .map(|diagnostic| diagnostic.code.as_str())
        .collect();
    assert_eq!(
        codes,
        vec![
            "ENGINE_ASSIGN_TYPE",
            "ENGINE_ASSIGN_TYPE",
            "ENGINE_ASSIGN_RESERVED",
            "ENGINE_CALL_UNKNOWN",
        ]
    );
    assert!(diagnostics
        .iter()
        .all(|diagnostic| diagnostic.kind == ErrorKind::BadAssignment));
}

#[test]
fn unknown_target_ends_conversation_fatally() {
    let mut engine = started("start\n    Q\n    \"x\" -> nowhere\n");
    let error = engine.respond("x").expect_err("respond should fail");
    assert_eq!(error.kind, ErrorKind::UnknownStateReference);
    assert_eq!(error.code, "ENGINE_STATE_UNKNOWN");
    assert!(error.is_fatal());
    assert!(engine.is_ended());
    let error = engine.respond("x").expect_err("respond should fail");
    assert_eq!(error.code, "ENGINE_ENDED");
}

#[test]
fn respond_before_start_is_protocol_error() {
    let mut engine = engine_from_source(GREETING);
    let error = engine.respond("yes").expect_err("respond should fail");
    assert_eq!(error.kind, ErrorKind::Protocol);
    assert_eq!(error.code, "ENGINE_NOT_STARTED");
    assert!(engine.current_output().is_err());
}

const CALLING: &str = r#"start
    Roll?
    "roll" -> result
    $before$ <- set
    $call$ <- dice
    $after$ <- got $call$

result
    $before$, $after$.
"#;

#[test]
fn synchronous_host_call_binds_result_inline() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let registry = FnHostCallRegistry::new().register("dice", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("6".to_string())
    });
    let script = compile(CALLING).expect("compile should pass");
    let mut options = EngineOptions::new(Arc::new(script));
    options.host_calls = Some(Arc::new(registry));
    let mut engine = DialogueEngine::new(options).expect("engine should build");
    engine.start().expect("start should pass");

    assert_eq!(
        engine.respond("roll").expect("respond should pass"),
        prompt("set, got 6.")
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.environment().get(CALL_VAR), Some(&DlValue::from("6")));
}

#[test]
fn failing_host_call_is_skipped() {
    let registry = FnHostCallRegistry::new().register("dice", || {
        Err(dl_core::DialogueError::new(ErrorKind::Host, "DICE_LOST", "no dice"))
    });
    let script = compile(CALLING).expect("compile should pass");
    let mut options = EngineOptions::new(Arc::new(script));
    options.host_calls = Some(Arc::new(registry));
    let mut engine = DialogueEngine::new(options).expect("engine should build");
    engine.start().expect("start should pass");

    assert_eq!(
        engine.respond("roll").expect("respond should pass"),
        prompt("set, got $call$.")
    );
    let diagnostics = engine.take_diagnostics();
    assert_eq!(diagnostics[0].kind, ErrorKind::Host);
    assert_eq!(diagnostics[0].code, "DICE_LOST");
}

#[test]
fn deferred_host_call_suspends_and_resumes_turn() {
    let registry = FnHostCallRegistry::new().register("dice", || Ok("unused".to_string()));
    let script = compile(CALLING).expect("compile should pass");
    let mut options = EngineOptions::new(Arc::new(script));
    options.host_calls = Some(Arc::new(registry));
    options.defer_host_calls = true;
    let mut engine = DialogueEngine::new(options).expect("engine should build");
    engine.start().expect("start should pass");

    let output = engine.respond("roll").expect("respond should pass");
    assert_eq!(
        output,
        EngineOutput::Call {
            name: "dice".to_string()
        }
    );
    assert_eq!(engine.waiting_call(), Some("dice"));
    assert_eq!(engine.current_output().expect("output should pass"), output);
    assert_eq!(engine.current_state(), "start");
    assert_eq!(engine.environment().counter(), 1);

    let error = engine.respond("again").expect_err("respond should fail");
    assert_eq!(error.code, "ENGINE_CALL_PENDING");

    assert_eq!(
        engine.complete_call("3").expect("complete should pass"),
        prompt("set, got 3.")
    );
    assert_eq!(engine.waiting_call(), None);
    assert_eq!(engine.environment().counter(), 2);

    let error = engine.complete_call("4").expect_err("complete should fail");
    assert_eq!(error.code, "ENGINE_NO_PENDING_CALL");
}

#[test]
fn custom_retry_prefix_and_escape_decoding_apply_to_output() {
    let script = compile("start\n    Line one\\nLine two\n    \"ok\" -> end\n")
        .expect("compile should pass");
    let mut options = EngineOptions::new(Arc::new(script));
    options.retry_prefix = Some("Eh? ".to_string());
    let mut engine = DialogueEngine::new(options).expect("engine should build");
    assert_eq!(
        engine.start().expect("start should pass"),
        prompt("Line one\nLine two")
    );
    assert_eq!(
        engine.respond("what").expect("respond should pass"),
        retry("Eh? Line one\nLine two")
    );
}

#[test]
fn conversations_share_one_script() {
    let script = Arc::new(compile(GREETING).expect("compile should pass"));
    let handles: Vec<_> = (0..4)
        .map(|index| {
            let script = Arc::clone(&script);
            std::thread::spawn(move || {
                let mut engine = DialogueEngine::new(EngineOptions::new(script))
                    .expect("engine should build");
                engine.start().expect("start should pass");
                if index % 2 == 0 {
                    engine.respond("yes").expect("respond should pass")
                } else {
                    engine.respond("no").expect("respond should pass")
                }
            })
        })
        .collect();
    for (index, handle) in handles.into_iter().enumerate() {
        let output = handle.join().expect("thread should finish");
        if index % 2 == 0 {
            assert_eq!(output, prompt("Count is 2 on turn 2."));
        } else {
            assert!(matches!(output, EngineOutput::Retry { .. }));
        }
    }
}

#[test]
fn deeply_nested_response_is_contained_in_the_turn() {
    let mut engine = started(
        "start\n    Number?\n    \".\", $response$ > 0 -> show\n    REST -> show\n\nshow\n    Value {$response$ + 0}.\n    REST -> end\n",
    );
    let deep = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
    assert_eq!(
        engine.respond(&deep).expect("respond should pass"),
        prompt("Value False.")
    );
    let codes: Vec<String> = engine
        .take_diagnostics()
        .into_iter()
        .map(|diagnostic| diagnostic.code)
        .collect();
    assert_eq!(codes, vec!["ENGINE_GUARD_FAILED", "TEMPLATE_ARITHMETIC"]);
    assert_eq!(engine.respond("bye").expect("respond should pass"), EngineOutput::End);
}
