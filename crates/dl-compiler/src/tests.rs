use super::*;
use dl_core::{ErrorKind, TransitionKey, DEFAULT_START_PROMPT, END_STATE, START_STATE};

const GREETING: &str = r#"start
    Hi $response$? ->
    "^y" -> q2
    $count$ <- !num {$counter$+1}
    # Please answer yes.

q2
    Count is $count$.
    "dog", $count$ > 1 -> end
    "cat" -> end
    REST -> start
"#;

#[test]
fn compiles_blocks_in_source_order() {
    let script = compile(GREETING).expect("script should compile");
    let start = script.get(START_STATE).expect("start should exist");
    assert_eq!(start.prompt, "Hi $response$? ->");
    assert_eq!(start.retry.as_deref(), Some("Please answer yes."));
    assert_eq!(start.transitions.len(), 1);
    assert_eq!(start.transitions[0].target, "q2");
    assert_eq!(start.assignments[0].target, "$count$");
    assert_eq!(start.assignments[0].value, "!num {$counter$+1}");

    let q2 = script.get("q2").expect("q2 should exist");
    let targets: Vec<&str> = q2
        .transitions
        .iter()
        .map(|transition| transition.target.as_str())
        .collect();
    assert_eq!(targets, vec!["end", "end", "start"]);
    assert!(matches!(
        &q2.transitions[0].key,
        TransitionKey::GuardedPattern { guard, .. } if guard == "$count$ > 1"
    ));
    assert_eq!(q2.wildcard_target(), Some("start"));
}

#[test]
fn empty_source_yields_seeded_machine() {
    let script = compile("").expect("empty source should compile");
    assert_eq!(script.len(), 2);
    let start = script.get(START_STATE).expect("start should exist");
    assert_eq!(start.prompt, DEFAULT_START_PROMPT);
    assert_eq!(start.wildcard_target(), Some(END_STATE));
    assert!(script
        .get(END_STATE)
        .expect("end should exist")
        .transitions
        .is_empty());
}

#[test]
fn explicit_start_replaces_default() {
    let script = compile("start\n    Welcome.\n").expect("script should compile");
    let start = script.get(START_STATE).expect("start should exist");
    assert_eq!(start.prompt, "Welcome.");
    assert!(start.transitions.is_empty());
    assert!(script.contains(END_STATE));
}

#[test]
fn duplicate_transitions_are_neither_merged_nor_reordered() {
    let source = "start\n    Q\n    \"b\" -> two\n    \"a\" -> one\n    \"b\" -> three\n";
    let script = compile(source).expect("script should compile");
    let start = script.get(START_STATE).expect("start should exist");
    let summary: Vec<(String, &str)> = start
        .transitions
        .iter()
        .map(|transition| {
            (
                transition.key.pattern().source().to_string(),
                transition.target.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("b".to_string(), "two"),
            ("a".to_string(), "one"),
            ("b".to_string(), "three"),
        ]
    );
}

#[test]
fn last_retry_line_wins() {
    let source = "start\n    Q\n    # first\n    #second\n";
    let script = compile(source).expect("script should compile");
    assert_eq!(
        script.get(START_STATE).and_then(|state| state.retry.as_deref()),
        Some("second")
    );
}

#[test]
fn later_block_replaces_earlier_block_with_same_key() {
    let source = "q\n    First\n\nq\n    Second\n";
    let script = compile(source).expect("script should compile");
    assert_eq!(script.get("q").map(|state| state.prompt.as_str()), Some("Second"));
}

#[test]
fn compile_errors_point_at_the_offending_line() {
    let source = "start\n    Q\n    \"ok\" -> end\n    $bad name$ <- 1\n";
    let error = compile(source).expect_err("compile should fail");
    assert_eq!(error.kind, ErrorKind::Compile);
    assert_eq!(error.code, "COMPILE_VARIABLE_INVALID");
    assert_eq!(error.offending_text.as_deref(), Some("$bad name$"));
    assert_eq!(error.span.map(|span| span.start.line), Some(4));
}

#[test]
fn each_compile_error_category_is_reported() {
    let cases = [
        ("bad key\n    Q\n", "COMPILE_STATE_KEY_INVALID"),
        ("start\n    Q\n    \"x\" -> no way\n", "COMPILE_TARGET_INVALID"),
        ("start\n    Q\n    \"x\", print(1) -> end\n", "COMPILE_GUARD_INVALID"),
        ("start\n    Q\n    \"[\" -> end\n", "COMPILE_REGEX_INVALID"),
        ("start\n    Q\n    free text\n", "COMPILE_INSTRUCTION_UNRECOGNIZED"),
        ("start\n\n", "COMPILE_BLOCK_EMPTY"),
    ];
    for (source, code) in cases {
        let error = compile(source).expect_err("compile should fail");
        assert_eq!(error.code, code, "source {:?}", source);
        assert!(error.is_fatal());
    }
}

#[test]
fn unknown_targets_compile_and_are_listed() {
    let script = compile("start\n    Q\n    \"x\" -> missing\n").expect("script should compile");
    assert_eq!(
        unresolved_targets(&script),
        vec![("start".to_string(), "missing".to_string())]
    );
}

#[test]
fn compiled_script_dumps_as_json() {
    let script = compile(GREETING).expect("script should compile");
    let json = serde_json::to_value(&script).expect("script should serialize");
    assert_eq!(json["states"]["q2"]["transitions"][2]["key"]["kind"], "wildcard");
    assert_eq!(json["states"]["start"]["retry"], "Please answer yes.");
}
