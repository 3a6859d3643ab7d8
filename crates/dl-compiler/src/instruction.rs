use std::sync::OnceLock;

use dl_core::{
    is_state_key, is_variable_name, Assignment, DialogueError, Pattern, SourceSpan, Transition,
    TransitionKey, WILDCARD_TOKEN,
};
use dl_expr::{is_well_formed, ExprKind};
use regex::Regex;

pub(crate) const RETRY_MARKER: char = '#';
pub(crate) const TRANSITION_SEP: &str = "->";
pub(crate) const ASSIGN_SEP: &str = "<-";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Instruction {
    Retry(String),
    Transition(Transition),
    Assignment(Assignment),
}

/// The greedy `.*` takes the last `", ` so guards cannot contain quotes.
fn guarded_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"^"(.*)", (.*)$"#).expect("guarded transition regex"))
}

fn quoted_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#"^"(.*)"$"#).expect("quoted transition regex"))
}

/// Classifies a trimmed instruction line. Marker checks run in priority
/// order: retry, transition, assignment.
pub(crate) fn classify(text: &str, line: usize) -> Result<Instruction, DialogueError> {
    if let Some(retry) = text.strip_prefix(RETRY_MARKER) {
        return Ok(Instruction::Retry(retry.trim().to_string()));
    }

    if let Some((left, right)) = text.split_once(TRANSITION_SEP) {
        let target = right.trim();
        if !is_state_key(target) {
            return Err(DialogueError::compile(
                "COMPILE_TARGET_INVALID",
                "Invalid transition target.",
                target,
                line,
            ));
        }
        let key = parse_transition_key(left.trim(), line)?;
        return Ok(Instruction::Transition(Transition {
            key,
            target: target.to_string(),
        }));
    }

    if let Some((left, right)) = text.split_once(ASSIGN_SEP) {
        let target = left.trim();
        if !is_variable_name(target) {
            return Err(DialogueError::compile(
                "COMPILE_VARIABLE_INVALID",
                "Bad variable name.",
                target,
                line,
            ));
        }
        return Ok(Instruction::Assignment(Assignment {
            target: target.to_string(),
            value: right.trim().to_string(),
        }));
    }

    Err(DialogueError::compile(
        "COMPILE_INSTRUCTION_UNRECOGNIZED",
        "Line is not a retry prompt, transition or assignment.",
        text,
        line,
    ))
}

pub(crate) fn parse_transition_key(text: &str, line: usize) -> Result<TransitionKey, DialogueError> {
    if text == WILDCARD_TOKEN {
        return Ok(TransitionKey::Wildcard);
    }

    if let Some(captures) = guarded_regex().captures(text) {
        let source = captures.get(1).map_or("", |m| m.as_str());
        let guard = captures.get(2).map_or("", |m| m.as_str());
        if !is_well_formed(guard, ExprKind::Boolean) {
            return Err(DialogueError::compile(
                "COMPILE_GUARD_INVALID",
                "Badly formatted guard.",
                guard,
                line,
            ));
        }
        let pattern = compile_pattern(source, line)?;
        return Ok(TransitionKey::GuardedPattern {
            pattern,
            guard: guard.to_string(),
        });
    }

    if let Some(captures) = quoted_regex().captures(text) {
        let source = captures.get(1).map_or("", |m| m.as_str());
        let pattern = compile_pattern(source, line)?;
        return Ok(TransitionKey::Pattern { pattern });
    }

    Err(DialogueError::compile(
        "COMPILE_TRANSITION_INVALID",
        "Badly formatted transition instruction.",
        text,
        line,
    ))
}

fn compile_pattern(source: &str, line: usize) -> Result<Pattern, DialogueError> {
    Pattern::new(source).map_err(|error| error.with_span(SourceSpan::line(line)))
}
