use std::sync::OnceLock;

use dl_core::{DialogueError, ErrorKind};
use dl_expr::{evaluate_as_boolean, evaluate_as_number};
use regex::Regex;
use tracing::warn;

use crate::environment::Environment;

/// Text left in place of an arithmetic span that fails to evaluate.
pub const ARITHMETIC_FALLBACK: &str = "False";

/// Innermost `{...}` without `@`, `|` or nested braces.
fn arithmetic_span_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{[^@|{}]*?\}").expect("arithmetic span regex"))
}

/// Innermost `{guard@options}` without nested braces.
fn conditional_span_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{[^{}]*?@[^{}]*?\}").expect("conditional span regex"))
}

/// Expands `template` against `env`. Never fails; expression errors are
/// logged and replaced by fallback text.
pub fn render(template: &str, env: &Environment) -> String {
    let mut diagnostics = Vec::new();
    render_with_diagnostics(template, env, &mut diagnostics)
}

/// Same as [`render`], also collecting each recovered failure.
pub fn render_with_diagnostics(
    template: &str,
    env: &Environment,
    diagnostics: &mut Vec<DialogueError>,
) -> String {
    let text = substitute_variables(template, env);
    let text = resolve_arithmetic(text, diagnostics);
    resolve_conditionals(text, diagnostics)
}

/// Replaces every bound `$name$` token with its value in one pass.
/// Substituted text is never rescanned. A `$` that does not open a bound
/// name stays literal, so its closing `$` can still open the next name.
pub fn substitute_variables(template: &str, env: &Environment) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let bound = tail[1..]
            .find('$')
            .map(|end| &tail[..end + 2])
            .and_then(|token| env.get(token).map(|value| (token, value)));
        match bound {
            Some((token, value)) => {
                out.push_str(&value.to_string());
                rest = &tail[token.len()..];
            }
            None => {
                out.push('$');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_arithmetic(mut text: String, diagnostics: &mut Vec<DialogueError>) -> String {
    while let Some(span) = arithmetic_span_regex().find(&text) {
        let range = span.range();
        let inner = &text[range.start + 1..range.end - 1];
        let replacement = match evaluate_as_number(inner) {
            Ok(value) => value.to_string(),
            Err(error) => {
                let diagnostic = DialogueError::new(
                    ErrorKind::InvalidExpression,
                    "TEMPLATE_ARITHMETIC",
                    format!("Bad arithmetic expression in text: {}", error.message),
                )
                .with_offending_text(inner);
                warn!(code = %diagnostic.code, expression = inner, "{}", diagnostic.message);
                diagnostics.push(diagnostic);
                ARITHMETIC_FALLBACK.to_string()
            }
        };
        text.replace_range(range, &replacement);
    }
    text
}

fn resolve_conditionals(mut text: String, diagnostics: &mut Vec<DialogueError>) -> String {
    while let Some(span) = conditional_span_regex().find(&text) {
        let range = span.range();
        let inner = &text[range.start + 1..range.end - 1];
        let replacement = choose_option(inner, diagnostics);
        text.replace_range(range, &replacement);
    }
    text
}

fn choose_option(inner: &str, diagnostics: &mut Vec<DialogueError>) -> String {
    let (guard, options_text) = inner.split_once('@').unwrap_or((inner, ""));

    if let Ok(flag) = evaluate_as_boolean(guard) {
        let (first, second) = options_text.split_once('|').unwrap_or((options_text, ""));
        return if flag { first } else { second }.to_string();
    }

    let options: Vec<&str> = options_text.split('|').collect();
    let last = options.last().copied().unwrap_or("");
    match guard.trim().parse::<i64>() {
        Ok(index) if index >= 0 => options
            .get(index as usize)
            .copied()
            .unwrap_or(last)
            .to_string(),
        // negative indices clamp like out-of-range ones
        Ok(_) => last.to_string(),
        Err(_) => {
            let diagnostic = DialogueError::new(
                ErrorKind::InvalidExpression,
                "TEMPLATE_CONDITIONAL_GUARD",
                "Bad guard in text; using the last option.",
            )
            .with_offending_text(guard);
            warn!(code = %diagnostic.code, guard = guard, "{}", diagnostic.message);
            diagnostics.push(diagnostic);
            last.to_string()
        }
    }
}
