use dl_core::{
    is_engine_bound, is_variable_name, Assignment, DialogueError, DlValue, ErrorKind, CALL_VAR,
};
use dl_expr::{evaluate_as_boolean, evaluate_as_number};

use super::DialogueEngine;
use crate::template::render_with_diagnostics;

pub(super) const BOOL_TAG: &str = "!bool";
pub(super) const NUM_TAG: &str = "!num";

#[derive(Debug, Clone, PartialEq)]
pub(super) enum AssignOutcome {
    Applied,
    Skipped,
    Suspend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Bool,
    Number,
    Text,
}

impl DialogueEngine {
    pub(super) fn apply_assignment(&mut self, assignment: &Assignment) -> AssignOutcome {
        let target = assignment.target.as_str();
        if !is_variable_name(target) {
            return self.skip(
                "ENGINE_ASSIGN_NAME_INVALID",
                format!("Bad assignment attempted to \"{}\".", target),
                assignment,
            );
        }
        if is_engine_bound(target) {
            return self.skip(
                "ENGINE_ASSIGN_RESERVED",
                format!("\"{}\" is bound by the engine and cannot be assigned.", target),
                assignment,
            );
        }
        if target == CALL_VAR {
            return self.dispatch_call(assignment);
        }

        let (kind, template) = match assignment.value.split_once(' ') {
            Some((BOOL_TAG, rest)) => (ValueKind::Bool, rest),
            Some((NUM_TAG, rest)) => (ValueKind::Number, rest),
            _ => {
                let kind = match self.env.get(target) {
                    Some(DlValue::Bool(_)) => ValueKind::Bool,
                    Some(DlValue::Number(_)) => ValueKind::Number,
                    Some(DlValue::String(_)) | None => ValueKind::Text,
                };
                (kind, assignment.value.as_str())
            }
        };

        let text = render_with_diagnostics(template, &self.env, &mut self.diagnostics);
        let value = match kind {
            ValueKind::Text => Ok(DlValue::String(text)),
            ValueKind::Bool => evaluate_as_boolean(&text).map(DlValue::Bool),
            ValueKind::Number => evaluate_as_number(&text).map(DlValue::Number),
        };

        match value {
            Ok(value) => {
                self.env.bind(target, value);
                AssignOutcome::Applied
            }
            Err(error) => self.skip(
                "ENGINE_ASSIGN_TYPE",
                format!("Ill-typed assignment to {}: {}", target, error.message),
                assignment,
            ),
        }
    }

    fn dispatch_call(&mut self, assignment: &Assignment) -> AssignOutcome {
        let name = assignment.value.trim();
        if !self.host_calls.contains(name) {
            return self.skip(
                "ENGINE_CALL_UNKNOWN",
                format!("Can't execute host call \"{}\".", name),
                assignment,
            );
        }
        if self.defer_host_calls {
            return AssignOutcome::Suspend(name.to_string());
        }
        match self.host_calls.call(name) {
            Ok(result) => {
                self.env.bind(CALL_VAR, result);
                AssignOutcome::Applied
            }
            Err(error) => {
                self.record(
                    DialogueError::new(ErrorKind::Host, error.code, error.message)
                        .with_offending_text(name),
                );
                AssignOutcome::Skipped
            }
        }
    }

    fn skip(
        &mut self,
        code: &str,
        message: String,
        assignment: &Assignment,
    ) -> AssignOutcome {
        self.record(
            DialogueError::new(ErrorKind::BadAssignment, code, message)
                .with_offending_text(format!("{} <- {}", assignment.target, assignment.value)),
        );
        AssignOutcome::Skipped
    }
}
