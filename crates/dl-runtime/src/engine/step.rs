use std::sync::Arc;

use dl_core::{
    DialogueError, EngineOutput, ErrorKind, StateDefinition, END_STATE, LAST_MATCH_VAR,
    RESPONSE_VAR,
};
use dl_expr::evaluate_as_boolean;
use tracing::debug;

use super::assign::AssignOutcome;
use super::{DialogueEngine, PendingBoundary, PendingTurn};
use crate::template::substitute_variables;

impl DialogueEngine {
    /// Processes one response and returns what the caller should show next.
    pub fn respond(&mut self, response: &str) -> Result<EngineOutput, DialogueError> {
        self.ensure_awaiting_response()?;
        self.diagnostics.clear();
        self.env.bind(RESPONSE_VAR, response);

        let script = Arc::clone(&self.script);
        let key = self.env.state_key().to_string();
        let state = script.get(&key).ok_or_else(|| {
            DialogueError::new(
                ErrorKind::UnknownStateReference,
                "ENGINE_STATE_UNKNOWN",
                format!("Current state \"{}\" is not defined.", key),
            )
        })?;

        let Some((target, matched)) = self.resolve_transition(state, response) else {
            self.record(
                DialogueError::new(
                    ErrorKind::TransitionResolution,
                    "ENGINE_NO_TRANSITION",
                    format!("No transition of \"{}\" accepts the response.", key),
                )
                .with_offending_text(response),
            );
            let text = match &state.retry {
                Some(retry) => self.render(retry),
                None => {
                    let prompt = self.render(&state.prompt);
                    format!("{}{}", self.retry_prefix, prompt)
                }
            };
            return Ok(self.await_response(EngineOutput::Retry { text }));
        };

        debug!(from = %key, to = %target, matched = %matched, "transition resolved");
        self.env.bind(LAST_MATCH_VAR, matched);
        self.run_turn(PendingTurn {
            target,
            next_assignment: 0,
        })
    }

    /// First ordered entry whose regex is found and whose guard holds, else
    /// the wildcard target with an empty match.
    fn resolve_transition(
        &mut self,
        state: &StateDefinition,
        response: &str,
    ) -> Option<(String, String)> {
        for transition in state.ordered_transitions() {
            let pattern = transition.key.pattern();
            let Some(found) = pattern.find(response) else {
                continue;
            };
            if let Some(guard) = transition.key.guard() {
                let expanded = substitute_variables(guard, &self.env);
                match evaluate_as_boolean(&expanded) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(error) => {
                        self.record(
                            DialogueError::new(
                                ErrorKind::InvalidExpression,
                                "ENGINE_GUARD_FAILED",
                                format!("Bad expression for transition guard: {}", error.message),
                            )
                            .with_offending_text(guard),
                        );
                        continue;
                    }
                }
            }
            return Some((transition.target.clone(), found.to_string()));
        }
        state
            .wildcard_target()
            .map(|target| (target.to_string(), String::new()))
    }

    /// Runs the remaining assignments of the state being left, then moves to
    /// the target.
    pub(super) fn run_turn(&mut self, turn: PendingTurn) -> Result<EngineOutput, DialogueError> {
        let script = Arc::clone(&self.script);
        let key = self.env.state_key().to_string();
        let assignments = script
            .get(&key)
            .map(|state| state.assignments.as_slice())
            .unwrap_or_default();

        for (index, assignment) in assignments.iter().enumerate().skip(turn.next_assignment) {
            if let AssignOutcome::Suspend(name) = self.apply_assignment(assignment) {
                debug!(call = %name, "turn suspended on host call");
                self.pending_boundary = Some(PendingBoundary::Call {
                    name: name.clone(),
                    turn: PendingTurn {
                        target: turn.target,
                        next_assignment: index + 1,
                    },
                });
                return Ok(EngineOutput::Call { name });
            }
        }

        self.finish_turn(&turn.target)
    }

    fn finish_turn(&mut self, target: &str) -> Result<EngineOutput, DialogueError> {
        self.env.advance_counter();
        self.env.set_state_key(target);

        let script = Arc::clone(&self.script);
        let Some(next) = script.get(target) else {
            self.ended = true;
            self.pending_boundary = None;
            return Err(DialogueError::new(
                ErrorKind::UnknownStateReference,
                "ENGINE_STATE_UNKNOWN",
                format!("Transition target \"{}\" is not defined.", target),
            )
            .with_offending_text(target));
        };

        if target == END_STATE {
            debug!("conversation ended");
            self.ended = true;
            self.pending_boundary = None;
            return Ok(EngineOutput::End);
        }

        let text = self.render(&next.prompt);
        Ok(self.await_response(EngineOutput::Prompt { text }))
    }

    fn ensure_awaiting_response(&self) -> Result<(), DialogueError> {
        if self.ended {
            return Err(DialogueError::protocol(
                "ENGINE_ENDED",
                "Conversation has already ended.",
            ));
        }
        match &self.pending_boundary {
            Some(PendingBoundary::Response { .. }) => Ok(()),
            Some(PendingBoundary::Call { name, .. }) => Err(DialogueError::protocol(
                "ENGINE_CALL_PENDING",
                format!("Host call \"{}\" must complete before the next response.", name),
            )),
            None => Err(DialogueError::protocol(
                "ENGINE_NOT_STARTED",
                "Conversation has not started.",
            )),
        }
    }
}
