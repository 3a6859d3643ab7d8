use std::sync::Arc;

use dl_core::{DialogueError, EngineOutput, ErrorKind, Script, END_STATE, START_STATE};
use tracing::{debug, warn};

use super::{DialogueEngine, EngineOptions, PendingBoundary, DEFAULT_RETRY_PREFIX};
use crate::environment::Environment;
use crate::escape::decode_escapes;
use crate::host::{EmptyHostCallRegistry, HostCallRegistry};
use crate::template::render_with_diagnostics;

impl DialogueEngine {
    pub fn new(options: EngineOptions) -> Result<Self, DialogueError> {
        for required in [START_STATE, END_STATE] {
            if !options.script.contains(required) {
                return Err(DialogueError::new(
                    ErrorKind::Compile,
                    "ENGINE_SCRIPT_INVALID",
                    format!("Script has no \"{}\" state.", required),
                ));
            }
        }

        let host_calls: Arc<dyn HostCallRegistry> = options
            .host_calls
            .unwrap_or_else(|| Arc::new(EmptyHostCallRegistry::default()));

        Ok(Self {
            script: options.script,
            host_calls,
            defer_host_calls: options.defer_host_calls,
            retry_prefix: options
                .retry_prefix
                .unwrap_or_else(|| DEFAULT_RETRY_PREFIX.to_string()),
            decode_escapes: options.decode_escapes,
            env: Environment::new(START_STATE),
            pending_boundary: None,
            ended: false,
            diagnostics: Vec::new(),
        })
    }

    /// Renders the `start` prompt. Must be called once before responding.
    pub fn start(&mut self) -> Result<EngineOutput, DialogueError> {
        if self.pending_boundary.is_some() || self.ended {
            return Err(DialogueError::protocol(
                "ENGINE_ALREADY_STARTED",
                "Conversation has already started.",
            ));
        }
        self.diagnostics.clear();
        let script = Arc::clone(&self.script);
        let prompt = script
            .get(START_STATE)
            .map(|state| state.prompt.as_str())
            .unwrap_or_default();
        let text = self.render(prompt);
        debug!(state = START_STATE, "conversation started");
        Ok(self.await_response(EngineOutput::Prompt { text }))
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn current_state(&self) -> &str {
        self.env.state_key()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Name of the host call the current turn is waiting on.
    pub fn waiting_call(&self) -> Option<&str> {
        match &self.pending_boundary {
            Some(PendingBoundary::Call { name, .. }) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Drains the recoverable failures recorded during the latest turn.
    pub fn take_diagnostics(&mut self) -> Vec<DialogueError> {
        std::mem::take(&mut self.diagnostics)
    }

    pub(super) fn render(&mut self, template: &str) -> String {
        let text = render_with_diagnostics(template, &self.env, &mut self.diagnostics);
        if self.decode_escapes {
            decode_escapes(&text)
        } else {
            text
        }
    }

    pub(super) fn record(&mut self, diagnostic: DialogueError) {
        warn!(
            code = %diagnostic.code,
            state = self.env.state_key(),
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    pub(super) fn await_response(&mut self, output: EngineOutput) -> EngineOutput {
        self.pending_boundary = Some(PendingBoundary::Response {
            output: output.clone(),
        });
        output
    }
}
