use std::sync::Arc;

use dl_api::{caller_answered_options, create_engine};
use dl_core::{DialogueError, EngineOutput, Script};
use dl_runtime::DialogueEngine;

/// Interactive conversation where the player also answers host calls.
pub(crate) struct PlaySession {
    script: Arc<Script>,
    engine: DialogueEngine,
}

impl PlaySession {
    pub(crate) fn start(script: Arc<Script>) -> Result<Self, DialogueError> {
        let engine = create_engine(caller_answered_options(Arc::clone(&script)))?;
        Ok(Self { script, engine })
    }

    pub(crate) fn output(&self) -> Result<EngineOutput, DialogueError> {
        self.engine.current_output()
    }

    /// Trimmed input answers the pending call if there is one, otherwise it
    /// is the response to the current prompt.
    pub(crate) fn submit(&mut self, raw: &str) -> Result<EngineOutput, DialogueError> {
        let input = raw.trim();
        if self.engine.waiting_call().is_some() {
            self.engine.complete_call(input)
        } else {
            self.engine.respond(input)
        }
    }

    pub(crate) fn restart(&mut self) -> Result<EngineOutput, DialogueError> {
        self.engine = create_engine(caller_answered_options(Arc::clone(&self.script)))?;
        self.engine.current_output()
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<DialogueError> {
        self.engine.take_diagnostics()
    }

    pub(crate) fn state_key(&self) -> &str {
        self.engine.current_state()
    }

    pub(crate) fn is_ended(&self) -> bool {
        self.engine.is_ended()
    }
}
