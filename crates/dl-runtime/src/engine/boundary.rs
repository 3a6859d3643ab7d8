use dl_core::{DialogueError, EngineOutput, CALL_VAR};

use super::{DialogueEngine, PendingBoundary};

impl DialogueEngine {
    /// Output the engine is currently waiting on, re-derived from the pending
    /// boundary.
    pub fn current_output(&self) -> Result<EngineOutput, DialogueError> {
        if self.ended {
            return Ok(EngineOutput::End);
        }
        match &self.pending_boundary {
            Some(PendingBoundary::Response { output }) => Ok(output.clone()),
            Some(PendingBoundary::Call { name, .. }) => Ok(EngineOutput::Call { name: name.clone() }),
            None => Err(DialogueError::protocol(
                "ENGINE_NOT_STARTED",
                "Conversation has not started.",
            )),
        }
    }

    /// Resumes a turn suspended on a deferred host call.
    pub fn complete_call(&mut self, result: &str) -> Result<EngineOutput, DialogueError> {
        let Some(PendingBoundary::Call { turn, .. }) = self.pending_boundary.clone() else {
            return Err(DialogueError::protocol(
                "ENGINE_NO_PENDING_CALL",
                "No host call is pending.",
            ));
        };
        self.pending_boundary = None;
        self.env.bind(CALL_VAR, result);
        self.run_turn(turn)
    }
}
