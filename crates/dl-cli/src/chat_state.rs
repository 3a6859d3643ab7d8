use dl_core::{DialogueError, EngineOutput};

use crate::{PlayCommand, PlaySession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Speaker {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChatLine {
    pub(crate) speaker: Speaker,
    pub(crate) text: String,
}

#[derive(Debug, Default)]
pub(crate) struct ChatState {
    pub(crate) history: Vec<ChatLine>,
    pub(crate) input_buffer: String,
    pub(crate) status: String,
    pub(crate) waiting_call: Option<String>,
    pub(crate) ended: bool,
    pub(crate) help_visible: bool,
}

impl ChatState {
    pub(crate) fn new() -> Self {
        Self {
            status: "ready".to_string(),
            ..Self::default()
        }
    }

    fn push(&mut self, speaker: Speaker, text: &str) {
        for line in text.split('\n') {
            self.history.push(ChatLine {
                speaker,
                text: line.to_string(),
            });
        }
    }

    pub(crate) fn apply_output(&mut self, output: EngineOutput, diagnostics: Vec<DialogueError>) {
        self.waiting_call = None;
        match output {
            EngineOutput::Prompt { text } | EngineOutput::Retry { text } => {
                self.push(Speaker::System, &text);
                self.status = "ready".to_string();
            }
            EngineOutput::Call { name } => {
                self.push(Speaker::System, &format!("[call {}] type the result", name));
                self.status = format!("waiting on call {}", name);
                self.waiting_call = Some(name);
            }
            EngineOutput::End => {
                self.push(Speaker::System, "[end]");
                self.status = "conversation ended; ctrl-r restarts".to_string();
                self.ended = true;
            }
        }
        if let Some(last) = diagnostics.last() {
            self.status = format!("warn {}: {}", last.code, last.message);
        }
    }

    pub(crate) fn apply_error(&mut self, error: &DialogueError) {
        self.status = format!("error {}: {}", error.code, error.message);
    }

    pub(crate) fn restart(&mut self, session: &mut PlaySession) {
        self.history.clear();
        self.ended = false;
        self.waiting_call = None;
        match session.restart() {
            Ok(output) => {
                let diagnostics = session.take_diagnostics();
                self.apply_output(output, diagnostics);
                self.status = "restarted".to_string();
            }
            Err(error) => self.apply_error(&error),
        }
    }

    /// Submits the input buffer. Returns `true` when the player asked to quit.
    pub(crate) fn submit(&mut self, session: &mut PlaySession) -> bool {
        let raw = std::mem::take(&mut self.input_buffer);
        match PlayCommand::parse(&raw) {
            Some(PlayCommand::Quit) => return true,
            Some(PlayCommand::Help) => {
                self.help_visible = !self.help_visible;
                return false;
            }
            Some(PlayCommand::Restart) => {
                self.restart(session);
                return false;
            }
            None => {}
        }
        if self.ended {
            self.status = "conversation ended; ctrl-r restarts".to_string();
            return false;
        }

        self.push(Speaker::User, raw.trim());
        match session.submit(&raw) {
            Ok(output) => {
                let diagnostics = session.take_diagnostics();
                self.apply_output(output, diagnostics);
            }
            Err(error) => {
                self.apply_error(&error);
                self.ended = session.is_ended();
            }
        }
        false
    }
}

#[cfg(test)]
mod chat_state_tests {
    use super::*;
    use dl_api::compile_script;
    use std::sync::Arc;

    fn started(source: &str) -> (ChatState, PlaySession) {
        let script = compile_script(source).expect("compile should pass");
        let mut session = PlaySession::start(Arc::new(script)).expect("session should start");
        let mut state = ChatState::new();
        let output = session.output().expect("output should pass");
        let diagnostics = session.take_diagnostics();
        state.apply_output(output, diagnostics);
        (state, session)
    }

    fn type_line(state: &mut ChatState, session: &mut PlaySession, text: &str) -> bool {
        state.input_buffer = text.to_string();
        state.submit(session)
    }

    #[test]
    fn history_alternates_system_and_user_lines() {
        let (mut state, mut session) =
            started("start\n    Name?\\nPlease.\n    \".+\" -> end\n");
        assert_eq!(state.history.len(), 2);
        assert!(!type_line(&mut state, &mut session, " Ada "));
        let speakers = state
            .history
            .iter()
            .map(|line| line.speaker)
            .collect::<Vec<_>>();
        assert_eq!(
            speakers,
            vec![Speaker::System, Speaker::System, Speaker::User, Speaker::System]
        );
        assert_eq!(state.history[2].text, "Ada");
        assert!(state.ended);
    }

    #[test]
    fn status_shows_last_diagnostic() {
        let (mut state, mut session) = started("start\n    Yes?\n    \"^y\" -> end\n");
        type_line(&mut state, &mut session, "no");
        assert!(state.status.starts_with("warn ENGINE_NO_TRANSITION"));
        assert_eq!(
            state.history.last().map(|line| line.text.as_str()),
            Some("Sorry, I didn't get that. Yes?")
        );
    }

    #[test]
    fn calls_are_answered_by_typing() {
        let (mut state, mut session) = started(
            "start\n    Roll?\n    REST -> show\n    $call$ <- dice\n\nshow\n    Rolled $call$.\n",
        );
        type_line(&mut state, &mut session, "go");
        assert_eq!(state.waiting_call.as_deref(), Some("dice"));
        type_line(&mut state, &mut session, "3");
        assert_eq!(state.waiting_call, None);
        assert_eq!(
            state.history.last().map(|line| line.text.as_str()),
            Some("Rolled 3.")
        );
    }

    #[test]
    fn fatal_errors_end_the_chat() {
        let (mut state, mut session) = started("start\n    Go?\n    REST -> nowhere\n");
        type_line(&mut state, &mut session, "x");
        assert!(state.status.starts_with("error ENGINE_STATE_UNKNOWN"));
        assert!(state.ended);
        state.restart(&mut session);
        assert!(!state.ended);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn commands_do_not_reach_the_engine() {
        let (mut state, mut session) = started("start\n    Hi\n    REST -> end\n");
        assert!(!type_line(&mut state, &mut session, ":help"));
        assert!(state.help_visible);
        assert!(type_line(&mut state, &mut session, ":quit"));
        assert_eq!(state.history.len(), 1);
    }
}
