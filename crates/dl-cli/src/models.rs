use std::path::PathBuf;

use dl_core::{DialogueError, EngineOutput};

pub(crate) const SCRIPT_EXTENSION: &str = "dlg";

#[derive(Debug, Clone)]
pub(crate) struct LoadedScript {
    pub(crate) path: PathBuf,
    pub(crate) source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundaryEvent {
    Prompt,
    Retry,
    Call,
    End,
}

impl BoundaryEvent {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Prompt => "PROMPT",
            Self::Retry => "RETRY",
            Self::Call => "CALL",
            Self::End => "END",
        }
    }
}

/// One engine output plus the diagnostics recorded while producing it.
#[derive(Debug, Clone)]
pub(crate) struct BoundaryResult {
    pub(crate) event: BoundaryEvent,
    pub(crate) text: Option<String>,
    pub(crate) call_name: Option<String>,
    pub(crate) diagnostics: Vec<DialogueError>,
}

impl BoundaryResult {
    pub(crate) fn new(output: EngineOutput, diagnostics: Vec<DialogueError>) -> Self {
        let (event, text, call_name) = match output {
            EngineOutput::Prompt { text } => (BoundaryEvent::Prompt, Some(text), None),
            EngineOutput::Retry { text } => (BoundaryEvent::Retry, Some(text), None),
            EngineOutput::Call { name } => (BoundaryEvent::Call, None, Some(name)),
            EngineOutput::End => (BoundaryEvent::End, None, None),
        };
        Self {
            event,
            text,
            call_name,
            diagnostics,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transcript {
    pub(crate) boundaries: Vec<BoundaryResult>,
    pub(crate) final_state: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CheckReport {
    pub(crate) path: PathBuf,
    pub(crate) states: usize,
    pub(crate) unresolved: Vec<(String, String)>,
    pub(crate) dump: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayCommand {
    Help,
    Restart,
    Quit,
}

impl PlayCommand {
    pub(crate) const HELP_TEXT: &'static str = "commands: :help :restart :quit";

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            ":help" => Some(Self::Help),
            ":restart" => Some(Self::Restart),
            ":quit" => Some(Self::Quit),
            _ => None,
        }
    }
}
