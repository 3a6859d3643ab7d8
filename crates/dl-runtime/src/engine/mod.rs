use std::sync::Arc;

use dl_core::{DialogueError, EngineOutput, Script};

use crate::environment::Environment;
use crate::host::HostCallRegistry;

mod assign;
mod boundary;
mod lifecycle;
mod step;

pub const DEFAULT_RETRY_PREFIX: &str = "Sorry, I didn't get that. ";

#[derive(Clone)]
pub struct EngineOptions {
    pub script: Arc<Script>,
    pub host_calls: Option<Arc<dyn HostCallRegistry>>,
    /// Suspend the turn on `$call$` and let the caller run the call.
    pub defer_host_calls: bool,
    pub retry_prefix: Option<String>,
    pub decode_escapes: bool,
}

impl EngineOptions {
    pub fn new(script: Arc<Script>) -> Self {
        Self {
            script,
            host_calls: None,
            defer_host_calls: false,
            retry_prefix: None,
            decode_escapes: true,
        }
    }
}

/// Remaining work of a turn interrupted by a deferred host call.
#[derive(Debug, Clone, PartialEq)]
struct PendingTurn {
    target: String,
    next_assignment: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum PendingBoundary {
    Response { output: EngineOutput },
    Call { name: String, turn: PendingTurn },
}

pub struct DialogueEngine {
    script: Arc<Script>,
    host_calls: Arc<dyn HostCallRegistry>,
    defer_host_calls: bool,
    retry_prefix: String,
    decode_escapes: bool,

    env: Environment,
    pending_boundary: Option<PendingBoundary>,
    ended: bool,
    diagnostics: Vec<DialogueError>,
}

#[cfg(test)]
mod tests;
