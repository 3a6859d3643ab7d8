mod blocks;
mod inspect;
mod instruction;

use dl_core::{DialogueError, Script, StateDefinition};
use tracing::{debug, warn};

use blocks::{scan_blocks, RawBlock};
use instruction::{classify, Instruction};

pub use inspect::{host_call_names, unreachable_states, unresolved_targets};

/// Compiles script source into a [`Script`] seeded with default `start` and
/// `end` states. Explicit blocks replace the defaults.
pub fn compile(source: &str) -> Result<Script, DialogueError> {
    let mut script = Script::seeded();
    let mut defined = std::collections::BTreeSet::new();

    for block in scan_blocks(source)? {
        let key = block.key.clone();
        let state = compile_block(block)?;
        if !defined.insert(key.clone()) {
            warn!(state = %key, "state redefined; later block replaces earlier one");
        }
        script.define(key, state);
    }

    debug!(states = script.len(), "script compiled");
    Ok(script)
}

fn compile_block(block: RawBlock) -> Result<StateDefinition, DialogueError> {
    let mut lines = block.body.into_iter();
    let prompt = lines.next().map(|line| line.text).unwrap_or_default();
    let mut state = StateDefinition::new(prompt);

    for line in lines {
        match classify(&line.text, line.line)? {
            Instruction::Retry(text) => state.retry = Some(text),
            Instruction::Transition(transition) => state.transitions.push(transition),
            Instruction::Assignment(assignment) => state.assignments.push(assignment),
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests;
