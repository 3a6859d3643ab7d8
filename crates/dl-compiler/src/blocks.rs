use dl_core::{is_state_key, DialogueError};

/// One unparsed block: an unindented key line followed by indented lines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawBlock {
    pub key: String,
    pub line: usize,
    pub body: Vec<RawLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawLine {
    pub text: String,
    pub line: usize,
}

/// Splits source into blocks. A block ends at a blank line, at the next
/// unindented line, or at end of input.
pub(crate) fn scan_blocks(source: &str) -> Result<Vec<RawBlock>, DialogueError> {
    let mut blocks = Vec::new();
    let mut current: Option<RawBlock> = None;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            finish_block(&mut current, &mut blocks)?;
            continue;
        }

        if raw.starts_with(char::is_whitespace) {
            let Some(block) = current.as_mut() else {
                return Err(DialogueError::compile(
                    "COMPILE_ORPHAN_INSTRUCTION",
                    "Indented line does not belong to a state block.",
                    raw.trim(),
                    line,
                ));
            };
            block.body.push(RawLine {
                text: raw.trim().to_string(),
                line,
            });
            continue;
        }

        finish_block(&mut current, &mut blocks)?;
        let key = raw.trim_end();
        if !is_state_key(key) {
            return Err(DialogueError::compile(
                "COMPILE_STATE_KEY_INVALID",
                "Invalid state key.",
                key,
                line,
            ));
        }
        current = Some(RawBlock {
            key: key.to_string(),
            line,
            body: Vec::new(),
        });
    }

    finish_block(&mut current, &mut blocks)?;
    Ok(blocks)
}

fn finish_block(
    current: &mut Option<RawBlock>,
    blocks: &mut Vec<RawBlock>,
) -> Result<(), DialogueError> {
    let Some(block) = current.take() else {
        return Ok(());
    };
    if block.body.is_empty() {
        return Err(DialogueError::compile(
            "COMPILE_BLOCK_EMPTY",
            format!("State \"{}\" has no prompt line.", block.key),
            block.key,
            block.line,
        ));
    }
    blocks.push(block);
    Ok(())
}
