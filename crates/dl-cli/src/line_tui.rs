use std::io::{self, BufRead, Write};

use dl_core::{DialogueError, EngineOutput};

use crate::{map_tui_io, PlayCommand, PlaySession};

pub(crate) fn run_line_mode(session: &mut PlaySession) -> Result<i32, DialogueError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_line_mode_with_io(session, &mut reader, &mut writer)
}

pub(crate) fn run_line_mode_with_io(
    session: &mut PlaySession,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, DialogueError> {
    writeln!(writer, "{}", PlayCommand::HELP_TEXT).map_err(map_tui_io)?;
    let mut output = session.output()?;

    loop {
        for diagnostic in session.take_diagnostics() {
            writeln!(writer, "[warn {}] {}", diagnostic.code, diagnostic.message)
                .map_err(map_tui_io)?;
        }
        match &output {
            EngineOutput::Prompt { text } | EngineOutput::Retry { text } => {
                writeln!(writer, "{}", text).map_err(map_tui_io)?;
            }
            EngineOutput::Call { name } => {
                writeln!(writer, "[call {}] enter the result", name).map_err(map_tui_io)?;
            }
            EngineOutput::End => {
                writeln!(writer, "[END]").map_err(map_tui_io)?;
                return Ok(0);
            }
        }

        let Some(raw) = prompt_input_from("> ", reader, writer)? else {
            return Ok(0);
        };
        output = match PlayCommand::parse(&raw) {
            Some(PlayCommand::Help) => {
                writeln!(writer, "{}", PlayCommand::HELP_TEXT).map_err(map_tui_io)?;
                continue;
            }
            Some(PlayCommand::Restart) => {
                writeln!(writer, "restarted").map_err(map_tui_io)?;
                session.restart()?
            }
            Some(PlayCommand::Quit) => {
                writeln!(writer, "bye").map_err(map_tui_io)?;
                return Ok(0);
            }
            None => session.submit(&raw)?,
        };
    }
}

/// Reads one line without its terminator; `None` at end of input.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, DialogueError> {
    write!(writer, "{}", prefix).map_err(map_tui_io)?;
    writer.flush().map_err(map_tui_io)?;
    let mut input = String::new();
    if reader.read_line(&mut input).map_err(map_tui_io)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
