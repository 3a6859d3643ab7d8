use dl_core::{DialogueError, EngineOutput};
use dl_runtime::DialogueEngine;

use crate::{json_text, BoundaryResult, Transcript};

/// Feeds `responses` and `call_results` into a started engine, in order,
/// until the conversation ends or the next input it needs is exhausted.
pub(crate) fn run_transcript(
    engine: &mut DialogueEngine,
    responses: &[String],
    call_results: &[String],
) -> Result<Transcript, DialogueError> {
    let mut responses = responses.iter();
    let mut call_results = call_results.iter();
    let mut output = engine.current_output()?;
    let mut boundaries = vec![BoundaryResult::new(
        output.clone(),
        engine.take_diagnostics(),
    )];

    loop {
        output = match output {
            EngineOutput::End => break,
            EngineOutput::Call { .. } => match call_results.next() {
                Some(result) => engine.complete_call(result)?,
                None => break,
            },
            EngineOutput::Prompt { .. } | EngineOutput::Retry { .. } => match responses.next() {
                Some(response) => engine.respond(response.trim())?,
                None => break,
            },
        };
        boundaries.push(BoundaryResult::new(
            output.clone(),
            engine.take_diagnostics(),
        ));
    }

    Ok(Transcript {
        boundaries,
        final_state: engine.current_state().to_string(),
    })
}

pub(crate) fn boundary_lines(boundary: &BoundaryResult) -> Vec<String> {
    let mut lines = vec![format!("EVENT:{}", boundary.event.label())];
    if let Some(text) = &boundary.text {
        lines.push(format!("TEXT_JSON:{}", json_text(text)));
    }
    if let Some(name) = &boundary.call_name {
        lines.push(format!("NAME_JSON:{}", json_text(name)));
    }
    for diagnostic in &boundary.diagnostics {
        lines.push(format!(
            "DIAG:{}|{}",
            diagnostic.code,
            json_text(&diagnostic.message)
        ));
    }
    lines
}

pub(crate) fn transcript_lines(transcript: &Transcript) -> Vec<String> {
    let mut lines = vec!["RESULT:OK".to_string()];
    for boundary in &transcript.boundaries {
        lines.extend(boundary_lines(boundary));
    }
    lines.push(format!("STATE:{}", transcript.final_state));
    lines
}

pub(crate) fn emit_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
