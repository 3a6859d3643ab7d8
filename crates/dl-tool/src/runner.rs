use std::path::Path;
use std::sync::Arc;

use dl_api::{caller_answered_options, compile_script, create_engine};
use dl_core::EngineOutput;

use crate::source::{read_script_from_dir, read_test_case};
use crate::{DlToolError, ExpectedEvent, TestCase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub observed_events: Vec<ExpectedEvent>,
    pub consumed_responses: usize,
    pub consumed_call_results: usize,
    pub ended: bool,
}

/// Plays `case` against its script. Responses (trimmed) answer prompts and
/// retries; `callResults` answer host calls. The run stops at the end of the
/// conversation or when responses run out.
pub fn run_case(scenario_dir: &Path, case: &TestCase) -> Result<RunReport, DlToolError> {
    let source = read_script_from_dir(scenario_dir, &case.script)?;
    let script = compile_script(&source)?;
    let mut engine = create_engine(caller_answered_options(Arc::new(script)))?;

    let mut observed_events = Vec::new();
    let mut responses = 0usize;
    let mut call_results = 0usize;
    let mut output = engine.current_output()?;

    loop {
        observed_events.push(ExpectedEvent::from(output.clone()));
        output = match output {
            EngineOutput::End => break,
            EngineOutput::Call { name } => {
                let result = case.call_results.get(call_results).ok_or_else(|| {
                    DlToolError::MissingCallResult {
                        event_index: observed_events.len() - 1,
                        name,
                    }
                })?;
                call_results += 1;
                engine.complete_call(result)?
            }
            EngineOutput::Prompt { .. } | EngineOutput::Retry { .. } => {
                let Some(response) = case.responses.get(responses) else {
                    break;
                };
                responses += 1;
                engine.respond(response.trim())?
            }
        };
    }

    let ended = engine.is_ended();
    if ended && responses != case.responses.len() {
        return Err(DlToolError::UnusedInputs {
            what: "responses",
            used: responses,
            total: case.responses.len(),
        });
    }
    if call_results != case.call_results.len() {
        return Err(DlToolError::UnusedInputs {
            what: "call results",
            used: call_results,
            total: case.call_results.len(),
        });
    }

    Ok(RunReport {
        observed_events,
        consumed_responses: responses,
        consumed_call_results: call_results,
        ended,
    })
}

pub fn assert_case(scenario_dir: &Path, case_path: &Path) -> Result<(), DlToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(scenario_dir, &case)?;

    if report.observed_events.len() != case.expected_events.len() {
        let observed = serde_json::to_string_pretty(&report.observed_events)
            .map_err(DlToolError::EventSerialize)?;
        return Err(DlToolError::EventCountMismatch {
            expected: case.expected_events.len(),
            actual: report.observed_events.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_events
        .iter()
        .zip(report.observed_events.iter())
        .enumerate()
    {
        if expected != actual {
            let expected = serde_json::to_string(expected).map_err(DlToolError::EventSerialize)?;
            let actual = serde_json::to_string(actual).map_err(DlToolError::EventSerialize)?;
            return Err(DlToolError::EventMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    Ok(())
}
