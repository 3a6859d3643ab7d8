use dl_compiler::{compile, unresolved_targets};
use dl_core::DialogueError;

use crate::{map_cli_dump, CheckReport, LoadedScript};

/// Compiles one script. Compile errors are prefixed with the file path;
/// unresolved targets are reported, not rejected.
pub(crate) fn check_script(
    script: &LoadedScript,
    dump: bool,
) -> Result<CheckReport, DialogueError> {
    let compiled = compile(&script.source).map_err(|mut error| {
        error.message = format!("{}: {}", script.path.display(), error.message);
        error
    })?;
    let dump = if dump {
        Some(serde_json::to_string(&compiled).map_err(map_cli_dump)?)
    } else {
        None
    };
    Ok(CheckReport {
        path: script.path.clone(),
        states: compiled.len(),
        unresolved: unresolved_targets(&compiled),
        dump,
    })
}

pub(crate) fn check_lines(reports: &[CheckReport]) -> Vec<String> {
    let mut lines = vec!["RESULT:OK".to_string()];
    for report in reports {
        lines.push(format!("SCRIPT:{}", report.path.display()));
        lines.push(format!("STATES:{}", report.states));
        for (state, target) in &report.unresolved {
            lines.push(format!("WARN_UNRESOLVED:{}->{}", state, target));
        }
        if let Some(dump) = &report.dump {
            lines.push(format!("DUMP_JSON:{}", dump));
        }
    }
    lines
}
