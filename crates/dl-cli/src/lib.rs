use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use dl_api::{caller_answered_options, compile_script, create_engine};
use dl_core::DialogueError;

mod boundary_runner;
mod chat_state;
mod check;
mod cli_args;
mod error_map;
mod line_tui;
mod logging;
mod models;
mod session;
mod source_loader;
mod tui;
mod tui_render;

pub(crate) use boundary_runner::{emit_lines, run_transcript, transcript_lines};
pub(crate) use check::{check_lines, check_script};
pub(crate) use cli_args::{CheckArgs, Cli, Mode, PlayArgs, RunArgs};
pub(crate) use error_map::{
    emit_error, json_text, map_cli_dump, map_cli_source_path, map_cli_source_read,
    map_cli_source_scan, map_tui_io,
};
pub(crate) use line_tui::run_line_mode;
pub(crate) use logging::init_logging;
#[cfg(test)]
pub(crate) use models::BoundaryEvent;
pub(crate) use models::{
    BoundaryResult, CheckReport, LoadedScript, PlayCommand, Transcript, SCRIPT_EXTENSION,
};
pub(crate) use session::PlaySession;
pub(crate) use source_loader::{load_script, load_scripts_dir};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, DialogueError> {
    let log_level = cli.log_level.as_deref();
    match cli.command {
        Mode::Run(args) => {
            init_logging(log_level);
            run_script(args)
        }
        Mode::Check(args) => {
            init_logging(log_level);
            run_check(args)
        }
        Mode::Play(args) => run_play(args, log_level),
    }
}

fn run_script(args: RunArgs) -> Result<i32, DialogueError> {
    let loaded = load_script(&args.script)?;
    let script = compile_script(&loaded.source)?;
    let mut engine = create_engine(caller_answered_options(Arc::new(script)))?;
    let transcript = run_transcript(&mut engine, &args.responses, &args.call_results)?;
    emit_lines(&transcript_lines(&transcript));
    Ok(0)
}

fn run_check(args: CheckArgs) -> Result<i32, DialogueError> {
    let scripts = match (&args.script, &args.scripts_dir) {
        (Some(script), _) => vec![load_script(script)?],
        (None, Some(dir)) => load_scripts_dir(dir)?,
        (None, None) => {
            return Err(DialogueError::protocol(
                "CLI_ARGS_MISSING",
                "check needs --script or --scripts-dir",
            ))
        }
    };
    let reports = scripts
        .iter()
        .map(|script| check_script(script, args.dump))
        .collect::<Result<Vec<_>, _>>()?;
    emit_lines(&check_lines(&reports));
    Ok(0)
}

fn run_play(args: PlayArgs, log_level: Option<&str>) -> Result<i32, DialogueError> {
    let loaded = load_script(&args.script)?;
    let script = compile_script(&loaded.source)?;
    let mut session = PlaySession::start(Arc::new(script))?;
    if args.line_mode {
        init_logging(log_level);
        return run_line_mode(&mut session);
    }
    let title = loaded
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("dialogue")
        .to_string();
    tui::run_chat_window(&mut session, &title, log_level)
}
