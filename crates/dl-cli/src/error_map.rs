use std::fmt::Display;

use dl_core::{DialogueError, ErrorKind};

fn map_error(code: &'static str, error: impl Display) -> DialogueError {
    DialogueError::new(ErrorKind::Host, code, error.to_string())
}

pub(crate) fn json_text(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}

pub(crate) fn emit_error(error: DialogueError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    if let Some(span) = &error.span {
        println!("ERROR_LINE:{}", span.start.line);
    }
    println!("ERROR_MSG_JSON:{}", json_text(&error.message));
    1
}

pub(crate) fn map_tui_io(error: std::io::Error) -> DialogueError {
    map_error("TUI_IO", error)
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> DialogueError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: walkdir::Error) -> DialogueError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> DialogueError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_dump(error: serde_json::Error) -> DialogueError {
    map_error("CLI_DUMP", error)
}
