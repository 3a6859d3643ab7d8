use std::fs;
use std::path::{Path, PathBuf};

use dl_core::{DialogueError, ErrorKind};
use walkdir::WalkDir;

use crate::{
    map_cli_source_path, map_cli_source_read, map_cli_source_scan, LoadedScript,
    SCRIPT_EXTENSION,
};

fn source_error(code: &'static str, message: String) -> DialogueError {
    DialogueError::new(ErrorKind::Host, code, message)
}

pub(crate) fn resolve_source_path(raw: &str) -> Result<PathBuf, DialogueError> {
    let path = PathBuf::from(raw);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(source_error(
            "CLI_SOURCE_NOT_FOUND",
            format!("path does not exist: {}", absolute.display()),
        ));
    }
    Ok(absolute)
}

pub(crate) fn load_script(raw: &str) -> Result<LoadedScript, DialogueError> {
    let path = resolve_source_path(raw)?;
    if !path.is_file() {
        return Err(source_error(
            "CLI_SOURCE_NOT_FILE",
            format!("script is not a file: {}", path.display()),
        ));
    }
    read_script(&path)
}

/// Every `.dlg` file under `raw`, in path order.
pub(crate) fn load_scripts_dir(raw: &str) -> Result<Vec<LoadedScript>, DialogueError> {
    let root = resolve_source_path(raw)?;
    if !root.is_dir() {
        return Err(source_error(
            "CLI_SOURCE_NOT_DIR",
            format!("scripts-dir is not a directory: {}", root.display()),
        ));
    }

    let mut scripts = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(map_cli_source_scan)?;
        if !entry.file_type().is_file() || !is_script_file(entry.path()) {
            continue;
        }
        scripts.push(read_script(entry.path())?);
    }

    if scripts.is_empty() {
        return Err(source_error(
            "CLI_SOURCE_EMPTY",
            format!("no .{} files under {}", SCRIPT_EXTENSION, root.display()),
        ));
    }
    Ok(scripts)
}

fn is_script_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SCRIPT_EXTENSION)
}

fn read_script(path: &Path) -> Result<LoadedScript, DialogueError> {
    let source = fs::read_to_string(path).map_err(map_cli_source_read)?;
    Ok(LoadedScript {
        path: path.to_path_buf(),
        source,
    })
}
