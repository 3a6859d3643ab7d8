use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{DlToolError, TestCase, TESTCASE_SCHEMA_V1};

const SCRIPT_EXTENSION: &str = "dlg";
const TESTCASE_FILE: &str = "testcase.json";

/// Reads `script` (a `/`-separated path relative to `scenario_dir`) from the
/// `.dlg` files found under `scenario_dir`.
pub fn read_script_from_dir(scenario_dir: &Path, script: &str) -> Result<String, DlToolError> {
    let mut scripts = BTreeMap::new();

    for entry in WalkDir::new(scenario_dir).follow_links(false) {
        let entry = entry.map_err(|source| DlToolError::Scan {
            path: scenario_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some(SCRIPT_EXTENSION)
        {
            continue;
        }
        let Ok(relative) = path.strip_prefix(scenario_dir) else {
            continue;
        };
        scripts.insert(
            relative.to_string_lossy().replace('\\', "/"),
            path.to_path_buf(),
        );
    }

    let path = scripts
        .get(script)
        .ok_or_else(|| DlToolError::ScriptMissing {
            path: scenario_dir.to_path_buf(),
            script: script.to_string(),
        })?;
    fs::read_to_string(path).map_err(|source| DlToolError::ReadFile {
        path: path.clone(),
        source,
    })
}

/// Every `testcase.json` under `root`, sorted by path.
pub fn discover_cases(root: &Path) -> Result<Vec<PathBuf>, DlToolError> {
    let mut cases = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| DlToolError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.file_name() == TESTCASE_FILE {
            cases.push(entry.into_path());
        }
    }
    Ok(cases)
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, DlToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| DlToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| DlToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(DlToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}
