use std::path::PathBuf;

pub const SCRIPT_FILE: &str = "main.dlg";
pub const TESTCASE_FILE: &str = "testcase.json";

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn scenarios_root() -> PathBuf {
    workspace_root().join("scenarios")
}

pub fn scenario_dir(name: &str) -> PathBuf {
    scenarios_root().join(name)
}

pub fn scenario_script(name: &str) -> PathBuf {
    scenario_dir(name).join(SCRIPT_FILE)
}

pub fn testcase_path(name: &str) -> PathBuf {
    scenario_dir(name).join(TESTCASE_FILE)
}
