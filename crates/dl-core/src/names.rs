use std::sync::OnceLock;

use regex::Regex;

/// Last user response.
pub const RESPONSE_VAR: &str = "$response$";
/// Turn counter, starts at 1.
pub const COUNTER_VAR: &str = "$counter$";
/// Substring matched by the transition that was taken.
pub const LAST_MATCH_VAR: &str = "$lm$";
/// Assigning to this name invokes a host call.
pub const CALL_VAR: &str = "$call$";

/// Names only the engine may bind.
pub const ENGINE_BOUND_VARS: [&str; 3] = [RESPONSE_VAR, COUNTER_VAR, LAST_MATCH_VAR];

fn variable_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\$[a-zA-Z]\w*\$$").expect("variable name regex must compile"))
}

fn state_key_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\w+$").expect("state key regex must compile"))
}

pub fn is_variable_name(name: &str) -> bool {
    variable_name_regex().is_match(name)
}

pub fn is_state_key(key: &str) -> bool {
    state_key_regex().is_match(key)
}

pub fn is_engine_bound(name: &str) -> bool {
    ENGINE_BOUND_VARS.contains(&name)
}
