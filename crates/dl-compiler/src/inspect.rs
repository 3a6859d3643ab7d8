use std::collections::BTreeSet;

use dl_core::{Script, CALL_VAR};

/// `(state, target)` pairs whose target is not defined in `script`,
/// in state key order then declaration order.
pub fn unresolved_targets(script: &Script) -> Vec<(String, String)> {
    let mut unresolved = Vec::new();
    for (key, state) in &script.states {
        for transition in &state.transitions {
            if !script.contains(&transition.target) {
                unresolved.push((key.clone(), transition.target.clone()));
            }
        }
    }
    unresolved
}

/// States no transition can reach, excluding `start`.
pub fn unreachable_states(script: &Script) -> Vec<String> {
    let mut reached = BTreeSet::new();
    let mut pending = vec![dl_core::START_STATE.to_string()];
    while let Some(key) = pending.pop() {
        if !reached.insert(key.clone()) {
            continue;
        }
        if let Some(state) = script.get(&key) {
            for transition in &state.transitions {
                if !reached.contains(&transition.target) {
                    pending.push(transition.target.clone());
                }
            }
        }
    }
    script
        .states
        .keys()
        .filter(|key| !reached.contains(*key))
        .cloned()
        .collect()
}

/// Distinct host call names named by `$call$` assignments, sorted.
pub fn host_call_names(script: &Script) -> Vec<String> {
    script
        .states
        .values()
        .flat_map(|state| &state.assignments)
        .filter(|assignment| assignment.target == CALL_VAR)
        .map(|assignment| assignment.value.trim().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
