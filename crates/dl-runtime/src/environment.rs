use std::collections::BTreeMap;

use dl_core::{DlValue, Number, COUNTER_VAR};

/// Per-conversation bindings plus the key of the state awaiting a response.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    state_key: String,
    variables: BTreeMap<String, DlValue>,
}

impl Environment {
    pub fn new(state_key: impl Into<String>) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert(COUNTER_VAR.to_string(), DlValue::Number(Number::Int(1)));
        Self {
            state_key: state_key.into(),
            variables,
        }
    }

    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    pub fn get(&self, name: &str) -> Option<&DlValue> {
        self.variables.get(name)
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<DlValue>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<DlValue>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn variables(&self) -> &BTreeMap<String, DlValue> {
        &self.variables
    }

    pub fn counter(&self) -> i64 {
        match self.variables.get(COUNTER_VAR) {
            Some(DlValue::Number(Number::Int(value))) => *value,
            _ => 1,
        }
    }

    pub(crate) fn set_state_key(&mut self, key: &str) {
        self.state_key = key.to_string();
    }

    pub(crate) fn advance_counter(&mut self) {
        let next = self.counter().saturating_add(1);
        self.variables
            .insert(COUNTER_VAR.to_string(), DlValue::Number(Number::Int(next)));
    }
}
