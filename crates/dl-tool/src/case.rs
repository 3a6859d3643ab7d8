use dl_core::EngineOutput;
use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "dl-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default = "default_script")]
    pub script: String,
    #[serde(default)]
    pub responses: Vec<String>,
    #[serde(default)]
    pub call_results: Vec<String>,
    #[serde(default)]
    pub expected_events: Vec<ExpectedEvent>,
}

fn default_script() -> String {
    "main.dlg".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedEvent {
    Prompt { text: String },
    Retry { text: String },
    Call { name: String },
    End,
}

impl From<EngineOutput> for ExpectedEvent {
    fn from(output: EngineOutput) -> Self {
        match output {
            EngineOutput::Prompt { text } => Self::Prompt { text },
            EngineOutput::Retry { text } => Self::Retry { text },
            EngineOutput::Call { name } => Self::Call { name },
            EngineOutput::End => Self::End,
        }
    }
}
