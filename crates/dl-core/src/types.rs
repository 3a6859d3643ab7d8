use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DialogueError, ErrorKind};

pub const START_STATE: &str = "start";
pub const END_STATE: &str = "end";
pub const DEFAULT_START_PROMPT: &str = "No start defined.";

/// Source text of the sentinel regex stored under wildcard transitions.
/// A character class that is both whitespace and non-whitespace never
/// matches anything, so the sentinel is only reachable by direct lookup.
pub const WILDCARD_PATTERN: &str = r"[^\S\s]";
/// Token authors write on the left of `->` to declare the fallback transition.
pub const WILDCARD_TOKEN: &str = "REST";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn line(line: usize) -> Self {
        Self {
            start: SourceLocation { line, column: 1 },
            end: SourceLocation { line, column: 1 },
        }
    }
}

/// Case-insensitive regex that remembers its source text.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, DialogueError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|error| {
                DialogueError::new(
                    ErrorKind::Compile,
                    "COMPILE_REGEX_INVALID",
                    format!("Regex \"{}\" does not parse: {}", source, error),
                )
                .with_offending_text(source)
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn wildcard() -> Self {
        static WILDCARD: OnceLock<Pattern> = OnceLock::new();
        WILDCARD
            .get_or_init(|| Pattern {
                source: WILDCARD_PATTERN.to_string(),
                regex: Regex::new(WILDCARD_PATTERN).expect("wildcard regex must compile"),
            })
            .clone()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substring search; returns the matched text.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.find(text).map(|found| found.as_str())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        if source == WILDCARD_PATTERN {
            return Ok(Self::wildcard());
        }
        Self::new(&source).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransitionKey {
    Pattern { pattern: Pattern },
    GuardedPattern { pattern: Pattern, guard: String },
    Wildcard,
}

impl TransitionKey {
    pub fn pattern(&self) -> Pattern {
        match self {
            Self::Pattern { pattern } | Self::GuardedPattern { pattern, .. } => pattern.clone(),
            Self::Wildcard => Pattern::wildcard(),
        }
    }

    pub fn guard(&self) -> Option<&str> {
        match self {
            Self::GuardedPattern { guard, .. } => Some(guard.as_str()),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub key: TransitionKey,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub target: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDefinition {
    pub prompt: String,
    pub transitions: Vec<Transition>,
    pub assignments: Vec<Assignment>,
    pub retry: Option<String>,
}

impl StateDefinition {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            transitions: Vec::new(),
            assignments: Vec::new(),
            retry: None,
        }
    }

    /// Target of the fallback entry; later wildcard lines replace earlier ones.
    pub fn wildcard_target(&self) -> Option<&str> {
        self.transitions
            .iter()
            .rev()
            .find(|transition| transition.key.is_wildcard())
            .map(|transition| transition.target.as_str())
    }

    /// Entries taking part in the ordered scan.
    pub fn ordered_transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions
            .iter()
            .filter(|transition| !transition.key.is_wildcard())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub states: BTreeMap<String, StateDefinition>,
}

impl Script {
    /// Script holding only the default `start` and `end` states.
    pub fn seeded() -> Self {
        let mut start = StateDefinition::new(DEFAULT_START_PROMPT);
        start.transitions.push(Transition {
            key: TransitionKey::Wildcard,
            target: END_STATE.to_string(),
        });
        let mut states = BTreeMap::new();
        states.insert(START_STATE.to_string(), start);
        states.insert(END_STATE.to_string(), StateDefinition::new(""));
        Self { states }
    }

    /// Inserts or replaces a state, returning the replaced definition.
    pub fn define(
        &mut self,
        key: impl Into<String>,
        definition: StateDefinition,
    ) -> Option<StateDefinition> {
        self.states.insert(key.into(), definition)
    }

    pub fn get(&self, key: &str) -> Option<&StateDefinition> {
        self.states.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EngineOutput {
    Prompt { text: String },
    Retry { text: String },
    Call { name: String },
    End,
}

#[cfg(test)]
mod types_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn wildcard_pattern_rejects_arbitrary_text(text in any::<String>()) {
            prop_assert!(!Pattern::wildcard().is_match(&text));
            prop_assert!(Pattern::wildcard().find(&text).is_none());
        }
    }

    #[test]
    fn wildcard_pattern_never_matches() {
        let wildcard = Pattern::wildcard();
        for text in ["", " ", "a", "REST", "[^\\S\\s]", "\n\t", "yes no", "ü"] {
            assert!(!wildcard.is_match(text), "wildcard matched {:?}", text);
        }
    }

    #[test]
    fn patterns_are_case_insensitive_substring_searches() {
        let pattern = Pattern::new("^y").expect("pattern should compile");
        assert_eq!(pattern.find("Yes please"), Some("Y"));
        assert_eq!(pattern.find("no"), None);

        let inner = Pattern::new("dog").expect("pattern should compile");
        assert_eq!(inner.find("a DOG here"), Some("DOG"));
    }

    #[test]
    fn invalid_pattern_is_compile_error() {
        let error = Pattern::new("(unclosed").expect_err("pattern should fail");
        assert_eq!(error.code, "COMPILE_REGEX_INVALID");
        assert_eq!(error.offending_text.as_deref(), Some("(unclosed"));
    }

    #[test]
    fn seeded_script_has_default_start_and_end() {
        let script = Script::seeded();
        let start = script.get(START_STATE).expect("start should exist");
        assert_eq!(start.prompt, DEFAULT_START_PROMPT);
        assert_eq!(start.wildcard_target(), Some(END_STATE));
        assert_eq!(start.ordered_transitions().count(), 0);
        let end = script.get(END_STATE).expect("end should exist");
        assert!(end.transitions.is_empty());
        assert_eq!(end.prompt, "");
    }

    #[test]
    fn last_wildcard_wins_lookup() {
        let mut state = StateDefinition::new("q");
        state.transitions.push(Transition {
            key: TransitionKey::Wildcard,
            target: "a".to_string(),
        });
        state.transitions.push(Transition {
            key: TransitionKey::Wildcard,
            target: "b".to_string(),
        });
        assert_eq!(state.wildcard_target(), Some("b"));
    }

    #[test]
    fn script_serializes_patterns_as_source_text() {
        let mut script = Script::seeded();
        let mut state = StateDefinition::new("Pick?");
        state.transitions.push(Transition {
            key: TransitionKey::GuardedPattern {
                pattern: Pattern::new("^y").expect("pattern should compile"),
                guard: "1 < 2".to_string(),
            },
            target: "end".to_string(),
        });
        script.define("pick", state);

        let json = serde_json::to_value(&script).expect("script should serialize");
        let key = &json["states"]["pick"]["transitions"][0]["key"];
        assert_eq!(key["kind"], "guardedPattern");
        assert_eq!(key["pattern"], "^y");
        assert_eq!(key["guard"], "1 < 2");

        let back: Script = serde_json::from_value(json).expect("script should deserialize");
        assert_eq!(back, script);
    }

    #[test]
    fn engine_output_uses_kind_tag() {
        let json = serde_json::to_string(&EngineOutput::Call {
            name: "dice".to_string(),
        })
        .expect("output should serialize");
        assert_eq!(json, r#"{"kind":"call","name":"dice"}"#);
    }
}
