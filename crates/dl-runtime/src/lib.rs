mod engine;
mod environment;
mod escape;
mod host;
mod template;

pub use engine::{DialogueEngine, EngineOptions, DEFAULT_RETRY_PREFIX};
pub use environment::Environment;
pub use escape::decode_escapes;
pub use host::{
    DeclaredHostCallRegistry, EmptyHostCallRegistry, FnHostCallRegistry, HostCallRegistry,
};
pub use template::{render, render_with_diagnostics, substitute_variables, ARITHMETIC_FALLBACK};
