use std::sync::Arc;

use dl_core::{DialogueError, Script};
use dl_runtime::{DeclaredHostCallRegistry, DialogueEngine, EngineOptions, HostCallRegistry};

#[derive(Clone)]
pub struct CreateEngineOptions {
    pub source: String,
    pub host_calls: Option<Arc<dyn HostCallRegistry>>,
    pub defer_host_calls: bool,
    pub retry_prefix: Option<String>,
    pub decode_escapes: bool,
}

impl CreateEngineOptions {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            host_calls: None,
            defer_host_calls: false,
            retry_prefix: None,
            decode_escapes: true,
        }
    }
}

pub fn compile_script(source: &str) -> Result<Script, DialogueError> {
    dl_compiler::compile(source)
}

/// Compiles the source and returns an engine that has already rendered the
/// `start` prompt; read it with [`DialogueEngine::current_output`].
pub fn create_engine_from_source(
    options: CreateEngineOptions,
) -> Result<DialogueEngine, DialogueError> {
    let script = compile_script(&options.source)?;
    create_engine(EngineOptions {
        script: Arc::new(script),
        host_calls: options.host_calls,
        defer_host_calls: options.defer_host_calls,
        retry_prefix: options.retry_prefix,
        decode_escapes: options.decode_escapes,
    })
}

/// Options for a caller that answers every host call itself: each `$call$`
/// name in the script is declared and calls are deferred.
pub fn caller_answered_options(script: Arc<Script>) -> EngineOptions {
    let names = dl_compiler::host_call_names(&script);
    let mut options = EngineOptions::new(script);
    options.host_calls = Some(Arc::new(DeclaredHostCallRegistry::new(names)));
    options.defer_host_calls = true;
    options
}

pub fn create_engine(options: EngineOptions) -> Result<DialogueEngine, DialogueError> {
    let mut engine = DialogueEngine::new(options)?;
    engine.start()?;
    Ok(engine)
}
