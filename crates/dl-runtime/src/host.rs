use std::collections::BTreeMap;
use std::fmt;

use dl_core::{DialogueError, ErrorKind};

/// Named side-effecting callables reachable through `$call$` assignments.
pub trait HostCallRegistry: Send + Sync {
    fn call(&self, name: &str) -> Result<String, DialogueError>;
    fn names(&self) -> &[String];

    fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|candidate| candidate == name)
    }
}

#[derive(Debug, Default)]
pub struct EmptyHostCallRegistry {
    names: Vec<String>,
}

impl HostCallRegistry for EmptyHostCallRegistry {
    fn call(&self, name: &str) -> Result<String, DialogueError> {
        Err(DialogueError::new(
            ErrorKind::Host,
            "ENGINE_HOST_CALL_MISSING",
            format!("Host call registry is empty; cannot call \"{}\".", name),
        ))
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

/// Registry that only declares names. Pair it with deferred host calls: the
/// caller answers each `Call` boundary itself, so `call` is never reached.
#[derive(Debug, Default, Clone)]
pub struct DeclaredHostCallRegistry {
    names: Vec<String>,
}

impl DeclaredHostCallRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !declared.contains(&name) {
                declared.push(name);
            }
        }
        Self { names: declared }
    }
}

impl HostCallRegistry for DeclaredHostCallRegistry {
    fn call(&self, name: &str) -> Result<String, DialogueError> {
        Err(DialogueError::new(
            ErrorKind::Host,
            "ENGINE_HOST_CALL_DEFERRED",
            format!("Host call \"{}\" must be answered by the caller.", name),
        ))
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

type HostCall = Box<dyn Fn() -> Result<String, DialogueError> + Send + Sync>;

/// Registry backed by closures. Any presentation handle a call needs is
/// captured by its closure.
#[derive(Default)]
pub struct FnHostCallRegistry {
    names: Vec<String>,
    calls: BTreeMap<String, HostCall>,
}

impl FnHostCallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, call: F) -> Self
    where
        F: Fn() -> Result<String, DialogueError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.calls.insert(name.clone(), Box::new(call)).is_none() {
            self.names.push(name);
        }
        self
    }
}

impl fmt::Debug for FnHostCallRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHostCallRegistry")
            .field("names", &self.names)
            .finish()
    }
}

impl HostCallRegistry for FnHostCallRegistry {
    fn call(&self, name: &str) -> Result<String, DialogueError> {
        let call = self.calls.get(name).ok_or_else(|| {
            DialogueError::new(
                ErrorKind::Host,
                "ENGINE_HOST_CALL_MISSING",
                format!("Host call \"{}\" is not registered.", name),
            )
        })?;
        call()
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}
