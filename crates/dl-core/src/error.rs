use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidExpression,
    Compile,
    TransitionResolution,
    UnknownStateReference,
    BadAssignment,
    Host,
    Protocol,
}

impl ErrorKind {
    /// Fatal kinds abort script loading or end the conversation; every other
    /// kind is contained within the turn that raised it.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::Compile | Self::UnknownStateReference | Self::Protocol
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct DialogueError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub offending_text: Option<String>,
    pub span: Option<SourceSpan>,
}

impl DialogueError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            offending_text: None,
            span: None,
        }
    }

    pub fn invalid_expression(
        code: impl Into<String>,
        message: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidExpression, code, message).with_offending_text(text)
    }

    pub fn compile(
        code: impl Into<String>,
        reason: impl Into<String>,
        offending_text: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::new(ErrorKind::Compile, code, reason)
            .with_offending_text(offending_text)
            .with_span(SourceSpan::line(line))
    }

    pub fn protocol(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, code, message)
    }

    pub fn with_offending_text(mut self, text: impl Into<String>) -> Self {
        self.offending_text = Some(text.into());
        self
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}
