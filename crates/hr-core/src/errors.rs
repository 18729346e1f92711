//! Structured error types shared across the matching crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`HrError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (vertex ids, line numbers, sizes).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HrError {
    /// Malformed graph: asymmetric edges, dangling references, bad quotas.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Syntax errors in the textual graph format.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// A matching that is inconsistent with its graph.
    #[error("matching error: {0}")]
    Matching(ErrorInfo),
    /// Broken algorithm invariant. Never expected in a correct build.
    #[error("internal error: {0}")]
    Internal(ErrorInfo),
    /// Serialization and IO errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Invalid generator or run configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl HrError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HrError::Graph(info)
            | HrError::Format(info)
            | HrError::Matching(info)
            | HrError::Internal(info)
            | HrError::Serde(info)
            | HrError::Config(info) => info,
        }
    }

    /// Returns the stable error code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Returns a copy of the error with an extra context entry, keeping the family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> HrError {
        let value = value.to_string();
        match self {
            HrError::Graph(info) => HrError::Graph(info.with_context(key, value)),
            HrError::Format(info) => HrError::Format(info.with_context(key, value)),
            HrError::Matching(info) => HrError::Matching(info.with_context(key, value)),
            HrError::Internal(info) => HrError::Internal(info.with_context(key, value)),
            HrError::Serde(info) => HrError::Serde(info.with_context(key, value)),
            HrError::Config(info) => HrError::Config(info.with_context(key, value)),
        }
    }

    /// Returns a copy of the error with a remediation hint, keeping the family.
    pub fn with_hint(self, hint: impl Into<String>) -> HrError {
        match self {
            HrError::Graph(info) => HrError::Graph(info.with_hint(hint)),
            HrError::Format(info) => HrError::Format(info.with_hint(hint)),
            HrError::Matching(info) => HrError::Matching(info.with_hint(hint)),
            HrError::Internal(info) => HrError::Internal(info.with_hint(hint)),
            HrError::Serde(info) => HrError::Serde(info.with_hint(hint)),
            HrError::Config(info) => HrError::Config(info.with_hint(hint)),
        }
    }
}

/// Shorthand for a `graph` family error.
pub fn graph_error(code: impl Into<String>, message: impl Into<String>) -> HrError {
    HrError::Graph(ErrorInfo::new(code, message))
}

/// Shorthand for an `internal` family error.
pub fn internal_error(code: impl Into<String>, message: impl Into<String>) -> HrError {
    HrError::Internal(ErrorInfo::new(code, message))
}
