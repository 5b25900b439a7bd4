//! Constraint violation types

use serde::{Deserialize, Serialize};

/// How a violation affects the proposed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the mutation
    Error,
    /// Surfaced to the caller, never blocks
    Warning,
}

/// One rule finding against a proposed course placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Whether this finding blocks the mutation
    pub severity: Severity,

    /// The offending course
    pub course_id: String,

    /// Human-readable finding
    pub message: String,

    /// Remediation hint, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ConstraintViolation {
    /// A blocking violation
    pub fn error(course_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            course_id: course_id.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// A non-blocking violation
    pub fn warning(course_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            course_id: course_id.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a remediation suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Whether this violation blocks the mutation
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {}", tag, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}
