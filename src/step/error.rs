use thiserror::Error;

use crate::format::template::TemplateError;

// ============================================================================
// Step signals
// ============================================================================

/// Raised by a step body to report that the step is ignored.
///
/// Only classified as ignored when the configured classifier recognises it
/// (see [`crate::result::status::classify_signals`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step ignored: {reason}")]
pub struct StepIgnored {
    pub reason: String,
}

impl StepIgnored {
    pub fn new(reason: impl Into<String>) -> Self {
        StepIgnored {
            reason: reason.into(),
        }
    }
}

/// Raised by a step body to report that the step was bypassed
/// (intentionally not performed). Does not halt the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step bypassed: {reason}")]
pub struct StepBypassed {
    pub reason: String,
}

impl StepBypassed {
    pub fn new(reason: impl Into<String>) -> Self {
        StepBypassed {
            reason: reason.into(),
        }
    }
}

/// A panic caught while resolving arguments or running a step body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step panicked: {message}")]
pub struct StepPanicked {
    pub message: String,
}

impl StepPanicked {
    pub fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        StepPanicked { message }
    }
}

// ============================================================================
// Declaration errors
// ============================================================================

/// A malformed scenario declaration, reported before any step runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("step {step}: name is empty")]
    EmptyName { step: usize },

    #[error("step {step} '{template}': parameter name '{name}' is not an identifier")]
    InvalidParameterName {
        step: usize,
        template: String,
        name: String,
    },

    #[error("step {step} '{template}': parameter '{name}' is declared twice")]
    DuplicateParameter {
        step: usize,
        template: String,
        name: String,
    },

    #[error("step {step} '{template}': {declared} parameter(s) declared but {provided} argument(s) supplied")]
    ArityMismatch {
        step: usize,
        template: String,
        declared: usize,
        provided: usize,
    },

    #[error("step {step} '{template}': malformed template: {source}")]
    MalformedTemplate {
        step: usize,
        template: String,
        source: TemplateError,
    },

    #[error("step {step} '{template}': placeholder '{{{name}}}' does not name a declared parameter")]
    UnknownPlaceholder {
        step: usize,
        template: String,
        name: String,
    },

    #[error("step {step} '{template}': {placeholders} positional placeholder(s) but only {parameters} parameter(s)")]
    TooManyPlaceholders {
        step: usize,
        template: String,
        placeholders: usize,
        parameters: usize,
    },
}
