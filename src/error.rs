//! Error types for the evaluator

use thiserror::Error;

use crate::value::JsValue;

/// Main error type for the evaluator
///
/// Every variant is fatal to the step that produced it: the evaluator never
/// recovers from an error on its own, the host decides what to do next.
#[derive(Debug, Error)]
pub enum JsError {
    /// Control flow that has no valid target (`break` outside a loop,
    /// `return` outside a function) or source the parser rejected.
    #[error("SyntaxError: {message}")]
    SyntaxError { message: String },

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("ReferenceError: {name} is not defined")]
    ReferenceError { name: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    /// An operator token the dispatch table does not recognize.
    #[error("Unknown operator: {operator}")]
    UnknownOperator { operator: String },

    /// A value raised by a script-level `throw` statement.
    #[error("Uncaught {message}")]
    Thrown { message: String, value: JsValue },

    /// Syntax tree or configuration could not be decoded.
    #[error("Malformed input: {0}")]
    Json(#[from] serde_json::Error),
}

impl JsError {
    pub fn syntax_error(message: impl Into<String>) -> Self {
        JsError::SyntaxError {
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn reference_error(name: impl Into<String>) -> Self {
        JsError::ReferenceError { name: name.into() }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    pub fn unknown_operator(operator: impl Into<String>) -> Self {
        JsError::UnknownOperator {
            operator: operator.into(),
        }
    }

    /// Wrap a thrown script value. `message` is its string coercion.
    pub fn thrown(message: impl Into<String>, value: JsValue) -> Self {
        JsError::Thrown {
            message: message.into(),
            value,
        }
    }

    /// The script value carried by a `throw`, if this error came from one
    pub fn thrown_value(&self) -> Option<&JsValue> {
        match self {
            JsError::Thrown { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Short name of the error class, as a script would see it
    pub fn kind(&self) -> &'static str {
        match self {
            JsError::SyntaxError { .. } => "SyntaxError",
            JsError::TypeError { .. } => "TypeError",
            JsError::ReferenceError { .. } => "ReferenceError",
            JsError::RangeError { .. } => "RangeError",
            JsError::UnknownOperator { .. } => "UnknownOperator",
            JsError::Thrown { .. } => "Thrown",
            JsError::Json(_) => "MalformedInput",
        }
    }
}
