//! Compiler Errors
//!
//! Every fallible operation in the crate reports a [`CompilerError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Parse error in expression '{expression}': {message}")]
    ParseError { message: String, expression: String },

    #[error("Evaluation error: {message}")]
    EvalError { message: String },

    #[error("Malformed repeat expression '{expression}': {reason}")]
    MalformedRepeat { expression: String, reason: String },

    #[error("Cannot resolve collection '{path}' in repeat expression '{expression}'")]
    UnresolvedCollection { expression: String, path: String },

    #[error("Element carries both '{first}' and '{second}' structural directives")]
    ConflictingStructural { first: String, second: String },

    #[error("Directive '{directive}' requires an argument (e.g. '{directive}:name')")]
    MissingArgument { directive: String },

    #[error("Unsupported shorthand '{expression}': {reason}")]
    UnsupportedShorthand { expression: String, reason: String },

    #[error("Directive '{directive}' requires the element to have a parent node")]
    DetachedNode { directive: String },

    #[error("Scope data must be an object, got {found}")]
    InvalidScope { found: String },

    #[error("Invalid compiler configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration is not valid JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),
}

impl CompilerError {
    pub fn parse(message: impl Into<String>, expression: &str) -> Self {
        CompilerError::ParseError {
            message: message.into(),
            expression: expression.to_string(),
        }
    }

    pub fn eval(message: impl Into<String>) -> Self {
        CompilerError::EvalError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompilerError>;
