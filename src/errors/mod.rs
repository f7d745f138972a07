use anyhow::Context as _;
use thiserror::Error;

/// Failures raised by the progression engine and the result store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Caller supplied something the engine refuses to work with; re-prompt.
    #[error("{0}")]
    InputInvalid(String),
    /// Stored data contradicts itself or the requested transition.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
    #[error("{0} not found")]
    NotFound(String),
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InputInvalid(message.into())
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        EngineError::InconsistentState(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound(what.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Add context to store errors
pub fn store_context(operation: &str, entity: &str) -> String {
    format!("Failed to {} {}", operation, entity)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Wrap result with parse context
pub fn with_parse_context<T, E>(result: Result<T, E>, data_type: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(parse_context(data_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_invalid_displays_message_verbatim() {
        let err = EngineError::invalid("cannot generate grouping: fewer than 2 participants");
        assert_eq!(
            err.to_string(),
            "cannot generate grouping: fewer than 2 participants"
        );
    }

    #[test]
    fn parse_context_wraps_source() {
        let result: Result<i32, std::num::ParseIntError> = "x".parse::<i32>();
        let err = with_parse_context(result, "rank").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse rank");
    }
}
