//! Validation errors for user-supplied input
//!
//! These are rejected before any batch starts, so they never leave partial
//! side effects behind. Environment failures (registry I/O, staging root
//! creation) travel as `anyhow::Error` with context instead.

use thiserror::Error;

/// Input rejected before any repository is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A repository URL was empty or had no usable final path segment
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required field was left empty
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// Two fields that must differ were given the same value
    #[error("{first} and {second} must differ (both are '{value}')")]
    SameValue {
        first: &'static str,
        second: &'static str,
        value: String,
    },

    /// The named repository is not in the registry
    #[error("unknown repository '{0}'")]
    UnknownRepository(String),

    /// The same repository was named more than once in one selection
    #[error("repository '{0}' was given more than once")]
    DuplicateName(String),

    /// A branch name git would parse as an option
    #[error("{field} must not start with '-' (got '{value}')")]
    OptionLike { field: &'static str, value: String },
}

/// Fails with [`ValidationError::EmptyField`] when `value` is blank
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// Fails with [`ValidationError::OptionLike`] when `value` starts with `-`
pub fn require_not_option(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim_start().starts_with('-') {
        return Err(ValidationError::OptionLike {
            field,
            value: value.trim().to_string(),
        });
    }
    Ok(())
}

/// Fails with [`ValidationError::SameValue`] when both values are identical
pub fn require_distinct(
    first: &'static str,
    first_value: &str,
    second: &'static str,
    second_value: &str,
) -> Result<(), ValidationError> {
    if first_value.trim() == second_value.trim() {
        return Err(ValidationError::SameValue {
            first,
            second,
            value: first_value.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_rejected() {
        assert_eq!(
            require_non_empty("branch", "   "),
            Err(ValidationError::EmptyField { field: "branch" })
        );
        assert!(require_non_empty("branch", "main").is_ok());
    }

    #[test]
    fn test_option_like_branch_names_are_rejected() {
        assert_eq!(
            require_not_option("branch", " --upload-pack=evil"),
            Err(ValidationError::OptionLike {
                field: "branch",
                value: "--upload-pack=evil".to_string()
            })
        );
        assert!(require_not_option("branch", "feature/x-y").is_ok());
    }

    #[test]
    fn test_identical_values_are_rejected_after_trimming() {
        let err = require_distinct("new branch", "dev ", "base branch", "dev").unwrap_err();
        assert_eq!(err.to_string(), "new branch and base branch must differ (both are 'dev')");
        assert!(require_distinct("new branch", "dev", "base branch", "main").is_ok());
    }
}
