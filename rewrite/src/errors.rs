use thiserror::Error;

use crate::config::ValidationError;

/// Errors that can occur while building a rule set
///
/// Rule compilation is the only failure point of the matcher; once a
/// `RuleSet` exists, evaluating requests against it cannot fail.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Invalid rewrite pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
