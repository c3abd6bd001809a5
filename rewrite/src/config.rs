use http::StatusCode;
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Default status code for redirect responses (302 Found)
pub(crate) const DEFAULT_REDIRECT_STATUS: StatusCode = StatusCode::FOUND;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No rewrite rules configured")]
    EmptyRules,

    #[error("Invalid redirect status code: {0}")]
    InvalidStatusCode(u16),
}

/// Rewrite rule configuration
///
/// `rules` maps a path pattern template to a destination template. Every `*`
/// in a pattern matches any sequence of characters (including the empty one)
/// and captures it; captured values can be referenced from the destination
/// as `$1`, `$2` and so on. Patterns are anchored at the end of the request
/// path only, so a pattern without a wildcard matches any path ending with
/// that literal text.
///
/// Rules are tried in declaration order and the first match wins.
///
/// Note: Uses an `IndexMap` so the declaration order in the config file is
/// the match priority. The rule set would otherwise be order-dependent on
/// map iteration, which makes multi-match behavior non-deterministic.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RewriteConfig {
    /// Pattern template -> destination template, tried in declaration order
    ///
    /// Example:
    ///   "/old":              "/new"
    ///   "/api/*":            "/$1"
    ///   "/users/*/orders/*": "/user/$1/order/$2"
    pub rules: IndexMap<String, String>,

    /// Status code for redirect responses. Defaults to 302 when unset.
    pub status_code: Option<u16>,
}

impl RewriteConfig {
    /// Validates the rewrite configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rules.is_empty() {
            return Err(ValidationError::EmptyRules);
        }
        self.redirect_status()?;
        Ok(())
    }

    /// Resolves the effective redirect status code
    pub fn redirect_status(&self) -> Result<StatusCode, ValidationError> {
        match self.status_code {
            None => Ok(DEFAULT_REDIRECT_STATUS),
            Some(code) => {
                StatusCode::from_u16(code).map_err(|_| ValidationError::InvalidStatusCode(code))
            }
        }
    }
}
