//! Rule compilation and matching
//!
//! Pattern templates are compiled once, at setup time, into anchored regular
//! expressions: every `*` becomes a `(.*)` capture group and a `$` anchor is
//! appended. There is deliberately no start anchor — a pattern matches any
//! *suffix* of the request path, which is observable behavior callers rely
//! on (a wildcard-free pattern acts as an exact-suffix match).
//!
//! A `RuleSet` is immutable after construction. `regex::Regex` is safe for
//! concurrent matching, so a `RuleSet` can be shared across in-flight
//! requests behind an `Arc` without locking.

use http::StatusCode;
use regex::{Captures, Regex};

use crate::config::RewriteConfig;
use crate::errors::RewriteError;

/// A single compiled rewrite rule
#[derive(Debug)]
struct CompiledRule {
    pattern: Regex,
    destination: String,
}

impl CompiledRule {
    fn compile(pattern: &str, destination: &str) -> Result<Self, RewriteError> {
        let anchored = format!("{}$", pattern.replace('*', "(.*)"));
        let pattern_regex =
            Regex::new(&anchored).map_err(|source| RewriteError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: pattern_regex,
            destination: destination.to_string(),
        })
    }

    /// Builds the destination string for a match by substituting `$N`
    /// placeholder tokens with the captured values.
    ///
    /// Substitution is a single left-to-right pass: substituted text is never
    /// re-scanned. A token with no corresponding capture (`$0`, or an index
    /// past the last group) is left in the output literally.
    fn expand(&self, captures: &Captures<'_>) -> String {
        let template = self.destination.as_str();
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(idx) = rest.find('$') {
            out.push_str(&rest[..idx]);
            rest = &rest[idx + 1..];

            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits == 0 {
                // Bare '$' with no index
                out.push('$');
                continue;
            }

            let (number, tail) = rest.split_at(digits);
            let capture = number
                .parse::<usize>()
                .ok()
                .filter(|&n| n >= 1)
                .and_then(|n| captures.get(n));
            match capture {
                Some(m) => out.push_str(m.as_str()),
                None => {
                    out.push('$');
                    out.push_str(number);
                }
            }
            rest = tail;
        }
        out.push_str(rest);

        out
    }
}

/// Outcome of a successful rule match
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// Fully substituted destination path
    pub location: String,
    /// Status code to redirect with
    pub status: StatusCode,
}

/// Compiled, ordered set of rewrite rules
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    status: StatusCode,
}

impl RuleSet {
    /// Compiles a validated configuration into a rule set
    ///
    /// Fails if the configuration is invalid or a pattern template is not
    /// valid regular-expression syntax after wildcard substitution.
    pub fn from_config(config: &RewriteConfig) -> Result<Self, RewriteError> {
        config.validate()?;
        let status = config.redirect_status()?;

        let mut rules = Vec::with_capacity(config.rules.len());
        for (pattern, destination) in &config.rules {
            rules.push(CompiledRule::compile(pattern, destination)?);
        }

        Ok(Self { rules, status })
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Tests a request path against the rules in declaration order and
    /// returns the redirect for the first match, if any.
    pub fn evaluate(&self, path: &str) -> Option<Redirect> {
        self.rules.iter().find_map(|rule| {
            rule.pattern.captures(path).map(|captures| Redirect {
                location: rule.expand(&captures),
                status: self.status,
            })
        })
    }
}
