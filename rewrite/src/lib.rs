pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod rules;
pub mod service;

pub use config::RewriteConfig;
pub use errors::RewriteError;
pub use rules::{Redirect, RuleSet};
pub use service::{Filter, RedirectService};
