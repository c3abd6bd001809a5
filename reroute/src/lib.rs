pub mod config;
pub mod http;
pub mod service;

use rewrite::{RedirectService, RuleSet};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rewrite(#[from] rewrite::RewriteError),
}

pub async fn run(config: config::Config) -> Result<(), ServerError> {
    let rules = Arc::new(RuleSet::from_config(&config.rewrite)?);
    tracing::info!(rules = rules.len(), "Compiled rewrite rules");

    let listener = TcpListener::bind(format!(
        "{}:{}",
        config.listener.host, config.listener.port
    ))
    .await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    let service = RedirectService::new(rules, service::FallbackService);
    http::serve(listener, service).await?;

    Ok(())
}
