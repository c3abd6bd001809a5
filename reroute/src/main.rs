use clap::Parser;
use reroute::config::Config;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Config-driven path rewrite/redirect server
#[derive(Parser)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = reroute::run(config).await {
        eprintln!("Server error: {e}");
        process::exit(1);
    }
}
