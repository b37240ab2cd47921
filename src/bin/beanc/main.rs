mod args;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use beanc::config::Config;
use beanc::dispatcher;
use clap::Parser;
use tracing::{error, Level};

use crate::args::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logging. stdout carries nothing but pulled job bodies, so logs always go
    // to stderr.
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    if args.json {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .without_time()
            .init();
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "usage error");
            return ExitCode::from(2);
        },
    };

    if let Err(error) = begin(&config).await {
        error!(error = format!("{error:#}"), "beanc failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn begin(config: &Config) -> Result<()> {
    dispatcher::run(config, tokio::io::stdin(), tokio::io::stdout())
        .await
        .with_context(|| format!("{} failed", config.action))
}
