use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use course_client::{run, ClientConfig, CourseClient};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ClientConfig::from_env().context("failed to load configuration")?;

    let client = match CourseClient::connect(&config).await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, address = %config.address, "failed to connect to course service");
            return Ok(ExitCode::FAILURE);
        }
    };
    info!(address = %config.address, "connected to course service");

    run(&client, &config).await;
    Ok(ExitCode::SUCCESS)
}
