//! Interactive mode for the server.
//!
//! Prompts for the source, bind address and port before starting the
//! server.

use dialoguer::{Confirm, Input, Select};

use casewatch_source::registry::{DEFAULT_SOURCE_ID, all_sources};

use crate::{ServerConfig, run_server};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Starts from [`ServerConfig::from_env`] and lets the user override the
/// source, bind address and port.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration cannot be
/// built, a prompt fails, or the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Casewatch Server");
    println!();

    let mut config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    let sources = all_sources().map_err(std::io::Error::other)?;
    let labels: Vec<String> = sources
        .iter()
        .map(|s| format!("{} ({})", s.name, s.id))
        .collect();
    let default = sources
        .iter()
        .position(|s| s.id == config.source.id)
        .or_else(|| sources.iter().position(|s| s.id == DEFAULT_SOURCE_ID))
        .unwrap_or(0);

    if !sources.is_empty() {
        let choice = Select::new()
            .with_prompt("Source")
            .items(&labels)
            .default(default)
            .interact()
            .map_err(std::io::Error::other)?;
        config.source = sources[choice].clone();
    }

    config.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(config.bind_addr.clone())
        .interact_text()
        .map_err(std::io::Error::other)?;

    config.port = Input::new()
        .with_prompt("Port")
        .default(config.port)
        .interact_text()
        .map_err(std::io::Error::other)?;

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{} with {}?",
            config.bind_addr, config.port, config.source.name
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    run_server(config).await
}
