//! Login Command
//!
//! Exchanges a password for a token and saves the session.

use anyhow::{Context, Result};
use dialoguer::Password;

use chatline_core::{ApiError, Session};

use crate::config::CliConfig;
use crate::display;

/// Logs in and saves the credentials.
pub async fn run(user_id: &str, password: Option<String>, config: &CliConfig) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt(format!("Password for {}", user_id))
            .interact()
            .context("Failed to read password")?,
    };

    let session = match Session::login(config.client.clone(), user_id, &password).await {
        Ok(session) => session,
        Err(err) if err.is_unauthorized() => {
            anyhow::bail!("Login refused for {}: wrong user or password", user_id)
        }
        Err(ApiError::Request(err)) => {
            anyhow::bail!("Could not reach {}: {}", config.client.api_base_url, err)
        }
        Err(err) => return Err(err.into()),
    };

    config.save_credentials(session.credentials())?;
    display::success(&format!("Logged in as {}", session.user_id()));
    Ok(())
}

/// Forgets the saved session.
pub fn logout(config: &CliConfig) -> Result<()> {
    if config.clear_credentials()? {
        display::success("Logged out");
    } else {
        display::info("No saved session");
    }
    Ok(())
}
