//! CLI Configuration

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use chatline_core::{ClientConfig, Credentials};

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory for the saved session.
    pub data_dir: PathBuf,
    /// Core client settings.
    pub client: ClientConfig,
}

/// Credentials saved by `login`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    user_id: String,
    token: String,
}

impl CliConfig {
    /// Returns the session file path.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Returns true if a session has been saved.
    pub fn is_logged_in(&self) -> bool {
        self.session_path().exists()
    }

    /// Saves credentials for later commands.
    pub fn save_credentials(&self, credentials: &Credentials) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create {:?}", self.data_dir))?;

        let stored = StoredSession {
            user_id: credentials.user_id.clone(),
            token: credentials.token.clone(),
        };
        fs::write(self.session_path(), serde_json::to_vec_pretty(&stored)?)?;
        Ok(())
    }

    /// Loads the saved credentials.
    pub fn load_credentials(&self) -> Result<Credentials> {
        if !self.is_logged_in() {
            bail!("Not logged in. Run 'chatline login <user>' first.");
        }
        let data = fs::read(self.session_path())?;
        let stored: StoredSession =
            serde_json::from_slice(&data).context("Saved session is corrupt; log in again")?;
        Ok(Credentials::new(&stored.user_id, &stored.token))
    }

    /// Forgets the saved credentials. Returns false if there were none.
    pub fn clear_credentials(&self) -> Result<bool> {
        if !self.is_logged_in() {
            return Ok(false);
        }
        fs::remove_file(self.session_path())?;
        Ok(true)
    }
}
