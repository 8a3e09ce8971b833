use crate::error::{config_error, SyncResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client registration downloaded from the Google Cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// The console wraps the registration in an `installed` or `web` object
#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!(
                "Failed to read client secrets {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SyncResult<Self> {
        let file: SecretsFile = serde_json::from_str(content)
            .map_err(|e| config_error(&format!("Invalid client secrets: {}", e)))?;

        file.installed
            .or(file.web)
            .ok_or_else(|| config_error("Client secrets contain neither `installed` nor `web`"))
    }
}
