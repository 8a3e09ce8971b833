//! Google OAuth credentials.
//!
//! Credentials are acquired once at startup and shared by every sync
//! component. A cached token file is used when possible; otherwise the
//! interactive browser flow runs.

pub mod flow;
pub mod secrets;
pub mod token;

pub use secrets::ClientSecrets;
pub use token::{TokenInfo, TokenManager};

use crate::config::AuthConfig;
use crate::error::{Error, SyncResult};
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Scopes requested for all three services
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/photoslibrary.readonly",
    "https://www.googleapis.com/auth/calendar.events.readonly",
];

/// Authorized credential handle passed to every provider client
#[derive(Clone)]
pub struct Credentials {
    access_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Load the cached token, falling back to interactive authorization.
///
/// Client secrets are only read when the cached token has to be refreshed or
/// replaced.
pub async fn acquire_credentials(config: &AuthConfig, client: &Client) -> SyncResult<Credentials> {
    if let Ok(Some(token)) = token::read_token_file(&config.token_file) {
        if token.is_usable_at(Utc::now().timestamp()) {
            debug!("Using cached access token");
            return Ok(Credentials::new(token.access_token));
        }
    }

    let secrets = ClientSecrets::from_file(&config.client_secrets)?;
    let manager = TokenManager::new(&config.token_file, secrets, client.clone());

    let token = match manager.get_token().await {
        Ok(token) => token,
        Err(Error::Auth(reason)) => {
            warn!("{}", reason);
            info!("Starting interactive authorization");
            flow::authorize(&manager, config.redirect_port).await?
        }
        Err(e) => return Err(e),
    };

    Ok(Credentials::new(token.access_token))
}
