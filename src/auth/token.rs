use super::secrets::ClientSecrets;
use super::SCOPES;
use crate::error::{auth_error, check_status, Error, SyncResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Refresh a little before Google's expiry to avoid mid-run failures
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token data persisted in the token file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp when the access token expires
    pub expires_at: i64,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenInfo {
    pub fn is_expired_at(&self, now_ts: i64) -> bool {
        self.expires_at <= now_ts + EXPIRY_MARGIN_SECS
    }

    pub fn has_scopes(&self, required: &[&str]) -> bool {
        required
            .iter()
            .all(|scope| self.scopes.iter().any(|s| s == scope))
    }

    /// Covers every scope and is not about to expire
    pub fn is_usable_at(&self, now_ts: i64) -> bool {
        self.has_scopes(SCOPES) && !self.is_expired_at(now_ts)
    }
}

/// Read a token file, `None` if it does not exist
pub fn read_token_file(path: &Path) -> SyncResult<Option<TokenInfo>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let token = serde_json::from_str(&content)
        .map_err(|e| auth_error(&format!("Failed to parse token file: {}", e)))?;
    Ok(Some(token))
}

/// Response of the OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

/// Loads, refreshes and stores the OAuth token file
#[derive(Debug, Clone)]
pub struct TokenManager {
    token_path: PathBuf,
    secrets: ClientSecrets,
    client: Client,
}

impl TokenManager {
    pub fn new(token_path: impl Into<PathBuf>, secrets: ClientSecrets, client: Client) -> Self {
        Self {
            token_path: token_path.into(),
            secrets,
            client,
        }
    }

    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Get a usable token from the token file, refreshing it when expired.
    ///
    /// Fails with `Error::Auth` when the file is missing or unusable, which
    /// callers treat as "run the interactive flow".
    pub async fn get_token(&self) -> SyncResult<TokenInfo> {
        let token = self
            .load()?
            .ok_or_else(|| auth_error("No token found. Authorization required."))?;

        if !token.has_scopes(SCOPES) {
            return Err(auth_error("Stored token is missing required scopes"));
        }

        if !token.is_expired_at(Utc::now().timestamp()) {
            debug!("Using cached access token");
            return Ok(token);
        }

        info!("Access token expired, refreshing");
        self.refresh_token(&token).await
    }

    /// Read the token file, `None` if it does not exist
    pub fn load(&self) -> SyncResult<Option<TokenInfo>> {
        read_token_file(&self.token_path)
    }

    pub fn save(&self, token: &TokenInfo) -> SyncResult<()> {
        if let Some(parent) = self
            .token_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.token_path, serde_json::to_string_pretty(token)?)?;
        debug!("Saved token to {}", self.token_path.display());
        Ok(())
    }

    /// Refresh an expired token and persist the result
    pub async fn refresh_token(&self, token: &TokenInfo) -> SyncResult<TokenInfo> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| auth_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.request_token(&params).await?;

        // Google omits the refresh token on refresh; keep the one we have
        let refreshed = TokenInfo {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .or_else(|| token.refresh_token.clone()),
            expires_at: expires_at(response.expires_in),
            scopes: response
                .scope
                .map(split_scopes)
                .unwrap_or_else(|| token.scopes.clone()),
        };

        self.save(&refreshed)?;
        info!("Access token refreshed");
        Ok(refreshed)
    }

    /// Exchange an authorization code for a token and persist it
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> SyncResult<TokenInfo> {
        let params = [
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self.request_token(&params).await?;
        let token = TokenInfo {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: expires_at(response.expires_in),
            scopes: response
                .scope
                .map(split_scopes)
                .unwrap_or_else(|| SCOPES.iter().map(|s| s.to_string()).collect()),
        };

        self.save(&token)?;
        Ok(token)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> SyncResult<TokenResponse> {
        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(params)
            .send()
            .await?;

        // A rejected grant means the stored authorization is no longer valid
        let response = check_status("OAuth token", response)
            .await
            .map_err(|e| match e {
                Error::Api { status, body, .. } => {
                    auth_error(&format!("Token request rejected: HTTP {} - {}", status, body))
                }
                other => other,
            })?;

        response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))
    }
}

fn expires_at(expires_in: Option<i64>) -> i64 {
    Utc::now().timestamp() + expires_in.unwrap_or(3600)
}

fn split_scopes(scope: String) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}
