use super::token::{TokenInfo, TokenManager};
use super::SCOPES;
use crate::error::{auth_error, other_error, SyncResult};
use tracing::{info, warn};
use url::Url;

/// Run the interactive browser authorization and store the resulting token.
///
/// Opens the consent page, waits for Google to redirect back to a local
/// callback server and exchanges the returned code.
pub async fn authorize(manager: &TokenManager, port: u16) -> SyncResult<TokenInfo> {
    let state = uuid::Uuid::new_v4().to_string();
    let redirect_uri = format!("http://localhost:{}", port);
    let auth_url = authorization_url(manager, &redirect_uri, &state)?;

    // The redirect must have somewhere to land before the user consents
    let server = bind_callback_server(port)?;

    println!("Opening browser for Google authorization...");
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Could not open browser: {}", e);
    }
    println!("If the browser did not open, visit:\n{}", auth_url);
    info!("Waiting for authorization callback on port {}", port);

    let code = tokio::task::spawn_blocking(move || wait_for_code(&server, &state))
        .await
        .map_err(|e| other_error(&format!("Callback task failed: {}", e)))??;

    let token = manager.exchange_code(&code, &redirect_uri).await?;
    info!(
        "Authorization complete, token saved to {}",
        manager.token_path().display()
    );
    Ok(token)
}

/// Build the consent page URL for all scopes this tool needs
pub fn authorization_url(
    manager: &TokenManager,
    redirect_uri: &str,
    state: &str,
) -> SyncResult<Url> {
    let secrets = manager.secrets();
    let scope = SCOPES.join(" ");
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| other_error(&format!("Invalid auth_uri: {}", e)))
}

/// Listen for the OAuth redirect on `localhost:<port>`
fn bind_callback_server(port: u16) -> SyncResult<tiny_http::Server> {
    tiny_http::Server::http(("127.0.0.1", port)).map_err(|e| {
        other_error(&format!(
            "Failed to start callback server on port {}: {}",
            port, e
        ))
    })
}

/// Serve callback requests until one carries an authorization code
fn wait_for_code(server: &tiny_http::Server, state: &str) -> SyncResult<String> {
    loop {
        let request = server.recv()?;

        match parse_callback(request.url(), state) {
            Ok(Some(code)) => {
                let response = tiny_http::Response::from_string(
                    "Authorization successful! You can close this window.",
                );
                let _ = request.respond(response);
                return Ok(code);
            }
            Ok(None) => {
                // Browsers also ask for /favicon.ico and the like
                let _ = request.respond(tiny_http::Response::empty(tiny_http::StatusCode(404)));
            }
            Err(e) => {
                let response =
                    tiny_http::Response::from_string(format!("Authorization failed: {}", e))
                        .with_status_code(tiny_http::StatusCode(400));
                let _ = request.respond(response);
                return Err(e);
            }
        }
    }
}

/// Extract the authorization code from a callback request path.
///
/// Returns `Ok(None)` for requests that are not an OAuth callback.
pub fn parse_callback(request_url: &str, expected_state: &str) -> SyncResult<Option<String>> {
    let url = Url::parse("http://localhost")
        .and_then(|base| base.join(request_url))
        .map_err(|e| auth_error(&format!("Invalid callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(auth_error(&format!("Authorization denied: {}", value))),
            _ => {}
        }
    }

    let Some(code) = code else {
        return Ok(None);
    };

    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in authorization callback"));
    }

    Ok(Some(code))
}
