use goodash_sync::auth::{flow, ClientSecrets, TokenManager};
use goodash_sync::startup;

/// Run the Google authorization flow and store a fresh token, even when a
/// cached one exists.
#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let (config, _log_guard) = startup::load_config()?;

    let secrets = ClientSecrets::from_file(&config.auth.client_secrets)?;
    let manager = TokenManager::new(&config.auth.token_file, secrets, reqwest::Client::new());

    flow::authorize(&manager, config.auth.redirect_port).await?;

    println!(
        "Token successfully saved to {}",
        config.auth.token_file.display()
    );
    Ok(())
}
