use goodash_sync::startup;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    // Load configuration and initialize logging; the guard flushes the log
    // file on exit
    let (config, _log_guard) = startup::load_config()?;

    info!("Starting...");
    let summary = startup::run(config).await?;

    info!(
        "Done. {} succeeded, {} failed, {} disabled",
        summary.succeeded.len(),
        summary.failed.len(),
        summary.skipped.len()
    );
    Ok(())
}
