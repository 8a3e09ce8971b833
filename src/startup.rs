use crate::auth;
use crate::components::{ComponentManager, RunSummary, SyncContext};
use crate::config::{Config, LoggingConfig};
use crate::error::{config_error, Error, SyncResult};
use reqwest::Client;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to the configured file, mirrored to stderr.
///
/// `RUST_LOG` takes precedence over `logging.level`. Keep the returned guard
/// alive for the whole run so buffered lines reach the file.
pub fn init_logging(config: &LoggingConfig) -> SyncResult<WorkerGuard> {
    let file_name = config
        .file
        .file_name()
        .ok_or_else(|| config_error("`logging.file` must name a file"))?;
    let directory = config
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(directory)?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},hyper=warn,reqwest=warn", config.level))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(guard)
}

/// Load the application config and start logging from it
pub fn load_config() -> miette::Result<(Config, WorkerGuard)> {
    start_logging(Config::load(), &LoggingConfig::default())
}

/// Initialize logging from a loaded config.
///
/// A config that failed to load is reported through `fallback` logging so the
/// failure still reaches a log file.
pub fn start_logging(
    loaded: SyncResult<Config>,
    fallback: &LoggingConfig,
) -> miette::Result<(Config, WorkerGuard)> {
    match loaded {
        Ok(config) => {
            let guard = init_logging(&config.logging)?;
            Ok((config, guard))
        }
        Err(e) => {
            let _guard = init_logging(fallback)?;
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Acquire credentials once and run every enabled sync component
pub async fn run(config: Config) -> miette::Result<RunSummary> {
    let client = Client::new();

    let credentials = match auth::acquire_credentials(&config.auth, &client).await {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Failed to acquire credentials: {:?}", e);
            return Err(e.into());
        }
    };
    info!("Credentials ready");

    let ctx = SyncContext::new(config, credentials, client);
    let manager = ComponentManager::with_google_components();
    Ok(manager.run_all(&ctx).await)
}
