use crate::auth::Credentials;
use crate::config::Config;
use crate::error::SyncResult;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use std::fmt;
use tracing::{error, info};

// Export components
pub mod calendar;
pub mod photos;
pub mod sheets;

pub use calendar::CalendarSync;
pub use photos::PhotoSync;
pub use sheets::SheetReader;

/// Everything a sync component needs for one run, built once at startup
pub struct SyncContext {
    pub config: Config,
    pub credentials: Credentials,
    pub client: Client,
    /// Reference time shared by all components in this run
    pub now: DateTime<Local>,
}

impl SyncContext {
    pub fn new(config: Config, credentials: Credentials, client: Client) -> Self {
        Self {
            config,
            credentials,
            client,
            now: Local::now(),
        }
    }
}

/// Component trait that all sync operations implement
#[async_trait]
pub trait SyncComponent: Send + Sync {
    /// Get the name of the component, also its key in `[components]`
    fn name(&self) -> &'static str;

    /// Run one fetch-transform-write cycle
    async fn run(&self, ctx: &SyncContext) -> SyncResult<()>;
}

/// Outcome of one orchestrator pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: Vec<&'static str>,
    pub failed: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Manager for all components
pub struct ComponentManager {
    components: Vec<Box<dyn SyncComponent>>,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentManager")
            .field("component_count", &self.components.len())
            .finish()
    }
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentManager {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Manager with the Google photo, calendar and sheet components in run order
    pub fn with_google_components() -> Self {
        let mut manager = Self::new();
        manager.register(PhotoSync);
        manager.register(CalendarSync);
        manager.register(SheetReader);
        manager
    }

    /// Register a component
    pub fn register<T: SyncComponent + 'static>(&mut self, component: T) {
        info!("Registering component: {}", component.name());
        self.components.push(Box::new(component));
    }

    /// Run every enabled component in registration order.
    ///
    /// A failing component is logged and does not stop the ones after it.
    pub async fn run_all(&self, ctx: &SyncContext) -> RunSummary {
        let mut summary = RunSummary::default();

        for component in &self.components {
            let name = component.name();
            if !ctx.config.is_component_enabled(name) {
                info!("Component {} is disabled, skipping", name);
                summary.skipped.push(name);
                continue;
            }

            info!("Running component: {}", name);
            match component.run(ctx).await {
                Ok(()) => summary.succeeded.push(name),
                Err(e) => {
                    // Log error but continue with other components
                    error!("Error running component {}: {:?}", name, e);
                    summary.failed.push(name);
                }
            }
        }

        summary
    }

    /// Get a component by name
    pub fn get_component_by_name(&self, name: &str) -> Option<&dyn SyncComponent> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }
}
