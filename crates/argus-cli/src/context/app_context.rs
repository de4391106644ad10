use std::sync::Arc;

use anyhow::Context;
use argus_config::ArgusConfig;
use argus_db::ArgusStore;

use crate::cli::GlobalFlags;

/// Load layered configuration, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ArgusConfig> {
    let mut config = ArgusConfig::load_with_dotenv().context("failed to load argus config")?;
    if let Some(data_dir) = &flags.data_dir {
        config.general.data_dir.clone_from(data_dir);
    }
    Ok(config)
}

/// Shared application resources initialized once for commands that touch
/// the run store.
pub struct AppContext {
    pub config: ArgusConfig,
    pub store: Arc<ArgusStore>,
}

impl AppContext {
    pub async fn init(config: ArgusConfig) -> anyhow::Result<Self> {
        let store = ArgusStore::open(&config.general)
            .await
            .with_context(|| {
                format!(
                    "failed to open run store in {}",
                    config.general.data_dir
                )
            })?;
        tracing::debug!(data_dir = %config.general.data_dir, "application context ready");
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Context over an in-memory store, for command tests.
    #[cfg(test)]
    pub async fn in_memory(config: ArgusConfig) -> Self {
        let store = ArgusStore::in_memory()
            .await
            .expect("in-memory store should open");
        Self {
            config,
            store: Arc::new(store),
        }
    }
}
