//! Configuration: settings file, process-wide context options and the
//! persisted key/value store.

mod settings;
mod store;

pub use settings::{default_config_path, ContextSettings, Settings, CONFIG_ENV_VAR};
pub use store::{KeyValueStore, ReadAllMode};

use parking_lot::RwLock;
use std::sync::OnceLock;

use crate::context::ContextOptions;
use crate::error::CrsResult;

/// Context options shared by the function registry, set once at startup.
static GLOBAL_OPTIONS: OnceLock<RwLock<ContextOptions>> = OnceLock::new();

fn global() -> &'static RwLock<ContextOptions> {
    GLOBAL_OPTIONS.get_or_init(|| RwLock::new(ContextOptions::default()))
}

/// Current process-wide context options.
pub fn global_options() -> ContextOptions {
    *global().read()
}

/// Replace the process-wide context options.
pub fn set_global_options(options: ContextOptions) {
    *global().write() = options;
}

/// Load settings from the default location, apply environment overrides and
/// publish the resulting context options.
pub fn init_from_environment() -> CrsResult<Settings> {
    let path = default_config_path()?;
    let settings = Settings::load(&path)?.with_env_overrides()?;
    set_global_options(settings.context_options());
    tracing::debug!(
        path = %path.display(),
        log_level = ?settings.context.log_level,
        allow_network = settings.context.allow_network,
        "configuration loaded"
    );
    Ok(settings)
}
