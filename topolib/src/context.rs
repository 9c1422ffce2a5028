//! Per-call execution contexts.
//!
//! Every public operation creates its own engine context from explicit
//! [`ContextOptions`] and drops it before returning. The options are injected
//! into the [`ContextFactory`]; nothing in here reads global state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::GeodesyEngine;
use crate::error::CrsResult;

/// Engine diagnostic verbosity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    None,
    Error,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map the integer stored in settings (0 = none .. 3 = trace).
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=0 => LogLevel::None,
            1 => LogLevel::Error,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn as_level(self) -> i64 {
        match self {
            LogLevel::None => 0,
            LogLevel::Error => 1,
            LogLevel::Debug => 2,
            LogLevel::Trace => 3,
        }
    }
}

/// Settings applied to every context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextOptions {
    pub log_level: LogLevel,
    pub allow_network: bool,
}

impl ContextOptions {
    pub fn new(log_level: LogLevel, allow_network: bool) -> Self {
        Self {
            log_level,
            allow_network,
        }
    }
}

/// Receiver for engine diagnostics.
pub type DiagnosticSink = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Target used for re-emitted engine diagnostics.
pub const ENGINE_LOG_TARGET: &str = "topolib::engine";

/// Sink forwarding engine diagnostics to `tracing`.
pub fn tracing_sink() -> DiagnosticSink {
    Arc::new(|level: LogLevel, message: &str| match level {
        LogLevel::Error => tracing::error!(target: ENGINE_LOG_TARGET, "{}", message),
        LogLevel::Debug => tracing::debug!(target: ENGINE_LOG_TARGET, "{}", message),
        LogLevel::Trace => tracing::trace!(target: ENGINE_LOG_TARGET, "{}", message),
        LogLevel::None => {}
    })
}

/// Creates engine contexts from injected options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFactory {
    options: ContextOptions,
}

impl ContextFactory {
    pub fn new(options: ContextOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ContextOptions {
        self.options
    }

    /// Create a fresh context. A diagnostic sink is attached only when the
    /// log level is above `None`.
    pub fn create<E: GeodesyEngine>(&self, engine: &E) -> CrsResult<E::Context> {
        let sink = (self.options.log_level > LogLevel::None).then(tracing_sink);
        tracing::trace!(
            engine = engine.name(),
            log_level = ?self.options.log_level,
            allow_network = self.options.allow_network,
            "creating context"
        );
        Ok(engine.create_context(&self.options, sink)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(LogLevel::from_level(-5), LogLevel::None);
        assert_eq!(LogLevel::from_level(0), LogLevel::None);
        assert_eq!(LogLevel::from_level(1), LogLevel::Error);
        assert_eq!(LogLevel::from_level(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_level(3), LogLevel::Trace);
        assert_eq!(LogLevel::from_level(9), LogLevel::Trace);
        assert_eq!(LogLevel::Debug.as_level(), 2);
    }

    #[test]
    fn test_default_options() {
        let options = ContextOptions::default();
        assert_eq!(options.log_level, LogLevel::None);
        assert!(!options.allow_network);
    }
}
