//! PROJ context - holds logging, network and error state for a thread of work

use crate::error::{Error, Result};
use proj_sys as ffi;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::rc::Rc;

/// PROJ log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Nothing is logged
    #[default]
    None,
    /// Errors only
    Error,
    /// Errors and debug messages
    Debug,
    /// Everything, including trace messages
    Trace,
    /// Internal: only used to query the level
    Tell,
}

impl LogLevel {
    fn to_ffi(self) -> ffi::PJ_LOG_LEVEL {
        match self {
            LogLevel::None => ffi::PJ_LOG_LEVEL_PJ_LOG_NONE,
            LogLevel::Error => ffi::PJ_LOG_LEVEL_PJ_LOG_ERROR,
            LogLevel::Debug => ffi::PJ_LOG_LEVEL_PJ_LOG_DEBUG,
            LogLevel::Trace => ffi::PJ_LOG_LEVEL_PJ_LOG_TRACE,
            LogLevel::Tell => ffi::PJ_LOG_LEVEL_PJ_LOG_TELL,
        }
    }

    fn from_raw(level: c_int) -> Self {
        match level {
            0 => LogLevel::None,
            1 => LogLevel::Error,
            2 => LogLevel::Debug,
            3 => LogLevel::Trace,
            _ => LogLevel::Tell,
        }
    }
}

/// Callback receiving PROJ log messages
pub type LogCallback = Box<dyn Fn(LogLevel, &str)>;

struct ContextInner {
    handle: *mut ffi::PJ_CONTEXT,
    // Kept alive for as long as PROJ may call back into it; dropped after the
    // context handle is destroyed.
    _logger: Option<Box<LogCallback>>,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                ffi::proj_context_destroy(self.handle);
            }
        }
    }
}

/// PROJ threading context
///
/// Every object created through a context keeps a reference to it, so the
/// native context is destroyed only after the last object is dropped.
///
/// # Example
///
/// ```rust,ignore
/// use topo_proj::{Context, LogLevel};
///
/// let ctx = Context::builder()
///     .log_level(LogLevel::Error)
///     .network(false)
///     .logger(Box::new(|level, msg| eprintln!("{:?}: {}", level, msg)))
///     .build()?;
/// let crs = ctx.create_from_database("EPSG", "4326")?;
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    /// Create a context with PROJ defaults (no logging callback, library default network setting)
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Start configuring a new context
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Get the raw FFI handle (for internal use)
    pub(crate) fn as_ptr(&self) -> *mut ffi::PJ_CONTEXT {
        self.inner.handle
    }

    /// Build an error from the context's current error number
    pub(crate) fn last_error(&self, what: &str) -> Error {
        Error::from_context(self.as_ptr(), what)
    }

    /// Whether network access is enabled on this context
    pub fn is_network_enabled(&self) -> bool {
        unsafe { ffi::proj_context_is_network_enabled(self.as_ptr()) != 0 }
    }
}

/// Builder for [`Context`]
#[derive(Default)]
pub struct ContextBuilder {
    log_level: LogLevel,
    network: Option<bool>,
    logger: Option<LogCallback>,
}

impl ContextBuilder {
    /// Set the PROJ log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Enable or disable network access (remote grids, CDN lookups)
    pub fn network(mut self, enabled: bool) -> Self {
        self.network = Some(enabled);
        self
    }

    /// Install a callback receiving PROJ log messages
    pub fn logger(mut self, logger: LogCallback) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Create the native context
    pub fn build(self) -> Result<Context> {
        let handle = unsafe { ffi::proj_context_create() };
        if handle.is_null() {
            return Err(Error::NullPointer("proj_context_create".into()));
        }

        // From here on the handle is owned by `inner` and released on every path.
        let mut inner = ContextInner {
            handle,
            _logger: None,
        };

        unsafe {
            ffi::proj_log_level(handle, self.log_level.to_ffi());
        }

        if let Some(enabled) = self.network {
            let ok = unsafe { ffi::proj_context_set_enable_network(handle, enabled as c_int) };
            if enabled && ok == 0 {
                return Err(Error::InvalidInput(
                    "PROJ was built without network support".into(),
                ));
            }
        }

        if let Some(logger) = self.logger {
            let boxed: Box<LogCallback> = Box::new(logger);
            let app_data = &*boxed as *const LogCallback as *mut c_void;
            unsafe {
                ffi::proj_log_func(handle, app_data, Some(log_trampoline));
            }
            inner._logger = Some(boxed);
        }

        Ok(Context {
            inner: Rc::new(inner),
        })
    }
}

unsafe extern "C" fn log_trampoline(app_data: *mut c_void, level: c_int, msg: *const c_char) {
    if app_data.is_null() || msg.is_null() {
        return;
    }
    let logger = &*(app_data as *const LogCallback);
    let text = CStr::from_ptr(msg).to_string_lossy();
    logger(LogLevel::from_raw(level), text.trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::None < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Debug);
        assert_eq!(LogLevel::from_raw(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_raw(42), LogLevel::Tell);
    }
}
