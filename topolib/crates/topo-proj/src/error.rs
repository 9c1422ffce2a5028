//! Error types for topo-proj

use proj_sys as ffi;
use std::ffi::CStr;
use thiserror::Error;

/// Result type for topo-proj operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using topo-proj
#[derive(Error, Debug)]
pub enum Error {
    /// PROJ returned a null handle without reporting an error number
    #[error("Null pointer error: {0}")]
    NullPointer(String),

    /// Input could not be handed to PROJ (interior NUL, empty text, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// PROJ reported an error through the context error number
    #[error("PROJ error {code}: {message}")]
    Proj { code: i32, message: String },

    /// The object does not carry the requested sub-object
    #[error("Not available: {0}")]
    NotAvailable(String),
}

impl Error {
    /// Build an error from the error number stored on a PROJ context.
    ///
    /// Falls back to `NullPointer` carrying `what` when PROJ did not set an
    /// error number.
    pub(crate) fn from_context(ctx: *mut ffi::PJ_CONTEXT, what: &str) -> Self {
        let code = unsafe { ffi::proj_context_errno(ctx) };
        if code == 0 {
            return Error::NullPointer(what.to_string());
        }

        let message = unsafe {
            let ptr = ffi::proj_context_errno_string(ctx, code);
            if ptr.is_null() {
                String::new()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        };

        Error::Proj {
            code,
            message: if message.is_empty() {
                what.to_string()
            } else {
                format!("{}: {}", what, message)
            },
        }
    }
}
