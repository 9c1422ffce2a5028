//! # topo-proj
//!
//! Safe, ergonomic Rust bindings to the PROJ coordinate reference system library.
//!
//! This crate wraps the raw `proj-sys` bindings with owned handle types that
//! release their native resources exactly once, on every exit path.
//!
//! ## Features
//!
//! - Contexts with log level, log callback and network switch
//! - CRS construction from EPSG/authority codes, WKT and any PROJ definition
//! - Metadata readers: axes, datum, ellipsoid, prime meridian, identifiers, area of use
//! - Axis normalization and equivalence checks
//! - Geodesic distance through a CRS's own geodetic CRS
//!
//! ## Example
//!
//! ```rust,ignore
//! use topo_proj::{Comparison, Context};
//!
//! let ctx = Context::new()?;
//! let a = ctx.create_from_database("EPSG", "4326")?;
//! let b = ctx.create("OGC:CRS84")?;
//!
//! assert!(!a.is_equivalent_to(&b, Comparison::Equivalent));
//! assert!(a.is_equivalent_to(&b, Comparison::EquivalentExceptAxisOrder));
//! ```

mod context;
mod error;
mod object;
mod transform;
mod types;

pub use context::{Context, ContextBuilder, LogCallback, LogLevel};
pub use error::{Error, Result};
pub use object::Object;
pub use transform::{transform_bounds, DistanceTransform};
pub use types::*;

use proj_sys as ffi;

/// Get the version of the linked PROJ library
pub fn proj_version() -> String {
    let info = unsafe { ffi::proj_info() };
    unsafe { object::opt_string(info.version) }.unwrap_or_else(|| "unknown".to_string())
}
