//! # TopoLib
//!
//! Resolve coordinate reference systems from spreadsheet-style cell input and
//! query their metadata.
//!
//! A CRS is named by a 1x1 or 1x2 block of cells: an EPSG number, an
//! `"EPSG:4326"`-like string, a WKT definition, any other text the engine
//! understands (PROJ string, PROJJSON, URN, name), or an authority/code pair.
//! Every call creates its own engine context, resolves the CRS, reads one
//! thing and releases everything again.
//!
//! ## Architecture
//!
//! - [`cells`]: host cell values, blocks and outputs, sentinel strings
//! - [`spec`]: classification of a cell block into a CRS specification
//! - [`context`]: per-call context options and factory
//! - [`engine`]: the geodesy engine traits plus the catalogue and PROJ engines
//! - [`resolver`]: specification to engine call
//! - [`query`]: the facade and its property table
//! - [`functions`]: `TL.crs.*` / `TL.cfg.*` registry used by hosts
//! - [`config`]: settings file, global options, key/value store
//! - [`http`]: axum host (feature `http-server`)
//!
//! ```no_run
//! use topolib::cells::CellBlock;
//! use topolib::context::ContextOptions;
//! use topolib::engine::DefaultEngine;
//! use topolib::query::{CrsProperty, Facade};
//!
//! # fn main() -> topolib::CrsResult<()> {
//! let facade = Facade::new(DefaultEngine::new()?, ContextOptions::default());
//! let name = facade.read(CrsProperty::Name, &CellBlock::scalar(28992.0), 0)?;
//! assert_eq!(name.as_text(), Some("Amersfoort / RD New"));
//! # Ok(())
//! # }
//! ```

pub mod cells;
pub mod config;
pub mod context;
mod distance;
pub mod engine;
mod equivalence;
pub mod error;
pub mod functions;
pub mod logging;
pub mod point;
pub mod query;
pub mod resolver;
pub mod spec;

#[cfg(feature = "http-server")]
pub mod http;

pub use cells::{CellBlock, CellError, CellOutput, CellValue};
pub use context::{ContextFactory, ContextOptions, LogLevel};
pub use engine::DefaultEngine;
pub use error::{CrsError, CrsResult, ErrorKind};
pub use functions::{Function, Functions};
pub use query::{AxisOrder, CrsProperty, Facade};
pub use spec::CrsSpecKind;
