//! Geodesy engine abstraction.
//!
//! The resolver and query layers never talk to a concrete engine. They go
//! through [`GeodesyEngine`] (context and CRS construction) and
//! [`EngineCrs`] (metadata readers, distance, equivalence). Two engines are
//! provided:
//!
//! - `catalog` (feature `catalog-engine`): an in-memory catalogue of common
//!   CRSs with Vincenty geodesic distance. No native dependencies.
//! - `proj` (feature `proj-engine`): the PROJ library through `topo-proj`.
//!
//! [`DefaultEngine`] picks PROJ when it is compiled in, the catalogue
//! otherwise.

#[cfg(feature = "catalog-engine")]
pub mod catalog;
#[cfg(feature = "catalog-engine")]
mod geodesic;
#[cfg(feature = "proj-engine")]
pub mod proj;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{ContextOptions, DiagnosticSink};
use crate::point::Point;

#[cfg(feature = "catalog-engine")]
pub use catalog::CatalogEngine;
#[cfg(feature = "proj-engine")]
pub use proj::ProjEngine;

// Engine selection: PROJ takes precedence when compiled in.
#[cfg(feature = "proj-engine")]
pub type DefaultEngine = proj::ProjEngine;

#[cfg(all(feature = "catalog-engine", not(feature = "proj-engine")))]
pub type DefaultEngine = catalog::CatalogEngine;

#[cfg(not(any(feature = "catalog-engine", feature = "proj-engine")))]
compile_error!("Enable at least one engine feature: catalog-engine or proj-engine.");

/// Result type for engine calls
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by an engine
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// The engine could not build an object from the given input.
    #[error("{0}")]
    Construction(String),

    /// The engine does not support this operation for this object.
    #[error("{engine} engine does not support {what}")]
    Unsupported { engine: &'static str, what: String },

    /// Any other failure while reading or computing.
    #[error("{0}")]
    Operation(String),
}

/// Equivalence criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equivalence {
    /// Same CRS for the purpose of coordinate operations, axis order included
    Strict,
    /// As `Strict`, but geographic CRSs may differ in axis order
    IgnoreAxisOrder,
}

/// Construction surface of a geodesy engine.
///
/// The context type carries per-call settings (log level, network access)
/// and is dropped after every CRS created through it.
pub trait GeodesyEngine: Send + Sync {
    type Context;
    type Crs: EngineCrs<Context = Self::Context>;

    /// Short engine name for logs and error messages.
    fn name(&self) -> &'static str;

    fn create_context(
        &self,
        options: &ContextOptions,
        sink: Option<DiagnosticSink>,
    ) -> EngineResult<Self::Context>;

    fn create_from_epsg(&self, ctx: &Self::Context, code: i32) -> EngineResult<Self::Crs>;

    fn create_from_wkt(&self, ctx: &Self::Context, wkt: &str) -> EngineResult<Self::Crs>;

    /// PROJ strings, PROJJSON, `AUTH:CODE`, URNs and names.
    fn create_from_descriptor(&self, ctx: &Self::Context, text: &str) -> EngineResult<Self::Crs>;

    fn create_from_authority_code(
        &self,
        ctx: &Self::Context,
        authority: &str,
        code: i32,
    ) -> EngineResult<Self::Crs>;
}

/// Read and compute surface of a resolved CRS.
///
/// Readers return `None` or an empty list when the CRS lacks the
/// information; the query layer turns that into sentinels.
pub trait EngineCrs: Sized {
    type Context;

    /// Copy with axes in east/north (longitude/latitude) order.
    fn with_axis_normalized(&self, ctx: &Self::Context) -> EngineResult<Self>;

    fn name(&self) -> Option<String>;
    fn crs_type(&self) -> CrsType;
    fn scope(&self) -> Option<String>;
    fn is_deprecated(&self) -> bool;
    fn celestial_body_name(&self) -> Option<String>;

    /// All axes, with compound CRSs flattened into their components.
    fn axes(&self) -> EngineResult<Vec<Axis>>;

    fn coordinate_system(&self) -> EngineResult<Option<CoordinateSystem>>;
    fn datum(&self) -> Option<Datum>;
    fn ellipsoid(&self) -> EngineResult<Option<Ellipsoid>>;
    fn prime_meridian(&self) -> EngineResult<Option<PrimeMeridian>>;
    fn identifiers(&self) -> Vec<Identifier>;
    fn usage_area(&self) -> EngineResult<Option<UsageArea>>;
    fn geodetic_crs(&self) -> Option<GeodeticCrs>;

    fn to_wkt(&self) -> Option<String>;
    fn to_proj_string(&self) -> Option<String>;
    fn to_projjson(&self) -> Option<String>;

    /// Geodesic distance in metres, ignoring height. May be NaN.
    fn geo_distance(&self, a: &Point, b: &Point) -> EngineResult<f64>;

    /// Geodesic distance in metres, including the height difference. May be NaN.
    fn geo_distance_z(&self, a: &Point, b: &Point) -> EngineResult<f64>;

    fn is_equivalent_to(
        &self,
        other: &Self,
        ctx: &Self::Context,
        criterion: Equivalence,
    ) -> EngineResult<bool>;
}

/// CRS type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsType {
    Unknown,
    Crs,
    GeodeticCrs,
    GeocentricCrs,
    GeographicCrs,
    Geographic2DCrs,
    Geographic3DCrs,
    VerticalCrs,
    ProjectedCrs,
    CompoundCrs,
    TemporalCrs,
    EngineeringCrs,
    BoundCrs,
    OtherCrs,
}

impl CrsType {
    pub fn as_str(self) -> &'static str {
        match self {
            CrsType::Unknown => "Unknown",
            CrsType::Crs => "Crs",
            CrsType::GeodeticCrs => "GeodeticCrs",
            CrsType::GeocentricCrs => "GeocentricCrs",
            CrsType::GeographicCrs => "GeographicCrs",
            CrsType::Geographic2DCrs => "Geographic2DCrs",
            CrsType::Geographic3DCrs => "Geographic3DCrs",
            CrsType::VerticalCrs => "VerticalCrs",
            CrsType::ProjectedCrs => "ProjectedCrs",
            CrsType::CompoundCrs => "CompoundCrs",
            CrsType::TemporalCrs => "TemporalCrs",
            CrsType::EngineeringCrs => "EngineeringCrs",
            CrsType::BoundCrs => "BoundCrs",
            CrsType::OtherCrs => "OtherCrs",
        }
    }

    pub fn is_geographic(self) -> bool {
        matches!(
            self,
            CrsType::GeographicCrs | CrsType::Geographic2DCrs | CrsType::Geographic3DCrs
        )
    }
}

impl fmt::Display for CrsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate system type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystemType {
    Unknown,
    Cartesian,
    Ellipsoidal,
    Vertical,
    Spherical,
    Ordinal,
    Parametric,
    DateTimeTemporal,
    TemporalCount,
    TemporalMeasure,
}

impl CoordinateSystemType {
    pub fn as_str(self) -> &'static str {
        match self {
            CoordinateSystemType::Unknown => "Unknown",
            CoordinateSystemType::Cartesian => "Cartesian",
            CoordinateSystemType::Ellipsoidal => "Ellipsoidal",
            CoordinateSystemType::Vertical => "Vertical",
            CoordinateSystemType::Spherical => "Spherical",
            CoordinateSystemType::Ordinal => "Ordinal",
            CoordinateSystemType::Parametric => "Parametric",
            CoordinateSystemType::DateTimeTemporal => "DateTimeTemporal",
            CoordinateSystemType::TemporalCount => "TemporalCount",
            CoordinateSystemType::TemporalMeasure => "TemporalMeasure",
        }
    }
}

/// Datum type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatumType {
    Unknown,
    GeodeticReferenceFrame,
    DynamicGeodeticReferenceFrame,
    VerticalReferenceFrame,
    DynamicVerticalReferenceFrame,
    DatumEnsemble,
    TemporalDatum,
    EngineeringDatum,
    ParametricDatum,
}

impl DatumType {
    pub fn as_str(self) -> &'static str {
        match self {
            DatumType::Unknown => "Unknown",
            DatumType::GeodeticReferenceFrame => "GeodeticReferenceFrame",
            DatumType::DynamicGeodeticReferenceFrame => "DynamicGeodeticReferenceFrame",
            DatumType::VerticalReferenceFrame => "VerticalReferenceFrame",
            DatumType::DynamicVerticalReferenceFrame => "DynamicVerticalReferenceFrame",
            DatumType::DatumEnsemble => "DatumEnsemble",
            DatumType::TemporalDatum => "TemporalDatum",
            DatumType::EngineeringDatum => "EngineeringDatum",
            DatumType::ParametricDatum => "ParametricDatum",
        }
    }
}

/// One coordinate axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    /// `north`, `east`, `up`, ...
    pub direction: Option<String>,
    pub unit_name: Option<String>,
    pub unit_auth_name: Option<String>,
    pub unit_code: Option<String>,
    /// Factor to SI (metre or radian)
    pub unit_conversion_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub name: Option<String>,
    pub cs_type: CoordinateSystemType,
    pub axes: Vec<Axis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub name: Option<String>,
    pub datum_type: DatumType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub name: Option<String>,
    pub semi_major_metre: f64,
    pub semi_minor_metre: f64,
    pub inverse_flattening: f64,
    pub is_semi_minor_computed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeMeridian {
    pub name: Option<String>,
    pub longitude: f64,
    pub unit_conversion_factor: f64,
    pub unit_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub authority: String,
    pub code: String,
}

/// Area of use: geographic bounds in degrees plus the same extent in CRS units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageArea {
    pub name: Option<String>,
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl UsageArea {
    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }

    /// Whether the projected extent is known.
    pub fn has_values(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Name and type of the geodetic CRS underlying a CRS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodeticCrs {
    pub name: Option<String>,
    pub crs_type: CrsType,
}
