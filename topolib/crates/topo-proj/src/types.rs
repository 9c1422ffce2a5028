//! Type definitions for topo-proj

use proj_sys as ffi;
use serde::{Deserialize, Serialize};

/// Kind of a PROJ object, as reported by `proj_get_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    Unknown,
    Ellipsoid,
    PrimeMeridian,
    GeodeticReferenceFrame,
    DynamicGeodeticReferenceFrame,
    VerticalReferenceFrame,
    DynamicVerticalReferenceFrame,
    DatumEnsemble,
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
    Conversion,
    Transformation,
    ConcatenatedOperation,
    OtherCoordinateOperation,
    TemporalDatum,
    EngineeringDatum,
    ParametricDatum,
}

impl From<ffi::PJ_TYPE> for ObjectType {
    fn from(t: ffi::PJ_TYPE) -> Self {
        match t {
            ffi::PJ_TYPE_PJ_TYPE_ELLIPSOID => ObjectType::Ellipsoid,
            ffi::PJ_TYPE_PJ_TYPE_PRIME_MERIDIAN => ObjectType::PrimeMeridian,
            ffi::PJ_TYPE_PJ_TYPE_GEODETIC_REFERENCE_FRAME => ObjectType::GeodeticReferenceFrame,
            ffi::PJ_TYPE_PJ_TYPE_DYNAMIC_GEODETIC_REFERENCE_FRAME => {
                ObjectType::DynamicGeodeticReferenceFrame
            }
            ffi::PJ_TYPE_PJ_TYPE_VERTICAL_REFERENCE_FRAME => ObjectType::VerticalReferenceFrame,
            ffi::PJ_TYPE_PJ_TYPE_DYNAMIC_VERTICAL_REFERENCE_FRAME => {
                ObjectType::DynamicVerticalReferenceFrame
            }
            ffi::PJ_TYPE_PJ_TYPE_DATUM_ENSEMBLE => ObjectType::DatumEnsemble,
            ffi::PJ_TYPE_PJ_TYPE_CRS => ObjectType::Crs,
            ffi::PJ_TYPE_PJ_TYPE_GEODETIC_CRS => ObjectType::GeodeticCrs,
            ffi::PJ_TYPE_PJ_TYPE_GEOCENTRIC_CRS => ObjectType::GeocentricCrs,
            ffi::PJ_TYPE_PJ_TYPE_GEOGRAPHIC_CRS => ObjectType::GeographicCrs,
            ffi::PJ_TYPE_PJ_TYPE_GEOGRAPHIC_2D_CRS => ObjectType::Geographic2DCrs,
            ffi::PJ_TYPE_PJ_TYPE_GEOGRAPHIC_3D_CRS => ObjectType::Geographic3DCrs,
            ffi::PJ_TYPE_PJ_TYPE_VERTICAL_CRS => ObjectType::VerticalCrs,
            ffi::PJ_TYPE_PJ_TYPE_PROJECTED_CRS => ObjectType::ProjectedCrs,
            ffi::PJ_TYPE_PJ_TYPE_COMPOUND_CRS => ObjectType::CompoundCrs,
            ffi::PJ_TYPE_PJ_TYPE_TEMPORAL_CRS => ObjectType::TemporalCrs,
            ffi::PJ_TYPE_PJ_TYPE_ENGINEERING_CRS => ObjectType::EngineeringCrs,
            ffi::PJ_TYPE_PJ_TYPE_BOUND_CRS => ObjectType::BoundCrs,
            ffi::PJ_TYPE_PJ_TYPE_OTHER_CRS => ObjectType::OtherCrs,
            ffi::PJ_TYPE_PJ_TYPE_CONVERSION => ObjectType::Conversion,
            ffi::PJ_TYPE_PJ_TYPE_TRANSFORMATION => ObjectType::Transformation,
            ffi::PJ_TYPE_PJ_TYPE_CONCATENATED_OPERATION => ObjectType::ConcatenatedOperation,
            ffi::PJ_TYPE_PJ_TYPE_OTHER_COORDINATE_OPERATION => {
                ObjectType::OtherCoordinateOperation
            }
            ffi::PJ_TYPE_PJ_TYPE_TEMPORAL_DATUM => ObjectType::TemporalDatum,
            ffi::PJ_TYPE_PJ_TYPE_ENGINEERING_DATUM => ObjectType::EngineeringDatum,
            ffi::PJ_TYPE_PJ_TYPE_PARAMETRIC_DATUM => ObjectType::ParametricDatum,
            _ => ObjectType::Unknown,
        }
    }
}

impl ObjectType {
    /// True for every CRS flavour
    pub fn is_crs(self) -> bool {
        matches!(
            self,
            ObjectType::Crs
                | ObjectType::GeodeticCrs
                | ObjectType::GeocentricCrs
                | ObjectType::GeographicCrs
                | ObjectType::Geographic2DCrs
                | ObjectType::Geographic3DCrs
                | ObjectType::VerticalCrs
                | ObjectType::ProjectedCrs
                | ObjectType::CompoundCrs
                | ObjectType::TemporalCrs
                | ObjectType::EngineeringCrs
                | ObjectType::BoundCrs
                | ObjectType::OtherCrs
        )
    }
}

/// Coordinate system type, as reported by `proj_cs_get_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsType {
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

impl From<ffi::PJ_COORDINATE_SYSTEM_TYPE> for CsType {
    fn from(t: ffi::PJ_COORDINATE_SYSTEM_TYPE) -> Self {
        match t {
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_CARTESIAN => CsType::Cartesian,
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_ELLIPSOIDAL => CsType::Ellipsoidal,
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_VERTICAL => CsType::Vertical,
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_SPHERICAL => CsType::Spherical,
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_ORDINAL => CsType::Ordinal,
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_PARAMETRIC => CsType::Parametric,
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_DATETIMETEMPORAL => {
                CsType::DateTimeTemporal
            }
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_TEMPORALCOUNT => CsType::TemporalCount,
            ffi::PJ_COORDINATE_SYSTEM_TYPE_PJ_CS_TYPE_TEMPORALMEASURE => {
                CsType::TemporalMeasure
            }
            _ => CsType::Unknown,
        }
    }
}

/// One axis of a coordinate system (`proj_cs_get_axis_info`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisInfo {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub direction: Option<String>,
    pub unit_conversion_factor: f64,
    pub unit_name: Option<String>,
    pub unit_auth_name: Option<String>,
    pub unit_code: Option<String>,
}

/// Ellipsoid parameters (`proj_ellipsoid_get_parameters`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidParameters {
    pub semi_major_metre: f64,
    pub semi_minor_metre: f64,
    pub is_semi_minor_computed: bool,
    pub inverse_flattening: f64,
}

/// Prime meridian parameters (`proj_prime_meridian_get_parameters`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeMeridianParameters {
    pub longitude: f64,
    pub unit_conversion_factor: f64,
    pub unit_name: Option<String>,
}

/// Area of use in geographic degrees (`proj_get_area_of_use`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaOfUse {
    pub name: Option<String>,
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl AreaOfUse {
    /// PROJ reports unknown bounds as -1000
    pub fn has_bounds(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite() && *v > -1000.0)
    }
}

/// Equivalence criterion for [`crate::Object::is_equivalent_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// All properties must match, including names
    Strict,
    /// Same for the purpose of coordinate operations
    #[default]
    Equivalent,
    /// As `Equivalent`, but the axis order of geographic CRSs may differ
    EquivalentExceptAxisOrder,
}

impl From<Comparison> for ffi::PJ_COMPARISON_CRITERION {
    fn from(c: Comparison) -> Self {
        match c {
            Comparison::Strict => ffi::PJ_COMPARISON_CRITERION_PJ_COMP_STRICT,
            Comparison::Equivalent => ffi::PJ_COMPARISON_CRITERION_PJ_COMP_EQUIVALENT,
            Comparison::EquivalentExceptAxisOrder => {
                ffi::PJ_COMPARISON_CRITERION_PJ_COMP_EQUIVALENT_EXCEPT_AXIS_ORDER_GEOGCRS
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_mapping() {
        assert_eq!(
            ObjectType::from(ffi::PJ_TYPE_PJ_TYPE_PROJECTED_CRS),
            ObjectType::ProjectedCrs
        );
        assert!(ObjectType::Geographic2DCrs.is_crs());
        assert!(!ObjectType::Ellipsoid.is_crs());
    }

    #[test]
    fn test_area_of_use_unknown_bounds() {
        let area = AreaOfUse {
            name: None,
            west: -1000.0,
            south: -1000.0,
            east: -1000.0,
            north: -1000.0,
        };
        assert!(!area.has_bounds());
    }
}
