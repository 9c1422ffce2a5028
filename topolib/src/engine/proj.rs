//! PROJ-backed engine.

use topo_proj::{
    AxisInfo, Comparison, Context, CsType, DistanceTransform, Object, ObjectType,
};

use super::{
    Axis, CoordinateSystem, CoordinateSystemType, CrsType, Datum, DatumType, EngineCrs,
    EngineError, EngineResult, Ellipsoid, Equivalence, GeodesyEngine, GeodeticCrs, Identifier,
    PrimeMeridian, UsageArea,
};
use crate::context::{ContextOptions, DiagnosticSink, LogLevel};
use crate::point::Point;

/// Engine creating CRSs through the PROJ library.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjEngine;

impl ProjEngine {
    pub fn new() -> EngineResult<Self> {
        tracing::debug!(version = %topo_proj::proj_version(), "PROJ engine ready");
        Ok(Self)
    }

    fn build_context(
        options: &ContextOptions,
        sink: Option<DiagnosticSink>,
        network: bool,
    ) -> topo_proj::Result<Context> {
        let mut builder = Context::builder()
            .log_level(to_proj_level(options.log_level))
            .network(network);
        if let Some(sink) = sink {
            builder = builder.logger(Box::new(move |level: topo_proj::LogLevel, message: &str| {
                sink(from_proj_level(level), message)
            }));
        }
        builder.build()
    }
}

fn to_proj_level(level: LogLevel) -> topo_proj::LogLevel {
    match level {
        LogLevel::None => topo_proj::LogLevel::None,
        LogLevel::Error => topo_proj::LogLevel::Error,
        LogLevel::Debug => topo_proj::LogLevel::Debug,
        LogLevel::Trace => topo_proj::LogLevel::Trace,
    }
}

fn from_proj_level(level: topo_proj::LogLevel) -> LogLevel {
    match level {
        topo_proj::LogLevel::None => LogLevel::None,
        topo_proj::LogLevel::Error => LogLevel::Error,
        topo_proj::LogLevel::Debug => LogLevel::Debug,
        topo_proj::LogLevel::Trace | topo_proj::LogLevel::Tell => LogLevel::Trace,
    }
}

fn construction(err: topo_proj::Error) -> EngineError {
    EngineError::Construction(err.to_string())
}

fn operation(err: topo_proj::Error) -> EngineError {
    EngineError::Operation(err.to_string())
}

fn ensure_crs(object: Object) -> EngineResult<ProjCrs> {
    if object.object_type().is_crs() {
        Ok(ProjCrs { object })
    } else {
        Err(EngineError::Construction(format!(
            "definition describes a {:?}, not a CRS",
            object.object_type()
        )))
    }
}

impl GeodesyEngine for ProjEngine {
    type Context = Context;
    type Crs = ProjCrs;

    fn name(&self) -> &'static str {
        "proj"
    }

    fn create_context(
        &self,
        options: &ContextOptions,
        sink: Option<DiagnosticSink>,
    ) -> EngineResult<Context> {
        match Self::build_context(options, sink.clone(), options.allow_network) {
            Ok(ctx) => Ok(ctx),
            Err(err) if options.allow_network => {
                tracing::warn!(error = %err, "network access unavailable, continuing offline");
                Self::build_context(options, sink, false).map_err(construction)
            }
            Err(err) => Err(construction(err)),
        }
    }

    fn create_from_epsg(&self, ctx: &Context, code: i32) -> EngineResult<ProjCrs> {
        ctx.create_from_database("EPSG", &code.to_string())
            .map_err(construction)
            .and_then(ensure_crs)
    }

    fn create_from_wkt(&self, ctx: &Context, wkt: &str) -> EngineResult<ProjCrs> {
        ctx.create_from_wkt(wkt)
            .map_err(construction)
            .and_then(ensure_crs)
    }

    fn create_from_descriptor(&self, ctx: &Context, text: &str) -> EngineResult<ProjCrs> {
        ctx.create(text).map_err(construction).and_then(ensure_crs)
    }

    fn create_from_authority_code(
        &self,
        ctx: &Context,
        authority: &str,
        code: i32,
    ) -> EngineResult<ProjCrs> {
        ctx.create_from_database(authority, &code.to_string())
            .map_err(construction)
            .and_then(ensure_crs)
    }
}

/// A CRS owned by a PROJ context.
#[derive(Debug)]
pub struct ProjCrs {
    object: Object,
}

fn crs_type(t: ObjectType) -> CrsType {
    match t {
        ObjectType::Crs => CrsType::Crs,
        ObjectType::GeodeticCrs => CrsType::GeodeticCrs,
        ObjectType::GeocentricCrs => CrsType::GeocentricCrs,
        ObjectType::GeographicCrs => CrsType::GeographicCrs,
        ObjectType::Geographic2DCrs => CrsType::Geographic2DCrs,
        ObjectType::Geographic3DCrs => CrsType::Geographic3DCrs,
        ObjectType::VerticalCrs => CrsType::VerticalCrs,
        ObjectType::ProjectedCrs => CrsType::ProjectedCrs,
        ObjectType::CompoundCrs => CrsType::CompoundCrs,
        ObjectType::TemporalCrs => CrsType::TemporalCrs,
        ObjectType::EngineeringCrs => CrsType::EngineeringCrs,
        ObjectType::BoundCrs => CrsType::BoundCrs,
        ObjectType::OtherCrs => CrsType::OtherCrs,
        _ => CrsType::Unknown,
    }
}

fn datum_type(t: ObjectType) -> DatumType {
    match t {
        ObjectType::GeodeticReferenceFrame => DatumType::GeodeticReferenceFrame,
        ObjectType::DynamicGeodeticReferenceFrame => DatumType::DynamicGeodeticReferenceFrame,
        ObjectType::VerticalReferenceFrame => DatumType::VerticalReferenceFrame,
        ObjectType::DynamicVerticalReferenceFrame => DatumType::DynamicVerticalReferenceFrame,
        ObjectType::DatumEnsemble => DatumType::DatumEnsemble,
        ObjectType::TemporalDatum => DatumType::TemporalDatum,
        ObjectType::EngineeringDatum => DatumType::EngineeringDatum,
        ObjectType::ParametricDatum => DatumType::ParametricDatum,
        _ => DatumType::Unknown,
    }
}

fn cs_type(t: CsType) -> CoordinateSystemType {
    match t {
        CsType::Unknown => CoordinateSystemType::Unknown,
        CsType::Cartesian => CoordinateSystemType::Cartesian,
        CsType::Ellipsoidal => CoordinateSystemType::Ellipsoidal,
        CsType::Vertical => CoordinateSystemType::Vertical,
        CsType::Spherical => CoordinateSystemType::Spherical,
        CsType::Ordinal => CoordinateSystemType::Ordinal,
        CsType::Parametric => CoordinateSystemType::Parametric,
        CsType::DateTimeTemporal => CoordinateSystemType::DateTimeTemporal,
        CsType::TemporalCount => CoordinateSystemType::TemporalCount,
        CsType::TemporalMeasure => CoordinateSystemType::TemporalMeasure,
    }
}

impl From<AxisInfo> for Axis {
    fn from(info: AxisInfo) -> Self {
        Axis {
            name: info.name,
            abbreviation: info.abbreviation,
            direction: info.direction,
            unit_name: info.unit_name,
            unit_auth_name: info.unit_auth_name,
            unit_code: info.unit_code,
            unit_conversion_factor: info.unit_conversion_factor,
        }
    }
}

impl EngineCrs for ProjCrs {
    type Context = Context;

    fn with_axis_normalized(&self, _ctx: &Context) -> EngineResult<Self> {
        self.object
            .normalized_for_visualization()
            .map(|object| ProjCrs { object })
            .map_err(operation)
    }

    fn name(&self) -> Option<String> {
        self.object.name()
    }

    fn crs_type(&self) -> CrsType {
        crs_type(self.object.object_type())
    }

    fn scope(&self) -> Option<String> {
        self.object.scope()
    }

    fn is_deprecated(&self) -> bool {
        self.object.is_deprecated()
    }

    fn celestial_body_name(&self) -> Option<String> {
        self.object.celestial_body_name()
    }

    fn axes(&self) -> EngineResult<Vec<Axis>> {
        let axes = self.object.crs_axes().map_err(operation)?;
        Ok(axes.into_iter().map(Axis::from).collect())
    }

    fn coordinate_system(&self) -> EngineResult<Option<CoordinateSystem>> {
        let Some(cs) = self.object.coordinate_system() else {
            return Ok(None);
        };
        let count = cs.cs_axis_count().map_err(operation)?;
        let axes = (0..count)
            .map(|i| cs.cs_axis_info(i).map(Axis::from))
            .collect::<topo_proj::Result<Vec<_>>>()
            .map_err(operation)?;
        Ok(Some(CoordinateSystem {
            name: cs.name(),
            cs_type: cs_type(cs.cs_type()),
            axes,
        }))
    }

    fn datum(&self) -> Option<Datum> {
        self.object.datum().map(|d| Datum {
            name: d.name(),
            datum_type: datum_type(d.object_type()),
        })
    }

    fn ellipsoid(&self) -> EngineResult<Option<Ellipsoid>> {
        let Some(ellipsoid) = self.object.ellipsoid() else {
            return Ok(None);
        };
        let params = ellipsoid.ellipsoid_parameters().map_err(operation)?;
        Ok(Some(Ellipsoid {
            name: ellipsoid.name(),
            semi_major_metre: params.semi_major_metre,
            semi_minor_metre: params.semi_minor_metre,
            inverse_flattening: params.inverse_flattening,
            is_semi_minor_computed: params.is_semi_minor_computed,
        }))
    }

    fn prime_meridian(&self) -> EngineResult<Option<PrimeMeridian>> {
        let Some(meridian) = self.object.prime_meridian() else {
            return Ok(None);
        };
        let params = meridian.prime_meridian_parameters().map_err(operation)?;
        Ok(Some(PrimeMeridian {
            name: meridian.name(),
            longitude: params.longitude,
            unit_conversion_factor: params.unit_conversion_factor,
            unit_name: params.unit_name,
        }))
    }

    fn identifiers(&self) -> Vec<Identifier> {
        self.object
            .identifiers()
            .into_iter()
            .map(|(authority, code)| Identifier { authority, code })
            .collect()
    }

    fn usage_area(&self) -> EngineResult<Option<UsageArea>> {
        let Some(area) = self.object.area_of_use() else {
            return Ok(None);
        };
        let [min_x, min_y, max_x, max_y] = if !area.has_bounds() {
            [f64::NAN; 4]
        } else {
            match topo_proj::transform_bounds(&self.object, area.west, area.south, area.east, area.north) {
                Ok(bounds) => bounds,
                Err(err) => {
                    tracing::debug!(error = %err, "using geographic bounds for usage area extent");
                    [area.west, area.south, area.east, area.north]
                }
            }
        };
        Ok(Some(UsageArea {
            name: area.name,
            west: area.west,
            south: area.south,
            east: area.east,
            north: area.north,
            min_x,
            min_y,
            max_x,
            max_y,
        }))
    }

    fn geodetic_crs(&self) -> Option<GeodeticCrs> {
        self.object.geodetic_crs().map(|g| GeodeticCrs {
            name: g.name(),
            crs_type: crs_type(g.object_type()),
        })
    }

    fn to_wkt(&self) -> Option<String> {
        self.object.as_wkt()
    }

    fn to_proj_string(&self) -> Option<String> {
        self.object.as_proj_string()
    }

    fn to_projjson(&self) -> Option<String> {
        self.object.as_projjson()
    }

    fn geo_distance(&self, a: &Point, b: &Point) -> EngineResult<f64> {
        DistanceTransform::new(&self.object)
            .and_then(|t| t.geo_distance(a.to_array(), b.to_array()))
            .map_err(operation)
    }

    fn geo_distance_z(&self, a: &Point, b: &Point) -> EngineResult<f64> {
        DistanceTransform::new(&self.object)
            .and_then(|t| t.geo_distance_z(a.to_array(), b.to_array()))
            .map_err(operation)
    }

    fn is_equivalent_to(
        &self,
        other: &Self,
        _ctx: &Context,
        criterion: Equivalence,
    ) -> EngineResult<bool> {
        let comparison = match criterion {
            Equivalence::Strict => Comparison::Equivalent,
            Equivalence::IgnoreAxisOrder => Comparison::EquivalentExceptAxisOrder,
        };
        Ok(self.object.is_equivalent_to(&other.object, comparison))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_round_trip() {
        for level in [LogLevel::None, LogLevel::Error, LogLevel::Debug, LogLevel::Trace] {
            assert_eq!(from_proj_level(to_proj_level(level)), level);
        }
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(crs_type(ObjectType::ProjectedCrs), CrsType::ProjectedCrs);
        assert_eq!(crs_type(ObjectType::Ellipsoid), CrsType::Unknown);
        assert_eq!(datum_type(ObjectType::DatumEnsemble), DatumType::DatumEnsemble);
        assert_eq!(cs_type(CsType::Ellipsoidal), CoordinateSystemType::Ellipsoidal);
    }
}
