//! The query facade: resolve a CRS, read one property, sanitize, dispose.
//!
//! Every property goes through [`Facade::with_crs`], which owns the context
//! and CRS for exactly the duration of one read. Properties only supply a
//! selector; the sentinel policy lives in a handful of helpers:
//!
//! | Result | Absent value |
//! |---|---|
//! | text | `<NotFound>` |
//! | indexed item | `<index out of range>` |
//! | number without a natural zero | `-1` |
//! | flag | `false` |
//! | usage-area number | `<NotFound>` |

use crate::cells::{CellBlock, CellError, CellOutput, NOT_FOUND_NUMBER};
use crate::context::{ContextFactory, ContextOptions};
use crate::engine::{Axis, EngineCrs, GeodesyEngine, Identifier, UsageArea};
use crate::error::CrsResult;
use crate::resolver;

/// Axis order a property is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// East/north (longitude/latitude) order
    Normalized,
    /// The order the CRS declares
    Declared,
}

/// Every readable CRS property, keyed by its registered function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsProperty {
    AsJsonString,
    AsProjString,
    AsWktString,
    AxisCount,
    AxisAbbreviation,
    AxisDirection,
    AxisName,
    AxisUnitAuthName,
    AxisUnitCode,
    AxisUnitConversionFactor,
    AxisUnitName,
    CelestialBodyName,
    CsAxisCount,
    CsAxisAbbreviation,
    CsAxisDirection,
    CsAxisName,
    CsAxisUnitAuthName,
    CsAxisUnitCode,
    CsAxisUnitConversionFactor,
    CsAxisUnitName,
    CsCoordinateSystemType,
    CsName,
    CsType,
    DatumName,
    DatumType,
    EllipsoidName,
    EllipsoidType,
    EllipsoidSemiMajorMetre,
    EllipsoidSemiMinorMetre,
    EllipsoidInverseFlattening,
    EllipsoidIsSemiMinorComputed,
    GeodeticCrsName,
    GeodeticCrsType,
    IdentifiersCount,
    IdentifierAuthority,
    IdentifierCode,
    IsDeprecated,
    Name,
    PrimeMeridianName,
    PrimeMeridianLongitude,
    PrimeMeridianUnitConversionFactor,
    PrimeMeridianUnitName,
    Scope,
    Type,
    UsageAreaCenter,
    UsageAreaCenterHasValues,
    UsageAreaCenterX,
    UsageAreaCenterY,
    UsageAreaMaxX,
    UsageAreaMaxY,
    UsageAreaMinX,
    UsageAreaMinY,
    UsageAreaName,
    UsageAreaWestLongitude,
    UsageAreaEastLongitude,
    UsageAreaSouthLatitude,
    UsageAreaNorthLatitude,
}

impl CrsProperty {
    pub const ALL: [CrsProperty; 57] = [
        CrsProperty::AsJsonString,
        CrsProperty::AsProjString,
        CrsProperty::AsWktString,
        CrsProperty::AxisCount,
        CrsProperty::AxisAbbreviation,
        CrsProperty::AxisDirection,
        CrsProperty::AxisName,
        CrsProperty::AxisUnitAuthName,
        CrsProperty::AxisUnitCode,
        CrsProperty::AxisUnitConversionFactor,
        CrsProperty::AxisUnitName,
        CrsProperty::CelestialBodyName,
        CrsProperty::CsAxisCount,
        CrsProperty::CsAxisAbbreviation,
        CrsProperty::CsAxisDirection,
        CrsProperty::CsAxisName,
        CrsProperty::CsAxisUnitAuthName,
        CrsProperty::CsAxisUnitCode,
        CrsProperty::CsAxisUnitConversionFactor,
        CrsProperty::CsAxisUnitName,
        CrsProperty::CsCoordinateSystemType,
        CrsProperty::CsName,
        CrsProperty::CsType,
        CrsProperty::DatumName,
        CrsProperty::DatumType,
        CrsProperty::EllipsoidName,
        CrsProperty::EllipsoidType,
        CrsProperty::EllipsoidSemiMajorMetre,
        CrsProperty::EllipsoidSemiMinorMetre,
        CrsProperty::EllipsoidInverseFlattening,
        CrsProperty::EllipsoidIsSemiMinorComputed,
        CrsProperty::GeodeticCrsName,
        CrsProperty::GeodeticCrsType,
        CrsProperty::IdentifiersCount,
        CrsProperty::IdentifierAuthority,
        CrsProperty::IdentifierCode,
        CrsProperty::IsDeprecated,
        CrsProperty::Name,
        CrsProperty::PrimeMeridianName,
        CrsProperty::PrimeMeridianLongitude,
        CrsProperty::PrimeMeridianUnitConversionFactor,
        CrsProperty::PrimeMeridianUnitName,
        CrsProperty::Scope,
        CrsProperty::Type,
        CrsProperty::UsageAreaCenter,
        CrsProperty::UsageAreaCenterHasValues,
        CrsProperty::UsageAreaCenterX,
        CrsProperty::UsageAreaCenterY,
        CrsProperty::UsageAreaMaxX,
        CrsProperty::UsageAreaMaxY,
        CrsProperty::UsageAreaMinX,
        CrsProperty::UsageAreaMinY,
        CrsProperty::UsageAreaName,
        CrsProperty::UsageAreaWestLongitude,
        CrsProperty::UsageAreaEastLongitude,
        CrsProperty::UsageAreaSouthLatitude,
        CrsProperty::UsageAreaNorthLatitude,
    ];

    /// Registered function name.
    pub fn function_name(self) -> &'static str {
        use CrsProperty::*;
        match self {
            AsJsonString => "TL.crs.AsJsonString",
            AsProjString => "TL.crs.AsProjString",
            AsWktString => "TL.crs.AsWktString",
            AxisCount => "TL.crs.Axis.Count",
            AxisAbbreviation => "TL.crs.Axis.Abbreviation",
            AxisDirection => "TL.crs.Axis.Direction",
            AxisName => "TL.crs.Axis.Name",
            AxisUnitAuthName => "TL.crs.Axis.UnitAuthName",
            AxisUnitCode => "TL.crs.Axis.UnitCode",
            AxisUnitConversionFactor => "TL.crs.Axis.UnitConversionFactor",
            AxisUnitName => "TL.crs.Axis.UnitName",
            CelestialBodyName => "TL.crs.CelestialBodyName",
            CsAxisCount => "TL.crs.CoordinateSystem.Axis.Count",
            CsAxisAbbreviation => "TL.crs.CoordinateSystem.Axis.Abbreviation",
            CsAxisDirection => "TL.crs.CoordinateSystem.Axis.Direction",
            CsAxisName => "TL.crs.CoordinateSystem.Axis.Name",
            CsAxisUnitAuthName => "TL.crs.CoordinateSystem.Axis.UnitAuthName",
            CsAxisUnitCode => "TL.crs.CoordinateSystem.Axis.UnitCode",
            CsAxisUnitConversionFactor => "TL.crs.CoordinateSystem.Axis.UnitConversionFactor",
            CsAxisUnitName => "TL.crs.CoordinateSystem.Axis.UnitName",
            CsCoordinateSystemType => "TL.crs.CoordinateSystem.CoordinateSystemType",
            CsName => "TL.crs.CoordinateSystem.Name",
            CsType => "TL.crs.CoordinateSystem.Type",
            DatumName => "TL.crs.Datum.Name",
            DatumType => "TL.crs.Datum.Type",
            EllipsoidName => "TL.crs.Ellipsoid.Name",
            EllipsoidType => "TL.crs.Ellipsoid.Type",
            EllipsoidSemiMajorMetre => "TL.crs.Ellipsoid.SemiMajorMetre",
            EllipsoidSemiMinorMetre => "TL.crs.Ellipsoid.SemiMinorMetre",
            EllipsoidInverseFlattening => "TL.crs.Ellipsoid.InverseFlattening",
            EllipsoidIsSemiMinorComputed => "TL.crs.Ellipsoid.IsSemiMinorComputed",
            GeodeticCrsName => "TL.crs.GeodeticCRS.Name",
            GeodeticCrsType => "TL.crs.GeodeticCRS.Type",
            IdentifiersCount => "TL.crs.Identifiers.Count",
            IdentifierAuthority => "TL.crs.Identifiers.Authority",
            IdentifierCode => "TL.crs.Identifiers.Code",
            IsDeprecated => "TL.crs.IsDeprecated",
            Name => "TL.crs.Name",
            PrimeMeridianName => "TL.crs.PrimeMeridian.Name",
            PrimeMeridianLongitude => "TL.crs.PrimeMeridian.Longitude",
            PrimeMeridianUnitConversionFactor => "TL.crs.PrimeMeridian.UnitConversionFactor",
            PrimeMeridianUnitName => "TL.crs.PrimeMeridian.UnitName",
            Scope => "TL.crs.Scope",
            Type => "TL.crs.Type",
            UsageAreaCenter => "TL.crs.UsageArea.Center",
            UsageAreaCenterHasValues => "TL.crs.UsageArea.Center.HasValues",
            UsageAreaCenterX => "TL.crs.UsageArea.Center.X",
            UsageAreaCenterY => "TL.crs.UsageArea.Center.Y",
            UsageAreaMaxX => "TL.crs.UsageArea.MaxX",
            UsageAreaMaxY => "TL.crs.UsageArea.MaxY",
            UsageAreaMinX => "TL.crs.UsageArea.MinX",
            UsageAreaMinY => "TL.crs.UsageArea.MinY",
            UsageAreaName => "TL.crs.UsageArea.Name",
            UsageAreaWestLongitude => "TL.crs.UsageArea.WestLongitude",
            UsageAreaEastLongitude => "TL.crs.UsageArea.EastLongitude",
            UsageAreaSouthLatitude => "TL.crs.UsageArea.SouthLatitude",
            UsageAreaNorthLatitude => "TL.crs.UsageArea.NorthLatitude",
        }
    }

    /// Look up a property by function name, ignoring surrounding
    /// whitespace and ASCII case.
    pub fn from_function_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.function_name().eq_ignore_ascii_case(name))
    }

    /// Whether the property takes a zero-based index argument.
    pub fn takes_index(self) -> bool {
        use CrsProperty::*;
        matches!(
            self,
            AxisAbbreviation
                | AxisDirection
                | AxisName
                | AxisUnitAuthName
                | AxisUnitCode
                | AxisUnitConversionFactor
                | AxisUnitName
                | CsAxisAbbreviation
                | CsAxisDirection
                | CsAxisName
                | CsAxisUnitAuthName
                | CsAxisUnitCode
                | CsAxisUnitConversionFactor
                | CsAxisUnitName
                | IdentifierAuthority
                | IdentifierCode
        )
    }

    /// Axis order the property is read in. Raw axis counts and the PROJ
    /// string use the declared form.
    pub fn axis_order(self) -> AxisOrder {
        match self {
            CrsProperty::AsProjString | CrsProperty::AxisCount | CrsProperty::CsAxisCount => {
                AxisOrder::Declared
            }
            _ => AxisOrder::Normalized,
        }
    }
}

/// Which axis list an indexed axis property reads.
#[derive(Clone, Copy)]
enum AxisSource {
    Crs,
    CoordinateSystem,
}

/// Which field of an axis a property reads.
#[derive(Clone, Copy)]
enum AxisField {
    Abbreviation,
    Direction,
    Name,
    UnitAuthName,
    UnitCode,
    UnitConversionFactor,
    UnitName,
}

impl AxisField {
    fn read(self, axis: &Axis) -> CellOutput {
        let text = |v: &Option<String>| CellOutput::text_or_not_found(v.clone());
        match self {
            AxisField::Abbreviation => text(&axis.abbreviation),
            AxisField::Direction => text(&axis.direction),
            AxisField::Name => text(&axis.name),
            AxisField::UnitAuthName => text(&axis.unit_auth_name),
            AxisField::UnitCode => text(&axis.unit_code),
            AxisField::UnitConversionFactor => CellOutput::number(axis.unit_conversion_factor),
            AxisField::UnitName => text(&axis.unit_name),
        }
    }
}

/// Resolution and query front end over one engine.
pub struct Facade<E: GeodesyEngine> {
    engine: E,
    contexts: ContextFactory,
}

impl<E: GeodesyEngine> Facade<E> {
    pub fn new(engine: E, options: ContextOptions) -> Self {
        Self {
            engine,
            contexts: ContextFactory::new(options),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn contexts(&self) -> &ContextFactory {
        &self.contexts
    }

    /// Create a context, resolve `spec` in the requested axis order, and run
    /// `read` on it. Context and CRS are dropped before this returns, on
    /// every path.
    pub fn with_crs<T>(
        &self,
        spec: &CellBlock,
        order: AxisOrder,
        read: impl FnOnce(&E::Crs) -> CrsResult<T>,
    ) -> CrsResult<T> {
        let ctx = self.contexts.create(&self.engine)?;
        let crs = resolver::resolve(&self.engine, &ctx, spec)?;
        match order {
            AxisOrder::Declared => read(&crs),
            AxisOrder::Normalized => {
                let normalized = crs.with_axis_normalized(&ctx)?;
                read(&normalized)
            }
        }
    }

    /// Like [`Facade::with_crs`] but with the context exposed to `read`.
    pub fn with_crs_and_context<T>(
        &self,
        spec: &CellBlock,
        read: impl FnOnce(&E::Context, &E::Crs) -> CrsResult<T>,
    ) -> CrsResult<T> {
        let ctx = self.contexts.create(&self.engine)?;
        let crs = resolver::resolve(&self.engine, &ctx, spec)?;
        read(&ctx, &crs)
    }

    /// Read one property. `index` is only used by indexed properties.
    pub fn read(&self, property: CrsProperty, spec: &CellBlock, index: i64) -> CrsResult<CellOutput> {
        use CrsProperty::*;
        let order = property.axis_order();
        match property {
            AsJsonString => self.export(spec, order, |c| c.to_projjson()),
            AsProjString => self.export(spec, order, |c| c.to_proj_string()),
            AsWktString => self.export(spec, order, |c| c.to_wkt()),

            AxisCount => self.with_crs(spec, order, |c| Ok(CellOutput::from(c.axes()?.len()))),
            AxisAbbreviation => self.axis(spec, index, AxisSource::Crs, AxisField::Abbreviation),
            AxisDirection => self.axis(spec, index, AxisSource::Crs, AxisField::Direction),
            AxisName => self.axis(spec, index, AxisSource::Crs, AxisField::Name),
            AxisUnitAuthName => self.axis(spec, index, AxisSource::Crs, AxisField::UnitAuthName),
            AxisUnitCode => self.axis(spec, index, AxisSource::Crs, AxisField::UnitCode),
            AxisUnitConversionFactor => {
                self.axis(spec, index, AxisSource::Crs, AxisField::UnitConversionFactor)
            }
            AxisUnitName => self.axis(spec, index, AxisSource::Crs, AxisField::UnitName),

            CelestialBodyName => self.text(spec, |c| Ok(c.celestial_body_name())),

            CsAxisCount => self.number(spec, order, |c| {
                Ok(c.coordinate_system()?.map(|cs| cs.axes.len() as f64))
            }),
            CsAxisAbbreviation => {
                self.axis(spec, index, AxisSource::CoordinateSystem, AxisField::Abbreviation)
            }
            CsAxisDirection => {
                self.axis(spec, index, AxisSource::CoordinateSystem, AxisField::Direction)
            }
            CsAxisName => self.axis(spec, index, AxisSource::CoordinateSystem, AxisField::Name),
            CsAxisUnitAuthName => {
                self.axis(spec, index, AxisSource::CoordinateSystem, AxisField::UnitAuthName)
            }
            CsAxisUnitCode => {
                self.axis(spec, index, AxisSource::CoordinateSystem, AxisField::UnitCode)
            }
            CsAxisUnitConversionFactor => self.axis(
                spec,
                index,
                AxisSource::CoordinateSystem,
                AxisField::UnitConversionFactor,
            ),
            CsAxisUnitName => {
                self.axis(spec, index, AxisSource::CoordinateSystem, AxisField::UnitName)
            }
            CsCoordinateSystemType => self.text(spec, |c| {
                Ok(c.coordinate_system()?.map(|cs| cs.cs_type.as_str().to_string()))
            }),
            CsName => self.text(spec, |c| Ok(c.coordinate_system()?.and_then(|cs| cs.name))),
            CsType => self.text(spec, |c| {
                Ok(c.coordinate_system()?.map(|_| "CoordinateSystem".to_string()))
            }),

            DatumName => self.text(spec, |c| Ok(c.datum().and_then(|d| d.name))),
            DatumType => self.text(spec, |c| {
                Ok(c.datum().map(|d| d.datum_type.as_str().to_string()))
            }),

            EllipsoidName => self.text(spec, |c| Ok(c.ellipsoid()?.and_then(|e| e.name))),
            EllipsoidType => self.text(spec, |c| {
                Ok(c.ellipsoid()?.map(|_| "Ellipsoid".to_string()))
            }),
            EllipsoidSemiMajorMetre => self.number(spec, order, |c| {
                Ok(c.ellipsoid()?.map(|e| e.semi_major_metre))
            }),
            EllipsoidSemiMinorMetre => self.number(spec, order, |c| {
                Ok(c.ellipsoid()?.map(|e| e.semi_minor_metre))
            }),
            EllipsoidInverseFlattening => self.number(spec, order, |c| {
                Ok(c.ellipsoid()?.map(|e| e.inverse_flattening))
            }),
            EllipsoidIsSemiMinorComputed => self.flag(spec, |c| {
                Ok(c.ellipsoid()?.map(|e| e.is_semi_minor_computed))
            }),

            GeodeticCrsName => self.text(spec, |c| Ok(c.geodetic_crs().and_then(|g| g.name))),
            GeodeticCrsType => self.text(spec, |c| {
                Ok(c.geodetic_crs().map(|g| g.crs_type.as_str().to_string()))
            }),

            IdentifiersCount => {
                self.with_crs(spec, order, |c| Ok(CellOutput::from(c.identifiers().len())))
            }
            IdentifierAuthority => self.indexed(spec, index, |c| Ok(c.identifiers()), |id: &Identifier| {
                CellOutput::text_or_not_found(Some(id.authority.clone()))
            }),
            IdentifierCode => self.indexed(spec, index, |c| Ok(c.identifiers()), |id: &Identifier| {
                CellOutput::text_or_not_found(Some(id.code.clone()))
            }),

            IsDeprecated => self.flag(spec, |c| Ok(Some(c.is_deprecated()))),
            Name => self.text(spec, |c| Ok(c.name())),
            Scope => self.text(spec, |c| Ok(c.scope())),
            Type => self.text(spec, |c| Ok(Some(c.crs_type().as_str().to_string()))),

            PrimeMeridianName => {
                self.text(spec, |c| Ok(c.prime_meridian()?.and_then(|p| p.name)))
            }
            PrimeMeridianLongitude => self.number(spec, order, |c| {
                Ok(c.prime_meridian()?.map(|p| p.longitude))
            }),
            PrimeMeridianUnitConversionFactor => self.number(spec, order, |c| {
                Ok(c.prime_meridian()?.map(|p| p.unit_conversion_factor))
            }),
            PrimeMeridianUnitName => {
                self.text(spec, |c| Ok(c.prime_meridian()?.and_then(|p| p.unit_name)))
            }

            UsageAreaCenter => self.area(spec, |a| {
                CellOutput::Array(vec![vec![
                    CellOutput::number(a.center_x()),
                    CellOutput::number(a.center_y()),
                ]])
            }),
            UsageAreaCenterHasValues => self.flag(spec, |c| {
                Ok(c.usage_area()?.map(|a| a.has_values()))
            }),
            UsageAreaCenterX => self.area(spec, |a| CellOutput::number(a.center_x())),
            UsageAreaCenterY => self.area(spec, |a| CellOutput::number(a.center_y())),
            UsageAreaMaxX => self.area(spec, |a| CellOutput::number(a.max_x)),
            UsageAreaMaxY => self.area(spec, |a| CellOutput::number(a.max_y)),
            UsageAreaMinX => self.area(spec, |a| CellOutput::number(a.min_x)),
            UsageAreaMinY => self.area(spec, |a| CellOutput::number(a.min_y)),
            UsageAreaName => self.text(spec, |c| Ok(c.usage_area()?.and_then(|a| a.name))),
            UsageAreaWestLongitude => self.area(spec, |a| CellOutput::number(a.west)),
            UsageAreaEastLongitude => self.area(spec, |a| CellOutput::number(a.east)),
            UsageAreaSouthLatitude => self.area(spec, |a| CellOutput::number(a.south)),
            UsageAreaNorthLatitude => self.area(spec, |a| CellOutput::number(a.north)),
        }
    }

    fn text(
        &self,
        spec: &CellBlock,
        select: impl FnOnce(&E::Crs) -> CrsResult<Option<String>>,
    ) -> CrsResult<CellOutput> {
        self.with_crs(spec, AxisOrder::Normalized, |crs| {
            Ok(CellOutput::text_or_not_found(select(crs)?))
        })
    }

    fn number(
        &self,
        spec: &CellBlock,
        order: AxisOrder,
        select: impl FnOnce(&E::Crs) -> CrsResult<Option<f64>>,
    ) -> CrsResult<CellOutput> {
        self.with_crs(spec, order, |crs| {
            Ok(CellOutput::number(select(crs)?.unwrap_or(NOT_FOUND_NUMBER)))
        })
    }

    fn flag(
        &self,
        spec: &CellBlock,
        select: impl FnOnce(&E::Crs) -> CrsResult<Option<bool>>,
    ) -> CrsResult<CellOutput> {
        self.with_crs(spec, AxisOrder::Normalized, |crs| {
            Ok(CellOutput::Bool(select(crs)?.unwrap_or(false)))
        })
    }

    /// Text exports: an empty export is a value error, not a sentinel.
    fn export(
        &self,
        spec: &CellBlock,
        order: AxisOrder,
        select: impl FnOnce(&E::Crs) -> Option<String>,
    ) -> CrsResult<CellOutput> {
        self.with_crs(spec, order, |crs| {
            Ok(match select(crs) {
                Some(text) if !text.trim().is_empty() => CellOutput::Text(text),
                _ => CellOutput::Error(CellError::Value),
            })
        })
    }

    fn indexed<T>(
        &self,
        spec: &CellBlock,
        index: i64,
        list: impl FnOnce(&E::Crs) -> CrsResult<Vec<T>>,
        field: impl FnOnce(&T) -> CellOutput,
    ) -> CrsResult<CellOutput> {
        self.with_crs(spec, AxisOrder::Normalized, |crs| {
            let items = list(crs)?;
            Ok(usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .map_or_else(CellOutput::index_out_of_range, field))
        })
    }

    fn axis(
        &self,
        spec: &CellBlock,
        index: i64,
        source: AxisSource,
        field: AxisField,
    ) -> CrsResult<CellOutput> {
        self.indexed(
            spec,
            index,
            |crs| match source {
                AxisSource::Crs => Ok(crs.axes()?),
                AxisSource::CoordinateSystem => {
                    Ok(crs.coordinate_system()?.map(|cs| cs.axes).unwrap_or_default())
                }
            },
            |axis: &Axis| field.read(axis),
        )
    }

    fn area(
        &self,
        spec: &CellBlock,
        field: impl FnOnce(&UsageArea) -> CellOutput,
    ) -> CrsResult<CellOutput> {
        self.with_crs(spec, AxisOrder::Normalized, |crs| {
            Ok(crs
                .usage_area()?
                .as_ref()
                .map_or_else(CellOutput::not_found, field))
        })
    }
}
