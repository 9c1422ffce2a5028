//! In-memory reference engine.
//!
//! Serves a fixed catalogue of common CRSs embedded at build time. It covers
//! every construction entry point (EPSG codes, authority codes, WKT,
//! PROJJSON, PROJ strings, URNs and names) by mapping the input back onto a
//! catalogue entry. Distances are ellipsoidal geodesics and limited to
//! geographic CRSs.

use std::sync::Arc;

use qtty::Degrees;
use serde::Deserialize;
use serde_json::{json, Value};

use super::geodesic;
use super::{
    Axis, CoordinateSystem, CoordinateSystemType, CrsType, Datum, DatumType, EngineCrs,
    EngineError, EngineResult, Ellipsoid, Equivalence, GeodesyEngine, GeodeticCrs, Identifier,
    PrimeMeridian, UsageArea,
};
use crate::context::{ContextOptions, DiagnosticSink, LogLevel};
use crate::point::Point;

const ENGINE_NAME: &str = "catalog";
const CATALOG_JSON: &str = include_str!("catalog.json");
const DEGREE: f64 = 0.017_453_292_519_943_3;
const PROJJSON_SCHEMA: &str = "https://proj.org/schemas/v0.7/projjson.schema.json";

/// Axis layouts used by catalogue entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AxisLayout {
    LatLon,
    LonLat,
    LatLonH,
    LonLatH,
    EastNorthXy,
    EastNorthEn,
}

impl AxisLayout {
    fn normalized(self) -> Self {
        match self {
            AxisLayout::LatLon => AxisLayout::LonLat,
            AxisLayout::LatLonH => AxisLayout::LonLatH,
            other => other,
        }
    }

    fn north_first(self) -> bool {
        matches!(self, AxisLayout::LatLon | AxisLayout::LatLonH)
    }

    fn cs_type(self) -> CoordinateSystemType {
        match self {
            AxisLayout::EastNorthXy | AxisLayout::EastNorthEn => CoordinateSystemType::Cartesian,
            _ => CoordinateSystemType::Ellipsoidal,
        }
    }

    fn cs_name(self) -> &'static str {
        match self {
            AxisLayout::LatLon => {
                "Ellipsoidal 2D CS. Axes: latitude, longitude. Orientations: north, east. UoM: degree"
            }
            AxisLayout::LonLat => {
                "Ellipsoidal 2D CS. Axes: longitude, latitude. Orientations: east, north. UoM: degree"
            }
            AxisLayout::LatLonH => {
                "Ellipsoidal 3D CS. Axes: latitude, longitude, ellipsoidal height. Orientations: north, east, up. UoM: degree, degree, metre."
            }
            AxisLayout::LonLatH => {
                "Ellipsoidal 3D CS. Axes: longitude, latitude, ellipsoidal height. Orientations: east, north, up. UoM: degree, degree, metre."
            }
            AxisLayout::EastNorthXy => {
                "Cartesian 2D CS. Axes: easting, northing (X,Y). Orientations: east, north. UoM: m."
            }
            AxisLayout::EastNorthEn => {
                "Cartesian 2D CS. Axes: easting, northing (E,N). Orientations: east, north. UoM: m."
            }
        }
    }

    fn axes(self) -> Vec<Axis> {
        match self {
            AxisLayout::LatLon => vec![latitude(), longitude()],
            AxisLayout::LonLat => vec![longitude(), latitude()],
            AxisLayout::LatLonH => vec![latitude(), longitude(), ellipsoidal_height()],
            AxisLayout::LonLatH => vec![longitude(), latitude(), ellipsoidal_height()],
            AxisLayout::EastNorthXy => vec![easting("X"), northing("Y")],
            AxisLayout::EastNorthEn => vec![easting("E"), northing("N")],
        }
    }
}

fn axis(name: &str, abbreviation: &str, direction: &str, unit: (&str, &str, f64)) -> Axis {
    let (unit_name, unit_code, factor) = unit;
    Axis {
        name: Some(name.to_string()),
        abbreviation: Some(abbreviation.to_string()),
        direction: Some(direction.to_string()),
        unit_name: Some(unit_name.to_string()),
        unit_auth_name: Some("EPSG".to_string()),
        unit_code: Some(unit_code.to_string()),
        unit_conversion_factor: factor,
    }
}

const ANGLE_UNIT: (&str, &str, f64) = ("degree", "9122", DEGREE);
const LENGTH_UNIT: (&str, &str, f64) = ("metre", "9001", 1.0);

fn latitude() -> Axis {
    axis("Geodetic latitude", "Lat", "north", ANGLE_UNIT)
}

fn longitude() -> Axis {
    axis("Geodetic longitude", "Lon", "east", ANGLE_UNIT)
}

fn ellipsoidal_height() -> Axis {
    axis("Ellipsoidal height", "h", "up", LENGTH_UNIT)
}

fn easting(abbreviation: &str) -> Axis {
    axis("Easting", abbreviation, "east", LENGTH_UNIT)
}

fn northing(abbreviation: &str) -> Axis {
    axis("Northing", abbreviation, "north", LENGTH_UNIT)
}

fn greenwich() -> PrimeMeridian {
    PrimeMeridian {
        name: Some("Greenwich".to_string()),
        longitude: 0.0,
        unit_conversion_factor: DEGREE,
        unit_name: Some("degree".to_string()),
    }
}

fn default_celestial_body() -> String {
    "Earth".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct EllipsoidEntry {
    name: String,
    semi_major_metre: f64,
    #[serde(default)]
    inverse_flattening: Option<f64>,
    #[serde(default)]
    semi_minor_metre: Option<f64>,
}

impl EllipsoidEntry {
    fn to_ellipsoid(&self) -> EngineResult<Ellipsoid> {
        let a = self.semi_major_metre;
        match (self.inverse_flattening, self.semi_minor_metre) {
            (Some(inv_f), _) => Ok(Ellipsoid {
                name: Some(self.name.clone()),
                semi_major_metre: a,
                semi_minor_metre: a * (1.0 - 1.0 / inv_f),
                inverse_flattening: inv_f,
                is_semi_minor_computed: true,
            }),
            (None, Some(b)) => Ok(Ellipsoid {
                name: Some(self.name.clone()),
                semi_major_metre: a,
                semi_minor_metre: b,
                inverse_flattening: if a == b { 0.0 } else { a / (a - b) },
                is_semi_minor_computed: false,
            }),
            (None, None) => Err(EngineError::Operation(format!(
                "ellipsoid '{}' has neither inverse flattening nor semi-minor axis",
                self.name
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AreaEntry {
    name: String,
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    authority: String,
    code: String,
    name: String,
    #[serde(rename = "type")]
    crs_type: CrsType,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default = "default_celestial_body")]
    celestial_body: String,
    axes: AxisLayout,
    #[serde(default)]
    datum: Option<Datum>,
    #[serde(default)]
    ellipsoid: Option<EllipsoidEntry>,
    #[serde(default)]
    prime_meridian: Option<PrimeMeridian>,
    #[serde(default)]
    area: Option<AreaEntry>,
    #[serde(default)]
    projected_bounds: Option<[f64; 4]>,
    #[serde(default)]
    base_crs: Option<String>,
    #[serde(default)]
    proj_string: Option<String>,
}

impl CatalogEntry {
    fn matches(&self, authority: &str, code: &str) -> bool {
        self.authority.eq_ignore_ascii_case(authority) && self.code.eq_ignore_ascii_case(code)
    }

    fn reference(&self) -> String {
        format!("{}:{}", self.authority, self.code)
    }
}

/// Per-call state of the catalogue engine.
pub struct CatalogContext {
    options: ContextOptions,
    sink: Option<DiagnosticSink>,
}

impl CatalogContext {
    pub fn options(&self) -> ContextOptions {
        self.options
    }

    fn emit(&self, level: LogLevel, message: impl FnOnce() -> String) {
        if level == LogLevel::None || level > self.options.log_level {
            return;
        }
        if let Some(sink) = &self.sink {
            sink(level, &message());
        }
    }
}

/// Reference engine over the embedded catalogue.
#[derive(Debug, Clone)]
pub struct CatalogEngine {
    entries: Vec<Arc<CatalogEntry>>,
}

impl CatalogEngine {
    /// Load the embedded catalogue.
    pub fn new() -> EngineResult<Self> {
        Self::from_json(CATALOG_JSON)
    }

    /// Load a catalogue from JSON. Every base CRS reference must resolve.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| EngineError::Construction(format!("invalid catalogue: {}", e)))?;
        let engine = Self {
            entries: entries.into_iter().map(Arc::new).collect(),
        };
        for entry in &engine.entries {
            if let Some(base) = &entry.base_crs {
                if engine.find_reference(base).is_none() {
                    return Err(EngineError::Construction(format!(
                        "{} refers to unknown base CRS {}",
                        entry.reference(),
                        base
                    )));
                }
            }
        }
        Ok(engine)
    }

    /// Number of catalogue entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `AUTH:CODE` of every entry, in catalogue order.
    pub fn references(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.reference()).collect()
    }

    fn find(&self, authority: &str, code: &str) -> Option<&Arc<CatalogEntry>> {
        self.entries.iter().find(|e| e.matches(authority, code))
    }

    fn find_reference(&self, reference: &str) -> Option<&Arc<CatalogEntry>> {
        let (authority, code) = reference.split_once(':')?;
        self.find(authority.trim(), code.trim())
    }

    fn find_name(&self, name: &str) -> Option<&Arc<CatalogEntry>> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
    }

    fn instantiate(&self, ctx: &CatalogContext, entry: &Arc<CatalogEntry>) -> EngineResult<CatalogCrs> {
        let base = match &entry.base_crs {
            Some(reference) => Some(self.find_reference(reference).cloned().ok_or_else(|| {
                EngineError::Construction(format!("base CRS {} not found", reference))
            })?),
            None => None,
        };
        ctx.emit(LogLevel::Debug, || {
            format!("resolved {} ({})", entry.reference(), entry.name)
        });
        Ok(CatalogCrs {
            entry: Arc::clone(entry),
            base,
            layout: entry.axes,
            identified: true,
        })
    }

    fn lookup(&self, ctx: &CatalogContext, authority: &str, code: &str) -> EngineResult<CatalogCrs> {
        match self.find(authority, code) {
            Some(entry) => self.instantiate(ctx, entry),
            None => {
                let message = format!("crs not found: {}:{}", authority, code);
                ctx.emit(LogLevel::Error, || message.clone());
                Err(EngineError::Construction(message))
            }
        }
    }

    fn lookup_name(&self, ctx: &CatalogContext, name: &str) -> EngineResult<CatalogCrs> {
        match self.find_name(name) {
            Some(entry) => self.instantiate(ctx, entry),
            None => {
                let message = format!("unrecognized CRS definition: '{}'", name);
                ctx.emit(LogLevel::Error, || message.clone());
                Err(EngineError::Construction(message))
            }
        }
    }

    fn from_projjson(&self, ctx: &CatalogContext, text: &str) -> EngineResult<CatalogCrs> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| EngineError::Construction(format!("invalid PROJJSON: {}", e)))?;
        if let Some(id) = value.get("id") {
            let authority = id.get("authority").and_then(Value::as_str);
            let code = match id.get("code") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            if let (Some(authority), Some(code)) = (authority, code) {
                return self.lookup(ctx, authority, &code);
            }
        }
        match value.get("name").and_then(Value::as_str) {
            Some(name) => self.lookup_name(ctx, name),
            None => Err(EngineError::Construction(
                "PROJJSON object has neither id nor name".to_string(),
            )),
        }
    }

    fn from_proj_string(&self, ctx: &CatalogContext, text: &str) -> EngineResult<CatalogCrs> {
        let wanted = proj_tokens(text);
        let entry = self
            .entries
            .iter()
            .find(|e| e.proj_string.as_deref().map(proj_tokens).as_ref() == Some(&wanted))
            .ok_or_else(|| {
                EngineError::Construction(format!("no catalogue CRS matches '{}'", text))
            })?;
        // PROJ strings carry no identifier and always use east/north order
        let mut crs = self.instantiate(ctx, entry)?;
        crs.layout = crs.layout.normalized();
        crs.identified = false;
        Ok(crs)
    }
}

impl GeodesyEngine for CatalogEngine {
    type Context = CatalogContext;
    type Crs = CatalogCrs;

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn create_context(
        &self,
        options: &ContextOptions,
        sink: Option<DiagnosticSink>,
    ) -> EngineResult<CatalogContext> {
        let ctx = CatalogContext {
            options: *options,
            sink,
        };
        if options.allow_network {
            ctx.emit(LogLevel::Debug, || {
                "network access enabled; the catalogue has no remote resources".to_string()
            });
        }
        Ok(ctx)
    }

    fn create_from_epsg(&self, ctx: &CatalogContext, code: i32) -> EngineResult<CatalogCrs> {
        self.lookup(ctx, "EPSG", &code.to_string())
    }

    fn create_from_wkt(&self, ctx: &CatalogContext, wkt: &str) -> EngineResult<CatalogCrs> {
        match wkt::top_level_reference(wkt)? {
            wkt::Reference::Id { authority, code } => self.lookup(ctx, &authority, &code),
            wkt::Reference::Name(name) => self.lookup_name(ctx, &name),
        }
    }

    fn create_from_descriptor(&self, ctx: &CatalogContext, text: &str) -> EngineResult<CatalogCrs> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::Construction("empty CRS definition".to_string()));
        }
        if text.starts_with('{') {
            return self.from_projjson(ctx, text);
        }
        if wkt::looks_like_wkt(text) {
            return self.create_from_wkt(ctx, text);
        }
        if text.starts_with('+') || text.starts_with("proj=") {
            return self.from_proj_string(ctx, text);
        }
        if let Some(urn) = strip_prefix_ignore_case(text, "urn:ogc:def:crs:") {
            // urn:ogc:def:crs:AUTH:[version]:CODE
            let parts: Vec<&str> = urn.split(':').collect();
            return match (parts.first(), parts.last()) {
                (Some(authority), Some(code)) if parts.len() >= 2 => {
                    self.lookup(ctx, authority, code)
                }
                _ => Err(EngineError::Construction(format!("invalid URN '{}'", text))),
            };
        }
        if let Some((authority, code)) = text.split_once(':') {
            if !authority.contains(char::is_whitespace) && !code.trim().is_empty() {
                return self.lookup(ctx, authority, code.trim());
            }
        }
        self.lookup_name(ctx, text)
    }

    fn create_from_authority_code(
        &self,
        ctx: &CatalogContext,
        authority: &str,
        code: i32,
    ) -> EngineResult<CatalogCrs> {
        self.lookup(ctx, authority.trim(), &code.to_string())
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Sorted PROJ string parameters, without flags that do not change the CRS.
fn proj_tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| t.trim_start_matches('+').to_string())
        .filter(|t| !matches!(t.as_str(), "" | "no_defs" | "type=crs" | "wktext"))
        .collect();
    tokens.sort();
    tokens
}

/// A CRS served from the catalogue.
#[derive(Debug, Clone)]
pub struct CatalogCrs {
    entry: Arc<CatalogEntry>,
    base: Option<Arc<CatalogEntry>>,
    layout: AxisLayout,
    identified: bool,
}

struct GeoPosition {
    lon: Degrees,
    lat: Degrees,
    height: f64,
}

impl CatalogCrs {
    /// Entry carrying datum, ellipsoid and prime meridian.
    fn geodetic(&self) -> &CatalogEntry {
        self.base.as_deref().unwrap_or(&self.entry)
    }

    fn ellipsoid_entry(&self) -> EngineResult<Ellipsoid> {
        self.geodetic()
            .ellipsoid
            .as_ref()
            .ok_or_else(|| EngineError::Operation(format!("{} has no ellipsoid", self.entry.name)))?
            .to_ellipsoid()
    }

    fn position(&self, point: &Point) -> EngineResult<GeoPosition> {
        if !self.entry.crs_type.is_geographic() {
            return Err(EngineError::Unsupported {
                engine: ENGINE_NAME,
                what: format!(
                    "geodesic distance in {} '{}'",
                    self.entry.crs_type, self.entry.name
                ),
            });
        }
        let (lon, lat) = if self.layout.north_first() {
            (point.y, point.x)
        } else {
            (point.x, point.y)
        };
        Ok(GeoPosition {
            lon: Degrees::new(lon),
            lat: Degrees::new(lat),
            height: point.z.unwrap_or(0.0),
        })
    }

    /// Ellipsoidal geodesic length, ignoring heights.
    fn surface_distance(&self, from: &GeoPosition, to: &GeoPosition) -> EngineResult<f64> {
        geodesic::inverse(
            &self.ellipsoid_entry()?,
            (from.lon.value(), from.lat.value()),
            (to.lon.value(), to.lat.value()),
        )
    }

    fn same_geodetic_basis(&self, other: &CatalogCrs) -> EngineResult<bool> {
        if self.datum().map(|d| d.name) != other.datum().map(|d| d.name) {
            return Ok(false);
        }
        let (a, b) = (self.ellipsoid()?, other.ellipsoid()?);
        let ellipsoids_match = match (a, b) {
            (Some(a), Some(b)) => {
                (a.semi_major_metre - b.semi_major_metre).abs() < 1e-4
                    && (a.semi_minor_metre - b.semi_minor_metre).abs() < 1e-4
            }
            (None, None) => true,
            _ => false,
        };
        let meridians_match = match (self.prime_meridian()?, other.prime_meridian()?) {
            (Some(a), Some(b)) => (a.longitude - b.longitude).abs() < 1e-12,
            (None, None) => true,
            _ => false,
        };
        Ok(ellipsoids_match && meridians_match)
    }

    fn area_bounds(&self, area: &AreaEntry) -> [f64; 4] {
        match self.entry.projected_bounds {
            Some(bounds) => bounds,
            None if self.layout.north_first() => [area.south, area.west, area.north, area.east],
            None => [area.west, area.south, area.east, area.north],
        }
    }

    fn wkt_datum(&self) -> String {
        let geodetic = self.geodetic();
        let ellipsoid = match geodetic.ellipsoid.as_ref().map(EllipsoidEntry::to_ellipsoid) {
            Some(Ok(e)) => format!(
                "ELLIPSOID[\"{}\",{},{},LENGTHUNIT[\"metre\",1]]",
                e.name.unwrap_or_default(),
                e.semi_major_metre,
                e.inverse_flattening
            ),
            _ => String::new(),
        };
        let keyword = match geodetic.datum.as_ref().map(|d| d.datum_type) {
            Some(DatumType::DatumEnsemble) => "ENSEMBLE",
            _ => "DATUM",
        };
        let name = geodetic
            .datum
            .as_ref()
            .and_then(|d| d.name.clone())
            .unwrap_or_default();
        let meridian = geodetic.prime_meridian.clone().unwrap_or_else(greenwich);
        format!(
            "{}[\"{}\",{}],PRIMEM[\"{}\",{},ANGLEUNIT[\"degree\",{}]]",
            keyword,
            name,
            ellipsoid,
            meridian.name.unwrap_or_default(),
            meridian.longitude,
            DEGREE
        )
    }

    fn wkt_axes(&self) -> String {
        let axes = self.layout.axes();
        let subtype = match self.layout.cs_type() {
            CoordinateSystemType::Cartesian => "Cartesian",
            _ => "ellipsoidal",
        };
        let mut out = format!("CS[{},{}]", subtype, axes.len());
        for (i, axis) in axes.iter().enumerate() {
            let unit = if axis.unit_name.as_deref() == Some("degree") {
                format!("ANGLEUNIT[\"degree\",{}]", DEGREE)
            } else {
                "LENGTHUNIT[\"metre\",1]".to_string()
            };
            out.push_str(&format!(
                ",AXIS[\"{} ({})\",{},ORDER[{}],{}]",
                axis.name.as_deref().unwrap_or_default().to_lowercase(),
                axis.abbreviation.as_deref().unwrap_or_default(),
                axis.direction.as_deref().unwrap_or_default(),
                i + 1,
                unit
            ));
        }
        out
    }

    fn wkt_usage(&self) -> String {
        let mut parts = Vec::new();
        if let Some(scope) = &self.entry.scope {
            parts.push(format!("SCOPE[\"{}\"]", scope));
        }
        if let Some(area) = &self.entry.area {
            parts.push(format!("AREA[\"{}\"]", area.name));
            parts.push(format!(
                "BBOX[{},{},{},{}]",
                area.south, area.west, area.north, area.east
            ));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(",USAGE[{}]", parts.join(","))
        }
    }

    fn wkt_id(&self, entry: &CatalogEntry) -> String {
        if !self.identified {
            return String::new();
        }
        if entry.code.chars().all(|c| c.is_ascii_digit()) {
            format!(",ID[\"{}\",{}]", entry.authority, entry.code)
        } else {
            format!(",ID[\"{}\",\"{}\"]", entry.authority, entry.code)
        }
    }

    fn projjson_axes(&self) -> Vec<Value> {
        self.layout
            .axes()
            .into_iter()
            .map(|a| {
                json!({
                    "name": a.name,
                    "abbreviation": a.abbreviation,
                    "direction": a.direction,
                    "unit": a.unit_name,
                })
            })
            .collect()
    }

    fn projjson_datum(&self) -> (String, Value) {
        let geodetic = self.geodetic();
        let ellipsoid = geodetic
            .ellipsoid
            .as_ref()
            .and_then(|e| e.to_ellipsoid().ok())
            .map(|e| {
                json!({
                    "name": e.name,
                    "semi_major_axis": e.semi_major_metre,
                    "inverse_flattening": e.inverse_flattening,
                })
            });
        let key = match geodetic.datum.as_ref().map(|d| d.datum_type) {
            Some(DatumType::DatumEnsemble) => "datum_ensemble",
            _ => "datum",
        };
        let name = geodetic.datum.as_ref().and_then(|d| d.name.clone());
        (key.to_string(), json!({ "name": name, "ellipsoid": ellipsoid }))
    }
}

impl EngineCrs for CatalogCrs {
    type Context = CatalogContext;

    fn with_axis_normalized(&self, ctx: &CatalogContext) -> EngineResult<Self> {
        let layout = self.layout.normalized();
        if layout != self.layout {
            ctx.emit(LogLevel::Trace, || {
                format!("normalized axis order of {}", self.entry.name)
            });
        }
        Ok(Self {
            layout,
            ..self.clone()
        })
    }

    fn name(&self) -> Option<String> {
        Some(self.entry.name.clone())
    }

    fn crs_type(&self) -> CrsType {
        self.entry.crs_type
    }

    fn scope(&self) -> Option<String> {
        self.entry.scope.clone()
    }

    fn is_deprecated(&self) -> bool {
        self.entry.deprecated
    }

    fn celestial_body_name(&self) -> Option<String> {
        Some(self.geodetic().celestial_body.clone())
    }

    fn axes(&self) -> EngineResult<Vec<Axis>> {
        Ok(self.layout.axes())
    }

    fn coordinate_system(&self) -> EngineResult<Option<CoordinateSystem>> {
        Ok(Some(CoordinateSystem {
            name: Some(self.layout.cs_name().to_string()),
            cs_type: self.layout.cs_type(),
            axes: self.layout.axes(),
        }))
    }

    fn datum(&self) -> Option<Datum> {
        self.geodetic().datum.clone()
    }

    fn ellipsoid(&self) -> EngineResult<Option<Ellipsoid>> {
        self.geodetic()
            .ellipsoid
            .as_ref()
            .map(EllipsoidEntry::to_ellipsoid)
            .transpose()
    }

    fn prime_meridian(&self) -> EngineResult<Option<PrimeMeridian>> {
        Ok(Some(
            self.geodetic()
                .prime_meridian
                .clone()
                .unwrap_or_else(greenwich),
        ))
    }

    fn identifiers(&self) -> Vec<Identifier> {
        if !self.identified {
            return Vec::new();
        }
        vec![Identifier {
            authority: self.entry.authority.clone(),
            code: self.entry.code.clone(),
        }]
    }

    fn usage_area(&self) -> EngineResult<Option<UsageArea>> {
        Ok(self.entry.area.as_ref().map(|area| {
            let [min_x, min_y, max_x, max_y] = self.area_bounds(area);
            UsageArea {
                name: Some(area.name.clone()),
                west: area.west,
                south: area.south,
                east: area.east,
                north: area.north,
                min_x,
                min_y,
                max_x,
                max_y,
            }
        }))
    }

    fn geodetic_crs(&self) -> Option<GeodeticCrs> {
        let geodetic = self.geodetic();
        geodetic.crs_type.is_geographic().then(|| GeodeticCrs {
            name: Some(geodetic.name.clone()),
            crs_type: geodetic.crs_type,
        })
    }

    fn to_wkt(&self) -> Option<String> {
        let body = format!(
            "{},{}{}",
            self.wkt_datum(),
            self.wkt_axes(),
            self.wkt_usage()
        );
        let wkt = match &self.base {
            Some(base) => format!(
                "PROJCRS[\"{}\",BASEGEOGCRS[\"{}\",{}{}],{}{}{}{}]",
                self.entry.name,
                base.name,
                self.wkt_datum(),
                self.wkt_id(base),
                self.wkt_axes(),
                self.wkt_usage(),
                self.entry
                    .proj_string
                    .as_ref()
                    .map(|p| format!(",REMARK[\"{}\"]", p))
                    .unwrap_or_default(),
                self.wkt_id(&self.entry)
            ),
            None => format!(
                "GEOGCRS[\"{}\",{}{}]",
                self.entry.name,
                body,
                self.wkt_id(&self.entry)
            ),
        };
        Some(wkt)
    }

    fn to_proj_string(&self) -> Option<String> {
        self.entry.proj_string.clone()
    }

    fn to_projjson(&self) -> Option<String> {
        let (datum_key, datum) = self.projjson_datum();
        let coordinate_system = json!({
            "subtype": match self.layout.cs_type() {
                CoordinateSystemType::Cartesian => "Cartesian",
                _ => "ellipsoidal",
            },
            "axis": self.projjson_axes(),
        });
        let mut object = json!({
            "$schema": PROJJSON_SCHEMA,
            "name": self.entry.name,
        });
        match &self.base {
            Some(base) => {
                let mut base_crs = json!({ "name": base.name });
                base_crs[datum_key.as_str()] = datum;
                object["type"] = json!("ProjectedCRS");
                object["base_crs"] = base_crs;
            }
            None => {
                object["type"] = json!("GeographicCRS");
                object[datum_key.as_str()] = datum;
            }
        }
        object["coordinate_system"] = coordinate_system;
        if let Some(scope) = &self.entry.scope {
            object["scope"] = json!(scope);
        }
        if let Some(area) = &self.entry.area {
            object["area"] = json!(area.name);
            object["bbox"] = json!({
                "south_latitude": area.south,
                "west_longitude": area.west,
                "north_latitude": area.north,
                "east_longitude": area.east,
            });
        }
        if self.identified {
            let code = match self.entry.code.parse::<i64>() {
                Ok(n) => json!(n),
                Err(_) => json!(self.entry.code),
            };
            object["id"] = json!({ "authority": self.entry.authority, "code": code });
        }
        serde_json::to_string_pretty(&object).ok()
    }

    fn geo_distance(&self, a: &Point, b: &Point) -> EngineResult<f64> {
        let (from, to) = (self.position(a)?, self.position(b)?);
        self.surface_distance(&from, &to)
    }

    fn geo_distance_z(&self, a: &Point, b: &Point) -> EngineResult<f64> {
        let (from, to) = (self.position(a)?, self.position(b)?);
        let surface = self.surface_distance(&from, &to)?;
        Ok(surface.hypot(to.height - from.height))
    }

    fn is_equivalent_to(
        &self,
        other: &Self,
        _ctx: &CatalogContext,
        criterion: Equivalence,
    ) -> EngineResult<bool> {
        if self.entry.crs_type != other.entry.crs_type || !self.same_geodetic_basis(other)? {
            return Ok(false);
        }
        if self.base.is_some() && self.entry.proj_string != other.entry.proj_string {
            return Ok(false);
        }
        let signature = |crs: &CatalogCrs| -> Vec<(String, u64)> {
            crs.layout
                .axes()
                .into_iter()
                .map(|a| (a.direction.unwrap_or_default(), a.unit_conversion_factor.to_bits()))
                .collect()
        };
        let (mut mine, mut theirs) = (signature(self), signature(other));
        if criterion == Equivalence::IgnoreAxisOrder && self.entry.crs_type.is_geographic() {
            mine.sort();
            theirs.sort();
        }
        Ok(mine == theirs)
    }
}

/// Just enough WKT reading to map a definition back onto the catalogue.
mod wkt {
    use super::{EngineError, EngineResult};

    pub(super) enum Reference {
        Id { authority: String, code: String },
        Name(String),
    }

    /// `KEYWORD[` prefix with an upper-case keyword.
    pub(super) fn looks_like_wkt(text: &str) -> bool {
        match text.find('[') {
            Some(0) | None => false,
            Some(pos) => text[..pos]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'),
        }
    }

    /// Identifier attached to the outermost object, else its name.
    pub(super) fn top_level_reference(wkt: &str) -> EngineResult<Reference> {
        let wkt = wkt.trim();
        if !looks_like_wkt(wkt) {
            return Err(parse_error("missing keyword"));
        }

        let mut depth: i32 = 0;
        let mut in_quote = false;
        let mut last_id = None;
        for (i, c) in wkt.char_indices() {
            match c {
                '"' => in_quote = !in_quote,
                '[' | '(' if !in_quote => depth += 1,
                ']' | ')' if !in_quote => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(parse_error("unbalanced brackets"));
                    }
                }
                _ if !in_quote && depth == 1 => {
                    let starts_token = wkt[..i]
                        .chars()
                        .next_back()
                        .map_or(false, |p| p == ',' || p.is_whitespace());
                    if starts_token {
                        if let Some(id) = identifier_at(&wkt[i..]) {
                            last_id = Some(id);
                        }
                    }
                }
                _ => {}
            }
        }
        if depth != 0 || in_quote {
            return Err(parse_error("unterminated definition"));
        }

        if let Some((authority, code)) = last_id {
            return Ok(Reference::Id { authority, code });
        }
        let name = wkt
            .split_once('"')
            .and_then(|(_, rest)| rest.split_once('"'))
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| parse_error("missing name"))?;
        Ok(Reference::Name(name))
    }

    /// `AUTHORITY["EPSG","4326"]` or `ID["EPSG",4326]`.
    fn identifier_at(text: &str) -> Option<(String, String)> {
        let body = text
            .strip_prefix("AUTHORITY[")
            .or_else(|| text.strip_prefix("ID["))?
            .trim_start();
        let (authority, rest) = body.strip_prefix('"')?.split_once('"')?;
        let rest = rest.trim_start().strip_prefix(',')?.trim_start();
        let code: String = match rest.strip_prefix('"') {
            Some(quoted) => quoted.split_once('"')?.0.to_string(),
            None => rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect(),
        };
        (!code.is_empty()).then(|| (authority.to_string(), code))
    }

    fn parse_error(what: &str) -> EngineError {
        EngineError::Construction(format!("Parsing error : {}", what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CatalogEngine, CatalogContext) {
        let engine = CatalogEngine::new().unwrap();
        let ctx = engine
            .create_context(&ContextOptions::default(), None)
            .unwrap();
        (engine, ctx)
    }

    #[test]
    fn test_embedded_catalogue_loads() {
        let engine = CatalogEngine::new().unwrap();
        assert!(engine.len() >= 13);
        assert!(engine.references().contains(&"OGC:CRS84".to_string()));
    }

    #[test]
    fn test_unknown_base_crs_is_rejected() {
        let json = r#"[{"authority":"X","code":"1","name":"n","type":"ProjectedCrs",
            "axes":"east_north_en","base_crs":"X:2"}]"#;
        assert!(CatalogEngine::from_json(json).is_err());
    }

    #[test]
    fn test_projected_inherits_geodetic_basis() {
        let (engine, ctx) = setup();
        let crs = engine.create_from_epsg(&ctx, 28992).unwrap();
        assert_eq!(crs.datum().unwrap().name.as_deref(), Some("Amersfoort"));
        let ellipsoid = crs.ellipsoid().unwrap().unwrap();
        assert_eq!(ellipsoid.name.as_deref(), Some("Bessel 1841"));
        assert!(ellipsoid.is_semi_minor_computed);
        assert_eq!(crs.geodetic_crs().unwrap().name.as_deref(), Some("Amersfoort"));
    }

    #[test]
    fn test_semi_minor_given() {
        let (engine, ctx) = setup();
        let crs = engine.create_from_epsg(&ctx, 4267).unwrap();
        let ellipsoid = crs.ellipsoid().unwrap().unwrap();
        assert!(!ellipsoid.is_semi_minor_computed);
        assert!((ellipsoid.inverse_flattening - 294.978_698_2).abs() < 1e-3);
    }

    #[test]
    fn test_normalization_swaps_geographic_axes() {
        let (engine, ctx) = setup();
        let crs = engine.create_from_epsg(&ctx, 4326).unwrap();
        assert_eq!(crs.axes().unwrap()[0].abbreviation.as_deref(), Some("Lat"));
        let normalized = crs.with_axis_normalized(&ctx).unwrap();
        assert_eq!(normalized.axes().unwrap()[0].abbreviation.as_deref(), Some("Lon"));
        // projected axes already east/north
        let rd = engine.create_from_epsg(&ctx, 28992).unwrap();
        assert_eq!(rd.with_axis_normalized(&ctx).unwrap().layout, rd.layout);
    }

    #[test]
    fn test_descriptor_forms() {
        let (engine, ctx) = setup();
        for text in [
            "EPSG:28992",
            "epsg:28992",
            "urn:ogc:def:crs:EPSG::28992",
            "Amersfoort / RD New",
        ] {
            let crs = engine.create_from_descriptor(&ctx, text).unwrap();
            assert_eq!(crs.name().as_deref(), Some("Amersfoort / RD New"), "{}", text);
        }
        let crs84 = engine.create_from_descriptor(&ctx, "OGC:CRS84").unwrap();
        assert_eq!(crs84.axes().unwrap()[0].direction.as_deref(), Some("east"));
        assert!(engine.create_from_descriptor(&ctx, "no such crs").is_err());
    }

    #[test]
    fn test_proj_string_has_no_identifier() {
        let (engine, ctx) = setup();
        let crs = engine
            .create_from_descriptor(&ctx, "+proj=longlat +ellps=bessel +no_defs")
            .unwrap();
        assert_eq!(crs.name().as_deref(), Some("Amersfoort"));
        assert!(crs.identifiers().is_empty());
        assert_eq!(crs.axes().unwrap()[0].direction.as_deref(), Some("east"));
    }

    #[test]
    fn test_wkt_round_trip() {
        let (engine, ctx) = setup();
        for code in [4326, 28992, 23095] {
            let crs = engine.create_from_epsg(&ctx, code).unwrap();
            let wkt = crs.to_wkt().unwrap();
            let again = engine.create_from_descriptor(&ctx, &wkt).unwrap();
            assert_eq!(again.name(), crs.name(), "{}", wkt);
            assert_eq!(again.identifiers(), crs.identifiers());
        }
    }

    #[test]
    fn test_wkt1_top_level_authority() {
        let (engine, ctx) = setup();
        let wkt = r#"PROJCS["Amersfoort / RD New",GEOGCS["Amersfoort",DATUM["Amersfoort",SPHEROID["Bessel 1841",6377397.155,299.1528128,AUTHORITY["EPSG","7004"]]],AUTHORITY["EPSG","4289"]],UNIT["metre",1],AUTHORITY["EPSG","28992"]]"#;
        let crs = engine.create_from_wkt(&ctx, wkt).unwrap();
        assert_eq!(crs.entry.code, "28992");
        assert!(engine.create_from_wkt(&ctx, "PROJCS[\"broken\"").is_err());
    }

    #[test]
    fn test_projjson_round_trip() {
        let (engine, ctx) = setup();
        let crs = engine.create_from_epsg(&ctx, 3857).unwrap();
        let json = crs.to_projjson().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "ProjectedCRS");
        let again = engine.create_from_descriptor(&ctx, &json).unwrap();
        assert_eq!(again.name(), crs.name());
    }

    #[test]
    fn test_ellipsoidal_distance() {
        let (engine, ctx) = setup();
        let crs = engine
            .create_from_epsg(&ctx, 4326)
            .unwrap()
            .with_axis_normalized(&ctx)
            .unwrap();
        let d = crs
            .geo_distance(&Point::new(5.0, 52.0), &Point::new(6.0, 52.0))
            .unwrap();
        assert!((d - 68_677.475).abs() < 0.01, "{}", d);

        // same arc on Bessel 1841
        let amersfoort = engine
            .create_from_epsg(&ctx, 4289)
            .unwrap()
            .with_axis_normalized(&ctx)
            .unwrap();
        let bessel = amersfoort
            .geo_distance(&Point::new(5.0, 52.0), &Point::new(6.0, 52.0))
            .unwrap();
        assert!((bessel - 68_669.080).abs() < 0.01, "{}", bessel);

        let dz = crs
            .geo_distance_z(
                &Point::new(5.0, 52.0).with_z(0.0),
                &Point::new(5.0, 52.0).with_z(100.0),
            )
            .unwrap();
        assert!((dz - 100.0).abs() < 1e-9);

        assert!(crs
            .geo_distance(&Point::new(5.0, 95.0), &Point::new(6.0, 52.0))
            .unwrap()
            .is_nan());
    }

    #[test]
    fn test_projected_distance_is_unsupported() {
        let (engine, ctx) = setup();
        let crs = engine.create_from_epsg(&ctx, 28992).unwrap();
        let err = crs
            .geo_distance(&Point::new(155_000.0, 463_000.0), &Point::new(156_000.0, 463_000.0))
            .unwrap_err();
        assert!(matches!(err, EngineError::Unsupported { .. }));
    }

    #[test]
    fn test_equivalence() {
        let (engine, ctx) = setup();
        let wgs84 = engine.create_from_epsg(&ctx, 4326).unwrap();
        let crs84 = engine.create_from_descriptor(&ctx, "OGC:CRS84").unwrap();
        let mercator = engine.create_from_epsg(&ctx, 3857).unwrap();

        assert!(wgs84.is_equivalent_to(&wgs84, &ctx, Equivalence::Strict).unwrap());
        assert!(!wgs84.is_equivalent_to(&crs84, &ctx, Equivalence::Strict).unwrap());
        assert!(wgs84
            .is_equivalent_to(&crs84, &ctx, Equivalence::IgnoreAxisOrder)
            .unwrap());
        assert!(!wgs84
            .is_equivalent_to(&mercator, &ctx, Equivalence::IgnoreAxisOrder)
            .unwrap());
    }

    #[test]
    fn test_diagnostics_reach_sink() {
        use std::sync::Mutex;

        let engine = CatalogEngine::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: DiagnosticSink = Arc::new(move |level: LogLevel, msg: &str| {
            sink_seen.lock().unwrap().push((level, msg.to_string()));
        });
        let ctx = engine
            .create_context(&ContextOptions::new(LogLevel::Error, false), Some(sink))
            .unwrap();
        assert!(engine.create_from_epsg(&ctx, 4326).is_ok());
        assert!(engine.create_from_epsg(&ctx, 99999).is_err());

        let seen = seen.lock().unwrap();
        // debug messages are filtered at error level
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, LogLevel::Error);
        assert!(seen[0].1.contains("99999"));
    }
}
