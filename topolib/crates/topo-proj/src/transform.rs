//! Coordinate transformation and geodesic distance

use crate::context::Context;
use crate::error::{Error, Result};
use crate::object::Object;
use proj_sys as ffi;

/// Number of intermediate points used when transforming bounding boxes
const DENSIFY_POINTS: i32 = 21;

/// Transformation from a CRS to its own geodetic CRS, in longitude/latitude order
///
/// This is the PROJ counterpart of a "distance transform": input points are
/// expressed in the (normalized) source CRS, distances are measured on the
/// ellipsoid of the geodetic CRS.
///
/// # Example
///
/// ```rust,ignore
/// let ctx = topo_proj::Context::new()?;
/// let crs = ctx.create_from_database("EPSG", "28992")?.normalized_for_visualization()?;
/// let transform = topo_proj::DistanceTransform::new(&crs)?;
/// let metres = transform.geo_distance([155000.0, 463000.0, 0.0, 0.0], [156000.0, 463000.0, 0.0, 0.0])?;
/// ```
pub struct DistanceTransform {
    operation: Object,
    geodesic: Object,
}

impl DistanceTransform {
    /// Build the transform for `crs`
    pub fn new(crs: &Object) -> Result<Self> {
        let ctx: &Context = crs.context();
        let geodetic = crs
            .geodetic_crs()
            .ok_or_else(|| Error::NotAvailable("CRS has no geodetic CRS".into()))?
            .normalized_for_visualization()?;
        let operation = ctx.create_crs_to_crs(crs, &geodetic)?;

        let ellipsoid = geodetic
            .ellipsoid()
            .ok_or_else(|| Error::NotAvailable("geodetic CRS has no ellipsoid".into()))?
            .ellipsoid_parameters()?;
        let definition = format!(
            "+proj=longlat +a={} +b={} +no_defs +type=crs",
            ellipsoid.semi_major_metre, ellipsoid.semi_minor_metre
        );
        let geodesic = ctx.create(&definition)?;

        Ok(Self {
            operation,
            geodesic,
        })
    }

    /// Transform a point to geographic longitude/latitude in degrees (height kept)
    pub fn to_geographic(&self, point: [f64; 4]) -> Result<[f64; 4]> {
        trans(&self.operation, ffi::PJ_DIRECTION_PJ_FWD, point)
    }

    /// Geodesic distance in metres between two points, ignoring height
    pub fn geo_distance(&self, a: [f64; 4], b: [f64; 4]) -> Result<f64> {
        let (a, b) = (self.to_radians(a)?, self.to_radians(b)?);
        Ok(unsafe { ffi::proj_lp_dist(self.geodesic.as_ptr(), a, b) })
    }

    /// Geodesic distance in metres between two points, including the height difference
    pub fn geo_distance_z(&self, a: [f64; 4], b: [f64; 4]) -> Result<f64> {
        let (a, b) = (self.to_radians(a)?, self.to_radians(b)?);
        Ok(unsafe { ffi::proj_lpz_dist(self.geodesic.as_ptr(), a, b) })
    }

    fn to_radians(&self, point: [f64; 4]) -> Result<ffi::PJ_COORD> {
        let geo = self.to_geographic(point)?;
        let lon = unsafe { ffi::proj_torad(geo[0]) };
        let lat = unsafe { ffi::proj_torad(geo[1]) };
        Ok(ffi::PJ_COORD {
            v: [lon, lat, geo[2], geo[3]],
        })
    }
}

/// Transform a geographic bounding box (degrees, lon/lat order) into `crs` coordinates
///
/// Returns `[min_x, min_y, max_x, max_y]`.
pub fn transform_bounds(crs: &Object, west: f64, south: f64, east: f64, north: f64) -> Result<[f64; 4]> {
    let ctx = crs.context();
    let geodetic = crs
        .geodetic_crs()
        .ok_or_else(|| Error::NotAvailable("CRS has no geodetic CRS".into()))?
        .normalized_for_visualization()?;
    let operation = ctx.create_crs_to_crs(&geodetic, crs)?;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0.0, 0.0, 0.0, 0.0);
    let ok = unsafe {
        ffi::proj_trans_bounds(
            ctx.as_ptr(),
            operation.as_ptr(),
            ffi::PJ_DIRECTION_PJ_FWD,
            west,
            south,
            east,
            north,
            &mut min_x,
            &mut min_y,
            &mut max_x,
            &mut max_y,
            DENSIFY_POINTS,
        )
    };
    if ok == 0 {
        return Err(ctx.last_error("proj_trans_bounds"));
    }
    Ok([min_x, min_y, max_x, max_y])
}

fn trans(operation: &Object, direction: ffi::PJ_DIRECTION, point: [f64; 4]) -> Result<[f64; 4]> {
    let input = ffi::PJ_COORD { v: point };
    let output = unsafe { ffi::proj_trans(operation.as_ptr(), direction, input) };
    let values = unsafe { output.v };
    if values[0].is_infinite() || values[1].is_infinite() {
        let code = unsafe { ffi::proj_errno(operation.as_ptr()) };
        return Err(Error::Proj {
            code,
            message: "coordinate could not be transformed".into(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_distance_one_degree_of_longitude() {
        let ctx = Context::new().unwrap();
        let crs = ctx
            .create_from_database("EPSG", "4326")
            .unwrap()
            .normalized_for_visualization()
            .unwrap();
        let transform = DistanceTransform::new(&crs).unwrap();
        let d = transform
            .geo_distance([5.0, 52.0, 0.0, f64::INFINITY], [6.0, 52.0, 0.0, f64::INFINITY])
            .unwrap();
        assert!((68_400.0..68_800.0).contains(&d), "{}", d);
    }

    #[test]
    fn test_transform_bounds_projected() {
        let ctx = Context::new().unwrap();
        let crs = ctx
            .create_from_database("EPSG", "28992")
            .unwrap()
            .normalized_for_visualization()
            .unwrap();
        let [min_x, min_y, max_x, max_y] = transform_bounds(&crs, 3.2, 50.75, 7.22, 53.7).unwrap();
        assert!(min_x < max_x && min_y < max_y);
        assert!((0.0..50_000.0).contains(&min_x), "{}", min_x);
    }
}
