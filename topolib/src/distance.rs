//! Geodesic distance between two points in a CRS.

use crate::cells::{CellBlock, CellOutput};
use crate::engine::{EngineCrs, GeodesyEngine};
use crate::error::CrsResult;
use crate::point::Point;
use crate::query::{AxisOrder, Facade};

impl<E: GeodesyEngine> Facade<E> {
    /// Distance in metres between `p1` and `p2`, given in the normalized
    /// (east, north) axis order of `spec`.
    ///
    /// Both points are parsed before any context is created. When
    /// `with_elevation` is set the height difference is included, points
    /// without a z ordinate count as height 0. A NaN result is reported as
    /// `#N/A`.
    pub fn geo_distance(
        &self,
        spec: &CellBlock,
        p1: &CellBlock,
        p2: &CellBlock,
        with_elevation: bool,
    ) -> CrsResult<CellOutput> {
        let a = Point::from_block(p1)?;
        let b = Point::from_block(p2)?;

        self.with_crs(spec, AxisOrder::Normalized, |crs| {
            let metres = if with_elevation {
                crs.geo_distance_z(&a, &b)?
            } else {
                crs.geo_distance(&a, &b)?
            };
            tracing::trace!(metres, with_elevation, "geodesic distance");
            Ok(CellOutput::number(metres))
        })
    }
}
