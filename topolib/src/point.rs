//! Points read from host cell ranges.

use crate::cells::{CellBlock, CellValue};
use crate::error::{CrsError, CrsResult};

/// A coordinate tuple of 2 to 4 ordinates (x, y, optional z, optional t).
///
/// Ordinates are interpreted in the axis order of whatever CRS they are used
/// with; the distance operator always uses the normalized (east, north) form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub t: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            t: None,
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_t(mut self, t: f64) -> Self {
        self.t = Some(t);
        self
    }

    /// Read a point from a single row of 2 to 4 numeric cells. Absent cells
    /// read as 0, the way the host coerces them into a numeric range.
    ///
    /// Each point is validated on its own; the arity of one point never
    /// constrains another.
    pub fn from_block(block: &CellBlock) -> CrsResult<Self> {
        if block.rows() != 1 {
            return Err(CrsError::InvalidPoint(format!(
                "expected a single row, got {} rows",
                block.rows()
            )));
        }
        let cells = block.first_row();
        if !(2..=4).contains(&cells.len()) {
            return Err(CrsError::InvalidPoint(format!(
                "expected 2 to 4 ordinates, got {}",
                cells.len()
            )));
        }

        let mut values = [0.0; 4];
        for (i, cell) in cells.iter().enumerate() {
            values[i] = match cell {
                CellValue::Number(n) => *n,
                CellValue::Empty | CellValue::Missing => 0.0,
                other => {
                    return Err(CrsError::InvalidPoint(format!(
                        "ordinate {} is not numeric: {:?}",
                        i + 1,
                        other
                    )))
                }
            };
        }

        let mut point = Point::new(values[0], values[1]);
        if cells.len() > 2 {
            point.z = Some(values[2]);
        }
        if cells.len() > 3 {
            point.t = Some(values[3]);
        }
        Ok(point)
    }

    /// Number of ordinates carried.
    pub fn dimension(&self) -> usize {
        2 + usize::from(self.z.is_some()) + usize::from(self.t.is_some())
    }

    /// Four-ordinate form; a missing z is 0 and a missing t is infinite
    /// (meaning "no epoch").
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.x,
            self.y,
            self.z.unwrap_or(0.0),
            self.t.unwrap_or(f64::INFINITY),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_to_four_ordinates() {
        let p = Point::from_block(&CellBlock::row([5.0, 52.0])).unwrap();
        assert_eq!(p.dimension(), 2);
        assert_eq!(p.to_array()[2], 0.0);

        let p = Point::from_block(&CellBlock::row([5.0, 52.0, 10.0])).unwrap();
        assert_eq!(p.z, Some(10.0));

        let p = Point::from_block(&CellBlock::row([5.0, 52.0, 10.0, 2020.5])).unwrap();
        assert_eq!(p.dimension(), 4);
        assert_eq!(p.to_array(), [5.0, 52.0, 10.0, 2020.5]);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(Point::from_block(&CellBlock::row([5.0])).is_err());
        assert!(Point::from_block(&CellBlock::row([1.0, 2.0, 3.0, 4.0, 5.0])).is_err());
        let two_rows = CellBlock::from_rows(vec![
            vec![CellValue::Number(1.0), CellValue::Number(2.0)],
            vec![CellValue::Number(3.0), CellValue::Number(4.0)],
        ])
        .unwrap();
        assert!(Point::from_block(&two_rows).is_err());
    }

    #[test]
    fn test_blank_ordinates_read_as_zero() {
        let block = CellBlock::row([CellValue::Number(5.0), CellValue::Number(52.0), CellValue::Empty]);
        let p = Point::from_block(&block).unwrap();
        assert_eq!(p.z, Some(0.0));

        let block = CellBlock::row([CellValue::Empty, CellValue::Number(52.0)]);
        assert_eq!(Point::from_block(&block).unwrap(), Point::new(0.0, 52.0));

        let block = CellBlock::row([CellValue::Number(5.0), CellValue::Missing]);
        assert_eq!(Point::from_block(&block).unwrap(), Point::new(5.0, 0.0));

        // an omitted argument is a single cell, not a point
        assert!(Point::from_block(&CellBlock::missing()).is_err());
    }

    #[test]
    fn test_rejects_non_numeric() {
        let block = CellBlock::row([CellValue::Number(1.0), CellValue::Text("x".into())]);
        assert!(matches!(
            Point::from_block(&block),
            Err(CrsError::InvalidPoint(_))
        ));
    }
}
