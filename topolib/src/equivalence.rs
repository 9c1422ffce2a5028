//! CRS equivalence tests.

use crate::cells::{CellBlock, CellOutput};
use crate::engine::{EngineCrs, Equivalence, GeodesyEngine};
use crate::error::CrsResult;
use crate::resolver;
use crate::query::Facade;

impl<E: GeodesyEngine> Facade<E> {
    /// Whether two specifications denote the same CRS.
    ///
    /// Both CRSs are resolved in one context and compared as declared,
    /// without axis normalization. `relaxed` allows geographic CRSs to
    /// differ in axis order.
    pub fn is_equivalent(
        &self,
        spec1: &CellBlock,
        spec2: &CellBlock,
        relaxed: bool,
    ) -> CrsResult<CellOutput> {
        let criterion = if relaxed {
            Equivalence::IgnoreAxisOrder
        } else {
            Equivalence::Strict
        };

        self.with_crs_and_context(spec1, |ctx, first| {
            let second = resolver::resolve(self.engine(), ctx, spec2)?;
            let same = first.is_equivalent_to(&second, ctx, criterion)?;
            Ok(CellOutput::Bool(same))
        })
    }
}
