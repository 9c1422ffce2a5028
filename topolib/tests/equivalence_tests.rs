#![cfg(feature = "catalog-engine")]

mod support;

use support::{catalog_facade, epsg};
use topolib::cells::{CellBlock, CellOutput};
use topolib::error::ErrorKind;

fn strict(a: &CellBlock, b: &CellBlock) -> bool {
    catalog_facade().is_equivalent(a, b, false).unwrap() == CellOutput::Bool(true)
}

fn relaxed(a: &CellBlock, b: &CellBlock) -> bool {
    catalog_facade().is_equivalent(a, b, true).unwrap() == CellOutput::Bool(true)
}

#[test]
fn test_same_crs_in_different_notations() {
    assert!(strict(&epsg(4326), &CellBlock::scalar("EPSG:4326")));
    assert!(strict(&epsg(28992), &CellBlock::row(["EPSG", "28992"])));
}

#[test]
fn test_axis_order_only_matters_when_strict() {
    let crs84 = CellBlock::scalar("OGC:CRS84");
    assert!(!strict(&epsg(4326), &crs84));
    assert!(relaxed(&epsg(4326), &crs84));
}

#[test]
fn test_comparison_uses_declared_axis_order() {
    // normalized, both would be lon/lat; as declared they differ
    let from_proj = CellBlock::scalar("+proj=longlat +datum=WGS84 +no_defs +type=crs");
    assert!(!strict(&epsg(4326), &from_proj));
    assert!(relaxed(&epsg(4326), &from_proj));
}

#[test]
fn test_different_datums_are_never_equivalent() {
    assert!(!relaxed(&epsg(4326), &epsg(4258)));
    assert!(!relaxed(&epsg(4326), &epsg(3857)));
    assert!(!relaxed(&epsg(28992), &epsg(23095)));
}

#[test]
fn test_errors_in_either_argument() {
    let facade = catalog_facade();
    let err = facade
        .is_equivalent(&epsg(4326), &CellBlock::scalar(true), false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSpec);
    let err = facade.is_equivalent(&epsg(99999), &epsg(4326), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailed);
}
