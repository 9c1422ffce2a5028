//! Runs against the system PROJ database; built with `--features proj-engine`.
#![cfg(feature = "proj-engine")]

mod support;

use support::{epsg, number, point, text};
use topolib::cells::{CellBlock, CellError, CellOutput, INDEX_OUT_OF_RANGE};
use topolib::engine::ProjEngine;
use topolib::error::ErrorKind;
use topolib::{ContextOptions, CrsProperty as P, Facade, LogLevel};

fn facade() -> Facade<ProjEngine> {
    Facade::new(ProjEngine::new().unwrap(), ContextOptions::default())
}

#[test]
fn test_metadata_from_database() {
    let facade = facade();
    let rd = epsg(28992);
    assert_eq!(text(&facade.read(P::Name, &rd, 0).unwrap()), "Amersfoort / RD New");
    assert_eq!(text(&facade.read(P::DatumName, &rd, 0).unwrap()), "Amersfoort");
    assert_eq!(text(&facade.read(P::EllipsoidName, &rd, 0).unwrap()), "Bessel 1841");
    assert_eq!(text(&facade.read(P::IdentifierCode, &rd, 0).unwrap()), "28992");
    assert_eq!(
        text(&facade.read(P::IdentifierCode, &rd, 5).unwrap()),
        INDEX_OUT_OF_RANGE
    );
    assert_eq!(number(&facade.read(P::AxisCount, &rd, 0).unwrap()), 2.0);
}

#[test]
fn test_normalized_axes() {
    let facade = facade();
    let direction = facade.read(P::AxisDirection, &epsg(4326), 0).unwrap();
    assert_eq!(text(&direction), "east");
}

#[test]
fn test_geodesic_distance() {
    let facade = facade();
    let out = facade
        .geo_distance(&epsg(4326), &point(&[5.0, 52.0]), &point(&[6.0, 52.0]), false)
        .unwrap();
    let metres = number(&out);
    assert!((metres - 68_677.475).abs() < 0.5, "{}", metres);
}

#[test]
fn test_invalid_coordinates_are_not_applicable() {
    let facade = facade();
    let out = facade
        .geo_distance(&epsg(4326), &point(&[5.0, 95.0]), &point(&[6.0, 52.0]), false)
        .unwrap();
    assert_eq!(out, CellOutput::Error(CellError::NotApplicable));
}

#[test]
fn test_equivalence() {
    let facade = facade();
    let crs84 = CellBlock::scalar("OGC:CRS84");
    assert_eq!(
        facade.is_equivalent(&epsg(4326), &crs84, false).unwrap(),
        CellOutput::Bool(false)
    );
    assert_eq!(
        facade.is_equivalent(&epsg(4326), &crs84, true).unwrap(),
        CellOutput::Bool(true)
    );
}

#[test]
fn test_unknown_code_fails_resolution() {
    let facade = facade();
    let err = facade.read(P::Name, &epsg(99999), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailed);
}

#[test]
fn test_logging_context_still_resolves() {
    let facade = Facade::new(
        ProjEngine::new().unwrap(),
        ContextOptions::new(LogLevel::Trace, false),
    );
    assert_eq!(text(&facade.read(P::Name, &epsg(4326), 0).unwrap()), "WGS 84");
}
