#![cfg(feature = "catalog-engine")]

mod support;

use support::{catalog_facade, epsg, number, text};
use topolib::cells::{CellBlock, CellError, CellOutput, INDEX_OUT_OF_RANGE, NOT_FOUND};
use topolib::error::ErrorKind;
use topolib::CrsProperty as P;

#[test]
fn test_basic_text_properties() {
    let facade = catalog_facade();
    let rd = epsg(28992);
    assert_eq!(text(&facade.read(P::Name, &rd, 0).unwrap()), "Amersfoort / RD New");
    assert_eq!(text(&facade.read(P::Type, &rd, 0).unwrap()), "ProjectedCrs");
    assert_eq!(text(&facade.read(P::DatumName, &rd, 0).unwrap()), "Amersfoort");
    assert_eq!(
        text(&facade.read(P::DatumType, &rd, 0).unwrap()),
        "GeodeticReferenceFrame"
    );
    assert_eq!(text(&facade.read(P::EllipsoidName, &rd, 0).unwrap()), "Bessel 1841");
    assert_eq!(text(&facade.read(P::EllipsoidType, &rd, 0).unwrap()), "Ellipsoid");
    assert_eq!(text(&facade.read(P::GeodeticCrsName, &rd, 0).unwrap()), "Amersfoort");
    assert_eq!(
        text(&facade.read(P::GeodeticCrsType, &rd, 0).unwrap()),
        "Geographic2DCrs"
    );
    assert_eq!(text(&facade.read(P::CelestialBodyName, &rd, 0).unwrap()), "Earth");
    assert_eq!(text(&facade.read(P::PrimeMeridianName, &rd, 0).unwrap()), "Greenwich");
    assert_eq!(text(&facade.read(P::PrimeMeridianUnitName, &rd, 0).unwrap()), "degree");
    assert_eq!(
        text(&facade.read(P::CsType, &rd, 0).unwrap()),
        "CoordinateSystem"
    );
    assert_eq!(
        text(&facade.read(P::CsCoordinateSystemType, &rd, 0).unwrap()),
        "Cartesian"
    );
}

#[test]
fn test_axes_are_read_normalized() {
    let facade = catalog_facade();
    let wgs84 = epsg(4326);
    assert_eq!(
        text(&facade.read(P::AxisName, &wgs84, 0).unwrap()),
        "Geodetic longitude"
    );
    assert_eq!(text(&facade.read(P::AxisAbbreviation, &wgs84, 1).unwrap()), "Lat");
    assert_eq!(text(&facade.read(P::AxisDirection, &wgs84, 1).unwrap()), "north");
    assert_eq!(text(&facade.read(P::AxisUnitName, &wgs84, 0).unwrap()), "degree");
    assert_eq!(text(&facade.read(P::AxisUnitAuthName, &wgs84, 0).unwrap()), "EPSG");
    assert_eq!(text(&facade.read(P::AxisUnitCode, &wgs84, 0).unwrap()), "9122");
    let factor = number(&facade.read(P::AxisUnitConversionFactor, &wgs84, 0).unwrap());
    assert!((factor - 1.0_f64.to_radians()).abs() < 1e-15);

    assert_eq!(
        text(&facade.read(P::CsAxisName, &wgs84, 0).unwrap()),
        "Geodetic longitude"
    );
}

#[test]
fn test_axis_counts_use_declared_form() {
    let facade = catalog_facade();
    assert_eq!(number(&facade.read(P::AxisCount, &epsg(4979), 0).unwrap()), 3.0);
    assert_eq!(number(&facade.read(P::CsAxisCount, &epsg(28992), 0).unwrap()), 2.0);
}

#[test]
fn test_index_out_of_range() {
    let facade = catalog_facade();
    let wgs84 = epsg(4326);
    for index in [2, 10, -1, i64::MIN] {
        assert_eq!(
            text(&facade.read(P::AxisName, &wgs84, index).unwrap()),
            INDEX_OUT_OF_RANGE,
            "index {}",
            index
        );
        assert_eq!(
            text(&facade.read(P::CsAxisUnitName, &wgs84, index).unwrap()),
            INDEX_OUT_OF_RANGE
        );
    }
    assert_eq!(
        text(&facade.read(P::IdentifierCode, &wgs84, 1).unwrap()),
        INDEX_OUT_OF_RANGE
    );
}

#[test]
fn test_identifiers() {
    let facade = catalog_facade();
    let wgs84 = epsg(4326);
    assert_eq!(number(&facade.read(P::IdentifiersCount, &wgs84, 0).unwrap()), 1.0);
    assert_eq!(text(&facade.read(P::IdentifierAuthority, &wgs84, 0).unwrap()), "EPSG");
    assert_eq!(text(&facade.read(P::IdentifierCode, &wgs84, 0).unwrap()), "4326");

    // A PROJ string carries no identifier at all.
    let bare = CellBlock::scalar("+proj=longlat +datum=WGS84 +no_defs +type=crs");
    assert_eq!(number(&facade.read(P::IdentifiersCount, &bare, 0).unwrap()), 0.0);
    assert_eq!(
        text(&facade.read(P::IdentifierAuthority, &bare, 0).unwrap()),
        INDEX_OUT_OF_RANGE
    );
}

#[test]
fn test_ellipsoid_numbers() {
    let facade = catalog_facade();
    let wgs84 = epsg(4326);
    let a = number(&facade.read(P::EllipsoidSemiMajorMetre, &wgs84, 0).unwrap());
    let b = number(&facade.read(P::EllipsoidSemiMinorMetre, &wgs84, 0).unwrap());
    let inv_f = number(&facade.read(P::EllipsoidInverseFlattening, &wgs84, 0).unwrap());
    assert_eq!(a, 6_378_137.0);
    assert!((b - 6_356_752.314_245).abs() < 1e-3, "{}", b);
    assert_eq!(inv_f, 298.257_223_563);
    assert_eq!(
        facade.read(P::EllipsoidIsSemiMinorComputed, &wgs84, 0).unwrap(),
        CellOutput::Bool(true)
    );
    assert_eq!(
        facade.read(P::EllipsoidIsSemiMinorComputed, &epsg(4267), 0).unwrap(),
        CellOutput::Bool(false)
    );
    assert_eq!(number(&facade.read(P::PrimeMeridianLongitude, &wgs84, 0).unwrap()), 0.0);
}

#[test]
fn test_deprecation_flag() {
    let facade = catalog_facade();
    assert_eq!(facade.read(P::IsDeprecated, &epsg(2037), 0).unwrap(), CellOutput::Bool(true));
    assert_eq!(facade.read(P::IsDeprecated, &epsg(25833), 0).unwrap(), CellOutput::Bool(false));
}

#[test]
fn test_usage_area() {
    let facade = catalog_facade();
    let rd = epsg(28992);
    assert_eq!(number(&facade.read(P::UsageAreaWestLongitude, &rd, 0).unwrap()), 3.2);
    assert_eq!(number(&facade.read(P::UsageAreaNorthLatitude, &rd, 0).unwrap()), 53.7);
    assert_eq!(number(&facade.read(P::UsageAreaMinX, &rd, 0).unwrap()), 12_628.0);
    assert_eq!(number(&facade.read(P::UsageAreaMaxY, &rd, 0).unwrap()), 611_063.0);
    assert_eq!(number(&facade.read(P::UsageAreaCenterX, &rd, 0).unwrap()), 148_125.5);
    assert_eq!(number(&facade.read(P::UsageAreaCenterY, &rd, 0).unwrap()), 459_621.0);
    assert_eq!(
        facade.read(P::UsageAreaCenterHasValues, &rd, 0).unwrap(),
        CellOutput::Bool(true)
    );
    assert!(text(&facade.read(P::UsageAreaName, &rd, 0).unwrap()).starts_with("Netherlands"));
    assert_eq!(
        facade.read(P::UsageAreaCenter, &rd, 0).unwrap(),
        CellOutput::Array(vec![vec![
            CellOutput::Number(148_125.5),
            CellOutput::Number(459_621.0)
        ]])
    );
}

#[test]
fn test_geographic_usage_area_is_normalized() {
    let facade = catalog_facade();
    let amersfoort = epsg(4289);
    // east/north order: X is longitude
    assert_eq!(number(&facade.read(P::UsageAreaMinX, &amersfoort, 0).unwrap()), 3.2);
    assert_eq!(number(&facade.read(P::UsageAreaMinY, &amersfoort, 0).unwrap()), 50.75);
}

#[test]
fn test_exports() {
    let facade = catalog_facade();
    let rd = epsg(28992);
    let proj = facade.read(P::AsProjString, &rd, 0).unwrap();
    assert!(text(&proj).starts_with("+proj=sterea"));

    let wkt = facade.read(P::AsWktString, &rd, 0).unwrap();
    assert!(text(&wkt).starts_with("PROJCRS[\"Amersfoort / RD New\""));

    let json = facade.read(P::AsJsonString, &rd, 0).unwrap();
    let value: serde_json::Value = serde_json::from_str(text(&json)).unwrap();
    assert_eq!(value["id"]["code"], 28992);
}

#[test]
fn test_blank_strings_become_not_found() {
    assert_eq!(
        CellOutput::text_or_not_found(Some(String::new())),
        CellOutput::Text(NOT_FOUND.to_string())
    );
}

#[test]
fn test_hard_errors_propagate() {
    let facade = catalog_facade();
    let err = facade.read(P::Name, &CellBlock::scalar(true), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSpec);
    let err = facade.read(P::Name, &epsg(1), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailed);
}

#[test]
fn test_every_property_answers_for_common_crs() {
    let facade = catalog_facade();
    for code in [4326, 4979, 3857, 28992, 23095, 2037] {
        for property in P::ALL {
            let out = facade
                .read(property, &epsg(code), 0)
                .unwrap_or_else(|e| panic!("{} on {}: {}", property.function_name(), code, e));
            assert_ne!(
                out,
                CellOutput::Error(CellError::Value),
                "{} on {}",
                property.function_name(),
                code
            );
        }
    }
}

#[test]
fn test_numeric_and_textual_specs_read_alike() {
    let facade = catalog_facade();
    let numeric = CellBlock::scalar(4326.0);
    let textual = CellBlock::scalar("4326");
    for property in [P::Name, P::Type, P::AxisCount, P::CsAxisCount] {
        assert_eq!(
            facade.read(property, &numeric, 0).unwrap(),
            facade.read(property, &textual, 0).unwrap(),
            "{:?}",
            property
        );
    }
    assert_eq!(number(&facade.read(P::AxisCount, &textual, 0).unwrap()), 2.0);
}

#[test]
fn test_independent_resolutions_report_the_same_metadata() {
    let facade = catalog_facade();
    let properties = [
        P::Name,
        P::DatumName,
        P::EllipsoidName,
        P::UsageAreaWestLongitude,
        P::UsageAreaEastLongitude,
        P::UsageAreaSouthLatitude,
        P::UsageAreaNorthLatitude,
    ];
    for spec in [epsg(28992), CellBlock::scalar("EPSG:4258")] {
        // every read builds and drops its own context
        let first: Vec<CellOutput> = properties
            .iter()
            .map(|p| facade.read(*p, &spec, 0).unwrap())
            .collect();
        let second: Vec<CellOutput> = properties
            .iter()
            .map(|p| facade.read(*p, &spec, 0).unwrap())
            .collect();
        assert_eq!(first, second, "{:?}", spec);
        assert!(first.iter().all(|out| !matches!(out, CellOutput::Error(_))));
    }
}
