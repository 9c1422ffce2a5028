#![cfg(feature = "catalog-engine")]

mod support;

use topolib::cells::{CellBlock, CellValue};
use topolib::engine::{CatalogEngine, EngineCrs, GeodesyEngine};
use topolib::error::ErrorKind;
use topolib::resolver;
use topolib::spec::{classify, CrsSpecKind};
use topolib::ContextOptions;

const RD_NEW_WKT: &str = r#"PROJCS["Amersfoort / RD New",GEOGCS["Amersfoort",DATUM["Amersfoort",SPHEROID["Bessel 1841",6377397.155,299.1528128]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4289"]],PROJECTION["Oblique_Stereographic"],UNIT["metre",1],AUTHORITY["EPSG","28992"]]"#;

fn resolve_name(block: &CellBlock) -> topolib::CrsResult<Option<String>> {
    let engine = CatalogEngine::new()?;
    let ctx = engine.create_context(&ContextOptions::default(), None)?;
    let crs = resolver::resolve(&engine, &ctx, block)?;
    Ok(crs.name())
}

#[test]
fn test_every_accepted_shape_resolves_to_the_same_crs() {
    let shapes = vec![
        CellBlock::scalar(28992.0),
        CellBlock::scalar(28992.7),
        CellBlock::scalar("28992"),
        CellBlock::scalar(" 28992 "),
        CellBlock::scalar("EPSG:28992"),
        CellBlock::scalar("Amersfoort / RD New"),
        CellBlock::scalar(RD_NEW_WKT),
        CellBlock::row(["EPSG", "28992"]),
        CellBlock::row([CellValue::from("EPSG"), CellValue::from(28992.0)]),
    ];
    for block in shapes {
        let name = resolve_name(&block).unwrap_or_else(|e| panic!("{:?}: {}", block, e));
        assert_eq!(name.as_deref(), Some("Amersfoort / RD New"), "{:?}", block);
    }
}

#[test]
fn test_classification_kinds() {
    assert_eq!(
        classify(&CellBlock::scalar(4326.0)).unwrap(),
        CrsSpecKind::NumericEpsg(4326)
    );
    assert_eq!(
        classify(&CellBlock::scalar("4326")).unwrap(),
        CrsSpecKind::TextualEpsg(4326)
    );
    assert!(matches!(
        classify(&CellBlock::scalar(RD_NEW_WKT)).unwrap(),
        CrsSpecKind::WellKnownText(_)
    ));
    assert!(matches!(
        classify(&CellBlock::scalar("+proj=longlat +datum=WGS84")).unwrap(),
        CrsSpecKind::GenericText(_)
    ));
    assert_eq!(
        classify(&CellBlock::row(["EPSG", "4326"])).unwrap(),
        CrsSpecKind::AuthorityCode {
            authority: "EPSG".to_string(),
            code: 4326
        }
    );
    assert_eq!(
        classify(&CellBlock::row([CellValue::from("EPSG"), CellValue::from(4326.9)])).unwrap(),
        CrsSpecKind::AuthorityCode {
            authority: "EPSG".to_string(),
            code: 4326
        }
    );
}

#[test]
fn test_classification_log_labels() {
    let kinds = [
        (CellBlock::scalar(4326.0), "numeric-epsg"),
        (CellBlock::scalar("4326"), "textual-epsg"),
        (CellBlock::scalar(RD_NEW_WKT), "wkt"),
        (CellBlock::scalar("+proj=longlat +datum=WGS84"), "text"),
        (CellBlock::row(["EPSG", "4326"]), "authority-code"),
    ];
    for (block, label) in kinds {
        assert_eq!(classify(&block).unwrap().label(), label, "{:?}", block);
    }
}

#[test]
fn test_numeric_and_textual_codes_agree() {
    let engine = CatalogEngine::new().unwrap();
    let ctx = engine.create_context(&ContextOptions::default(), None).unwrap();
    for code in [4326, 28992, 4979] {
        let numeric = resolver::resolve(&engine, &ctx, &CellBlock::scalar(f64::from(code))).unwrap();
        let textual = resolver::resolve(&engine, &ctx, &CellBlock::scalar(code.to_string())).unwrap();
        assert_eq!(numeric.name(), textual.name(), "{}", code);
        assert_eq!(numeric.crs_type(), textual.crs_type(), "{}", code);
        assert_eq!(
            numeric.axes().unwrap().len(),
            textual.axes().unwrap().len(),
            "{}",
            code
        );
    }
}

#[test]
fn test_malformed_shapes() {
    let malformed = vec![
        CellBlock::scalar(true),
        CellBlock::missing(),
        CellBlock::row([1.0, 2.0, 3.0]),
        CellBlock::row([CellValue::from(4326.0), CellValue::from("EPSG")]),
        CellBlock::row(["EPSG", "43x26"]),
        CellBlock::from_rows(vec![
            vec![CellValue::from(4326.0)],
            vec![CellValue::from(4326.0)],
        ])
        .unwrap(),
    ];
    for block in malformed {
        let err = resolve_name(&block).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSpec, "{:?}: {}", block, err);
    }
}

#[test]
fn test_unknown_crs_is_resolution_failure() {
    for block in [
        CellBlock::scalar(99999.0),
        CellBlock::scalar("no such CRS"),
        CellBlock::row(["ESRI", "99999"]),
        CellBlock::scalar("PROJCS[\"broken\""),
    ] {
        let err = resolve_name(&block).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailed, "{:?}", block);
    }
}

#[test]
fn test_resolution_error_carries_engine_message() {
    let err = resolve_name(&CellBlock::scalar(99999.0)).unwrap_err();
    assert!(err.to_string().contains("99999"), "{}", err);
}
