//! Turns a classified CRS specification into exactly one engine call.

use crate::cells::CellBlock;
use crate::engine::GeodesyEngine;
use crate::error::{CrsError, CrsResult};
use crate::spec::{self, CrsSpecKind};

/// Classify `block` and resolve it. Classification failures are
/// `MalformedSpec`; engine failures are `ResolutionFailed` carrying the
/// engine message.
pub fn resolve<E: GeodesyEngine>(
    engine: &E,
    ctx: &E::Context,
    block: &CellBlock,
) -> CrsResult<E::Crs> {
    let kind = spec::classify(block)?;
    resolve_kind(engine, ctx, &kind)
}

/// Resolve an already classified specification. No retries.
pub fn resolve_kind<E: GeodesyEngine>(
    engine: &E,
    ctx: &E::Context,
    kind: &CrsSpecKind,
) -> CrsResult<E::Crs> {
    tracing::debug!(engine = engine.name(), kind = kind.label(), spec = %kind, "resolving CRS");

    let result = match kind {
        CrsSpecKind::NumericEpsg(code) | CrsSpecKind::TextualEpsg(code) => {
            engine.create_from_epsg(ctx, *code)
        }
        CrsSpecKind::WellKnownText(wkt) => engine.create_from_wkt(ctx, wkt),
        CrsSpecKind::GenericText(text) => engine.create_from_descriptor(ctx, text),
        CrsSpecKind::AuthorityCode { authority, code } => {
            engine.create_from_authority_code(ctx, authority, *code)
        }
    };

    result.map_err(|err| {
        tracing::debug!(spec = %kind, error = %err, "CRS resolution failed");
        CrsError::resolution(err.to_string())
    })
}
