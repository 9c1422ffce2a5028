//! TopoLib HTTP Server Binary
//!
//! Serves the `TL.crs.*` and `TL.cfg.*` functions as a JSON API.
//!
//! # Usage
//!
//! ```bash
//! # Built-in catalogue engine (default)
//! cargo run --bin topolib-server
//!
//! # PROJ engine (needs libproj)
//! cargo run --bin topolib-server --features proj-engine
//!
//! curl -X POST localhost:8080/v1/functions/TL.crs.Name -d '{"args": [28992]}' \
//!   -H 'content-type: application/json'
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log filter (default: info)
//! - `TOPOLIB_CONFIG`: Settings file (default: `<data dir>/TopoLib/TopoLib.toml`)
//! - `TOPOLIB_LOG_LEVEL`, `TOPOLIB_ALLOW_NETWORK`: context overrides

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use topolib::engine::GeodesyEngine;
use topolib::functions::Functions;
use topolib::http::{create_router, AppState};
use topolib::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    info!("Starting TopoLib HTTP Server");

    let functions = Functions::from_environment().map_err(|e| anyhow::anyhow!(e))?;
    info!(
        engine = functions.facade().engine().name(),
        config = %functions.store().path().display(),
        "Function registry initialized"
    );

    let state = AppState::new(Arc::new(functions));
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
