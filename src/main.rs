//! strprop binary: reads config from the environment and serves until a
//! shutdown signal arrives.
//!
//! Configuration:
//! - `STRPROP_ADDR` — bind address, default `0.0.0.0:3000`
//! - `RUST_LOG` — tracing filter, default `info`

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use strprop::{App, Server, Store, StringService};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let addr = std::env::var("STRPROP_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());

    let service = StringService::new(Arc::new(Store::new()));
    let app = App::new(service);

    if let Err(e) = Server::bind(&addr).serve(app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
