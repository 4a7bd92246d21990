// Файл: crates/broker/src/main.rs
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use broker::config::BrokerConfig;
use broker::facet::FacetCoordinator;
use broker::http_api::{router, AppState};
use broker::store::FsPartitionStore;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = BrokerConfig::from_env();
    let store = Arc::new(FsPartitionStore::new(cfg.partitions_root.clone()));
    let coord = Arc::new(FacetCoordinator::from_config(&cfg, store));

    let addr: SocketAddr = cfg.addr.parse()?;
    let app = router(AppState {
        coord,
        cfg: cfg.clone(),
    });

    tracing::info!(
        address = %addr,
        parallelism = cfg.parallelism,
        max_per_shard = cfg.max_per_shard,
        "broker listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
