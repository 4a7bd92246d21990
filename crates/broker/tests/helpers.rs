// path: crates/broker/tests/helpers.rs
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use broker::config::BrokerConfig;
use broker::facet::FacetCoordinator;
use broker::http_api::{router, AppState};
use broker::store::{FsPartitionStore, PartitionStore};
use http_body_util::BodyExt;
use serde_json::Value;
use termlist_core::partition::json::JsonPartitionWriter;
use tower::ServiceExt;

pub fn make_router_with_store(cfg: BrokerConfig, store: Arc<dyn PartitionStore>) -> Router {
    let coord = Arc::new(FacetCoordinator::from_config(&cfg, store));
    router(AppState { coord, cfg })
}

pub fn make_router_with_config(cfg: BrokerConfig) -> Router {
    let store = Arc::new(FsPartitionStore::new(cfg.partitions_root.clone()));
    make_router_with_store(cfg, store)
}

pub fn make_router_with_parallelism(parallelism: usize) -> Router {
    let cfg = BrokerConfig {
        parallelism,
        ..BrokerConfig::default()
    };
    make_router_with_config(cfg)
}

/// Собирает одну партицию из jsonl-строк в `root/name`.
pub fn write_partition(root: &Path, name: &str, docs: &[&str]) -> PathBuf {
    let input = root.join(format!("{name}.jsonl"));
    {
        let mut f = File::create(&input).unwrap();
        for d in docs {
            writeln!(f, "{d}").unwrap();
        }
    }
    let out = root.join(name);
    JsonPartitionWriter::default()
        .write_partitions(input.to_str().unwrap(), out.to_str().unwrap())
        .expect("write partition");
    out
}

pub async fn post_facet(app: Router, body: &Value) -> (StatusCode, Value) {
    let resp = app
        .oneshot(
            Request::post("/facet")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let v: Value = serde_json::from_slice(&bytes).unwrap();
    (status, v)
}

pub fn entries(v: &Value) -> Vec<String> {
    v["entries"]
        .as_array()
        .expect("entries array")
        .iter()
        .map(|e| e.as_str().unwrap().to_string())
        .collect()
}
