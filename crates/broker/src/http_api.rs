use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use termlist_core::FacetError;

use crate::config::BrokerConfig;
use crate::facet::types::{FacetHttpRequest, FacetResponse};
use crate::facet::FacetCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub coord: Arc<FacetCoordinator>,
    pub cfg: BrokerConfig,
}

pub fn router(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/facet", post(facet))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn facet(
    State(st): State<AppState>,
    Json(req): Json<FacetHttpRequest>,
) -> Result<Json<FacetResponse>, (StatusCode, Json<Value>)> {
    let resp = st.coord.handle(req).await.map_err(facet_error)?;
    Ok(Json(resp))
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn facet_error(e: FacetError) -> (StatusCode, Json<Value>) {
    let status = if e.is_request_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "error": e.to_string() })))
}
