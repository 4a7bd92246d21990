use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use broker::config::BrokerConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

mod helpers;
use helpers::make_router_with_config;

async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let resp = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn healthz_reports_ok_without_partitions() {
    // корень партиций может вообще не существовать: healthz его не трогает
    let cfg = BrokerConfig {
        partitions_root: Some("/definitely/not/here".into()),
        ..BrokerConfig::default()
    };

    let (status, body) = call(make_router_with_config(cfg), Method::GET, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn facet_is_post_only() {
    let (status, _) = call(
        make_router_with_config(BrokerConfig::default()),
        Method::GET,
        "/facet",
    )
    .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
