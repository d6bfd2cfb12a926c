use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use viagens::{
    models::trip::MISSING_FIELDS_MESSAGE, routes::create_router,
    services::memory::MemoryStore, state::AppState,
};

fn app() -> (Router, MemoryStore) {
    let store = MemoryStore::default();
    let state = AppState::new(Arc::new(store.clone()));
    (create_router(state), store)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, created) = call(app, Method::POST, "/viagens", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create failed: {created}");
    created[0].clone()
}

#[tokio::test]
async fn index_reports_running() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "mensagem": "API de viagens rodando!" }));
}

#[tokio::test]
async fn create_returns_array_with_assigned_id() {
    let (app, _) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/viagens",
        Some(json!({"destino": "Paris", "preco": 5000, "tipo": "internacional"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": 1,
            "destino": "Paris",
            "duracao_dias": null,
            "preco": 5000,
            "tipo": "internacional"
        }])
    );
}

#[tokio::test]
async fn created_trip_can_be_fetched_by_id() {
    let (app, _) = app();
    let created = create(
        &app,
        json!({"destino": "Gramado", "duracao_dias": 3, "preco": 1450.9, "tipo": "nacional"}),
    )
    .await;

    let (status, fetched) = call(&app, Method::GET, &format!("/viagens/{}", created["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["duracao_dias"], 3);
    assert_eq!(fetched["preco"], 1450.9);
}

#[tokio::test]
async fn create_without_required_fields_inserts_nothing() {
    let (app, store) = app();
    for body in [
        json!({"preco": 5000, "tipo": "internacional"}),
        json!({"destino": "Paris", "tipo": "internacional"}),
        json!({"destino": "Paris", "preco": 5000}),
        json!({}),
    ] {
        let (status, response) = call(&app, Method::POST, "/viagens", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "erro": MISSING_FIELDS_MESSAGE }));
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_bodies_use_the_api_error_shape() {
    let (app, store) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/viagens",
        Some(json!({"destino": 3, "preco": 5000, "tipo": "internacional"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["erro"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/viagens")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"destino\":"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn list_returns_every_trip() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/viagens", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create(&app, json!({"destino": "Recife", "preco": 900, "tipo": "nacional"})).await;
    create(&app, json!({"destino": "Roma", "preco": 6100, "tipo": "internacional"})).await;
    let (_, body) = call(&app, Method::GET, "/viagens", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_by_tipo_matches_exactly() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/viagens/tipo/nacional", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create(&app, json!({"destino": "Recife", "preco": 900, "tipo": "nacional"})).await;
    create(&app, json!({"destino": "Roma", "preco": 6100, "tipo": "internacional"})).await;
    create(&app, json!({"destino": "Manaus", "preco": 1300, "tipo": "Nacional"})).await;

    let (_, body) = call(&app, Method::GET, "/viagens/tipo/nacional", None).await;
    let trips = body.as_array().unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0]["destino"], "Recife");
}

#[tokio::test]
async fn update_replaces_every_field() {
    let (app, _) = app();
    let created = create(
        &app,
        json!({"destino": "Salvador", "duracao_dias": 7, "preco": 2100, "tipo": "nacional"}),
    )
    .await;
    let uri = format!("/viagens/{}", created["id"]);

    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"destino": "Fortaleza", "preco": 1800, "tipo": "nacional"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": created["id"],
            "destino": "Fortaleza",
            "duracao_dias": null,
            "preco": 1800,
            "tipo": "nacional"
        }])
    );

    let (_, fetched) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["duracao_dias"], Value::Null);
}

#[tokio::test]
async fn update_surfaces_backend_constraint_errors() {
    let (app, _) = app();
    let created = create(&app, json!({"destino": "Salvador", "preco": 2100, "tipo": "nacional"})).await;
    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/viagens/{}", created["id"]),
        Some(json!({"preco": 1800, "tipo": "nacional"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["erro"],
        "null value in column \"destino\" of relation \"viagens\" violates not-null constraint"
    );
}

#[tokio::test]
async fn deleted_trip_can_no_longer_be_fetched() {
    let (app, _) = app();
    let created = create(&app, json!({"destino": "Lisboa", "preco": 4300, "tipo": "internacional"})).await;
    let uri = format!("/viagens/{}", created["id"]);

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "mensagem": "Viagem deletada." }));

    let (status, body) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "erro": "JSON object requested, multiple (or no) rows returned" })
    );
}

#[tokio::test]
async fn invalid_ids_are_reported_as_bad_requests() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/viagens/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "invalid input syntax for type bigint: \"abc\"");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/viagens")
        .header(header::ORIGIN, "https://front.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/viagens/1")
        .header(header::ORIGIN, "https://front.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

async fn post_raw(app: &Router, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
    let mut request = Request::builder().method(Method::POST).uri("/viagens");
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn create_without_a_json_body_reports_missing_fields() {
    let (app, store) = app();
    let cases = [
        (None, ""),
        (Some("application/json"), ""),
        (Some("application/json"), "  \n"),
        (Some("text/plain"), r#"{"destino":"Paris","preco":5000,"tipo":"internacional"}"#),
    ];
    for (content_type, body) in cases {
        let (status, response) = post_raw(&app, content_type, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{content_type:?} {body:?}");
        assert_eq!(response, json!({ "erro": MISSING_FIELDS_MESSAGE }));
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn update_without_a_body_clears_every_field() {
    let (app, _) = app();
    let created = create(&app, json!({"destino": "Belém", "preco": 1700, "tipo": "nacional"})).await;
    let (status, body) = call(&app, Method::PUT, &format!("/viagens/{}", created["id"]), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["erro"],
        "null value in column \"destino\" of relation \"viagens\" violates not-null constraint"
    );
}

#[tokio::test]
async fn non_numeric_preco_is_rejected_before_the_backend() {
    let (app, store) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/viagens",
        Some(json!({"destino": "Paris", "preco": "5000", "tipo": "internacional"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_ne!(body["erro"], MISSING_FIELDS_MESSAGE);
    assert!(body["erro"].as_str().unwrap().contains("preco"));
    assert!(store.is_empty().await);
}
