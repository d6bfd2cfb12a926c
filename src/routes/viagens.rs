use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::AppError,
    models::trip::{Trip, TripPayload},
    routes::ApiJson,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/tipo/:tipo", get(list_by_tipo))
        .route("/:id", get(find).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, AppError> {
    Ok(Json(state.trips.list().await?))
}

async fn list_by_tipo(
    State(state): State<AppState>,
    Path(tipo): Path<String>,
) -> Result<Json<Vec<Trip>>, AppError> {
    Ok(Json(state.trips.list_by_tipo(&tipo).await?))
}

async fn find(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.get(&id).await?))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TripPayload>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let trip = payload.into_new_trip()?;
    let created = state.trips.insert(trip).await?;
    if let Some(row) = created.first() {
        info!(id = %row.id, "viagem criada");
    }
    Ok(Json(created))
}

// Full replacement: fields missing from the body are written as null.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<TripPayload>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let updated = state.trips.update(&id, payload.into_changes()).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.trips.delete(&id).await?;
    info!(%id, "viagem deletada");
    Ok(Json(json!({ "mensagem": "Viagem deletada." })))
}
