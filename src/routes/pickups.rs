use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::db::{
    self,
    models::{EntityRef, NewPickup},
};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    pub scheduled_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub food_item: Option<EntityRef>,
    pub charity: Option<EntityRef>,
}

pub async fn schedule_pickup(
    State(state): State<AppState>,
    Json(req): Json<PickupRequest>,
) -> impl IntoResponse {
    let new = NewPickup {
        scheduled_time: req.scheduled_time,
        status: req.status,
        food_item_id: req.food_item.and_then(|r| r.id),
        charity_id: req.charity.and_then(|r| r.id),
    };
    match db::create_pickup(&state.db, new).await {
        Ok(pickup) => AxumJson(pickup).into_response(),
        Err(e) => {
            tracing::error!("DB Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_all_pickups(State(state): State<AppState>) -> impl IntoResponse {
    match db::list_pickups(&state.db).await {
        Ok(pickups) => AxumJson(pickups).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_pickup_by_id(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match db::get_pickup(&state.db, id).await {
        Ok(Some(pickup)) => AxumJson(pickup).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn delete_pickup(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match db::delete_pickup(&state.db, id).await {
        Ok(true) => (StatusCode::OK, "Deleted").into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("Delete pickup error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_total_pickups_count(State(state): State<AppState>) -> impl IntoResponse {
    match db::count_pickups(&state.db).await {
        Ok(count) => AxumJson(count).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}
