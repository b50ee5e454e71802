use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};

use crate::db::{self, models::FoodItem};
use crate::AppState;

pub async fn add_food_item(
    State(state): State<AppState>,
    Json(item): Json<FoodItem>,
) -> impl IntoResponse {
    match db::add_food_item(&state.db, &item).await {
        Ok(saved) => AxumJson(saved).into_response(),
        Err(e) => {
            tracing::error!("DB Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_all_food_items(State(state): State<AppState>) -> impl IntoResponse {
    match db::list_food_items(&state.db).await {
        Ok(items) => AxumJson(items).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

/// Only unclaimed food items, for charities to browse.
pub async fn get_available_food_items(State(state): State<AppState>) -> impl IntoResponse {
    match db::list_available_food_items(&state.db).await {
        Ok(items) => AxumJson(items).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_food_by_id(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match db::get_food_item(&state.db, id).await {
        Ok(Some(item)) => AxumJson(item).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn delete_food_item(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match db::delete_food_item(&state.db, id).await {
        Ok(true) => (StatusCode::OK, "Deleted").into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("Delete food item error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}
