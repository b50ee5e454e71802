use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};

use crate::db::{self, models::User};
use crate::AppState;

pub async fn register_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> impl IntoResponse {
    match db::create_user(&state.db, &user).await {
        Ok(saved) => AxumJson(saved).into_response(),
        Err(e) => {
            tracing::error!("DB Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_all_users(State(state): State<AppState>) -> impl IntoResponse {
    match db::list_users(&state.db).await {
        Ok(users) => AxumJson(users).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_user(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match db::get_user(&state.db, id).await {
        Ok(Some(user)) => AxumJson(user).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_user_by_email(
    Path(email): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match db::get_user_by_email(&state.db, &email).await {
        Ok(Some(user)) => AxumJson(user).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_user_count(State(state): State<AppState>) -> impl IntoResponse {
    match db::count_users(&state.db).await {
        Ok(count) => AxumJson(count).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}
