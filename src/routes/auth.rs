use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use serde::Deserialize;
use serde_json::json;

use crate::db::{self, models::User};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Uniqueness is checked before the insert rather than enforced in one
/// transaction; the small race window between check and insert is an
/// accepted limitation of the scheme.
pub async fn signup(State(state): State<AppState>, Json(user): Json<User>) -> impl IntoResponse {
    match db::username_taken(&state.db, &user.username).await {
        Ok(true) => return (StatusCode::BAD_REQUEST, "Username already taken").into_response(),
        Ok(false) => {}
        Err(e) => return signup_failure(e),
    }

    match db::email_taken(&state.db, &user.email).await {
        Ok(true) => return (StatusCode::BAD_REQUEST, "Email already in use").into_response(),
        Ok(false) => {}
        Err(e) => return signup_failure(e),
    }

    match db::create_user(&state.db, &user).await {
        Ok(_) => (StatusCode::OK, "Signup successful").into_response(),
        Err(e) => signup_failure(e),
    }
}

fn signup_failure(e: anyhow::Error) -> axum::response::Response {
    tracing::error!("Signup failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Signup failed: {}", e),
    )
        .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    match db::authenticate_user(&state.db, &req.email, &req.password).await {
        Ok(Some(user)) => AxumJson(json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
            // There is no session machinery; the constant token is not a
            // credential the backend ever verifies.
            "token": "dummy-token",
        }))
        .into_response(),
        Ok(None) => {
            (StatusCode::UNAUTHORIZED, "Login failed. Please sign up first.").into_response()
        }
        Err(e) => {
            tracing::error!("Login error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}
