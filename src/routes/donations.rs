use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::db::{
    self,
    models::{DonationLogPatch, EntityRef},
};
use crate::AppState;

/// Donation log request body: nested entity objects of which only the ids
/// are used.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationLogRequest {
    pub donor: Option<EntityRef>,
    pub charity: Option<EntityRef>,
    pub food_item: Option<EntityRef>,
    pub donated_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl DonationLogRequest {
    fn into_patch(self) -> DonationLogPatch {
        DonationLogPatch {
            donor_id: self.donor.and_then(|r| r.id),
            charity_id: self.charity.and_then(|r| r.id),
            food_item_id: self.food_item.and_then(|r| r.id),
            donated_at: self.donated_at,
            claimed_at: self.claimed_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub charity_id: Option<i64>,
}

pub async fn get_all_donations(State(state): State<AppState>) -> impl IntoResponse {
    match db::list_donation_logs(&state.db).await {
        Ok(logs) => AxumJson(logs).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_total_donations_count(State(state): State<AppState>) -> impl IntoResponse {
    match db::count_donation_logs(&state.db).await {
        Ok(count) => AxumJson(count).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_claimed_food_count(State(state): State<AppState>) -> impl IntoResponse {
    match db::count_claimed_donations(&state.db).await {
        Ok(count) => AxumJson(count).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn get_total_food_quantity(State(state): State<AppState>) -> impl IntoResponse {
    match db::total_food_quantity(&state.db).await {
        Ok(total) => AxumJson(total).into_response(),
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn create_donation_log(
    State(state): State<AppState>,
    Json(req): Json<DonationLogRequest>,
) -> impl IntoResponse {
    match db::create_donation_log(&state.db, req.into_patch()).await {
        Ok(log) => AxumJson(log).into_response(),
        Err(e) => {
            tracing::error!("DB Error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

/// One winner per food item; everything else is a conflict. All three
/// rejection causes (unknown item, unknown charity, already claimed) come
/// back from the ledger as a uniform no-result.
pub async fn claim_donation(
    Path(food_item_id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> impl IntoResponse {
    let Some(charity_id) = req.charity_id else {
        return (StatusCode::BAD_REQUEST, "charityId is required").into_response();
    };

    match db::claim_food(&state.db, food_item_id, charity_id).await {
        Ok(Some(log)) => AxumJson(log).into_response(),
        Ok(None) => (StatusCode::CONFLICT, "Already claimed or invalid IDs").into_response(),
        Err(e) => {
            tracing::error!("Claim error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}

pub async fn update_donation_log(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<DonationLogRequest>,
) -> impl IntoResponse {
    match db::update_donation_log(&state.db, id, req.into_patch()).await {
        Ok(Some(log)) => AxumJson(log).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("Update donation log error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response()
        }
    }
}
