use axum::{
    routing::{get, post, put},
    Router,
};

pub mod db;
pub mod routes;
pub mod seed;

use db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

/// All API routes, without middleware; `main` layers CORS, auth and rate
/// limiting on top before serving.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        // Auth
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        // Users
        .route(
            "/api/users",
            get(routes::users::get_all_users).post(routes::users::register_user),
        )
        .route("/api/users/count", get(routes::users::get_user_count))
        .route("/api/users/email/{email}", get(routes::users::get_user_by_email))
        .route("/api/users/{id}", get(routes::users::get_user))
        // Food catalog
        .route(
            "/api/food",
            get(routes::food::get_all_food_items).post(routes::food::add_food_item),
        )
        .route("/api/food/available", get(routes::food::get_available_food_items))
        .route(
            "/api/food/{id}",
            get(routes::food::get_food_by_id).delete(routes::food::delete_food_item),
        )
        // Donation ledger
        .route(
            "/api/donations",
            get(routes::donations::get_all_donations).post(routes::donations::create_donation_log),
        )
        .route(
            "/api/donations/count",
            get(routes::donations::get_total_donations_count),
        )
        .route(
            "/api/donations/claimed/count",
            get(routes::donations::get_claimed_food_count),
        )
        .route(
            "/api/donations/foodquantity/total",
            get(routes::donations::get_total_food_quantity),
        )
        .route(
            "/api/donations/claim/{food_item_id}",
            post(routes::donations::claim_donation),
        )
        .route("/api/donations/{id}", put(routes::donations::update_donation_log))
        // Pickup register
        .route(
            "/api/pickups",
            get(routes::pickups::get_all_pickups).post(routes::pickups::schedule_pickup),
        )
        .route("/api/pickups/count", get(routes::pickups::get_total_pickups_count))
        .route(
            "/api/pickups/{id}",
            get(routes::pickups::get_pickup_by_id).delete(routes::pickups::delete_pickup),
        )
        // Notifications (behind the bearer catch-all, see main::require_auth)
        .route(
            "/api/notifications/user/{user_id}",
            get(routes::notifications::get_notifications_for_user),
        )
}

async fn health_check() -> &'static str {
    "OK"
}
