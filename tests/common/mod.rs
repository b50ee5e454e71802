#![allow(dead_code)]

use sustainshare_backend::db::{
    self,
    models::{FoodItem, User},
    DbPool,
};
use tempfile::TempDir;

/// Fresh SQLite-backed pool in a private temp directory. The directory must
/// stay alive for the duration of the test.
pub fn test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("temp dir");
    let pool = db::init_sqlite_pool(&dir.path().join("test.db")).expect("init sqlite pool");
    (dir, pool)
}

pub async fn register_user(pool: &DbPool, name: &str, role: &str) -> User {
    let user = User {
        id: 0,
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: format!("{}-{}", role.to_lowercase(), name.to_lowercase()),
        password: "pw".to_string(),
        role: role.to_string(),
    };
    db::create_user(pool, &user).await.expect("create user")
}

pub async fn post_food(
    pool: &DbPool,
    name: &str,
    quantity: i64,
    donor_id: Option<i64>,
) -> FoodItem {
    let item = FoodItem {
        id: 0,
        name: Some(name.to_string()),
        quantity,
        pickup_location: Some("12 Market St".to_string()),
        expiry_time: Some("today 6pm".to_string()),
        donor_phone: None,
        donor_id,
    };
    db::add_food_item(pool, &item).await.expect("add food item")
}
