use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    // Plaintext, compared by direct equality at login, and serialized in
    // API responses. Known weakness: no hashing anywhere.
    pub password: String,
    pub role: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    #[serde(default)]
    pub id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    pub pickup_location: Option<String>,
    pub expiry_time: Option<String>,
    pub donor_phone: Option<String>,
    // Loose reference to the posting donor, not an enforced foreign key
    pub donor_id: Option<i64>,
}

/// The claim record: the single source of truth for whether a food item is
/// claimed and by whom. References are stored as ids and hydrated into full
/// entities for API responses.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DonationLog {
    pub id: i64,
    pub donor: Option<User>,
    pub charity: Option<User>,
    pub food_item: Option<FoodItem>,
    pub donated_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PickupSchedule {
    pub id: i64,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub food_item: Option<FoodItem>,
    pub charity: Option<User>,
}

/// A nested entity reference in a request body; only the id matters, any
/// other fields the client sends along are ignored.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct EntityRef {
    pub id: Option<i64>,
}

/// Field set for creating or patching a donation log. On update, `None`
/// means "leave unchanged", never "clear".
#[derive(Debug, Clone, Default)]
pub struct DonationLogPatch {
    pub donor_id: Option<i64>,
    pub charity_id: Option<i64>,
    pub food_item_id: Option<i64>,
    pub donated_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPickup {
    pub scheduled_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub food_item_id: Option<i64>,
    pub charity_id: Option<i64>,
}
