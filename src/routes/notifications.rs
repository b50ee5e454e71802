use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{
    self,
    models::{DonationLog, User},
};
use crate::AppState;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_read: bool,
}

/// Feeds are recomputed from the ledger on every request; nothing about
/// notifications is persisted.
pub async fn get_notifications_for_user(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let user = match db::get_user(&state.db, user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response();
        }
    };
    let Some(user) = user else {
        return AxumJson(Vec::<Notification>::new()).into_response();
    };

    let logs = match db::list_donation_logs(&state.db).await {
        Ok(logs) => logs,
        Err(e) => {
            tracing::error!("DB Query Error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response();
        }
    };

    let all_users = if user.role == "Admin" {
        match db::list_users(&state.db).await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("DB Query Error: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database Error").into_response();
            }
        }
    } else {
        Vec::new()
    };

    AxumJson(assemble(&user, &all_users, &logs)).into_response()
}

fn food_name(log: &DonationLog) -> String {
    log.food_item
        .as_ref()
        .and_then(|f| f.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn donor_name(log: &DonationLog) -> String {
    log.donor
        .as_ref()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Builds the role-specific feed. Unrecognized roles get an empty list.
pub fn assemble(user: &User, all_users: &[User], logs: &[DonationLog]) -> Vec<Notification> {
    let mut notifications = Vec::new();

    match user.role.as_str() {
        "Charity" => {
            // Every posted food, regardless of claim status
            for log in logs {
                let food = food_name(log);
                let donor = donor_name(log);
                notifications.push(Notification {
                    id: format!("food_posted_{}", log.id),
                    kind: "food_posted".to_string(),
                    message: format!("New food posted: {} by {}", food, donor),
                    food_name: Some(food),
                    donor_name: Some(donor),
                    charity_name: None,
                    user_name: None,
                    user_role: None,
                    timestamp: log.donated_at,
                    is_read: false,
                });
            }
        }
        "Donor" => {
            // Only this donor's food, and only once claimed
            for log in logs {
                let claimed_by_charity = log.charity.as_ref();
                let owned = log.donor.as_ref().is_some_and(|d| d.id == user.id);
                if let (true, Some(charity)) = (owned, claimed_by_charity) {
                    let food = food_name(log);
                    notifications.push(Notification {
                        id: format!("food_claimed_{}", log.id),
                        kind: "food_claimed".to_string(),
                        message: format!(
                            "Your food '{}' was claimed by {}",
                            food, charity.name
                        ),
                        food_name: Some(food),
                        donor_name: None,
                        charity_name: Some(charity.name.clone()),
                        user_name: None,
                        user_role: None,
                        timestamp: log.donated_at,
                        is_read: false,
                    });
                }
            }
        }
        "Admin" => {
            for other in all_users {
                if other.id == user.id {
                    continue;
                }
                notifications.push(Notification {
                    id: format!("user_{}", other.id),
                    kind: "new_user".to_string(),
                    message: format!("New user registered: {} ({})", other.name, other.role),
                    food_name: None,
                    donor_name: None,
                    charity_name: None,
                    user_name: Some(other.name.clone()),
                    user_role: Some(other.role.clone()),
                    timestamp: Some(Utc::now()),
                    is_read: false,
                });
            }

            for log in logs {
                let food = food_name(log);
                let donor = donor_name(log);
                notifications.push(Notification {
                    id: format!("donation_{}", log.id),
                    kind: "food_donated".to_string(),
                    message: format!("Food donated: {} by {}", food, donor),
                    food_name: Some(food.clone()),
                    donor_name: Some(donor),
                    charity_name: None,
                    user_name: None,
                    user_role: None,
                    timestamp: log.donated_at,
                    is_read: false,
                });

                if let Some(charity) = log.charity.as_ref() {
                    notifications.push(Notification {
                        id: format!("claim_{}", log.id),
                        kind: "food_claimed".to_string(),
                        message: format!("Food claimed: {} by {}", food, charity.name),
                        food_name: Some(food.clone()),
                        donor_name: None,
                        charity_name: Some(charity.name.clone()),
                        user_name: None,
                        user_role: None,
                        timestamp: log.donated_at,
                        is_read: false,
                    });
                }
            }
        }
        _ => {}
    }

    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FoodItem;

    fn user(id: i64, name: &str, role: &str) -> User {
        User {
            id,
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: format!("555-{:04}", id),
            password: "pw".to_string(),
            role: role.to_string(),
        }
    }

    fn log(
        id: i64,
        donor: Option<User>,
        charity: Option<User>,
        food: Option<&str>,
    ) -> DonationLog {
        let claimed_at = charity.as_ref().map(|_| Utc::now());
        DonationLog {
            id,
            donor,
            charity,
            food_item: food.map(|name| FoodItem {
                id: 100 + id,
                name: Some(name.to_string()),
                quantity: 2,
                pickup_location: None,
                expiry_time: None,
                donor_phone: None,
                donor_id: None,
            }),
            donated_at: Some(Utc::now()),
            claimed_at,
        }
    }

    #[test]
    fn charity_sees_every_posted_food() {
        let donor = user(1, "Dana", "Donor");
        let charity = user(2, "Shelter", "Charity");
        let logs = vec![
            log(1, Some(donor.clone()), None, Some("Rice")),
            log(2, Some(donor), Some(charity.clone()), Some("Bread")),
        ];

        let feed = assemble(&charity, &[], &logs);
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|n| n.kind == "food_posted"));
        assert_eq!(feed[0].message, "New food posted: Rice by Dana");
    }

    #[test]
    fn donor_sees_only_own_claimed_food() {
        let donor = user(1, "Dana", "Donor");
        let other_donor = user(3, "Omar", "Donor");
        let charity = user(2, "Shelter", "Charity");
        let logs = vec![
            log(1, Some(donor.clone()), None, Some("Rice")),
            log(2, Some(donor.clone()), Some(charity.clone()), Some("Bread")),
            log(3, Some(other_donor), Some(charity), Some("Soup")),
        ];

        let feed = assemble(&donor, &[], &logs);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "food_claimed_2");
        assert_eq!(feed[0].message, "Your food 'Bread' was claimed by Shelter");
    }

    #[test]
    fn admin_sees_users_donations_and_claims() {
        let admin = user(9, "Root", "Admin");
        let donor = user(1, "Dana", "Donor");
        let charity = user(2, "Shelter", "Charity");
        let users = vec![donor.clone(), charity.clone(), admin.clone()];
        let logs = vec![
            log(1, Some(donor.clone()), None, Some("Rice")),
            log(2, Some(donor), Some(charity), Some("Bread")),
        ];

        let feed = assemble(&admin, &users, &logs);
        // two other users + two donations + one claim, never a self entry
        assert_eq!(feed.len(), 5);
        assert_eq!(feed.iter().filter(|n| n.kind == "new_user").count(), 2);
        assert_eq!(feed.iter().filter(|n| n.kind == "food_donated").count(), 2);
        assert_eq!(feed.iter().filter(|n| n.kind == "food_claimed").count(), 1);
        assert!(feed.iter().all(|n| n.id != "user_9"));
    }

    #[test]
    fn unknown_role_gets_empty_feed() {
        let stranger = user(5, "Eve", "Auditor");
        let logs = vec![log(1, None, None, Some("Rice"))];
        assert!(assemble(&stranger, &[], &logs).is_empty());
    }

    #[test]
    fn missing_references_render_as_unknown() {
        let charity = user(2, "Shelter", "Charity");
        let logs = vec![log(1, None, None, None)];
        let feed = assemble(&charity, &[], &logs);
        assert_eq!(feed[0].message, "New food posted: Unknown by Unknown");
    }
}
