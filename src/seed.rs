use crate::db::{self, models::User, DbPool};

const DEMO_USERS: &[(&str, &str, &str, &str, &str, &str)] = &[
    (
        "Demo Donor",
        "demodonor",
        "donor@example.com",
        "1111111111",
        "donorpass",
        "Donor",
    ),
    (
        "Demo Charity",
        "democharity",
        "charity@example.com",
        "2222222222",
        "charitypass",
        "Charity",
    ),
    (
        "Demo Admin",
        "demoadmin",
        "admin@example.com",
        "3333333333",
        "adminpass",
        "Admin",
    ),
];

/// Idempotent demo fixtures, guarded by existence checks. The caller treats
/// any error as non-fatal: startup must never abort over missing demo data.
pub async fn create_demo_users(pool: &DbPool) -> anyhow::Result<()> {
    for &(name, username, email, phone, password, role) in DEMO_USERS {
        if db::email_taken(pool, email).await? || db::username_taken(pool, username).await? {
            continue;
        }
        db::create_user(
            pool,
            &User {
                id: 0,
                name: name.to_string(),
                username: username.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                password: password.to_string(),
                role: role.to_string(),
            },
        )
        .await?;
        tracing::info!("Demo {} user created", role.to_lowercase());
    }
    Ok(())
}
