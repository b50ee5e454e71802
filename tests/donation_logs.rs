use chrono::{TimeZone, Utc};
use sustainshare_backend::db::{self, models::DonationLogPatch};

mod common;

#[tokio::test]
async fn create_defaults_donated_at_and_hydrates_references() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let food = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;

    let log = db::create_donation_log(
        &pool,
        DonationLogPatch {
            donor_id: Some(donor.id),
            food_item_id: Some(food.id),
            ..Default::default()
        },
    )
    .await
    .expect("create log");

    assert!(log.donated_at.is_some());
    assert!(log.claimed_at.is_none());
    assert_eq!(log.donor.as_ref().map(|u| u.name.as_str()), Some("Dana"));
    assert_eq!(log.food_item.as_ref().map(|f| f.id), Some(food.id));
    assert!(log.charity.is_none());
}

#[tokio::test]
async fn create_preserves_an_explicit_donated_at() {
    let (_dir, pool) = common::test_pool();
    let donated_at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();

    let log = db::create_donation_log(
        &pool,
        DonationLogPatch {
            donated_at: Some(donated_at),
            ..Default::default()
        },
    )
    .await
    .expect("create log");

    assert_eq!(log.donated_at, Some(donated_at));
}

#[tokio::test]
async fn update_patches_only_the_supplied_fields() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let food = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;
    let donated_at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();

    let created = db::create_donation_log(
        &pool,
        DonationLogPatch {
            donor_id: Some(donor.id),
            food_item_id: Some(food.id),
            donated_at: Some(donated_at),
            ..Default::default()
        },
    )
    .await
    .expect("create log");

    let claimed_at = Utc.with_ymd_and_hms(2026, 5, 2, 9, 30, 0).unwrap();
    let updated = db::update_donation_log(
        &pool,
        created.id,
        DonationLogPatch {
            claimed_at: Some(claimed_at),
            ..Default::default()
        },
    )
    .await
    .expect("update")
    .expect("log exists");

    assert_eq!(updated.claimed_at, Some(claimed_at));
    assert_eq!(updated.donated_at, Some(donated_at));
    assert_eq!(updated.donor.as_ref().map(|u| u.id), Some(donor.id));
    assert_eq!(updated.food_item.as_ref().map(|f| f.id), Some(food.id));
    assert!(updated.charity.is_none());
}

#[tokio::test]
async fn update_of_a_missing_log_reports_not_found() {
    let (_dir, pool) = common::test_pool();
    let outcome = db::update_donation_log(&pool, 42, DonationLogPatch::default())
        .await
        .expect("update");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn aggregates_recount_on_every_call() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let charity = common::register_user(&pool, "Shelter", "Charity").await;
    let rice = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;
    let bread = common::post_food(&pool, "Bread", 5, Some(donor.id)).await;

    db::create_donation_log(
        &pool,
        DonationLogPatch {
            donor_id: Some(donor.id),
            food_item_id: Some(rice.id),
            ..Default::default()
        },
    )
    .await
    .expect("create log");

    assert_eq!(db::count_donation_logs(&pool).await.expect("count"), 1);
    assert_eq!(db::count_claimed_donations(&pool).await.expect("count"), 0);
    assert_eq!(db::total_food_quantity(&pool).await.expect("sum"), 3);

    db::claim_food(&pool, bread.id, charity.id)
        .await
        .expect("claim")
        .expect("claim should succeed");

    assert_eq!(db::count_donation_logs(&pool).await.expect("count"), 2);
    assert_eq!(db::count_claimed_donations(&pool).await.expect("count"), 1);
    assert_eq!(db::total_food_quantity(&pool).await.expect("sum"), 8);
}
