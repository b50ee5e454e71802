use sustainshare_backend::db::{self, models::DonationLogPatch};

mod common;

#[tokio::test]
async fn available_excludes_only_successfully_claimed_items() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let charity = common::register_user(&pool, "Shelter", "Charity").await;

    let claimed = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;
    let posted = common::post_food(&pool, "Bread", 5, Some(donor.id)).await;
    let logged_only = common::post_food(&pool, "Soup", 2, Some(donor.id)).await;

    // An unclaimed log (no charity, no claimedAt) must not hide the item
    db::create_donation_log(
        &pool,
        DonationLogPatch {
            donor_id: Some(donor.id),
            food_item_id: Some(logged_only.id),
            ..Default::default()
        },
    )
    .await
    .expect("create log");

    db::claim_food(&pool, claimed.id, charity.id)
        .await
        .expect("claim")
        .expect("claim should succeed");

    let available = db::list_available_food_items(&pool).await.expect("list");
    let ids: Vec<i64> = available.iter().map(|f| f.id).collect();

    assert!(ids.contains(&posted.id));
    assert!(ids.contains(&logged_only.id));
    assert!(!ids.contains(&claimed.id));
}

#[tokio::test]
async fn deleting_a_food_item_cascades_to_its_donation_logs() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let charity = common::register_user(&pool, "Shelter", "Charity").await;

    let doomed = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;
    let kept = common::post_food(&pool, "Bread", 5, Some(donor.id)).await;

    db::claim_food(&pool, doomed.id, charity.id)
        .await
        .expect("claim")
        .expect("claim should succeed");
    db::claim_food(&pool, kept.id, charity.id)
        .await
        .expect("claim")
        .expect("claim should succeed");

    assert!(db::delete_food_item(&pool, doomed.id).await.expect("delete"));

    assert!(db::get_food_item(&pool, doomed.id)
        .await
        .expect("get")
        .is_none());
    let logs = db::list_donation_logs(&pool).await.expect("list");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].food_item.as_ref().map(|f| f.id), Some(kept.id));
}

#[tokio::test]
async fn get_food_item_misses_are_not_errors() {
    let (_dir, pool) = common::test_pool();
    assert!(db::get_food_item(&pool, 7).await.expect("get").is_none());
    assert!(!db::delete_food_item(&pool, 7).await.expect("delete"));
}

#[tokio::test]
async fn deleted_item_can_be_claimed_by_nobody() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let charity = common::register_user(&pool, "Shelter", "Charity").await;
    let food = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;

    assert!(db::delete_food_item(&pool, food.id).await.expect("delete"));

    let outcome = db::claim_food(&pool, food.id, charity.id).await.expect("claim");
    assert!(outcome.is_none());
    assert_eq!(db::count_donation_logs(&pool).await.expect("count"), 0);
}
