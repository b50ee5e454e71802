use chrono::{TimeZone, Utc};
use sustainshare_backend::db::{self, models::NewPickup};

mod common;

#[tokio::test]
async fn pickup_lifecycle() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let charity = common::register_user(&pool, "Shelter", "Charity").await;
    let food = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;
    let scheduled_time = Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap();

    let pickup = db::create_pickup(
        &pool,
        NewPickup {
            scheduled_time: Some(scheduled_time),
            status: Some("Scheduled".to_string()),
            food_item_id: Some(food.id),
            charity_id: Some(charity.id),
        },
    )
    .await
    .expect("create pickup");

    assert_eq!(pickup.scheduled_time, Some(scheduled_time));
    assert_eq!(pickup.status.as_deref(), Some("Scheduled"));
    assert_eq!(pickup.food_item.as_ref().map(|f| f.id), Some(food.id));
    assert_eq!(pickup.charity.as_ref().map(|u| u.id), Some(charity.id));

    let listed = db::list_pickups(&pool).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(db::count_pickups(&pool).await.expect("count"), 1);

    let fetched = db::get_pickup(&pool, pickup.id).await.expect("get");
    assert_eq!(fetched.map(|p| p.id), Some(pickup.id));

    assert!(db::delete_pickup(&pool, pickup.id).await.expect("delete"));
    assert!(db::get_pickup(&pool, pickup.id).await.expect("get").is_none());
    assert_eq!(db::count_pickups(&pool).await.expect("count"), 0);
}

#[tokio::test]
async fn status_is_free_text_by_convention() {
    let (_dir, pool) = common::test_pool();

    let pickup = db::create_pickup(
        &pool,
        NewPickup {
            status: Some("running late".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("create pickup");

    assert_eq!(pickup.status.as_deref(), Some("running late"));
    assert!(pickup.food_item.is_none());
    assert!(pickup.charity.is_none());
    assert!(pickup.scheduled_time.is_none());
}

#[tokio::test]
async fn missing_pickup_lookups_are_not_errors() {
    let (_dir, pool) = common::test_pool();
    assert!(db::get_pickup(&pool, 9).await.expect("get").is_none());
    assert!(!db::delete_pickup(&pool, 9).await.expect("delete"));
}
