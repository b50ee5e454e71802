use sustainshare_backend::db::{self, models::DonationLogPatch};

mod common;

#[tokio::test]
async fn claim_creates_log_lazily_and_infers_donor() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let charity = common::register_user(&pool, "Shelter", "Charity").await;
    let food = common::post_food(&pool, "Rice", 3, Some(donor.id)).await;

    let log = db::claim_food(&pool, food.id, charity.id)
        .await
        .expect("claim")
        .expect("claim should succeed");

    assert_eq!(log.food_item.as_ref().map(|f| f.id), Some(food.id));
    assert_eq!(log.charity.as_ref().map(|u| u.id), Some(charity.id));
    assert_eq!(log.donor.as_ref().map(|u| u.id), Some(donor.id));
    assert!(log.claimed_at.is_some());
}

#[tokio::test]
async fn repeated_claim_is_rejected_and_state_unchanged() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let first = common::register_user(&pool, "Shelter", "Charity").await;
    let second = common::register_user(&pool, "Kitchen", "Charity").await;
    let food = common::post_food(&pool, "Bread", 5, Some(donor.id)).await;

    let winner = db::claim_food(&pool, food.id, first.id)
        .await
        .expect("claim")
        .expect("first claim should succeed");

    // Different charity, then the winner again: both must be rejected
    assert!(db::claim_food(&pool, food.id, second.id)
        .await
        .expect("claim")
        .is_none());
    assert!(db::claim_food(&pool, food.id, first.id)
        .await
        .expect("claim")
        .is_none());

    let logs = db::list_donation_logs(&pool).await.expect("list");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].charity.as_ref().map(|u| u.id), Some(first.id));
    assert_eq!(logs[0].claimed_at, winner.claimed_at);
}

#[tokio::test]
async fn claim_of_unknown_food_item_is_rejected_without_a_record() {
    let (_dir, pool) = common::test_pool();
    let charity = common::register_user(&pool, "Shelter", "Charity").await;

    let outcome = db::claim_food(&pool, 999, charity.id).await.expect("claim");
    assert!(outcome.is_none());
    assert_eq!(db::count_donation_logs(&pool).await.expect("count"), 0);
}

#[tokio::test]
async fn claim_with_unknown_charity_is_rejected_without_mutation() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let food = common::post_food(&pool, "Soup", 2, Some(donor.id)).await;

    let outcome = db::claim_food(&pool, food.id, 999).await.expect("claim");
    assert!(outcome.is_none());
    assert_eq!(db::count_donation_logs(&pool).await.expect("count"), 0);
}

#[tokio::test]
async fn claim_takes_over_an_existing_unclaimed_log() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let charity = common::register_user(&pool, "Shelter", "Charity").await;
    let food = common::post_food(&pool, "Pasta", 4, Some(donor.id)).await;

    let created = db::create_donation_log(
        &pool,
        DonationLogPatch {
            donor_id: Some(donor.id),
            food_item_id: Some(food.id),
            ..Default::default()
        },
    )
    .await
    .expect("create log");

    let claimed = db::claim_food(&pool, food.id, charity.id)
        .await
        .expect("claim")
        .expect("claim should succeed");

    assert_eq!(claimed.id, created.id);
    assert_eq!(claimed.donor.as_ref().map(|u| u.id), Some(donor.id));
    assert_eq!(claimed.charity.as_ref().map(|u| u.id), Some(charity.id));
    assert_eq!(claimed.donated_at, created.donated_at);
}

#[tokio::test]
async fn claim_succeeds_when_the_donor_reference_does_not_resolve() {
    let (_dir, pool) = common::test_pool();
    let charity = common::register_user(&pool, "Shelter", "Charity").await;
    let food = common::post_food(&pool, "Apples", 10, Some(424242)).await;

    let log = db::claim_food(&pool, food.id, charity.id)
        .await
        .expect("claim")
        .expect("claim should succeed");

    assert!(log.donor.is_none());
    assert_eq!(log.charity.as_ref().map(|u| u.id), Some(charity.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_claims_yield_exactly_one_success() {
    let (_dir, pool) = common::test_pool();
    let donor = common::register_user(&pool, "Dana", "Donor").await;
    let food = common::post_food(&pool, "Flour", 20, Some(donor.id)).await;
    let food_id = food.id;

    let mut charity_ids = Vec::new();
    for i in 0..8 {
        let charity = common::register_user(&pool, &format!("Charity{}", i), "Charity").await;
        charity_ids.push(charity.id);
    }

    let mut handles = Vec::new();
    for charity_id in charity_ids {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let outcome = db::claim_food(&pool, food_id, charity_id)
                .await
                .expect("claim");
            (charity_id, outcome.is_some())
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        let (charity_id, won) = handle.await.expect("join");
        if won {
            winners.push(charity_id);
        }
    }

    assert_eq!(winners.len(), 1, "exactly one concurrent claim may succeed");

    let logs = db::list_donation_logs(&pool).await.expect("list");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].charity.as_ref().map(|u| u.id), Some(winners[0]));
    assert_eq!(
        db::count_claimed_donations(&pool).await.expect("count"),
        1
    );
}
