mod common;

use relink::domain::entities::{NewLink, NewReferralRequest, RequestStatus};
use relink::domain::repositories::{LinkRepository, ReferralRequestRepository};
use relink::error::AppError;
use relink::infrastructure::persistence::{PgLinkRepository, PgReferralRequestRepository};
use sqlx::PgPool;
use std::sync::Arc;

fn request(link_id: i64, requester_id: i64, owner_id: i64) -> NewReferralRequest {
    NewReferralRequest {
        link_id,
        requester_id,
        owner_id,
        custom_alias: None,
    }
}

#[sqlx::test]
async fn test_duplicate_pending_request_is_rejected(pool: PgPool) {
    let repo = PgReferralRequestRepository::new(Arc::new(pool.clone()));

    let owner = common::create_account(&pool, "owner").await;
    let requester = common::create_account(&pool, "requester").await;
    let root_id = common::create_root_link(&pool, "root", "https://t.example/", owner).await;

    repo.create(request(root_id, requester, owner)).await.unwrap();

    let result = repo.create(request(root_id, requester, owner)).await;
    assert!(matches!(result.unwrap_err(), AppError::DuplicatePending { .. }));
}

#[sqlx::test]
async fn test_resolved_request_frees_the_pending_slot(pool: PgPool) {
    let repo = PgReferralRequestRepository::new(Arc::new(pool.clone()));

    let owner = common::create_account(&pool, "owner").await;
    let requester = common::create_account(&pool, "requester").await;
    let root_id = common::create_root_link(&pool, "root", "https://t.example/", owner).await;

    let first = repo.create(request(root_id, requester, owner)).await.unwrap();
    repo.decline(first.id).await.unwrap();

    // The partial unique index only guards pending rows.
    repo.create(request(root_id, requester, owner)).await.unwrap();
}

#[sqlx::test]
async fn test_approve_materializes_link_and_flips_status(pool: PgPool) {
    let links = PgLinkRepository::new(Arc::new(pool.clone()));
    let repo = PgReferralRequestRepository::new(Arc::new(pool.clone()));

    let owner = common::create_account(&pool, "owner").await;
    let requester = common::create_account(&pool, "requester").await;
    let root_id = common::create_root_link(&pool, "root", "https://t.example/", owner).await;
    let parent = links.find_by_id(root_id).await.unwrap().unwrap();

    let req = repo.create(request(root_id, requester, owner)).await.unwrap();

    let link = repo
        .approve(req.id, NewLink::referral("partner".to_string(), &parent, requester))
        .await
        .unwrap();

    assert!(link.is_referral);
    assert_eq!(link.root_link_id, Some(root_id));
    assert_eq!(link.referrer_id, Some(requester));
    assert_eq!(link.target_url, "https://t.example/");

    let stored = repo.find_by_id(req.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
    assert!(stored.decided_at.is_some());
}

#[sqlx::test]
async fn test_approval_is_exactly_once(pool: PgPool) {
    let links = PgLinkRepository::new(Arc::new(pool.clone()));
    let repo = PgReferralRequestRepository::new(Arc::new(pool.clone()));

    let owner = common::create_account(&pool, "owner").await;
    let requester = common::create_account(&pool, "requester").await;
    let root_id = common::create_root_link(&pool, "root", "https://t.example/", owner).await;
    let parent = links.find_by_id(root_id).await.unwrap().unwrap();

    let req = repo.create(request(root_id, requester, owner)).await.unwrap();
    repo.approve(req.id, NewLink::referral("once".to_string(), &parent, requester))
        .await
        .unwrap();

    // A second approval must not insert another link.
    let again = repo
        .approve(req.id, NewLink::referral("twice".to_string(), &parent, requester))
        .await;
    assert!(matches!(again.unwrap_err(), AppError::Validation { .. }));

    let decline = repo.decline(req.id).await;
    assert!(matches!(decline.unwrap_err(), AppError::Validation { .. }));

    let referral_links: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE root_link_id = $1")
            .bind(root_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(referral_links, 1);
}

#[sqlx::test]
async fn test_alias_collision_rolls_back_approval(pool: PgPool) {
    let links = PgLinkRepository::new(Arc::new(pool.clone()));
    let repo = PgReferralRequestRepository::new(Arc::new(pool.clone()));

    let owner = common::create_account(&pool, "owner").await;
    let requester = common::create_account(&pool, "requester").await;
    let root_id = common::create_root_link(&pool, "root", "https://t.example/", owner).await;
    common::create_root_link(&pool, "taken", "https://other.example/", owner).await;
    let parent = links.find_by_id(root_id).await.unwrap().unwrap();

    let req = repo.create(request(root_id, requester, owner)).await.unwrap();

    let result = repo
        .approve(req.id, NewLink::referral("taken".to_string(), &parent, requester))
        .await;
    assert!(matches!(result.unwrap_err(), AppError::AliasConflict { .. }));

    // The status flip rolled back with the insert; the request stays pending.
    let stored = repo.find_by_id(req.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
}

#[sqlx::test]
async fn test_approval_allowed_when_requester_already_targets_same_url(pool: PgPool) {
    let links = PgLinkRepository::new(Arc::new(pool.clone()));
    let repo = PgReferralRequestRepository::new(Arc::new(pool.clone()));

    let owner = common::create_account(&pool, "owner").await;
    let requester = common::create_account(&pool, "requester").await;
    let root_id = common::create_root_link(&pool, "root", "https://shared.example/", owner).await;
    let parent = links.find_by_id(root_id).await.unwrap().unwrap();

    // The requester already shortens the same destination with a link of
    // their own; per-owner target uniqueness only binds root links, so the
    // referral (which copies the parent's target) still goes through.
    common::create_root_link(&pool, "mine", "https://shared.example/", requester).await;

    let req = repo.create(request(root_id, requester, owner)).await.unwrap();

    let link = repo
        .approve(req.id, NewLink::referral("partner".to_string(), &parent, requester))
        .await
        .unwrap();

    assert!(link.is_referral);
    assert_eq!(link.owner_id, Some(requester));
    assert_eq!(link.target_url, "https://shared.example/");

    let stored = repo.find_by_id(req.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
}
