#![allow(dead_code)]

use sqlx::PgPool;

pub async fn create_account(pool: &PgPool, username: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO accounts (username, display_name, password_hash) \
         VALUES ($1, $1, 'x') RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_root_link(pool: &PgPool, short_id: &str, target: &str, owner_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (short_id, target_url, owner_id, allow_referrals) \
         VALUES ($1, $2, $3, TRUE) RETURNING id",
    )
    .bind(short_id)
    .bind(target)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_referral_link(
    pool: &PgPool,
    short_id: &str,
    target: &str,
    root_id: i64,
    referrer_id: i64,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (short_id, target_url, owner_id, is_referral, root_link_id, referrer_id) \
         VALUES ($1, $2, $3, TRUE, $4, $3) RETURNING id",
    )
    .bind(short_id)
    .bind(target)
    .bind(referrer_id)
    .bind(root_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_expired_link(pool: &PgPool, short_id: &str, owner_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (short_id, target_url, owner_id, expires_at) \
         VALUES ($1, 'https://expired.example/', $2, NOW() - INTERVAL '1 hour') RETURNING id",
    )
    .bind(short_id)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_visit(pool: &PgPool, link_id: i64, ip: &str) {
    sqlx::query("INSERT INTO visits (link_id, ip_address) VALUES ($1, $2)")
        .bind(link_id)
        .bind(ip)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn count_rows(pool: &PgPool, sql: &str, id: i64) -> i64 {
    sqlx::query_scalar(sql).bind(id).fetch_one(pool).await.unwrap()
}
