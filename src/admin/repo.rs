use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo::Role,
    subscriptions::repo::{ACTIVE_FILTER, SubscriptionStatus},
};

/// One row of the admin subscription listing: subscription joined with the
/// owning user and the plan, flattened for `FromRow`.
#[derive(Debug, Clone, FromRow)]
pub struct AdminSubscriptionRow {
    pub id: Uuid,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub status: SubscriptionStatus,
    pub created_at: OffsetDateTime,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_role: Role,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub plan_price: f64,
    pub plan_features: Vec<String>,
    pub plan_duration_days: i32,
    pub plan_created_at: OffsetDateTime,
}

pub async fn count_users(db: &PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users"#)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn count_admins(db: &PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE role = 'admin'"#)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn count_subscriptions(db: &PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM subscriptions"#)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Same predicate as the user-facing current-subscription lookup: the stored
/// status alone is not trusted once the window has passed.
pub async fn count_active_subscriptions(db: &PgPool) -> anyhow::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM subscriptions WHERE {ACTIVE_FILTER}");
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(db).await?;
    Ok(count)
}

pub async fn list_users(db: &PgPool) -> anyhow::Result<Vec<crate::auth::repo::User>> {
    let users = sqlx::query_as::<_, crate::auth::repo::User>(
        r#"
        SELECT id, name, email, password_hash, role, is_active, created_at
        FROM users
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn list_subscriptions(db: &PgPool) -> anyhow::Result<Vec<AdminSubscriptionRow>> {
    let rows = sqlx::query_as::<_, AdminSubscriptionRow>(
        r#"
        SELECT s.id, s.start_date, s.end_date, s.status, s.created_at,
               u.id AS user_id, u.name AS user_name, u.email AS user_email,
               u.role AS user_role,
               p.id AS plan_id, p.name AS plan_name, p.price AS plan_price,
               p.features AS plan_features, p.duration_days AS plan_duration_days,
               p.created_at AS plan_created_at
        FROM subscriptions s
        JOIN users u ON u.id = s.user_id
        JOIN plans p ON p.id = s.plan_id
        ORDER BY s.created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}
