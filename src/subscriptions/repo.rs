use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// SQL predicate deciding whether a subscription row counts as active. Both
/// conditions are required: nothing reconciles the stored status when a
/// window lapses, so the date check travels with every active-ness query.
/// Spliced into the current-subscription lookup here and into the admin
/// active count.
pub const ACTIVE_FILTER: &str = "status = 'active' AND end_date >= now()";

/// Stored subscription state, the `subscription_status` Postgres enum.
///
/// `expired` exists in storage but is never written by this system: nothing
/// reconciles the stored status when a window lapses. Active-ness is always
/// judged by [`ACTIVE_FILTER`], never by the stored field alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

/// Subscription record. `end_date` is computed once at creation and never
/// recomputed; there is no update path besides date-based reinterpretation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub status: SubscriptionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Subscription joined with its plan, flattened for `FromRow`.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub status: SubscriptionStatus,
    pub created_at: OffsetDateTime,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub plan_price: f64,
    pub plan_features: Vec<String>,
    pub plan_duration_days: i32,
    pub plan_created_at: OffsetDateTime,
}

/// End of the window a plan purchase buys. Exact day arithmetic, not
/// month-approximate: 30 days is 30 * 86400 seconds from the start.
pub fn compute_end_date(start: OffsetDateTime, duration_days: i32) -> OffsetDateTime {
    start + Duration::days(i64::from(duration_days))
}

impl Subscription {
    /// Insert a new subscription with an explicit window. Start and end are
    /// both bound so the stored window is exactly what the caller computed.
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        plan_id: Uuid,
        start_date: OffsetDateTime,
        end_date: OffsetDateTime,
    ) -> anyhow::Result<Subscription> {
        let sub = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, plan_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, 'active')
            RETURNING id, user_id, plan_id, start_date, end_date, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(db)
        .await?;
        Ok(sub)
    }

    /// The user's current subscription, joined with its plan.
    ///
    /// Active-ness comes from [`ACTIVE_FILTER`]. Its unqualified columns
    /// resolve to `subscriptions`: `plans` carries neither `status` nor
    /// `end_date`.
    pub async fn current_for_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Option<SubscriptionPlanRow>> {
        let sql = format!(
            r#"
            SELECT s.id, s.user_id, s.start_date, s.end_date, s.status, s.created_at,
                   p.id AS plan_id, p.name AS plan_name, p.price AS plan_price,
                   p.features AS plan_features, p.duration_days AS plan_duration_days,
                   p.created_at AS plan_created_at
            FROM subscriptions s
            JOIN plans p ON p.id = s.plan_id
            WHERE s.user_id = $1 AND {ACTIVE_FILTER}
            ORDER BY s.created_at DESC
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, SubscriptionPlanRow>(&sql)
            .bind(user_id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn end_date_is_exact_day_arithmetic() {
        let start = datetime!(2026-01-15 10:30:00 UTC);
        let end = compute_end_date(start, 30);
        assert_eq!(end, datetime!(2026-02-14 10:30:00 UTC));
        assert_eq!((end - start).whole_seconds(), 30 * 86_400);
    }

    #[test]
    fn annual_duration_crosses_the_year_boundary_exactly() {
        let start = datetime!(2026-08-25 00:00:00 UTC);
        let end = compute_end_date(start, 365);
        assert_eq!((end - start).whole_days(), 365);
        assert_eq!(end, datetime!(2027-08-25 00:00:00 UTC));
    }

    #[test]
    fn active_filter_checks_status_and_window_together() {
        assert!(ACTIVE_FILTER.contains("status = 'active'"));
        assert!(ACTIVE_FILTER.contains("end_date >= now()"));
        assert!(ACTIVE_FILTER.contains(" AND "));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::Active).unwrap(),
            r#""active""#
        );
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::Cancelled).unwrap(),
            r#""cancelled""#
        );
        let status: SubscriptionStatus = serde_json::from_str(r#""expired""#).unwrap();
        assert_eq!(status, SubscriptionStatus::Expired);
    }
}
