use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    admin::repo::AdminSubscriptionRow,
    auth::repo::{Role, User},
    plans::repo::Plan,
    subscriptions::repo::SubscriptionStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_subscriptions: i64,
    pub active_subscriptions: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: DashboardStats,
}

/// Envelope shared by the admin listings: `{success, count, data}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// User as shown in the admin listing. The password hash is not a field here,
/// so it cannot leak through this surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Subscriber identity embedded in the subscription listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSubscription {
    pub id: Uuid,
    pub user: SubscriberInfo,
    pub plan: Plan,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub status: SubscriptionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<AdminSubscriptionRow> for AdminSubscription {
    fn from(row: AdminSubscriptionRow) -> Self {
        Self {
            id: row.id,
            user: SubscriberInfo {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                role: row.user_role,
            },
            plan: Plan {
                id: row.plan_id,
                name: row.plan_name,
                price: row.plan_price,
                features: row.plan_features,
                duration_days: row.plan_duration_days,
                created_at: row.plan_created_at,
            },
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status,
            created_at: row.created_at,
        }
    }
}
