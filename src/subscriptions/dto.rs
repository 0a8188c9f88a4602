use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    plans::repo::Plan,
    subscriptions::repo::{Subscription, SubscriptionPlanRow, SubscriptionStatus},
};

/// A subscription with its plan inlined, the shape every subscription
/// endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionWithPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: Plan,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub status: SubscriptionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SubscriptionWithPlan {
    /// Build from a freshly inserted record and the plan already in hand.
    pub fn from_parts(sub: Subscription, plan: Plan) -> Self {
        Self {
            id: sub.id,
            user_id: sub.user_id,
            plan,
            start_date: sub.start_date,
            end_date: sub.end_date,
            status: sub.status,
            created_at: sub.created_at,
        }
    }
}

impl From<SubscriptionPlanRow> for SubscriptionWithPlan {
    fn from(row: SubscriptionPlanRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
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

/// Response for a successful subscribe call.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribedResponse {
    pub message: String,
    pub subscription: SubscriptionWithPlan,
}
