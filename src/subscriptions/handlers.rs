use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    error::ApiError,
    plans::repo::Plan,
    state::AppState,
    subscriptions::{
        dto::{SubscribedResponse, SubscriptionWithPlan},
        repo::{compute_end_date, Subscription},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe/:plan_id", post(subscribe))
        .route("/my-subscription", get(my_subscription))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn subscribe(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(plan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubscribedResponse>), ApiError> {
    let plan = Plan::find_by_id(&state.db, plan_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Plan not found".into()))?;

    let start_date = OffsetDateTime::now_utc();
    let end_date = compute_end_date(start_date, plan.duration_days);

    // A single insert, nothing to roll back on failure. Repeat calls stack
    // additional rows: one-active-subscription-per-user is not enforced
    // server-side.
    let sub = Subscription::insert(&state.db, user.id, plan.id, start_date, end_date).await?;

    info!(plan_id = %plan.id, subscription_id = %sub.id, "subscription created");
    Ok((
        StatusCode::CREATED,
        Json(SubscribedResponse {
            message: "Subscription created successfully".into(),
            subscription: SubscriptionWithPlan::from_parts(sub, plan),
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn my_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<SubscriptionWithPlan>, ApiError> {
    let row = Subscription::current_for_user(&state.db, user.id)
        .await?
        // Expected empty state, not a failure: the client renders it as
        // "no active subscription".
        .ok_or_else(|| ApiError::NotFound("No active subscription found".into()))?;
    Ok(Json(row.into()))
}
