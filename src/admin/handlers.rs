use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    admin::{
        dto::{AdminSubscription, DashboardStats, ListResponse, StatsResponse, UserSummary},
        repo,
    },
    auth::extractors::AdminUser,
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/users", get(list_users))
        .route("/subscriptions", get(list_subscriptions))
}

#[instrument(skip(state, _admin))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = DashboardStats {
        total_users: repo::count_users(&state.db).await?,
        total_admins: repo::count_admins(&state.db).await?,
        total_subscriptions: repo::count_subscriptions(&state.db).await?,
        active_subscriptions: repo::count_active_subscriptions(&state.db).await?,
    };

    Ok(Json(StatsResponse {
        success: true,
        data: stats,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ListResponse<UserSummary>>, ApiError> {
    let users = repo::list_users(&state.db).await?;
    let data: Vec<UserSummary> = users.into_iter().map(UserSummary::from).collect();
    Ok(Json(ListResponse::new(data)))
}

#[instrument(skip(state, _admin))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ListResponse<AdminSubscription>>, ApiError> {
    let rows = repo::list_subscriptions(&state.db).await?;
    let data: Vec<AdminSubscription> = rows.into_iter().map(AdminSubscription::from).collect();
    Ok(Json(ListResponse::new(data)))
}
