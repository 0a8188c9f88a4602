use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{error::ApiError, plans::repo::Plan, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/plans", get(list_plans))
}

/// Public catalog listing. No auth: anonymous visitors browse plans too.
#[instrument(skip(state))]
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<Plan>>, ApiError> {
    let plans = Plan::list_all(&state.db).await?;
    Ok(Json(plans))
}
