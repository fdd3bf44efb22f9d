use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::auth::middleware::AuthUser;
use crate::dto::{ActionResult, AnalyticsQuery};
use crate::services::analytics::{compute_analytics, Analytics, Period};
use crate::AppState;

pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> Json<ActionResult<Analytics>> {
    let period = Period::from_code(query.period.as_deref());

    Json(
        compute_analytics(
            state.store.as_ref(),
            &auth_user.external_id,
            period,
            Utc::now(),
        )
        .await,
    )
}
