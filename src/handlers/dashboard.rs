// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::dashboard::DashboardStats,
};

// GET /api/dashboard/stats/
#[utoipa::path(
    get,
    path = "/api/dashboard/stats/",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contagens por status, receita e ticket médio", body = DashboardStats),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .dashboard_service
        .get_stats(&app_state.db_pool, user.0.id, Utc::now())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(stats))
}
