// src/handlers/material_usages.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::AppJson},
    models::work_order::{CreateMaterialUsagePayload, MaterialUsageDetail, MaterialUsagePatch, OrderFilter},
};

#[utoipa::path(
    get,
    path = "/api/materiais-utilizados/",
    tag = "Materiais Utilizados",
    params(OrderFilter),
    responses((status = 200, description = "Materiais lançados nas ordens", body = Vec<MaterialUsageDetail>)),
    security(("api_jwt" = []))
)]
pub async fn list_usages(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let usages = app_state
        .work_order_service
        .list_usages(&app_state.db_pool, user.0.id, filter.ordem)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(usages))
}

#[utoipa::path(
    post,
    path = "/api/materiais-utilizados/",
    tag = "Materiais Utilizados",
    request_body = CreateMaterialUsagePayload,
    responses(
        (status = 201, description = "Material lançado; total da ordem recalculado", body = MaterialUsageDetail),
        (status = 400, description = "Dados inválidos ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_usage(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<CreateMaterialUsagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let usage = app_state
        .work_order_service
        .create_usage(&app_state.db_pool, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(usage)))
}

#[utoipa::path(
    get,
    path = "/api/materiais-utilizados/{id}/",
    tag = "Materiais Utilizados",
    params(("id" = i64, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento de material", body = MaterialUsageDetail),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_usage(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let usage = app_state
        .work_order_service
        .get_usage(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(usage))
}

// PUT e PATCH compartilham o handler
#[utoipa::path(
    put,
    path = "/api/materiais-utilizados/{id}/",
    tag = "Materiais Utilizados",
    params(("id" = i64, Path, description = "ID do lançamento")),
    request_body = MaterialUsagePatch,
    responses(
        (status = 200, description = "Lançamento atualizado; total da ordem recalculado", body = MaterialUsageDetail),
        (status = 400, description = "Dados inválidos ou referência inexistente"),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_usage(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<MaterialUsagePatch>,
) -> Result<impl IntoResponse, ApiError> {
    patch
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let usage = app_state
        .work_order_service
        .update_usage(&app_state.db_pool, user.0.id, id, &patch)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(usage))
}

#[utoipa::path(
    delete,
    path = "/api/materiais-utilizados/{id}/",
    tag = "Materiais Utilizados",
    params(("id" = i64, Path, description = "ID do lançamento")),
    responses(
        (status = 204, description = "Lançamento excluído; total da ordem recalculado"),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_usage(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .work_order_service
        .delete_usage(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
