// src/handlers/work_orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::AppJson},
    models::work_order::{AgendaEntry, WorkOrderDetail, WorkOrderPatch, WorkOrderPayload},
};

#[utoipa::path(
    get,
    path = "/api/ordens/",
    tag = "Ordens de Serviço",
    responses(
        (status = 200, description = "Ordens do profissional, mais recentes primeiro", body = Vec<WorkOrderDetail>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .work_order_service
        .list(&app_state.db_pool, user.0.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(orders))
}

#[utoipa::path(
    post,
    path = "/api/ordens/",
    tag = "Ordens de Serviço",
    request_body = WorkOrderPayload,
    responses(
        (status = 201, description = "Ordem criada em aberto", body = WorkOrderDetail),
        (status = 400, description = "Dados inválidos, referência inexistente ou conflito de agenda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<WorkOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let order = app_state
        .work_order_service
        .create(&app_state.db_pool, user.0.id, &payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/ordens/agenda/",
    tag = "Ordens de Serviço",
    responses((status = 200, description = "Eventos de calendário das ordens agendadas", body = Vec<AgendaEntry>)),
    security(("api_jwt" = []))
)]
pub async fn agenda(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .work_order_service
        .agenda(&app_state.db_pool, user.0.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/ordens/{id}/",
    tag = "Ordens de Serviço",
    params(("id" = i64, Path, description = "ID da ordem")),
    responses(
        (status = 200, description = "Ordem com valores calculados", body = WorkOrderDetail),
        (status = 404, description = "Ordem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .work_order_service
        .get(&app_state.db_pool, user.0.id, id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/api/ordens/{id}/",
    tag = "Ordens de Serviço",
    params(("id" = i64, Path, description = "ID da ordem")),
    request_body = WorkOrderPayload,
    responses(
        (status = 200, description = "Ordem atualizada", body = WorkOrderDetail),
        (status = 400, description = "Dados inválidos, referência inexistente ou conflito de agenda"),
        (status = 404, description = "Ordem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<WorkOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let order = app_state
        .work_order_service
        .update(&app_state.db_pool, user.0.id, id, &payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(order))
}

#[utoipa::path(
    patch,
    path = "/api/ordens/{id}/",
    tag = "Ordens de Serviço",
    params(("id" = i64, Path, description = "ID da ordem")),
    request_body = WorkOrderPatch,
    responses(
        (status = 200, description = "Ordem atualizada", body = WorkOrderDetail),
        (status = 400, description = "Dados inválidos, referência inexistente ou conflito de agenda"),
        (status = 404, description = "Ordem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn patch_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<WorkOrderPatch>,
) -> Result<impl IntoResponse, ApiError> {
    patch
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let order = app_state
        .work_order_service
        .patch(&app_state.db_pool, user.0.id, id, patch, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/ordens/{id}/",
    tag = "Ordens de Serviço",
    params(("id" = i64, Path, description = "ID da ordem")),
    responses(
        (status = 204, description = "Ordem excluída com seus pagamentos e materiais"),
        (status = 404, description = "Ordem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .work_order_service
        .delete(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/ordens/{id}/finalizar/",
    tag = "Ordens de Serviço",
    params(("id" = i64, Path, description = "ID da ordem")),
    responses(
        (status = 200, description = "Ordem finalizada (FINISHED ou PAID)", body = WorkOrderDetail),
        (status = 400, description = "A ordem não pode ser finalizada no status atual"),
        (status = 404, description = "Ordem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn finalize_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .work_order_service
        .finalize(&app_state.db_pool, user.0.id, id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/ordens/{id}/cancelar/",
    tag = "Ordens de Serviço",
    params(("id" = i64, Path, description = "ID da ordem")),
    responses(
        (status = 200, description = "Ordem cancelada", body = WorkOrderDetail),
        (status = 400, description = "A ordem já está encerrada"),
        (status = 404, description = "Ordem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .work_order_service
        .cancel(&app_state.db_pool, user.0.id, id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(order))
}
