// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::AppJson},
    models::catalog::{Material, MaterialPatch, MaterialPayload, Service, ServicePatch, ServicePayload},
};

// ---
// SERVIÇOS
// ---

#[utoipa::path(
    get,
    path = "/api/servicos/",
    tag = "Serviços",
    responses((status = 200, description = "Serviços do profissional", body = Vec<Service>)),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let services = app_state
        .catalog_service
        .list_services(&app_state.db_pool, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(services))
}

#[utoipa::path(
    post,
    path = "/api/servicos/",
    tag = "Serviços",
    request_body = ServicePayload,
    responses(
        (status = 201, description = "Serviço criado", body = Service),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<ServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .create_service(&app_state.db_pool, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(service)))
}

#[utoipa::path(
    get,
    path = "/api/servicos/{id}/",
    tag = "Serviços",
    params(("id" = i64, Path, description = "ID do serviço")),
    responses(
        (status = 200, description = "Serviço", body = Service),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let service = app_state
        .catalog_service
        .get_service(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(service))
}

#[utoipa::path(
    put,
    path = "/api/servicos/{id}/",
    tag = "Serviços",
    params(("id" = i64, Path, description = "ID do serviço")),
    request_body = ServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<ServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .update_service(&app_state.db_pool, user.0.id, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(service))
}

#[utoipa::path(
    patch,
    path = "/api/servicos/{id}/",
    tag = "Serviços",
    params(("id" = i64, Path, description = "ID do serviço")),
    request_body = ServicePatch,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn patch_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<ServicePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let service = app_state
        .catalog_service
        .patch_service(&app_state.db_pool, user.0.id, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(service))
}

#[utoipa::path(
    delete,
    path = "/api/servicos/{id}/",
    tag = "Serviços",
    params(("id" = i64, Path, description = "ID do serviço")),
    responses(
        (status = 204, description = "Serviço excluído"),
        (status = 400, description = "Serviço usado em ordens de serviço"),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_service(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// MATERIAIS
// ---

#[utoipa::path(
    get,
    path = "/api/materiais/",
    tag = "Materiais",
    responses((status = 200, description = "Materiais do profissional", body = Vec<Material>)),
    security(("api_jwt" = []))
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let materials = app_state
        .catalog_service
        .list_materials(&app_state.db_pool, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(materials))
}

#[utoipa::path(
    post,
    path = "/api/materiais/",
    tag = "Materiais",
    request_body = MaterialPayload,
    responses(
        (status = 201, description = "Material criado", body = Material),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<MaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let material = app_state
        .catalog_service
        .create_material(&app_state.db_pool, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(material)))
}

#[utoipa::path(
    get,
    path = "/api/materiais/stores/",
    tag = "Materiais",
    responses((status = 200, description = "Lojas já cadastradas, em ordem alfabética", body = Vec<String>)),
    security(("api_jwt" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let stores = app_state
        .catalog_service
        .list_stores(&app_state.db_pool, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(stores))
}

#[utoipa::path(
    get,
    path = "/api/materiais/{id}/",
    tag = "Materiais",
    params(("id" = i64, Path, description = "ID do material")),
    responses(
        (status = 200, description = "Material", body = Material),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let material = app_state
        .catalog_service
        .get_material(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(material))
}

#[utoipa::path(
    put,
    path = "/api/materiais/{id}/",
    tag = "Materiais",
    params(("id" = i64, Path, description = "ID do material")),
    request_body = MaterialPayload,
    responses(
        (status = 200, description = "Material atualizado", body = Material),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<MaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let material = app_state
        .catalog_service
        .update_material(&app_state.db_pool, user.0.id, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(material))
}

#[utoipa::path(
    patch,
    path = "/api/materiais/{id}/",
    tag = "Materiais",
    params(("id" = i64, Path, description = "ID do material")),
    request_body = MaterialPatch,
    responses(
        (status = 200, description = "Material atualizado", body = Material),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn patch_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<MaterialPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let material = app_state
        .catalog_service
        .patch_material(&app_state.db_pool, user.0.id, id, patch)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(material))
}

#[utoipa::path(
    delete,
    path = "/api/materiais/{id}/",
    tag = "Materiais",
    params(("id" = i64, Path, description = "ID do material")),
    responses(
        (status = 204, description = "Material excluído"),
        (status = 400, description = "Material usado em ordens de serviço"),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_material(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
