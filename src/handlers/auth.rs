// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, json::AppJson},
    models::auth::{AccessToken, RefreshPayload, RegisterUserPayload, TokenPair, TokenPayload, User},
};

// Handler de registro
#[utoipa::path(
    post,
    path = "/api/user/register/",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Profissional registrado", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Usuário ou e-mail já existe")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .register_user(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/token/",
    tag = "Auth",
    request_body = TokenPayload,
    responses(
        (status = 200, description = "Par de tokens", body = TokenPair),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn obtain_token(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<TokenPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let pair = app_state
        .auth_service
        .login_user(&app_state.db_pool, &payload.username, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(pair))
}

#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    tag = "Auth",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "Novo access token", body = AccessToken),
        (status = 401, description = "Refresh token inválido ou expirado")
    )
)]
pub async fn refresh_token(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<RefreshPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let access = app_state
        .auth_service
        .refresh(&app_state.db_pool, &payload.refresh)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(access))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/user/me/",
    tag = "Auth",
    responses(
        (status = 200, description = "Profissional autenticado", body = User),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
