// src/handlers/payments.rs

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
    models::{
        payment::{CreatePaymentPayload, PaymentView},
        work_order::OrderFilter,
    },
};

#[utoipa::path(
    get,
    path = "/api/pagamentos/",
    tag = "Pagamentos",
    params(OrderFilter),
    responses((status = 200, description = "Pagamentos, mais recentes primeiro", body = Vec<PaymentView>)),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .payment_service
        .list(&app_state.db_pool, user.0.id, filter.ordem)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(payments))
}

#[utoipa::path(
    post,
    path = "/api/pagamentos/",
    tag = "Pagamentos",
    request_body = CreatePaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = PaymentView),
        (status = 400, description = "Valor inválido, acima do pendente ou ordem encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    AppJson(payload): AppJson<CreatePaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let payment = app_state
        .payment_service
        .create(&app_state.db_pool, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos/{id}/",
    tag = "Pagamentos",
    params(("id" = i64, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento", body = PaymentView),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .payment_service
        .get(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(payment))
}

#[utoipa::path(
    delete,
    path = "/api/pagamentos/{id}/",
    tag = "Pagamentos",
    params(("id" = i64, Path, description = "ID do pagamento")),
    responses(
        (status = 204, description = "Pagamento excluído; ordem paga com saldo volta a finalizada"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .payment_service
        .delete(&app_state.db_pool, user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
