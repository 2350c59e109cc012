use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{middleware::i18n::Locale, models::work_order::WorkOrderStatus};

/// Entidades expostas pela API, usadas nas mensagens de erro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Client,
    Service,
    Material,
    WorkOrder,
    MaterialUsage,
    Payment,
}

impl Resource {
    fn name(self, locale: &Locale) -> String {
        match self {
            Resource::Client => locale.pick("Cliente", "Client"),
            Resource::Service => locale.pick("Serviço", "Service"),
            Resource::Material => locale.pick("Material", "Material"),
            Resource::WorkOrder => locale.pick("Ordem de serviço", "Work order"),
            Resource::MaterialUsage => locale.pick("Material utilizado", "Material usage"),
            Resource::Payment => locale.pick("Pagamento", "Payment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Corpo ausente, JSON malformado ou com campos faltando/de tipo errado.
    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0:?} {1} não encontrado")]
    ResourceNotFound(Resource, i64),

    /// Um id informado no payload não existe (ou é de outro profissional).
    #[error("{0:?} {1} inválido")]
    InvalidReference(Resource, i64),

    #[error("{0:?} {1} ainda é referenciado")]
    ResourceInUse(Resource, i64),

    #[error("Conflito de agenda com a OS #{order_id}")]
    ScheduleConflict {
        order_id: i64,
        client_name: String,
        local_start: String,
    },

    #[error("Total da ordem acima do limite ({max})")]
    TotalTooLarge { max: Decimal },

    #[error("Valor de pagamento deve ser positivo")]
    InvalidPaymentAmount,

    #[error("Pagamento excede o valor pendente ({pending})")]
    PaymentExceedsPending { pending: Decimal },

    #[error("Ordem sem valor pendente")]
    NothingPending,

    #[error("Ordem {0:?} não aceita pagamentos")]
    OrderClosedForPayments(WorkOrderStatus),

    #[error("Ordem {0:?} não pode ser finalizada")]
    CannotFinalize(WorkOrderStatus),

    #[error("Ordem {0:?} não pode ser cancelada")]
    CannotCancel(WorkOrderStatus),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Erro pronto para a resposta HTTP (status + mensagem já traduzida).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let (status, error) = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: locale.pick("Um ou mais campos são inválidos.", "One or more fields are invalid."),
                    details: Some(json!(details)),
                };
            }
            AppError::InvalidBody(reason) => {
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: locale.pick(
                        "O corpo da requisição é inválido.",
                        "The request body is invalid.",
                    ),
                    details: Some(json!({ "body": [reason] })),
                };
            }
            AppError::UsernameAlreadyExists => (
                StatusCode::CONFLICT,
                locale.pick("Este nome de usuário já está em uso.", "This username is already taken."),
            ),
            AppError::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                locale.pick("Este e-mail já está em uso.", "This e-mail is already in use."),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                locale.pick("Usuário ou senha inválidos.", "Invalid username or password."),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                locale.pick(
                    "Token de autenticação inválido ou ausente.",
                    "Authentication token is invalid or missing.",
                ),
            ),
            AppError::UserNotFound => (
                StatusCode::UNAUTHORIZED,
                locale.pick("Usuário não encontrado.", "User not found."),
            ),
            AppError::ResourceNotFound(resource, id) => (
                StatusCode::NOT_FOUND,
                locale.pick(
                    &format!("{} #{} não encontrado.", resource.name(locale), id),
                    &format!("{} #{} not found.", resource.name(locale), id),
                ),
            ),
            AppError::InvalidReference(resource, id) => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    &format!("{} #{} inválido.", resource.name(locale), id),
                    &format!("{} #{} is invalid.", resource.name(locale), id),
                ),
            ),
            AppError::ResourceInUse(resource, id) => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    &format!(
                        "{} #{} não pode ser excluído pois está vinculado a ordens de serviço.",
                        resource.name(locale), id
                    ),
                    &format!(
                        "{} #{} cannot be deleted because it is referenced by work orders.",
                        resource.name(locale), id
                    ),
                ),
            ),
            AppError::ScheduleConflict { order_id, client_name, local_start } => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    &format!(
                        "Conflito de agenda: a OS #{} ({}) já está agendada para {}.",
                        order_id, client_name, local_start
                    ),
                    &format!(
                        "Schedule conflict: work order #{} ({}) is already scheduled at {}.",
                        order_id, client_name, local_start
                    ),
                ),
            ),
            AppError::TotalTooLarge { max } => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    &format!("O total da ordem não pode passar de R$ {}.", max),
                    &format!("The work order total cannot exceed R$ {}.", max),
                ),
            ),
            AppError::InvalidPaymentAmount => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    "O valor do pagamento deve ser maior que zero.",
                    "Payment amount must be greater than zero.",
                ),
            ),
            AppError::PaymentExceedsPending { pending } => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    &format!("O valor excede o saldo pendente de R$ {}.", pending),
                    &format!("Amount exceeds the pending balance of R$ {}.", pending),
                ),
            ),
            AppError::NothingPending => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    "Esta ordem de serviço não possui valor pendente.",
                    "This work order has no pending balance.",
                ),
            ),
            AppError::OrderClosedForPayments(_) => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    "Ordens pagas ou canceladas não aceitam novos pagamentos.",
                    "Paid or canceled work orders do not accept new payments.",
                ),
            ),
            AppError::CannotFinalize(_) => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    "Somente ordens abertas ou em andamento podem ser finalizadas.",
                    "Only open or in-progress work orders can be finalized.",
                ),
            ),
            AppError::CannotCancel(_) => (
                StatusCode::BAD_REQUEST,
                locale.pick(
                    "Ordens pagas ou canceladas não podem ser canceladas.",
                    "Paid or canceled work orders cannot be canceled.",
                ),
            ),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => (
                StatusCode::NOT_FOUND,
                locale.pick("Registro não encontrado.", "Record not found."),
            ),
            // Banco, bcrypt, JWT e anyhow viram 500; o detalhe só vai para o log.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    locale.pick("Ocorreu um erro inesperado.", "An unexpected error occurred."),
                )
            }
        };

        ApiError { status, error, details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado onde não há Locale à mão (middleware, extratores)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
