// src/models/client.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[schema(example = 1)]
    pub id: i64,

    #[serde(skip)]
    pub professional_id: Uuid,

    #[schema(example = "Maria da Silva")]
    pub name: String,
    #[schema(example = "maria@email.com")]
    pub email: String,
    #[schema(example = "(11) 99999-8888")]
    pub phone: String,
    #[schema(example = "Rua das Flores, 123")]
    pub address: String,
    #[schema(example = "Portão azul")]
    pub reference_point: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório (máx. 100 caracteres)."))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    // Vazio é aceito; se vier preenchido precisa ser um e-mail
    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 20, message = "O telefone deve ter no máximo 20 caracteres."))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "O endereço deve ter no máximo 255 caracteres."))]
    pub address: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "O ponto de referência deve ter no máximo 255 caracteres."))]
    pub reference_point: String,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub reference_point: Option<String>,
    pub notes: Option<String>,
}

impl ClientPatch {
    /// Aplica o patch sobre o registro atual; o resultado passa pela mesma validação do PUT.
    pub fn merge_into(self, current: &Client) -> ClientPayload {
        ClientPayload {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            phone: self.phone.unwrap_or_else(|| current.phone.clone()),
            address: self.address.unwrap_or_else(|| current.address.clone()),
            reference_point: self.reference_point.unwrap_or_else(|| current.reference_point.clone()),
            notes: self.notes.unwrap_or_else(|| current.notes.clone()),
        }
    }
}

fn validate_optional_email(email: &str) -> Result<(), validator::ValidationError> {
    use validator::ValidateEmail;

    if email.is_empty() || email.validate_email() {
        return Ok(());
    }
    let mut err = validator::ValidationError::new("email");
    err.message = Some("O e-mail fornecido é inválido.".into());
    Err(err)
}

/// Totais de um cliente (relatório do dashboard).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub client_id: i64,
    #[schema(example = "Maria da Silva")]
    pub client_name: String,
    #[schema(example = 3)]
    pub completed_orders: i64,
    #[schema(example = "450.00")]
    pub total_invoiced: Decimal,
    #[schema(example = "300.00")]
    pub total_paid: Decimal,
    #[schema(example = "150.00")]
    pub total_pending: Decimal,
}

/// Uma ordem do cliente com o quanto já foi pago.
#[derive(Debug, Clone, FromRow)]
pub struct ClientOrderBalance {
    pub status: crate::models::work_order::WorkOrderStatus,
    pub total_value: Decimal,
    pub paid_value: Decimal,
}
