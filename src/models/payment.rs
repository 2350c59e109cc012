// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    Cash,
    CreditCard,
    DebitCard,
    Boleto,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::Boleto => "Boleto",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[schema(example = 1)]
    pub id: i64,
    pub work_order_id: i64,
    #[schema(example = "130.00")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

/// Pagamento como exibido pela API (inclui o rótulo da forma de pagamento).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    #[schema(example = "Pix")]
    pub method_label: String,
}

impl From<Payment> for PaymentView {
    fn from(payment: Payment) -> Self {
        let method_label = payment.method.label().to_string();
        PaymentView { payment, method_label }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentPayload {
    pub work_order_id: i64,
    // Positividade e saldo são regras de negócio, checadas no serviço
    #[validate(custom(function = "validate_cents"))]
    #[schema(example = "130.00")]
    pub amount: Decimal,
    pub method: PaymentMethod,
}

fn validate_cents(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > 2 {
        let mut err = ValidationError::new("invalid_money");
        err.message = Some("O valor deve ter no máximo 2 casas decimais.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_carries_method_label() {
        let payment = Payment {
            id: 1,
            work_order_id: 7,
            amount: Decimal::new(13000, 2),
            method: PaymentMethod::CreditCard,
            paid_at: Utc::now(),
        };
        let json = serde_json::to_value(PaymentView::from(payment)).unwrap();
        assert_eq!(json["method"], "CREDIT_CARD");
        assert_eq!(json["methodLabel"], "Cartão de Crédito");
        assert_eq!(json["amount"], "130.00");
    }

    #[test]
    fn payload_rejects_fractions_of_cents() {
        let payload: CreatePaymentPayload =
            serde_json::from_str(r#"{"workOrderId": 1, "amount": "10.005", "method": "PIX"}"#).unwrap();
        assert!(payload.validate().is_err());

        let payload: CreatePaymentPayload =
            serde_json::from_str(r#"{"workOrderId": 1, "amount": 130, "method": "CASH"}"#).unwrap();
        assert!(payload.validate().is_ok());
    }
}
