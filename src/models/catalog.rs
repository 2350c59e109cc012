// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- SERVIÇOS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[schema(example = 1)]
    pub id: i64,
    #[serde(skip)]
    pub professional_id: Uuid,
    #[schema(example = "Instalação de chuveiro")]
    pub name: String,
    pub description: String,
    #[schema(example = "100.00")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório (máx. 100 caracteres)."))]
    #[schema(example = "Instalação de chuveiro")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "100.00")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "120.00")]
    pub price: Option<Decimal>,
}

impl ServicePatch {
    pub fn merge_into(self, current: &Service) -> ServicePayload {
        ServicePayload {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            price: self.price.unwrap_or(current.price),
        }
    }
}

// --- MATERIAIS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[schema(example = 1)]
    pub id: i64,
    #[serde(skip)]
    pub professional_id: Uuid,
    #[schema(example = "Cabo flexível 2,5mm")]
    pub name: String,
    pub description: String,
    #[schema(example = "15.00")]
    pub unit_price: Decimal,
    #[schema(example = "m")]
    pub unit_of_measure: String,
    #[schema(example = "Casa do Eletricista")]
    pub store: String,
}

fn default_unit() -> String {
    "un".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório (máx. 100 caracteres)."))]
    #[schema(example = "Cabo flexível 2,5mm")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "15.00")]
    pub unit_price: Decimal,

    #[serde(default = "default_unit")]
    #[validate(length(max = 20, message = "A unidade deve ter no máximo 20 caracteres."))]
    #[schema(example = "m")]
    pub unit_of_measure: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "A loja deve ter no máximo 100 caracteres."))]
    pub store: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "15.00")]
    pub unit_price: Option<Decimal>,
    pub unit_of_measure: Option<String>,
    pub store: Option<String>,
}

impl MaterialPatch {
    pub fn merge_into(self, current: &Material) -> MaterialPayload {
        MaterialPayload {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            unit_price: self.unit_price.unwrap_or(current.unit_price),
            unit_of_measure: self.unit_of_measure.unwrap_or_else(|| current.unit_of_measure.clone()),
            store: self.store.unwrap_or_else(|| current.store.clone()),
        }
    }
}

/// Preços: não negativos, no máximo 2 casas e cabendo em NUMERIC(10,2).
fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    let max = Decimal::new(9_999_999_999, 2);
    if *value < Decimal::ZERO || value.normalize().scale() > 2 || *value > max {
        let mut err = ValidationError::new("invalid_money");
        err.message = Some("Informe um valor não negativo com até 2 casas decimais.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(price: Decimal) -> ServicePayload {
        ServicePayload { name: "Visita".into(), description: String::new(), price }
    }

    #[test]
    fn price_accepts_two_decimal_places() {
        assert!(service(Decimal::new(10000, 2)).validate().is_ok());
        assert!(service(Decimal::ZERO).validate().is_ok());
        // 1.500 normaliza para 1.5
        assert!(service(Decimal::new(1500, 3)).validate().is_ok());
    }

    #[test]
    fn price_rejects_negative_and_fractions_of_cents() {
        assert!(service(Decimal::new(-1, 0)).validate().is_err());
        assert!(service(Decimal::new(1001, 3)).validate().is_err());
    }

    #[test]
    fn material_unit_defaults_to_un() {
        let payload: MaterialPayload =
            serde_json::from_str(r#"{"name": "Fita isolante", "unitPrice": "7.50"}"#).unwrap();
        assert_eq!(payload.unit_of_measure, "un");
        assert_eq!(payload.store, "");
        assert_eq!(payload.unit_price, Decimal::new(750, 2));
    }
}
