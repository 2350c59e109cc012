// src/models/work_order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{
    catalog::{Material, Service},
    client::Client,
    payment::PaymentView,
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    Open,
    InProgress,
    Finished,
    Paid,
    Canceled,
}

impl WorkOrderStatus {
    /// Paid e Canceled não aceitam mais transições.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkOrderStatus::Paid | WorkOrderStatus::Canceled)
    }

    /// Ordens que ainda ocupam a agenda do profissional.
    pub fn blocks_schedule(self) -> bool {
        matches!(self, WorkOrderStatus::Open | WorkOrderStatus::InProgress)
    }

    pub fn is_completed(self) -> bool {
        matches!(self, WorkOrderStatus::Finished | WorkOrderStatus::Paid)
    }

    /// Cor usada na visão de calendário.
    pub fn color(self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "#0288d1",
            WorkOrderStatus::InProgress => "#ed6c02",
            WorkOrderStatus::Finished => "#ed6c02",
            WorkOrderStatus::Paid => "#2e7d32",
            WorkOrderStatus::Canceled => "#d32f2f",
        }
    }
}

/// Status exibido: uma ordem gravada como Open cujo horário agendado já chegou
/// aparece como InProgress. O valor gravado não muda.
pub fn effective_status(
    stored: WorkOrderStatus,
    scheduled_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> WorkOrderStatus {
    match (stored, scheduled_at) {
        (WorkOrderStatus::Open, Some(start)) if now >= start => WorkOrderStatus::InProgress,
        _ => stored,
    }
}

// --- Registros ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    #[schema(example = 12)]
    pub id: i64,
    #[serde(skip)]
    pub professional_id: uuid::Uuid,
    pub client_id: i64,
    pub status: WorkOrderStatus,
    pub opened_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[schema(example = "2.50")]
    pub estimated_duration_hours: Option<Decimal>,
    pub finished_at: Option<DateTime<Utc>>,
    #[schema(example = "Rua das Flores, 123")]
    pub service_address: String,
    pub notes: String,
    #[schema(example = "130.00")]
    pub total_value: Decimal,
}

impl WorkOrder {
    pub fn effective_status(&self, now: DateTime<Utc>) -> WorkOrderStatus {
        effective_status(self.status, self.scheduled_at, now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    pub id: i64,
    pub work_order_id: i64,
    pub material_id: i64,
    #[schema(example = 2)]
    pub quantity: i32,
}

/// Linha de material com o cadastro embutido, como aparece na ordem.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsageDetail {
    pub id: i64,
    pub work_order_id: i64,
    pub material: Material,
    pub quantity: i32,
    #[schema(example = "30.00")]
    pub line_value: Decimal,
}

/// Vínculo ordem × serviço, usado para montar várias ordens de uma vez.
#[derive(Debug, Clone, FromRow)]
pub struct OrderServiceRow {
    pub work_order_id: i64,
    #[sqlx(flatten)]
    pub service: Service,
}

/// Linha de material já com o cadastro, para montar várias ordens de uma vez.
#[derive(Debug, Clone, FromRow)]
pub struct OrderMaterialRow {
    pub usage_id: i64,
    pub work_order_id: i64,
    pub quantity: i32,
    #[sqlx(flatten)]
    pub material: Material,
}

/// Valores derivados da composição e dos pagamentos atuais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderValues {
    #[schema(example = "100.00")]
    pub services_value: Decimal,
    #[schema(example = "30.00")]
    pub materials_value: Decimal,
    #[schema(example = "130.00")]
    pub total_value: Decimal,
    #[schema(example = "50.00")]
    pub paid_value: Decimal,
    #[schema(example = "80.00")]
    pub pending_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDetail {
    pub id: i64,
    pub client: Client,
    pub services: Vec<Service>,
    pub material_usages: Vec<MaterialUsageDetail>,
    pub payments: Vec<PaymentView>,
    /// Status exibido (considera o horário agendado)
    pub status: WorkOrderStatus,
    /// Status gravado
    pub stored_status: WorkOrderStatus,
    pub opened_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[schema(example = "2.50")]
    pub estimated_duration_hours: Option<Decimal>,
    pub finished_at: Option<DateTime<Utc>>,
    pub service_address: String,
    pub notes: String,
    #[serde(flatten)]
    pub values: OrderValues,
}

/// Ordem agendada com o nome do cliente (checagem de conflito e agenda).
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledOrder {
    pub id: i64,
    pub client_name: String,
    pub status: WorkOrderStatus,
    pub scheduled_at: DateTime<Utc>,
    pub estimated_duration_hours: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntry {
    pub id: i64,
    #[schema(example = "OS #12 - Maria da Silva")]
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    #[schema(example = "/ordens/12")]
    pub url: String,
    #[schema(example = "#0288d1")]
    pub color: String,
    pub status: WorkOrderStatus,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLinePayload {
    pub material_id: i64,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderPayload {
    pub client_id: i64,

    #[serde(default)]
    #[schema(example = json!([1, 2]))]
    pub service_ids: Vec<i64>,

    /// Ausente mantém os materiais utilizados atuais; `[]` remove todos.
    #[serde(default)]
    #[validate(nested)]
    pub materials: Option<Vec<MaterialLinePayload>>,

    pub scheduled_at: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_duration"))]
    #[schema(example = "2.50")]
    pub estimated_duration_hours: Option<Decimal>,

    #[serde(default)]
    #[validate(length(max = 255, message = "O endereço deve ter no máximo 255 caracteres."))]
    pub service_address: String,

    #[serde(default)]
    pub notes: String,
}

/// PATCH: campos ausentes ficam como estão; `null` limpa os opcionais.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderPatch {
    pub client_id: Option<i64>,

    pub service_ids: Option<Vec<i64>>,

    #[validate(nested)]
    pub materials: Option<Vec<MaterialLinePayload>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub scheduled_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, example = "2.50")]
    pub estimated_duration_hours: Option<Option<Decimal>>,

    #[validate(length(max = 255, message = "O endereço deve ter no máximo 255 caracteres."))]
    pub service_address: Option<String>,

    pub notes: Option<String>,
}

impl WorkOrderPatch {
    /// Mescla com a ordem atual e seus serviços; o resultado passa pela validação do PUT.
    /// Materiais ausentes seguem ausentes, e os utilizados atuais não são tocados.
    pub fn merge_into(self, current: &WorkOrder, current_service_ids: Vec<i64>) -> WorkOrderPayload {
        WorkOrderPayload {
            client_id: self.client_id.unwrap_or(current.client_id),
            service_ids: self.service_ids.unwrap_or(current_service_ids),
            materials: self.materials,
            scheduled_at: self.scheduled_at.unwrap_or(current.scheduled_at),
            estimated_duration_hours: self
                .estimated_duration_hours
                .unwrap_or(current.estimated_duration_hours),
            service_address: self.service_address.unwrap_or_else(|| current.service_address.clone()),
            notes: self.notes.unwrap_or_else(|| current.notes.clone()),
        }
    }
}

/// Duração em horas: não negativa, até 2 casas, cabendo em NUMERIC(5,2).
fn validate_duration(value: &Decimal) -> Result<(), validator::ValidationError> {
    if *value < Decimal::ZERO || value.normalize().scale() > 2 || *value > Decimal::new(99_999, 2) {
        let mut err = validator::ValidationError::new("invalid_duration");
        err.message = Some("A duração deve ser um número de horas entre 0 e 999,99.".into());
        return Err(err);
    }
    Ok(())
}

/// Distingue campo ausente (None) de `null` explícito (Some(None)).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialUsagePayload {
    pub work_order_id: i64,
    pub material_id: i64,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsagePatch {
    pub material_id: Option<i64>,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: Option<i32>,
}

/// Filtro `?ordem=<id>` das listagens ligadas a uma ordem.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub ordem: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn open_order_past_its_start_is_shown_in_progress() {
        let now = Utc::now();
        let start = now - Duration::minutes(5);
        assert_eq!(
            effective_status(WorkOrderStatus::Open, Some(start), now),
            WorkOrderStatus::InProgress
        );
        assert_eq!(
            effective_status(WorkOrderStatus::Open, Some(now), now),
            WorkOrderStatus::InProgress
        );
    }

    #[test]
    fn open_order_before_start_or_unscheduled_stays_open() {
        let now = Utc::now();
        assert_eq!(
            effective_status(WorkOrderStatus::Open, Some(now + Duration::hours(1)), now),
            WorkOrderStatus::Open
        );
        assert_eq!(effective_status(WorkOrderStatus::Open, None, now), WorkOrderStatus::Open);
    }

    #[test]
    fn other_stored_statuses_are_shown_as_is() {
        let now = Utc::now();
        let past = Some(now - Duration::days(1));
        for status in [
            WorkOrderStatus::InProgress,
            WorkOrderStatus::Finished,
            WorkOrderStatus::Paid,
            WorkOrderStatus::Canceled,
        ] {
            assert_eq!(effective_status(status, past, now), status);
        }
    }

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let cleared: WorkOrderPatch =
            serde_json::from_str(r#"{"scheduledAt": null, "notes": "x"}"#).unwrap();
        assert_eq!(cleared.scheduled_at, Some(None));
        assert_eq!(cleared.estimated_duration_hours, None);

        let untouched: WorkOrderPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(untouched.scheduled_at, None);
    }

    #[test]
    fn patch_merge_clears_schedule_but_keeps_composition() {
        let now = Utc::now();
        let current = WorkOrder {
            id: 9,
            professional_id: uuid::Uuid::new_v4(),
            client_id: 4,
            status: WorkOrderStatus::Open,
            opened_at: now,
            scheduled_at: Some(now),
            estimated_duration_hours: Some(Decimal::new(2, 0)),
            finished_at: None,
            service_address: "Rua A".into(),
            notes: String::new(),
            total_value: Decimal::new(13000, 2),
        };
        let patch: WorkOrderPatch = serde_json::from_str(r#"{"scheduledAt": null}"#).unwrap();

        let merged = patch.merge_into(&current, vec![1]);
        assert_eq!(merged.scheduled_at, None);
        assert_eq!(merged.estimated_duration_hours, Some(Decimal::new(2, 0)));
        assert_eq!(merged.service_ids, vec![1]);
        assert!(merged.materials.is_none());
        assert_eq!(merged.client_id, 4);

        let patch: WorkOrderPatch =
            serde_json::from_str(r#"{"materials": [{"materialId": 5, "quantity": 2}]}"#).unwrap();
        let merged = patch.merge_into(&current, vec![1]);
        assert_eq!(merged.materials.map(|lines| lines.len()), Some(1));
    }

    #[test]
    fn payload_without_materials_leaves_them_unset() {
        let payload: WorkOrderPayload = serde_json::from_str(r#"{"clientId": 1}"#).unwrap();
        assert!(payload.materials.is_none());

        let payload: WorkOrderPayload = serde_json::from_str(r#"{"clientId": 1, "materials": []}"#).unwrap();
        assert_eq!(payload.materials.map(|lines| lines.len()), Some(0));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let payload: WorkOrderPayload =
            serde_json::from_str(r#"{"clientId": 1, "estimatedDurationHours": "-1"}"#).unwrap();
        assert!(payload.validate().is_err());

        let payload: WorkOrderPayload =
            serde_json::from_str(r#"{"clientId": 1, "estimatedDurationHours": 2.5}"#).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&WorkOrderStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }
}
