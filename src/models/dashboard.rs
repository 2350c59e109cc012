// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::work_order::WorkOrderStatus;

/// Contagem de ordens por status exibido.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total_orders: i64,
    /// Abertas e ainda não iniciadas
    pub open_orders: i64,
    pub in_progress_orders: i64,
    /// Finalizadas com saldo pendente
    pub finished_pending_orders: i64,
    pub paid_orders: i64,
    /// Finalizadas + pagas
    pub completed_orders: i64,
    pub canceled_orders: i64,
}

// Os cards do dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(flatten)]
    pub orders: StatusCounts,
    pub total_clients: i64,
    pub total_services: i64,
    #[schema(example = "1250.00")]
    pub revenue_this_month: Decimal,
    #[schema(example = "9800.00")]
    pub total_revenue: Decimal,
    #[schema(example = "245.00")]
    pub average_ticket: Decimal,
}

/// O mínimo de cada ordem para calcular o status exibido.
#[derive(Debug, Clone, FromRow)]
pub struct OrderStateRow {
    pub status: WorkOrderStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
}
