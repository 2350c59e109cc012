// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::OrderStateRow};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    /// Status gravado + horário de cada ordem; a contagem por status exibido é feita em memória.
    pub async fn order_states<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<OrderStateRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, OrderStateRow>(
            "SELECT status, scheduled_at FROM work_orders WHERE professional_id = $1",
        )
        .bind(professional_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Soma dos pagamentos com `paid_at` em [from, to); sem limites soma tudo.
    pub async fn revenue<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(p.amount), 0)
            FROM payments p
            JOIN work_orders wo ON wo.id = p.work_order_id
            WHERE wo.professional_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR p.paid_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR p.paid_at < $3)
            "#,
        )
        .bind(professional_id)
        .bind(from)
        .bind(to)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
