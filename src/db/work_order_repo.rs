// src/db/work_order_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::work_order::{
        MaterialUsage, OrderMaterialRow, OrderServiceRow, ScheduledOrder, WorkOrder, WorkOrderStatus,
    },
};

const ORDER_COLUMNS: &str = r#"
    id, professional_id, client_id, status, opened_at, scheduled_at,
    estimated_duration_hours, finished_at, service_address, notes, total_value
"#;

/// Campos editáveis de uma ordem (o resto é calculado ou controlado pelo status).
#[derive(Debug, Clone)]
pub struct OrderFields<'a> {
    pub client_id: i64,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub estimated_duration_hours: Option<Decimal>,
    pub service_address: &'a str,
    pub notes: &'a str,
}

#[derive(Clone, Default)]
pub struct WorkOrderRepository;

impl WorkOrderRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ORDENS
    // =========================================================================

    pub async fn list<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM work_orders WHERE professional_id = $1 ORDER BY opened_at DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(professional_id)
            .fetch_all(executor)
            .await?;
        Ok(orders)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
    ) -> Result<Option<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM work_orders WHERE id = $1 AND professional_id = $2");
        let order = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(id)
            .bind(professional_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        fields: &OrderFields<'_>,
    ) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO work_orders (
                professional_id, client_id, status, scheduled_at,
                estimated_duration_hours, service_address, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(professional_id)
            .bind(fields.client_id)
            .bind(WorkOrderStatus::Open)
            .bind(fields.scheduled_at)
            .bind(fields.estimated_duration_hours)
            .bind(fields.service_address)
            .bind(fields.notes)
            .fetch_one(executor)
            .await?;
        Ok(order)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        fields: &OrderFields<'_>,
    ) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE work_orders
            SET client_id = $3, scheduled_at = $4, estimated_duration_hours = $5,
                service_address = $6, notes = $7
            WHERE id = $1 AND professional_id = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(id)
            .bind(professional_id)
            .bind(fields.client_id)
            .bind(fields.scheduled_at)
            .bind(fields.estimated_duration_hours)
            .bind(fields.service_address)
            .bind(fields.notes)
            .fetch_one(executor)
            .await?;
        Ok(order)
    }

    /// Serviços, materiais e pagamentos caem junto (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM work_orders WHERE id = $1 AND professional_id = $2")
            .bind(id)
            .bind(professional_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: WorkOrderStatus,
        finished_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE work_orders SET status = $2, finished_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(finished_at)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_total<'e, E>(&self, executor: E, id: i64, total: Decimal) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE work_orders SET total_value = $2 WHERE id = $1")
            .bind(id)
            .bind(total)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  COMPOSIÇÃO (serviços e materiais)
    // =========================================================================

    pub async fn clear_services<'e, E>(&self, executor: E, order_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM work_order_services WHERE work_order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// `service_ids` já validados e sem repetição.
    pub async fn add_services<'e, E>(&self, executor: E, order_id: i64, service_ids: &[i64]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO work_order_services (work_order_id, service_id)
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(order_id)
        .bind(service_ids)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn clear_material_usages<'e, E>(&self, executor: E, order_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM material_usages WHERE work_order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Insere as linhas (material_id, quantidade) de uma vez.
    pub async fn add_material_usages<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        lines: &[(i64, i32)],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (material_ids, quantities): (Vec<i64>, Vec<i32>) = lines.iter().copied().unzip();
        sqlx::query(
            r#"
            INSERT INTO material_usages (work_order_id, material_id, quantity)
            SELECT $1, m, q FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS t(m, q)
            "#,
        )
        .bind(order_id)
        .bind(material_ids)
        .bind(quantities)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Ordens do profissional que incluem o serviço.
    pub async fn orders_using_service<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        service_id: i64,
    ) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT wo.id FROM work_orders wo
            JOIN work_order_services wos ON wos.work_order_id = wo.id
            WHERE wo.professional_id = $1 AND wos.service_id = $2
            ORDER BY wo.id ASC
            "#,
        )
        .bind(professional_id)
        .bind(service_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Ordens do profissional com ao menos uma linha do material.
    pub async fn orders_using_material<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        material_id: i64,
    ) -> Result<Vec<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT wo.id FROM work_orders wo
            JOIN material_usages mu ON mu.work_order_id = wo.id
            WHERE wo.professional_id = $1 AND mu.material_id = $2
            ORDER BY wo.id ASC
            "#,
        )
        .bind(professional_id)
        .bind(material_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Serviços de várias ordens de uma vez (evita N+1 na listagem).
    pub async fn services_for_orders<'e, E>(
        &self,
        executor: E,
        order_ids: &[i64],
    ) -> Result<Vec<OrderServiceRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, OrderServiceRow>(
            r#"
            SELECT wos.work_order_id, s.id, s.professional_id, s.name, s.description, s.price
            FROM work_order_services wos
            JOIN services s ON s.id = wos.service_id
            WHERE wos.work_order_id = ANY($1)
            ORDER BY s.name ASC, s.id ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn materials_for_orders<'e, E>(
        &self,
        executor: E,
        order_ids: &[i64],
    ) -> Result<Vec<OrderMaterialRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, OrderMaterialRow>(
            r#"
            SELECT
                mu.id AS usage_id, mu.work_order_id, mu.quantity,
                m.id, m.professional_id, m.name, m.description,
                m.unit_price, m.unit_of_measure, m.store
            FROM material_usages mu
            JOIN materials m ON m.id = mu.material_id
            WHERE mu.work_order_id = ANY($1)
            ORDER BY mu.id ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    //  MATERIAIS UTILIZADOS (acesso avulso)
    // =========================================================================

    /// Linhas de material do profissional, opcionalmente de uma só ordem.
    pub async fn list_usages<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        order_id: Option<i64>,
    ) -> Result<Vec<OrderMaterialRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, OrderMaterialRow>(
            r#"
            SELECT
                mu.id AS usage_id, mu.work_order_id, mu.quantity,
                m.id, m.professional_id, m.name, m.description,
                m.unit_price, m.unit_of_measure, m.store
            FROM material_usages mu
            JOIN materials m ON m.id = mu.material_id
            JOIN work_orders wo ON wo.id = mu.work_order_id
            WHERE wo.professional_id = $1
              AND ($2::BIGINT IS NULL OR mu.work_order_id = $2)
            ORDER BY mu.work_order_id DESC, mu.id ASC
            "#,
        )
        .bind(professional_id)
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn find_usage<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        usage_id: i64,
    ) -> Result<Option<MaterialUsage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usage = sqlx::query_as::<_, MaterialUsage>(
            r#"
            SELECT mu.id, mu.work_order_id, mu.material_id, mu.quantity
            FROM material_usages mu
            JOIN work_orders wo ON wo.id = mu.work_order_id
            WHERE mu.id = $1 AND wo.professional_id = $2
            "#,
        )
        .bind(usage_id)
        .bind(professional_id)
        .fetch_optional(executor)
        .await?;
        Ok(usage)
    }

    pub async fn create_usage<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        material_id: i64,
        quantity: i32,
    ) -> Result<MaterialUsage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usage = sqlx::query_as::<_, MaterialUsage>(
            r#"
            INSERT INTO material_usages (work_order_id, material_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, work_order_id, material_id, quantity
            "#,
        )
        .bind(order_id)
        .bind(material_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(usage)
    }

    pub async fn update_usage<'e, E>(
        &self,
        executor: E,
        usage_id: i64,
        material_id: i64,
        quantity: i32,
    ) -> Result<MaterialUsage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usage = sqlx::query_as::<_, MaterialUsage>(
            r#"
            UPDATE material_usages SET material_id = $2, quantity = $3
            WHERE id = $1
            RETURNING id, work_order_id, material_id, quantity
            "#,
        )
        .bind(usage_id)
        .bind(material_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(usage)
    }

    pub async fn delete_usage<'e, E>(&self, executor: E, usage_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM material_usages WHERE id = $1")
            .bind(usage_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  AGENDA
    // =========================================================================

    /// Ordens que ainda ocupam horário (abertas/em andamento, com início).
    pub async fn active_schedule<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
    ) -> Result<Vec<ScheduledOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ScheduledOrder>(
            r#"
            SELECT wo.id, c.name AS client_name, wo.status, wo.scheduled_at, wo.estimated_duration_hours
            FROM work_orders wo
            JOIN clients c ON c.id = wo.client_id
            WHERE wo.professional_id = $1
              AND wo.scheduled_at IS NOT NULL
              AND wo.status IN ('OPEN', 'IN_PROGRESS')
            ORDER BY wo.scheduled_at ASC, wo.id ASC
            "#,
        )
        .bind(professional_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Tudo que tem horário marcado, menos as canceladas.
    pub async fn agenda<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<ScheduledOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ScheduledOrder>(
            r#"
            SELECT wo.id, c.name AS client_name, wo.status, wo.scheduled_at, wo.estimated_duration_hours
            FROM work_orders wo
            JOIN clients c ON c.id = wo.client_id
            WHERE wo.professional_id = $1
              AND wo.scheduled_at IS NOT NULL
              AND wo.status <> 'CANCELED'
            ORDER BY wo.scheduled_at ASC, wo.id ASC
            "#,
        )
        .bind(professional_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
