// src/db/payment_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::map_reference_error,
        error::{AppError, Resource},
    },
    models::payment::{Payment, PaymentMethod},
};

#[derive(Clone, Default)]
pub struct PaymentRepository;

impl PaymentRepository {
    pub fn new() -> Self {
        Self
    }

    /// Pagamentos do profissional (via ordem), opcionalmente de uma só ordem.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        order_id: Option<i64>,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.id, p.work_order_id, p.amount, p.method, p.paid_at
            FROM payments p
            JOIN work_orders wo ON wo.id = p.work_order_id
            WHERE wo.professional_id = $1
              AND ($2::BIGINT IS NULL OR p.work_order_id = $2)
            ORDER BY p.paid_at DESC, p.id DESC
            "#,
        )
        .bind(professional_id)
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn list_for_orders<'e, E>(&self, executor: E, order_ids: &[i64]) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, work_order_id, amount, method, paid_at
            FROM payments
            WHERE work_order_id = ANY($1)
            ORDER BY paid_at ASC, id ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.id, p.work_order_id, p.amount, p.method, p.paid_at
            FROM payments p
            JOIN work_orders wo ON wo.id = p.work_order_id
            WHERE p.id = $1 AND wo.professional_id = $2
            "#,
        )
        .bind(id)
        .bind(professional_id)
        .fetch_optional(executor)
        .await?;
        Ok(payment)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (work_order_id, amount, method)
            VALUES ($1, $2, $3)
            RETURNING id, work_order_id, amount, method, paid_at
            "#,
        )
        .bind(order_id)
        .bind(amount)
        .bind(method)
        .fetch_one(executor)
        .await
        .map_err(map_reference_error(Resource::WorkOrder, order_id))?;
        Ok(payment)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn total_paid<'e, E>(&self, executor: E, order_id: i64) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM payments WHERE work_order_id = $1")
                .bind(order_id)
                .fetch_one(executor)
                .await?;
        Ok(total)
    }
}
