// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::map_delete_error,
        error::{AppError, Resource},
    },
    models::client::{Client, ClientOrderBalance, ClientPayload},
};

const CLIENT_COLUMNS: &str =
    "id, professional_id, name, email, phone, address, reference_point, notes, created_at";

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE professional_id = $1 ORDER BY name ASC, id ASC"
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(professional_id)
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    /// Busca escopada: cliente de outro profissional é tratado como inexistente.
    pub async fn find<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1 AND professional_id = $2");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(professional_id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    pub async fn find_by_ids<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        ids: &[i64],
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE professional_id = $1 AND id = ANY($2)"
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(professional_id)
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clients (professional_id, name, email, phone, address, reference_point, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(professional_id)
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(&payload.address)
            .bind(&payload.reference_point)
            .bind(&payload.notes)
            .fetch_one(executor)
            .await?;
        Ok(client)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        payload: &ClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clients
            SET name = $3, email = $4, phone = $5, address = $6, reference_point = $7, notes = $8
            WHERE id = $1 AND professional_id = $2
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(professional_id)
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(&payload.address)
            .bind(&payload.reference_point)
            .bind(&payload.notes)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Retorna `false` se o cliente não existe para este profissional.
    pub async fn delete<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND professional_id = $2")
            .bind(id)
            .bind(professional_id)
            .execute(executor)
            .await
            .map_err(map_delete_error(Resource::Client, id))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn has_work_orders<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM work_orders WHERE client_id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    pub async fn count<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE professional_id = $1")
            .bind(professional_id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    // =========================================================================
    //  ESTATÍSTICAS
    // =========================================================================

    /// Cada ordem do cliente com total e soma de pagamentos.
    pub async fn order_balances<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        client_id: i64,
    ) -> Result<Vec<ClientOrderBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balances = sqlx::query_as::<_, ClientOrderBalance>(
            r#"
            SELECT
                wo.status,
                wo.total_value,
                COALESCE((SELECT SUM(p.amount) FROM payments p WHERE p.work_order_id = wo.id), 0)
                    AS paid_value
            FROM work_orders wo
            WHERE wo.client_id = $1 AND wo.professional_id = $2
            "#,
        )
        .bind(client_id)
        .bind(professional_id)
        .fetch_all(executor)
        .await?;
        Ok(balances)
    }
}
