// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::map_delete_error,
        error::{AppError, Resource},
    },
    models::catalog::{Material, MaterialPayload, Service, ServicePayload},
};

const SERVICE_COLUMNS: &str = "id, professional_id, name, description, price";
const MATERIAL_COLUMNS: &str =
    "id, professional_id, name, description, unit_price, unit_of_measure, store";

// Serviços e materiais: o catálogo de preços do profissional
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn list_services<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE professional_id = $1 ORDER BY name ASC, id ASC"
        );
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(professional_id)
            .fetch_all(executor)
            .await?;
        Ok(services)
    }

    pub async fn find_service<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
    ) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1 AND professional_id = $2");
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .bind(professional_id)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    /// Apenas os serviços do profissional entre os ids pedidos.
    pub async fn find_services_by_ids<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        ids: &[i64],
    ) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE professional_id = $1 AND id = ANY($2)"
        );
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(professional_id)
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(services)
    }

    pub async fn create_service<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        payload: &ServicePayload,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO services (professional_id, name, description, price)
            VALUES ($1, $2, $3, $4)
            RETURNING {SERVICE_COLUMNS}
            "#
        );
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(professional_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.price)
            .fetch_one(executor)
            .await?;
        Ok(service)
    }

    pub async fn update_service<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        payload: &ServicePayload,
    ) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE services SET name = $3, description = $4, price = $5
            WHERE id = $1 AND professional_id = $2
            RETURNING {SERVICE_COLUMNS}
            "#
        );
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .bind(professional_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.price)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    pub async fn delete_service<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM services WHERE id = $1 AND professional_id = $2")
            .bind(id)
            .bind(professional_id)
            .execute(executor)
            .await
            .map_err(map_delete_error(Resource::Service, id))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn service_in_use<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM work_order_services WHERE service_id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    pub async fn count_services<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE professional_id = $1")
            .bind(professional_id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    // =========================================================================
    //  MATERIAIS
    // =========================================================================

    pub async fn list_materials<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE professional_id = $1 ORDER BY name ASC, id ASC"
        );
        let materials = sqlx::query_as::<_, Material>(&sql)
            .bind(professional_id)
            .fetch_all(executor)
            .await?;
        Ok(materials)
    }

    pub async fn find_material<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
    ) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1 AND professional_id = $2");
        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .bind(professional_id)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }

    pub async fn find_materials_by_ids<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        ids: &[i64],
    ) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE professional_id = $1 AND id = ANY($2)"
        );
        let materials = sqlx::query_as::<_, Material>(&sql)
            .bind(professional_id)
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(materials)
    }

    pub async fn create_material<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        payload: &MaterialPayload,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO materials (professional_id, name, description, unit_price, unit_of_measure, store)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MATERIAL_COLUMNS}
            "#
        );
        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(professional_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.unit_price)
            .bind(&payload.unit_of_measure)
            .bind(&payload.store)
            .fetch_one(executor)
            .await?;
        Ok(material)
    }

    pub async fn update_material<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        payload: &MaterialPayload,
    ) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE materials
            SET name = $3, description = $4, unit_price = $5, unit_of_measure = $6, store = $7
            WHERE id = $1 AND professional_id = $2
            RETURNING {MATERIAL_COLUMNS}
            "#
        );
        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .bind(professional_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.unit_price)
            .bind(&payload.unit_of_measure)
            .bind(&payload.store)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }

    pub async fn delete_material<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1 AND professional_id = $2")
            .bind(id)
            .bind(professional_id)
            .execute(executor)
            .await
            .map_err(map_delete_error(Resource::Material, id))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn material_in_use<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM material_usages WHERE material_id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    /// Lojas já usadas nos materiais (para autocompletar), sem espaços nas pontas.
    pub async fn list_stores<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stores: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT btrim(store) AS store FROM materials
            WHERE professional_id = $1 AND btrim(store) <> ''
            ORDER BY store ASC
            "#,
        )
        .bind(professional_id)
        .fetch_all(executor)
        .await?;
        Ok(stores)
    }
}
