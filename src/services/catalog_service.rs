// src/services/catalog_service.rs

use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{AppError, Resource},
    db::CatalogRepository,
    models::catalog::{Material, MaterialPatch, MaterialPayload, Service, ServicePatch, ServicePayload},
    services::work_order_service::WorkOrderService,
};

/// Mudança de preço regrava, na mesma transação, o total das ordens afetadas.
#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    work_orders: WorkOrderService,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, work_orders: WorkOrderService) -> Self {
        Self { repo, work_orders }
    }

    // --- SERVIÇOS ---

    pub async fn list_services<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_services(executor, professional_id).await
    }

    pub async fn get_service<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_service(executor, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Service, id))
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
        self.repo.create_service(executor, professional_id, payload).await
    }

    pub async fn update_service<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        payload: &ServicePayload,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let service = self.save_service(&mut tx, professional_id, id, payload).await?;
        tx.commit().await?;
        Ok(service)
    }

    pub async fn patch_service<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        patch: ServicePatch,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_service(&mut *tx, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Service, id))?;
        let merged = patch.merge_into(&current);
        merged.validate()?;

        let service = self.save_service(&mut tx, professional_id, id, &merged).await?;
        tx.commit().await?;
        Ok(service)
    }

    async fn save_service(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        id: i64,
        payload: &ServicePayload,
    ) -> Result<Service, AppError> {
        let service = self
            .repo
            .update_service(&mut *conn, professional_id, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Service, id))?;
        self.work_orders
            .refresh_totals_for_service(conn, professional_id, id)
            .await?;
        Ok(service)
    }

    pub async fn delete_service<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_service(&mut *tx, professional_id, id).await?.is_none() {
            return Err(AppError::ResourceNotFound(Resource::Service, id));
        }
        if self.repo.service_in_use(&mut *tx, id).await? {
            return Err(AppError::ResourceInUse(Resource::Service, id));
        }

        self.repo.delete_service(&mut *tx, professional_id, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // --- MATERIAIS ---

    pub async fn list_materials<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_materials(executor, professional_id).await
    }

    pub async fn get_material<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_material(executor, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Material, id))
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
        self.repo.create_material(executor, professional_id, payload).await
    }

    pub async fn update_material<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        payload: &MaterialPayload,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let material = self.save_material(&mut tx, professional_id, id, payload).await?;
        tx.commit().await?;
        Ok(material)
    }

    pub async fn patch_material<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        patch: MaterialPatch,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_material(&mut *tx, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Material, id))?;
        let merged = patch.merge_into(&current);
        merged.validate()?;

        let material = self.save_material(&mut tx, professional_id, id, &merged).await?;
        tx.commit().await?;
        Ok(material)
    }

    async fn save_material(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        id: i64,
        payload: &MaterialPayload,
    ) -> Result<Material, AppError> {
        let material = self
            .repo
            .update_material(&mut *conn, professional_id, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Material, id))?;
        self.work_orders
            .refresh_totals_for_material(conn, professional_id, id)
            .await?;
        Ok(material)
    }

    pub async fn delete_material<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find_material(&mut *tx, professional_id, id).await?.is_none() {
            return Err(AppError::ResourceNotFound(Resource::Material, id));
        }
        if self.repo.material_in_use(&mut *tx, id).await? {
            return Err(AppError::ResourceInUse(Resource::Material, id));
        }

        self.repo.delete_material(&mut *tx, professional_id, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_stores<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_stores(executor, professional_id).await
    }
}
