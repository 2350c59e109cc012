// src/services/work_order_service.rs

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, Utc};
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{AppError, Resource},
    db::{
        work_order_repo::OrderFields, CatalogRepository, ClientRepository, PaymentRepository,
        WorkOrderRepository,
    },
    models::{
        catalog::Service,
        client::Client,
        payment::{Payment, PaymentView},
        work_order::{
            AgendaEntry, CreateMaterialUsagePayload, MaterialLinePayload, MaterialUsageDetail,
            MaterialUsagePatch, OrderMaterialRow, OrderServiceRow, ScheduledOrder, WorkOrder,
            WorkOrderDetail, WorkOrderPatch, WorkOrderPayload, WorkOrderStatus,
        },
    },
    services::{billing, scheduling},
};

#[derive(Clone)]
pub struct WorkOrderService {
    repo: WorkOrderRepository,
    client_repo: ClientRepository,
    catalog_repo: CatalogRepository,
    payment_repo: PaymentRepository,
    local_offset: FixedOffset,
}

impl WorkOrderService {
    pub fn new(
        repo: WorkOrderRepository,
        client_repo: ClientRepository,
        catalog_repo: CatalogRepository,
        payment_repo: PaymentRepository,
        local_offset: FixedOffset,
    ) -> Self {
        Self { repo, client_repo, catalog_repo, payment_repo, local_offset }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkOrderDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let orders = self.repo.list(&mut *conn, professional_id).await?;
        self.load_details(&mut conn, professional_id, orders, now).await
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let order = self.find_order(&mut conn, professional_id, id).await?;
        self.load_detail(&mut conn, professional_id, order, now).await
    }

    /// Calendário: tudo que tem horário, menos canceladas, colorido pelo status exibido.
    pub async fn agenda<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<AgendaEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.repo.agenda(executor, professional_id).await?;
        Ok(rows.into_iter().map(|row| agenda_entry(row, now)).collect())
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        payload: &WorkOrderPayload,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let service_ids = self.check_references(&mut tx, professional_id, payload).await?;
        self.check_schedule(&mut tx, professional_id, WorkOrderStatus::Open, payload, None)
            .await?;

        let order = self.repo.create(&mut *tx, professional_id, &fields_of(payload)).await?;
        let materials = payload.materials.as_deref().unwrap_or_default();
        self.replace_composition(&mut tx, order.id, &service_ids, Some(materials))
            .await?;
        let order = self.recompute(&mut tx, professional_id, order.id).await?;

        let detail = self.load_detail(&mut tx, professional_id, order, now).await?;
        tx.commit().await?;

        tracing::info!("📋 OS #{} criada (total {})", detail.id, detail.values.total_value);
        Ok(detail)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        payload: &WorkOrderPayload,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.find_order(&mut tx, professional_id, id).await?;
        let detail = self.apply_update(&mut tx, professional_id, current, payload, now).await?;

        tx.commit().await?;
        Ok(detail)
    }

    /// PATCH: campos ausentes mantêm o valor atual, inclusive serviços e materiais utilizados.
    pub async fn patch<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        patch: WorkOrderPatch,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.find_order(&mut tx, professional_id, id).await?;

        let service_ids = self
            .repo
            .services_for_orders(&mut *tx, &[id])
            .await?
            .into_iter()
            .map(|row| row.service.id)
            .collect();

        let merged = patch.merge_into(&current, service_ids);
        merged.validate()?;

        let detail = self.apply_update(&mut tx, professional_id, current, &merged, now).await?;

        tx.commit().await?;
        Ok(detail)
    }

    pub async fn delete<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, professional_id, id).await? {
            return Err(AppError::ResourceNotFound(Resource::WorkOrder, id));
        }
        tracing::info!("🗑️ OS #{} excluída", id);
        Ok(())
    }

    /// Finaliza: quitada vira PAID, com saldo vira FINISHED.
    pub async fn finalize<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self.find_order(&mut tx, professional_id, id).await?;
        let paid = self.payment_repo.total_paid(&mut *tx, id).await?;
        let status = billing::finalize(order.status, billing::pending(order.total_value, paid))?;

        let finished_at = order.finished_at.or(Some(now));
        self.repo.set_status(&mut *tx, id, status, finished_at).await?;

        let order = self.find_order(&mut tx, professional_id, id).await?;
        let detail = self.load_detail(&mut tx, professional_id, order, now).await?;
        tx.commit().await?;

        tracing::info!("✅ OS #{} finalizada como {:?}", id, status);
        Ok(detail)
    }

    pub async fn cancel<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self.find_order(&mut tx, professional_id, id).await?;
        let status = billing::cancel(order.status)?;
        self.repo.set_status(&mut *tx, id, status, order.finished_at).await?;

        let order = self.find_order(&mut tx, professional_id, id).await?;
        let detail = self.load_detail(&mut tx, professional_id, order, now).await?;
        tx.commit().await?;

        tracing::info!("🚫 OS #{} cancelada", id);
        Ok(detail)
    }

    // =========================================================================
    //  MATERIAIS UTILIZADOS
    // =========================================================================

    pub async fn list_usages<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        order_id: Option<i64>,
    ) -> Result<Vec<MaterialUsageDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self.repo.list_usages(executor, professional_id, order_id).await?;
        Ok(rows.into_iter().map(usage_detail).collect())
    }

    pub async fn get_usage<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        usage_id: i64,
    ) -> Result<MaterialUsageDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        self.usage_detail_by_id(&mut conn, professional_id, usage_id).await
    }

    pub async fn create_usage<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        payload: &CreateMaterialUsagePayload,
    ) -> Result<MaterialUsageDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find(&mut *tx, professional_id, payload.work_order_id).await?.is_none() {
            return Err(AppError::InvalidReference(Resource::WorkOrder, payload.work_order_id));
        }
        self.check_materials(&mut tx, professional_id, &[payload.material_id]).await?;

        let usage = self
            .repo
            .create_usage(&mut *tx, payload.work_order_id, payload.material_id, payload.quantity)
            .await?;
        self.recompute(&mut tx, professional_id, usage.work_order_id).await?;

        let detail = self.usage_detail_by_id(&mut tx, professional_id, usage.id).await?;
        tx.commit().await?;
        Ok(detail)
    }

    /// PUT e PATCH: campos ausentes mantêm o valor atual.
    pub async fn update_usage<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        usage_id: i64,
        patch: &MaterialUsagePatch,
    ) -> Result<MaterialUsageDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_usage(&mut *tx, professional_id, usage_id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::MaterialUsage, usage_id))?;

        let material_id = patch.material_id.unwrap_or(current.material_id);
        let quantity = patch.quantity.unwrap_or(current.quantity);
        if material_id != current.material_id {
            self.check_materials(&mut tx, professional_id, &[material_id]).await?;
        }

        self.repo.update_usage(&mut *tx, usage_id, material_id, quantity).await?;
        self.recompute(&mut tx, professional_id, current.work_order_id).await?;

        let detail = self.usage_detail_by_id(&mut tx, professional_id, usage_id).await?;
        tx.commit().await?;
        Ok(detail)
    }

    pub async fn delete_usage<'e, E>(&self, executor: E, professional_id: Uuid, usage_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let usage = self
            .repo
            .find_usage(&mut *tx, professional_id, usage_id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::MaterialUsage, usage_id))?;

        self.repo.delete_usage(&mut *tx, usage_id).await?;
        self.recompute(&mut tx, professional_id, usage.work_order_id).await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  INTERNOS (sempre dentro de uma conexão/transação já aberta)
    // =========================================================================

    async fn find_order(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        id: i64,
    ) -> Result<WorkOrder, AppError> {
        self.repo
            .find(&mut *conn, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::WorkOrder, id))
    }

    async fn apply_update(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        current: WorkOrder,
        payload: &WorkOrderPayload,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError> {
        let service_ids = self.check_references(conn, professional_id, payload).await?;
        self.check_schedule(conn, professional_id, current.status, payload, Some(current.id))
            .await?;

        self.repo
            .update(&mut *conn, professional_id, current.id, &fields_of(payload))
            .await?;
        self.replace_composition(conn, current.id, &service_ids, payload.materials.as_deref())
            .await?;

        let order = self.recompute(conn, professional_id, current.id).await?;
        self.load_detail(conn, professional_id, order, now).await
    }

    /// Cliente, serviços e materiais precisam existir e ser do profissional.
    /// Devolve os ids de serviço sem repetição, na ordem recebida.
    async fn check_references(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        payload: &WorkOrderPayload,
    ) -> Result<Vec<i64>, AppError> {
        if self
            .client_repo
            .find(&mut *conn, professional_id, payload.client_id)
            .await?
            .is_none()
        {
            return Err(AppError::InvalidReference(Resource::Client, payload.client_id));
        }

        let service_ids = unique_ids(payload.service_ids.iter().copied());
        if !service_ids.is_empty() {
            let found = self
                .catalog_repo
                .find_services_by_ids(&mut *conn, professional_id, &service_ids)
                .await?;
            if let Some(missing) = first_missing(&service_ids, found.iter().map(|s| s.id)) {
                return Err(AppError::InvalidReference(Resource::Service, missing));
            }
        }

        let material_ids: Vec<i64> = payload.materials.iter().flatten().map(|m| m.material_id).collect();
        self.check_materials(conn, professional_id, &material_ids).await?;

        Ok(service_ids)
    }

    async fn check_materials(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        material_ids: &[i64],
    ) -> Result<(), AppError> {
        let ids = unique_ids(material_ids.iter().copied());
        if ids.is_empty() {
            return Ok(());
        }
        let found = self
            .catalog_repo
            .find_materials_by_ids(&mut *conn, professional_id, &ids)
            .await?;
        match first_missing(&ids, found.iter().map(|m| m.id)) {
            Some(missing) => Err(AppError::InvalidReference(Resource::Material, missing)),
            None => Ok(()),
        }
    }

    async fn check_schedule(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        status: WorkOrderStatus,
        payload: &WorkOrderPayload,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        if !status.blocks_schedule()
            || scheduling::Window::new(payload.scheduled_at, payload.estimated_duration_hours).is_none()
        {
            return Ok(());
        }

        let existing = self.repo.active_schedule(&mut *conn, professional_id).await?;
        scheduling::ensure_no_conflict(
            status,
            payload.scheduled_at,
            payload.estimated_duration_hours,
            exclude_id,
            &existing,
            self.local_offset,
        )
    }

    /// Serviços são sempre substituídos. Materiais utilizados só quando vierem
    /// no payload; `None` preserva as linhas (e os ids) existentes.
    async fn replace_composition(
        &self,
        conn: &mut PgConnection,
        order_id: i64,
        service_ids: &[i64],
        materials: Option<&[MaterialLinePayload]>,
    ) -> Result<(), AppError> {
        self.repo.clear_services(&mut *conn, order_id).await?;
        if !service_ids.is_empty() {
            self.repo.add_services(&mut *conn, order_id, service_ids).await?;
        }

        let Some(materials) = materials else {
            return Ok(());
        };
        self.repo.clear_material_usages(&mut *conn, order_id).await?;
        if !materials.is_empty() {
            let lines: Vec<(i64, i32)> = materials.iter().map(|m| (m.material_id, m.quantity)).collect();
            self.repo.add_material_usages(&mut *conn, order_id, &lines).await?;
        }
        Ok(())
    }

    /// Regrava o total das ordens que usam o serviço (preço alterado no catálogo).
    pub(crate) async fn refresh_totals_for_service(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        service_id: i64,
    ) -> Result<(), AppError> {
        let order_ids = self
            .repo
            .orders_using_service(&mut *conn, professional_id, service_id)
            .await?;
        self.refresh_totals(conn, professional_id, &order_ids).await
    }

    /// Regrava o total das ordens com o material utilizado (preço alterado no catálogo).
    pub(crate) async fn refresh_totals_for_material(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        material_id: i64,
    ) -> Result<(), AppError> {
        let order_ids = self
            .repo
            .orders_using_material(&mut *conn, professional_id, material_id)
            .await?;
        self.refresh_totals(conn, professional_id, &order_ids).await
    }

    async fn refresh_totals(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        order_ids: &[i64],
    ) -> Result<(), AppError> {
        for &order_id in order_ids {
            self.recompute(conn, professional_id, order_id).await?;
        }
        if !order_ids.is_empty() {
            tracing::info!("🔄 Total recalculado em {} OS após mudança de preço", order_ids.len());
        }
        Ok(())
    }

    /// Recalcula e grava o total; ordem fechada pode trocar entre FINISHED e PAID.
    async fn recompute(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        order_id: i64,
    ) -> Result<WorkOrder, AppError> {
        let services = self.repo.services_for_orders(&mut *conn, &[order_id]).await?;
        let materials = self.repo.materials_for_orders(&mut *conn, &[order_id]).await?;

        let total = billing::check_total(billing::order_total(
            services.iter().map(|row| row.service.price),
            materials.iter().map(|row| (row.quantity, row.material.unit_price)),
        ))?;
        self.repo.set_total(&mut *conn, order_id, total).await?;

        let order = self.find_order(conn, professional_id, order_id).await?;
        if !matches!(order.status, WorkOrderStatus::Finished | WorkOrderStatus::Paid) {
            return Ok(order);
        }

        let paid = self.payment_repo.total_paid(&mut *conn, order_id).await?;
        let status = billing::status_after_recompute(order.status, billing::pending(total, paid));
        if status == order.status {
            return Ok(order);
        }

        tracing::info!("🔄 OS #{} passou de {:?} para {:?} após recálculo", order_id, order.status, status);
        self.repo.set_status(&mut *conn, order_id, status, order.finished_at).await?;
        self.find_order(conn, professional_id, order_id).await
    }

    async fn load_detail(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        order: WorkOrder,
        now: DateTime<Utc>,
    ) -> Result<WorkOrderDetail, AppError> {
        let id = order.id;
        self.load_details(conn, professional_id, vec![order], now)
            .await?
            .pop()
            .ok_or(AppError::ResourceNotFound(Resource::WorkOrder, id))
    }

    /// Monta várias ordens com poucas consultas (uma por tabela relacionada).
    async fn load_details(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        orders: Vec<WorkOrder>,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkOrderDetail>, AppError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let client_ids = unique_ids(orders.iter().map(|o| o.client_id));

        let clients = self.client_repo.find_by_ids(&mut *conn, professional_id, &client_ids).await?;
        let services = self.repo.services_for_orders(&mut *conn, &order_ids).await?;
        let materials = self.repo.materials_for_orders(&mut *conn, &order_ids).await?;
        let payments = self.payment_repo.list_for_orders(&mut *conn, &order_ids).await?;

        assemble(orders, clients, services, materials, payments, now)
    }

    async fn usage_detail_by_id(
        &self,
        conn: &mut PgConnection,
        professional_id: Uuid,
        usage_id: i64,
    ) -> Result<MaterialUsageDetail, AppError> {
        let usage = self
            .repo
            .find_usage(&mut *conn, professional_id, usage_id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::MaterialUsage, usage_id))?;

        self.repo
            .list_usages(&mut *conn, professional_id, Some(usage.work_order_id))
            .await?
            .into_iter()
            .find(|row| row.usage_id == usage_id)
            .map(usage_detail)
            .ok_or(AppError::ResourceNotFound(Resource::MaterialUsage, usage_id))
    }
}

fn fields_of(payload: &WorkOrderPayload) -> OrderFields<'_> {
    OrderFields {
        client_id: payload.client_id,
        scheduled_at: payload.scheduled_at,
        estimated_duration_hours: payload.estimated_duration_hours,
        service_address: &payload.service_address,
        notes: &payload.notes,
    }
}

fn unique_ids<I>(ids: I) -> Vec<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn first_missing<I>(wanted: &[i64], found: I) -> Option<i64>
where
    I: IntoIterator<Item = i64>,
{
    let found: HashSet<i64> = found.into_iter().collect();
    wanted.iter().copied().find(|id| !found.contains(id))
}

fn usage_detail(row: OrderMaterialRow) -> MaterialUsageDetail {
    let line_value = billing::materials_value([(row.quantity, row.material.unit_price)]);
    MaterialUsageDetail {
        id: row.usage_id,
        work_order_id: row.work_order_id,
        material: row.material,
        quantity: row.quantity,
        line_value,
    }
}

fn agenda_entry(row: ScheduledOrder, now: DateTime<Utc>) -> AgendaEntry {
    let status = crate::models::work_order::effective_status(row.status, Some(row.scheduled_at), now);
    AgendaEntry {
        id: row.id,
        title: format!("OS #{} - {}", row.id, row.client_name),
        start: row.scheduled_at,
        end: scheduling::end_of(row.scheduled_at, row.estimated_duration_hours),
        url: format!("/ordens/{}", row.id),
        color: status.color().to_string(),
        status,
    }
}

fn assemble(
    orders: Vec<WorkOrder>,
    clients: Vec<Client>,
    services: Vec<OrderServiceRow>,
    materials: Vec<OrderMaterialRow>,
    payments: Vec<Payment>,
    now: DateTime<Utc>,
) -> Result<Vec<WorkOrderDetail>, AppError> {
    let clients: HashMap<i64, Client> = clients.into_iter().map(|c| (c.id, c)).collect();

    let mut services_by_order: HashMap<i64, Vec<Service>> = HashMap::new();
    for row in services {
        services_by_order.entry(row.work_order_id).or_default().push(row.service);
    }
    let mut usages_by_order: HashMap<i64, Vec<MaterialUsageDetail>> = HashMap::new();
    for row in materials {
        usages_by_order.entry(row.work_order_id).or_default().push(usage_detail(row));
    }
    let mut payments_by_order: HashMap<i64, Vec<Payment>> = HashMap::new();
    for payment in payments {
        payments_by_order.entry(payment.work_order_id).or_default().push(payment);
    }

    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        let client = clients
            .get(&order.client_id)
            .cloned()
            .ok_or_else(|| anyhow!("cliente {} da OS #{} não encontrado", order.client_id, order.id))?;
        let services = services_by_order.remove(&order.id).unwrap_or_default();
        let usages = usages_by_order.remove(&order.id).unwrap_or_default();
        let payments = payments_by_order.remove(&order.id).unwrap_or_default();

        let values = billing::compute_values(
            services.iter().map(|s| s.price),
            usages.iter().map(|u| (u.quantity, u.material.unit_price)),
            payments.iter().map(|p| p.amount),
        );

        details.push(WorkOrderDetail {
            id: order.id,
            status: order.effective_status(now),
            stored_status: order.status,
            client,
            services,
            material_usages: usages,
            payments: payments.into_iter().map(PaymentView::from).collect(),
            opened_at: order.opened_at,
            scheduled_at: order.scheduled_at,
            estimated_duration_hours: order.estimated_duration_hours,
            finished_at: order.finished_at,
            service_address: order.service_address,
            notes: order.notes,
            values,
        });
    }
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{catalog::Material, payment::PaymentMethod};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn client(id: i64) -> Client {
        Client {
            id,
            professional_id: Uuid::nil(),
            name: format!("Cliente {id}"),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            reference_point: String::new(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    fn order(id: i64, client_id: i64, total: i64, scheduled_at: Option<DateTime<Utc>>) -> WorkOrder {
        WorkOrder {
            id,
            professional_id: Uuid::nil(),
            client_id,
            status: WorkOrderStatus::Open,
            opened_at: Utc::now(),
            scheduled_at,
            estimated_duration_hours: None,
            finished_at: None,
            service_address: String::new(),
            notes: String::new(),
            total_value: Decimal::new(total, 2),
        }
    }

    fn material(id: i64, unit_price: i64) -> Material {
        Material {
            id,
            professional_id: Uuid::nil(),
            name: "Cabo".into(),
            description: String::new(),
            unit_price: Decimal::new(unit_price, 2),
            unit_of_measure: "m".into(),
            store: String::new(),
        }
    }

    fn service(id: i64, price: i64) -> Service {
        Service {
            id,
            professional_id: Uuid::nil(),
            name: "Instalação".into(),
            description: String::new(),
            price: Decimal::new(price, 2),
        }
    }

    #[test]
    fn assemble_groups_rows_per_order() {
        let now = Utc::now();
        let details = assemble(
            vec![order(1, 10, 13000, None), order(2, 10, 5000, Some(now - Duration::hours(1)))],
            vec![client(10)],
            vec![
                OrderServiceRow { work_order_id: 1, service: service(100, 10000) },
                OrderServiceRow { work_order_id: 2, service: service(101, 5000) },
            ],
            vec![OrderMaterialRow { usage_id: 7, work_order_id: 1, quantity: 2, material: material(50, 1500) }],
            vec![Payment {
                id: 1,
                work_order_id: 1,
                amount: Decimal::new(5000, 2),
                method: PaymentMethod::Pix,
                paid_at: now,
            }],
            now,
        )
        .unwrap();

        let first = &details[0];
        assert_eq!(first.services.len(), 1);
        assert_eq!(first.material_usages[0].line_value.to_string(), "30.00");
        assert_eq!(first.values.total_value.to_string(), "130.00");
        assert_eq!(first.values.paid_value.to_string(), "50.00");
        assert_eq!(first.values.pending_value.to_string(), "80.00");
        assert_eq!(first.status, WorkOrderStatus::Open);

        let second = &details[1];
        assert!(second.payments.is_empty());
        assert_eq!(second.status, WorkOrderStatus::InProgress);
        assert_eq!(second.stored_status, WorkOrderStatus::Open);
    }

    #[test]
    fn assemble_fails_loudly_when_client_is_missing() {
        let result = assemble(vec![order(1, 99, 0, None)], vec![], vec![], vec![], vec![], Utc::now());
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }

    #[test]
    fn agenda_entry_uses_effective_status_and_window() {
        let start = Utc.with_ymd_and_hms(2026, 10, 20, 13, 0, 0).unwrap();
        let row = ScheduledOrder {
            id: 12,
            client_name: "Maria da Silva".into(),
            status: WorkOrderStatus::Open,
            scheduled_at: start,
            estimated_duration_hours: Some(Decimal::new(15, 1)),
        };

        let before = agenda_entry(row.clone(), start - Duration::hours(1));
        assert_eq!(before.title, "OS #12 - Maria da Silva");
        assert_eq!(before.url, "/ordens/12");
        assert_eq!(before.color, "#0288d1");
        assert_eq!(before.end, Some(start + Duration::minutes(90)));

        let during = agenda_entry(row, start + Duration::minutes(10));
        assert_eq!(during.status, WorkOrderStatus::InProgress);
        assert_eq!(during.color, "#ed6c02");
    }

    #[test]
    fn agenda_entry_without_duration_has_no_end() {
        let row = ScheduledOrder {
            id: 3,
            client_name: "João".into(),
            status: WorkOrderStatus::Paid,
            scheduled_at: Utc::now(),
            estimated_duration_hours: None,
        };
        let entry = agenda_entry(row, Utc::now());
        assert_eq!(entry.end, None);
        assert_eq!(entry.color, "#2e7d32");
    }

    #[test]
    fn unique_ids_keep_first_occurrence_order() {
        assert_eq!(unique_ids([3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert_eq!(unique_ids(Vec::new()), Vec::<i64>::new());
        assert_eq!(first_missing(&[1, 2, 3], [3, 1]), Some(2));
        assert_eq!(first_missing(&[1], [1]), None);
    }
}
