// src/services/client_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::{AppError, Resource},
        money::round2,
    },
    db::ClientRepository,
    models::{
        client::{Client, ClientOrderBalance, ClientPatch, ClientPayload, ClientStats},
        work_order::WorkOrderStatus,
    },
    services::billing,
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, professional_id).await
    }

    pub async fn get<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find(executor, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Client, id))
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
        self.repo.create(executor, professional_id, payload).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        payload: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, professional_id, id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Client, id))
    }

    /// PATCH: mescla com o registro atual e revalida como um PUT.
    pub async fn patch<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        id: i64,
        patch: ClientPatch,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        use validator::Validate;

        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find(&mut *tx, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Client, id))?;

        let merged = patch.merge_into(&current);
        merged.validate()?;

        let client = self
            .repo
            .update(&mut *tx, professional_id, id, &merged)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Client, id))?;

        tx.commit().await?;
        Ok(client)
    }

    pub async fn delete<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if self.repo.find(&mut *tx, professional_id, id).await?.is_none() {
            return Err(AppError::ResourceNotFound(Resource::Client, id));
        }
        if self.repo.has_work_orders(&mut *tx, id).await? {
            return Err(AppError::ResourceInUse(Resource::Client, id));
        }

        self.repo.delete(&mut *tx, professional_id, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn stats<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<ClientStats, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let client = self
            .repo
            .find(&mut *conn, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Client, id))?;
        let balances = self.repo.order_balances(&mut *conn, professional_id, id).await?;

        Ok(summarize(client, &balances))
    }
}

/// Totais do cliente. Ordens canceladas não entram em faturado nem pendente.
fn summarize(client: Client, balances: &[ClientOrderBalance]) -> ClientStats {
    let completed_orders = balances.iter().filter(|b| b.status.is_completed()).count() as i64;

    let mut total_invoiced = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut total_pending = Decimal::ZERO;

    for balance in balances {
        total_paid += balance.paid_value;
        if balance.status == WorkOrderStatus::Canceled {
            continue;
        }
        total_invoiced += balance.total_value;
        total_pending += billing::pending(balance.total_value, balance.paid_value).max(Decimal::ZERO);
    }

    ClientStats {
        client_id: client.id,
        client_name: client.name,
        completed_orders,
        total_invoiced: round2(total_invoiced),
        total_paid: round2(total_paid),
        total_pending: round2(total_pending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn client() -> Client {
        Client {
            id: 3,
            professional_id: Uuid::new_v4(),
            name: "Maria".into(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            reference_point: String::new(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    fn balance(status: WorkOrderStatus, total: i64, paid: i64) -> ClientOrderBalance {
        ClientOrderBalance {
            status,
            total_value: Decimal::new(total, 2),
            paid_value: Decimal::new(paid, 2),
        }
    }

    #[test]
    fn stats_skip_canceled_orders_in_invoiced_and_pending() {
        let stats = summarize(
            client(),
            &[
                balance(WorkOrderStatus::Paid, 13000, 13000),
                balance(WorkOrderStatus::Finished, 20000, 5000),
                balance(WorkOrderStatus::Open, 10000, 0),
                balance(WorkOrderStatus::Canceled, 9900, 0),
            ],
        );

        assert_eq!(stats.completed_orders, 2);
        assert_eq!(stats.total_invoiced.to_string(), "430.00");
        assert_eq!(stats.total_paid.to_string(), "180.00");
        assert_eq!(stats.total_pending.to_string(), "250.00");
    }

    #[test]
    fn overpaid_order_does_not_reduce_pending() {
        let stats = summarize(
            client(),
            &[
                balance(WorkOrderStatus::Paid, 5000, 8000),
                balance(WorkOrderStatus::Finished, 3000, 0),
            ],
        );
        assert_eq!(stats.total_pending.to_string(), "30.00");
    }

    #[test]
    fn client_without_orders_has_zeroed_stats() {
        let stats = summarize(client(), &[]);
        assert_eq!(stats.completed_orders, 0);
        assert_eq!(stats.total_invoiced.to_string(), "0.00");
        assert_eq!(stats.client_name, "Maria");
    }
}
