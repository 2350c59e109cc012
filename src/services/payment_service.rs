// src/services/payment_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{AppError, Resource},
    db::{PaymentRepository, WorkOrderRepository},
    models::payment::{CreatePaymentPayload, PaymentView},
    services::billing,
};

#[derive(Clone)]
pub struct PaymentService {
    repo: PaymentRepository,
    order_repo: WorkOrderRepository,
}

impl PaymentService {
    pub fn new(repo: PaymentRepository, order_repo: WorkOrderRepository) -> Self {
        Self { repo, order_repo }
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        order_id: Option<i64>,
    ) -> Result<Vec<PaymentView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = self.repo.list(executor, professional_id, order_id).await?;
        Ok(payments.into_iter().map(PaymentView::from).collect())
    }

    pub async fn get<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<PaymentView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find(executor, professional_id, id)
            .await?
            .map(PaymentView::from)
            .ok_or(AppError::ResourceNotFound(Resource::Payment, id))
    }

    /// Registra o pagamento e, se quitou uma ordem finalizada, marca como PAID.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        payload: &CreatePaymentPayload,
    ) -> Result<PaymentView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .find(&mut *tx, professional_id, payload.work_order_id)
            .await?
            .ok_or(AppError::InvalidReference(Resource::WorkOrder, payload.work_order_id))?;

        let paid = self.repo.total_paid(&mut *tx, order.id).await?;
        let pending = billing::pending(order.total_value, paid);
        billing::check_payment(order.status, payload.amount, pending)?;

        let payment = self
            .repo
            .create(&mut *tx, order.id, payload.amount, payload.method)
            .await?;

        let pending_after = billing::pending(order.total_value, paid + payment.amount);
        let status = billing::status_after_payment(order.status, pending_after);
        if status != order.status {
            self.order_repo
                .set_status(&mut *tx, order.id, status, order.finished_at)
                .await?;
            tracing::info!("💰 OS #{} quitada", order.id);
        }

        tx.commit().await?;
        Ok(PaymentView::from(payment))
    }

    /// Exclui o pagamento; ordem paga que volta a ter saldo retorna a FINISHED.
    pub async fn delete<'e, E>(&self, executor: E, professional_id: Uuid, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = self
            .repo
            .find(&mut *tx, professional_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::Payment, id))?;
        let order = self
            .order_repo
            .find(&mut *tx, professional_id, payment.work_order_id)
            .await?
            .ok_or(AppError::ResourceNotFound(Resource::WorkOrder, payment.work_order_id))?;

        self.repo.delete(&mut *tx, id).await?;

        let paid = self.repo.total_paid(&mut *tx, order.id).await?;
        let outcome = billing::status_after_payment_removed(order.status, billing::pending(order.total_value, paid));
        if outcome.status != order.status {
            let finished_at = if outcome.clear_finished_at { None } else { order.finished_at };
            self.order_repo
                .set_status(&mut *tx, order.id, outcome.status, finished_at)
                .await?;
            tracing::info!("↩️ OS #{} voltou para {:?} após exclusão de pagamento", order.id, outcome.status);
        }

        tx.commit().await?;
        Ok(())
    }
}
