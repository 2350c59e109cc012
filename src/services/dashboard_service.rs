// src/services/dashboard_service.rs

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::round2},
    db::{CatalogRepository, ClientRepository, DashboardRepository},
    models::{
        dashboard::{DashboardStats, OrderStateRow, StatusCounts},
        work_order::{effective_status, WorkOrderStatus},
    },
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    client_repo: ClientRepository,
    catalog_repo: CatalogRepository,
    local_offset: FixedOffset,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        client_repo: ClientRepository,
        catalog_repo: CatalogRepository,
        local_offset: FixedOffset,
    ) -> Self {
        Self { repo, client_repo, catalog_repo, local_offset }
    }

    pub async fn get_stats<'e, E>(
        &self,
        executor: E,
        professional_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente dos números
        let mut tx = executor.begin().await?;

        let states = self.repo.order_states(&mut *tx, professional_id).await?;
        let orders = count_statuses(&states, now);

        let total_clients = self.client_repo.count(&mut *tx, professional_id).await?;
        let total_services = self.catalog_repo.count_services(&mut *tx, professional_id).await?;

        let (month_start, month_end) = month_bounds(now, self.local_offset)?;
        let revenue_this_month = self
            .repo
            .revenue(&mut *tx, professional_id, Some(month_start), Some(month_end))
            .await?;
        let total_revenue = self.repo.revenue(&mut *tx, professional_id, None, None).await?;

        tx.commit().await?;

        Ok(DashboardStats {
            average_ticket: average_ticket(total_revenue, orders.completed_orders),
            orders,
            total_clients,
            total_services,
            revenue_this_month: round2(revenue_this_month),
            total_revenue: round2(total_revenue),
        })
    }
}

/// Contagem pelo status exibido (OPEN já iniciada conta como em andamento).
fn count_statuses(states: &[OrderStateRow], now: DateTime<Utc>) -> StatusCounts {
    states.iter().fold(StatusCounts::default(), |mut counts, row| {
        counts.total_orders += 1;
        match effective_status(row.status, row.scheduled_at, now) {
            WorkOrderStatus::Open => counts.open_orders += 1,
            WorkOrderStatus::InProgress => counts.in_progress_orders += 1,
            WorkOrderStatus::Finished => {
                counts.finished_pending_orders += 1;
                counts.completed_orders += 1;
            }
            WorkOrderStatus::Paid => {
                counts.paid_orders += 1;
                counts.completed_orders += 1;
            }
            WorkOrderStatus::Canceled => counts.canceled_orders += 1,
        }
        counts
    })
}

fn average_ticket(revenue: Decimal, completed: i64) -> Decimal {
    if completed == 0 {
        return round2(Decimal::ZERO);
    }
    round2(revenue / Decimal::from(completed))
}

/// [início, fim) do mês corrente no fuso local, em UTC.
fn month_bounds(now: DateTime<Utc>, offset: FixedOffset) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let local = now.with_timezone(&offset);
    let first_day = NaiveDate::from_ymd_opt(local.year(), local.month(), 1);
    let next_first_day = if local.month() == 12 {
        NaiveDate::from_ymd_opt(local.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(local.year(), local.month() + 1, 1)
    };

    let to_utc = |date: Option<NaiveDate>| -> Result<DateTime<Utc>, AppError> {
        let midnight = date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| anyhow::anyhow!("data inválida ao calcular o mês corrente"))?;
        offset
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| anyhow::anyhow!("horário local ambíguo: {midnight}").into())
    };

    Ok((to_utc(first_day)?, to_utc(next_first_day)?))
}
