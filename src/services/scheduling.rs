// src/services/scheduling.rs

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::{
    common::error::AppError,
    models::work_order::{ScheduledOrder, WorkOrderStatus},
};

/// Intervalo semiaberto [start, end) ocupado por uma ordem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// `None` quando falta o início ou a duração não é positiva.
    pub fn new(start: Option<DateTime<Utc>>, duration_hours: Option<Decimal>) -> Option<Self> {
        let start = start?;
        let hours = duration_hours?;
        if hours <= Decimal::ZERO {
            return None;
        }
        // Duração em segundos inteiros
        let seconds = (hours * Decimal::from(3600)).round().to_i64()?;
        let end = start.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;
        Some(Window { start, end })
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Fim previsto para exibir na agenda.
pub fn end_of(start: DateTime<Utc>, duration_hours: Option<Decimal>) -> Option<DateTime<Utc>> {
    Window::new(Some(start), duration_hours).map(|w| w.end)
}

/// Primeira ordem da agenda que colide com a janela candidata.
/// `existing` já vem filtrado pelo profissional; aqui só se ignoram a própria
/// ordem e as que não bloqueiam agenda.
pub fn find_conflict<'a>(
    candidate: &Window,
    exclude_id: Option<i64>,
    existing: &'a [ScheduledOrder],
) -> Option<&'a ScheduledOrder> {
    existing
        .iter()
        .filter(|o| Some(o.id) != exclude_id)
        .filter(|o| o.status.blocks_schedule())
        .find(|o| {
            Window::new(Some(o.scheduled_at), o.estimated_duration_hours)
                .is_some_and(|w| w.overlaps(candidate))
        })
}

/// Data/hora local no formato usado nas mensagens (dd/mm/aaaa HH:MM).
pub fn format_local(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string()
}

/// Rejeita a gravação se a janela da ordem colide com outra ordem ativa.
pub fn ensure_no_conflict(
    status: WorkOrderStatus,
    scheduled_at: Option<DateTime<Utc>>,
    duration_hours: Option<Decimal>,
    exclude_id: Option<i64>,
    existing: &[ScheduledOrder],
    offset: FixedOffset,
) -> Result<(), AppError> {
    if !status.blocks_schedule() {
        return Ok(());
    }
    let Some(candidate) = Window::new(scheduled_at, duration_hours) else {
        return Ok(());
    };

    match find_conflict(&candidate, exclude_id, existing) {
        Some(other) => Err(AppError::ScheduleConflict {
            order_id: other.id,
            client_name: other.client_name.clone(),
            local_start: format_local(other.scheduled_at, offset),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, hour, minute, 0).unwrap()
    }

    fn hours(h: i64, scale: u32) -> Option<Decimal> {
        Some(Decimal::new(h, scale))
    }

    fn order(id: i64, status: WorkOrderStatus, start: DateTime<Utc>, duration: Option<Decimal>) -> ScheduledOrder {
        ScheduledOrder {
            id,
            client_name: format!("Cliente {id}"),
            status,
            scheduled_at: start,
            estimated_duration_hours: duration,
        }
    }

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn window_requires_start_and_positive_duration() {
        assert!(Window::new(None, hours(2, 0)).is_none());
        assert!(Window::new(Some(at(10, 0)), None).is_none());
        assert!(Window::new(Some(at(10, 0)), hours(0, 0)).is_none());
        assert!(Window::new(Some(at(10, 0)), hours(-1, 0)).is_none());

        let w = Window::new(Some(at(10, 0)), hours(25, 1)).unwrap();
        assert_eq!(w.end, at(12, 30));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let a = Window::new(Some(at(10, 0)), hours(2, 0)).unwrap();
        let b = Window::new(Some(at(12, 0)), hours(1, 0)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        let c = Window::new(Some(at(11, 59)), hours(1, 0)).unwrap();
        assert!(a.overlaps(&c));
    }

    #[test]
    fn conflict_reports_other_order_in_local_time() {
        let existing = vec![order(7, WorkOrderStatus::Open, at(13, 0), hours(2, 0))];
        let err = ensure_no_conflict(
            WorkOrderStatus::Open,
            Some(at(14, 0)),
            hours(1, 0),
            None,
            &existing,
            brt(),
        )
        .unwrap_err();

        match err {
            AppError::ScheduleConflict { order_id, client_name, local_start } => {
                assert_eq!(order_id, 7);
                assert_eq!(client_name, "Cliente 7");
                assert_eq!(local_start, "20/10/2026 10:00");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn closed_orders_do_not_block_the_schedule() {
        let existing = vec![
            order(1, WorkOrderStatus::Canceled, at(10, 0), hours(2, 0)),
            order(2, WorkOrderStatus::Finished, at(10, 0), hours(2, 0)),
            order(3, WorkOrderStatus::Paid, at(10, 0), hours(2, 0)),
        ];
        assert!(
            ensure_no_conflict(WorkOrderStatus::Open, Some(at(10, 30)), hours(1, 0), None, &existing, brt())
                .is_ok()
        );
    }

    #[test]
    fn in_progress_orders_block_the_schedule() {
        let existing = vec![order(4, WorkOrderStatus::InProgress, at(9, 0), hours(3, 0))];
        assert!(
            ensure_no_conflict(WorkOrderStatus::Open, Some(at(11, 0)), hours(1, 0), None, &existing, brt())
                .is_err()
        );
    }

    #[test]
    fn order_being_updated_is_ignored() {
        let existing = vec![order(5, WorkOrderStatus::Open, at(10, 0), hours(2, 0))];
        assert!(
            ensure_no_conflict(WorkOrderStatus::Open, Some(at(10, 30)), hours(1, 0), Some(5), &existing, brt())
                .is_ok()
        );
    }

    #[test]
    fn candidate_without_window_or_closed_is_exempt() {
        let existing = vec![order(6, WorkOrderStatus::Open, at(10, 0), hours(2, 0))];
        assert!(ensure_no_conflict(WorkOrderStatus::Open, Some(at(10, 30)), None, None, &existing, brt()).is_ok());
        assert!(
            ensure_no_conflict(WorkOrderStatus::Finished, Some(at(10, 30)), hours(1, 0), None, &existing, brt())
                .is_ok()
        );
    }

    #[test]
    fn existing_order_without_duration_never_conflicts() {
        let existing = vec![order(8, WorkOrderStatus::Open, at(10, 0), None)];
        assert!(
            ensure_no_conflict(WorkOrderStatus::Open, Some(at(10, 0)), hours(1, 0), None, &existing, brt())
                .is_ok()
        );
    }
}
