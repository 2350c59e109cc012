// src/services/billing.rs
//
// Valores da ordem e regras de status ligadas a pagamento. Tudo aqui é puro:
// recebe o estado já lido do banco e devolve a decisão.

use rust_decimal::Decimal;

use crate::{
    common::{
        error::AppError,
        money::{round2, EPSILON, MAX_ORDER_TOTAL},
    },
    models::work_order::{OrderValues, WorkOrderStatus},
};

pub fn services_value<I>(prices: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round2(prices.into_iter().sum())
}

/// Soma de quantidade × preço unitário de cada linha de material.
pub fn materials_value<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    round2(
        lines
            .into_iter()
            .map(|(quantity, unit_price)| Decimal::from(quantity) * unit_price)
            .sum(),
    )
}

/// Total persistido na ordem.
pub fn order_total<S, M>(service_prices: S, material_lines: M) -> Decimal
where
    S: IntoIterator<Item = Decimal>,
    M: IntoIterator<Item = (i32, Decimal)>,
{
    round2(services_value(service_prices) + materials_value(material_lines))
}

/// O total precisa caber na coluna da ordem; acima disso é erro de negócio.
pub fn check_total(total: Decimal) -> Result<Decimal, AppError> {
    if total > MAX_ORDER_TOTAL {
        return Err(AppError::TotalTooLarge { max: MAX_ORDER_TOTAL });
    }
    Ok(total)
}

/// Saldo bruto (pode ser negativo se a composição diminuiu depois de pagamentos).
pub fn pending(total: Decimal, paid: Decimal) -> Decimal {
    round2(total - paid)
}

pub fn is_settled(pending: Decimal) -> bool {
    pending <= EPSILON
}

/// Valores exibidos da ordem, sempre derivados da composição atual.
/// O pendente reportado nunca é negativo.
pub fn compute_values<S, M, P>(service_prices: S, material_lines: M, payments: P) -> OrderValues
where
    S: IntoIterator<Item = Decimal>,
    M: IntoIterator<Item = (i32, Decimal)>,
    P: IntoIterator<Item = Decimal>,
{
    let services = services_value(service_prices);
    let materials = materials_value(material_lines);
    let total = round2(services + materials);
    let paid = round2(payments.into_iter().sum());

    OrderValues {
        services_value: services,
        materials_value: materials,
        total_value: total,
        paid_value: paid,
        pending_value: pending(total, paid).max(round2(Decimal::ZERO)),
    }
}

// =============================================================================
//  Status
// =============================================================================

/// Finalizar: só a partir de Open/InProgress; quitada vira Paid, senão Finished.
pub fn finalize(stored: WorkOrderStatus, pending: Decimal) -> Result<WorkOrderStatus, AppError> {
    match stored {
        WorkOrderStatus::Open | WorkOrderStatus::InProgress => Ok(if is_settled(pending) {
            WorkOrderStatus::Paid
        } else {
            WorkOrderStatus::Finished
        }),
        other => Err(AppError::CannotFinalize(other)),
    }
}

pub fn cancel(stored: WorkOrderStatus) -> Result<WorkOrderStatus, AppError> {
    if stored.is_terminal() {
        return Err(AppError::CannotCancel(stored));
    }
    Ok(WorkOrderStatus::Canceled)
}

/// Valida um novo pagamento contra o status e o saldo atuais.
pub fn check_payment(
    stored: WorkOrderStatus,
    amount: Decimal,
    pending: Decimal,
) -> Result<(), AppError> {
    if stored.is_terminal() {
        return Err(AppError::OrderClosedForPayments(stored));
    }
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidPaymentAmount);
    }
    if pending <= Decimal::ZERO {
        return Err(AppError::NothingPending);
    }
    if amount > pending + EPSILON {
        return Err(AppError::PaymentExceedsPending { pending });
    }
    Ok(())
}

/// Depois de registrar um pagamento: ordem finalizada e quitada passa a Paid.
pub fn status_after_payment(stored: WorkOrderStatus, pending: Decimal) -> WorkOrderStatus {
    match stored {
        WorkOrderStatus::Finished if is_settled(pending) => WorkOrderStatus::Paid,
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub status: WorkOrderStatus,
    pub clear_finished_at: bool,
}

/// Depois de excluir um pagamento: ordem paga que voltou a ter saldo volta a
/// Finished e perde a data de finalização.
pub fn status_after_payment_removed(stored: WorkOrderStatus, pending: Decimal) -> Reconciliation {
    match stored {
        WorkOrderStatus::Paid if pending > Decimal::ZERO => Reconciliation {
            status: WorkOrderStatus::Finished,
            clear_finished_at: true,
        },
        other => Reconciliation { status: other, clear_finished_at: false },
    }
}

/// Depois de recalcular o total (serviços/materiais mudaram) numa ordem fechada.
pub fn status_after_recompute(stored: WorkOrderStatus, pending: Decimal) -> WorkOrderStatus {
    match stored {
        WorkOrderStatus::Paid if pending > Decimal::ZERO => WorkOrderStatus::Finished,
        WorkOrderStatus::Finished if is_settled(pending) => WorkOrderStatus::Paid,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brl(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn total_adds_services_and_material_lines() {
        // Um serviço de R$ 100,00 e 2 × material de R$ 15,00
        let total = order_total([brl(10000)], [(2, brl(1500))]);
        assert_eq!(total, brl(13000));
        assert_eq!(total.to_string(), "130.00");
    }

    #[test]
    fn empty_order_totals_zero() {
        let values = compute_values(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(values.total_value.to_string(), "0.00");
        assert_eq!(values.pending_value.to_string(), "0.00");
    }

    #[test]
    fn values_split_paid_and_pending() {
        let services = [brl(10000), brl(2550)];
        let lines = [(3, brl(199)), (1, brl(1000))];
        let values = compute_values(services, lines, [brl(5000)]);
        assert_eq!(values.total_value, order_total(services, lines));
        assert_eq!(values.services_value, brl(12550));
        assert_eq!(values.materials_value, brl(1597));
        assert_eq!(values.total_value, brl(14147));
        assert_eq!(values.paid_value, brl(5000));
        assert_eq!(values.pending_value, brl(9147));
    }

    #[test]
    fn reported_pending_is_never_negative() {
        let values = compute_values([brl(5000)], Vec::new(), [brl(8000)]);
        assert_eq!(values.pending_value, brl(0));
        assert_eq!(pending(brl(5000), brl(8000)), brl(-3000));
    }

    #[test]
    fn displayed_total_is_services_plus_materials() {
        // Preço do serviço subiu depois do pagamento: o saldo reaparece
        let values = compute_values([brl(12000)], [(2, brl(1500))], [brl(10000)]);
        assert_eq!(values.total_value, values.services_value + values.materials_value);
        assert_eq!(values.total_value, brl(15000));
        assert_eq!(values.pending_value, brl(5000));
    }

    #[test]
    fn total_up_to_the_column_limit_is_accepted() {
        assert_eq!(MAX_ORDER_TOTAL.to_string(), "99999999.99");
        assert_eq!(check_total(MAX_ORDER_TOTAL).unwrap(), MAX_ORDER_TOTAL);
    }

    #[test]
    fn total_above_the_column_limit_is_rejected() {
        let total = order_total([brl(9_999_999_999)], [(1, brl(1))]);
        assert!(matches!(check_total(total), Err(AppError::TotalTooLarge { max }) if max == MAX_ORDER_TOTAL));
    }

    #[test]
    fn finalize_settled_order_becomes_paid() {
        assert_eq!(finalize(WorkOrderStatus::Open, brl(0)).unwrap(), WorkOrderStatus::Paid);
        assert_eq!(finalize(WorkOrderStatus::InProgress, brl(1)).unwrap(), WorkOrderStatus::Paid);
    }

    #[test]
    fn finalize_with_balance_becomes_finished() {
        assert_eq!(finalize(WorkOrderStatus::Open, brl(2)).unwrap(), WorkOrderStatus::Finished);
        assert_eq!(
            finalize(WorkOrderStatus::InProgress, brl(13000)).unwrap(),
            WorkOrderStatus::Finished
        );
    }

    #[test]
    fn finalize_rejected_outside_open_or_in_progress() {
        for status in [WorkOrderStatus::Finished, WorkOrderStatus::Paid, WorkOrderStatus::Canceled] {
            assert!(matches!(finalize(status, brl(0)), Err(AppError::CannotFinalize(s)) if s == status));
        }
    }

    #[test]
    fn cancel_only_from_non_terminal() {
        assert_eq!(cancel(WorkOrderStatus::Finished).unwrap(), WorkOrderStatus::Canceled);
        assert!(cancel(WorkOrderStatus::Paid).is_err());
        assert!(cancel(WorkOrderStatus::Canceled).is_err());
    }

    #[test]
    fn payment_amount_must_be_positive() {
        assert!(matches!(
            check_payment(WorkOrderStatus::Open, brl(0), brl(10000)),
            Err(AppError::InvalidPaymentAmount)
        ));
        assert!(matches!(
            check_payment(WorkOrderStatus::Open, brl(-100), brl(10000)),
            Err(AppError::InvalidPaymentAmount)
        ));
    }

    #[test]
    fn payment_may_exceed_pending_by_one_cent_only() {
        assert!(check_payment(WorkOrderStatus::Finished, brl(13001), brl(13000)).is_ok());
        assert!(matches!(
            check_payment(WorkOrderStatus::Finished, brl(13002), brl(13000)),
            Err(AppError::PaymentExceedsPending { .. })
        ));
    }

    #[test]
    fn payment_rejected_on_closed_or_settled_orders() {
        assert!(matches!(
            check_payment(WorkOrderStatus::Paid, brl(100), brl(100)),
            Err(AppError::OrderClosedForPayments(WorkOrderStatus::Paid))
        ));
        assert!(matches!(
            check_payment(WorkOrderStatus::Canceled, brl(100), brl(100)),
            Err(AppError::OrderClosedForPayments(WorkOrderStatus::Canceled))
        ));
        assert!(matches!(
            check_payment(WorkOrderStatus::Open, brl(100), brl(0)),
            Err(AppError::NothingPending)
        ));
    }

    #[test]
    fn full_payment_on_finished_order_marks_it_paid() {
        assert_eq!(status_after_payment(WorkOrderStatus::Finished, brl(0)), WorkOrderStatus::Paid);
        assert_eq!(
            status_after_payment(WorkOrderStatus::Finished, brl(500)),
            WorkOrderStatus::Finished
        );
        // Ordem aberta quitada continua aberta até ser finalizada
        assert_eq!(status_after_payment(WorkOrderStatus::Open, brl(0)), WorkOrderStatus::Open);
    }

    #[test]
    fn removing_payment_reverts_paid_order() {
        let r = status_after_payment_removed(WorkOrderStatus::Paid, brl(13000));
        assert_eq!(r, Reconciliation { status: WorkOrderStatus::Finished, clear_finished_at: true });

        let untouched = status_after_payment_removed(WorkOrderStatus::Paid, brl(0));
        assert_eq!(untouched.status, WorkOrderStatus::Paid);
        assert!(!untouched.clear_finished_at);

        let open = status_after_payment_removed(WorkOrderStatus::Open, brl(13000));
        assert_eq!(open.status, WorkOrderStatus::Open);
    }

    #[test]
    fn recompute_moves_between_finished_and_paid() {
        assert_eq!(
            status_after_recompute(WorkOrderStatus::Paid, brl(1500)),
            WorkOrderStatus::Finished
        );
        assert_eq!(status_after_recompute(WorkOrderStatus::Finished, brl(-500)), WorkOrderStatus::Paid);
        assert_eq!(status_after_recompute(WorkOrderStatus::Open, brl(0)), WorkOrderStatus::Open);
    }
}
