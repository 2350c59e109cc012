// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Tolerância de arredondamento usada nas regras de quitação (R$ 0,01).
pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maior total que cabe em `work_orders.total_value` (NUMERIC(10, 2)).
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Arredonda para 2 casas (meio para longe do zero) e fixa a escala em 2,
/// para que o valor serialize sempre como "130.00".
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_is_one_cent() {
        assert_eq!(EPSILON, Decimal::new(1, 2));
    }

    #[test]
    fn round2_fixes_scale_for_whole_numbers() {
        assert_eq!(round2(Decimal::from(130)).to_string(), "130.00");
    }

    #[test]
    fn round2_rounds_midpoint_away_from_zero() {
        assert_eq!(round2(Decimal::new(10005, 3)).to_string(), "10.01");
        assert_eq!(round2(Decimal::new(-10005, 3)).to_string(), "-10.01");
        assert_eq!(round2(Decimal::new(10004, 3)).to_string(), "10.00");
    }
}
