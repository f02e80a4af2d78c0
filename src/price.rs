use rust_decimal::{Decimal, RoundingStrategy};

/// Renders an amount as Brazilian Real, e.g. `R$ 4.890,00`.
///
/// The separator between the symbol and the digits is a non-breaking space,
/// the same output browsers produce for the `pt-BR`/`BRL` locale pair.
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    // Units and centavos are taken apart so amounts near `Decimal::MAX` never scale up.
    let magnitude = rounded.abs();
    let units = magnitude.trunc().normalize().to_string();
    let centavos = (magnitude.fract() * Decimal::ONE_HUNDRED)
        .trunc()
        .normalize()
        .to_string();

    format!(
        "{sign}R$\u{a0}{},{:0>2}",
        group_thousands(&units),
        centavos
    )
}

fn group_thousands(units: &str) -> String {
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_amounts_with_thousand_separators() {
        assert_eq!(format_price(Decimal::from(4890)), "R$\u{a0}4.890,00");
        assert_eq!(format_price(Decimal::from(1_234_567)), "R$\u{a0}1.234.567,00");
        assert_eq!(format_price(Decimal::from(100)), "R$\u{a0}100,00");
    }

    #[test]
    fn formats_fractions() {
        assert_eq!(format_price(Decimal::new(5, 1)), "R$\u{a0}0,50");
        assert_eq!(format_price(Decimal::new(7, 2)), "R$\u{a0}0,07");
        assert_eq!(format_price(Decimal::new(199_990, 2)), "R$\u{a0}1.999,90");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_price(Decimal::new(12_345, 3)), "R$\u{a0}12,35");
        assert_eq!(format_price(Decimal::new(-12_345, 3)), "-R$\u{a0}12,35");
    }

    #[test]
    fn formats_amounts_up_to_the_decimal_limit() {
        assert_eq!(
            format_price(Decimal::MAX),
            "R$\u{a0}79.228.162.514.264.337.593.543.950.335,00"
        );
        assert_eq!(
            format_price(Decimal::from_i128_with_scale(10_i128.pow(27) + 5, 1)),
            "R$\u{a0}100.000.000.000.000.000.000.000.000,50"
        );
    }

    #[test]
    fn zero_has_no_sign() {
        assert_eq!(format_price(Decimal::ZERO), "R$\u{a0}0,00");
        assert_eq!(format_price(Decimal::new(-1, 3)), "R$\u{a0}0,00");
    }
}
