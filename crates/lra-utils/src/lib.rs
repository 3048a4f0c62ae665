//! Number and currency formatting helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Group the digits of an unsigned integer string with a separator
pub fn group_thousands(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format a number with thousands separators and a fixed number of decimals
///
/// Rounds half away from zero, so `1234.5` with zero decimals becomes `1,235`.
pub fn format_number(
    value: Decimal,
    decimal_places: u32,
    thousands_separator: &str,
    decimal_separator: &str,
) -> String {
    let rounded = value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text, String::new()),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part, thousands_separator));
    if decimal_places > 0 {
        let mut frac = frac_part;
        while (frac.len() as u32) < decimal_places {
            frac.push('0');
        }
        out.push_str(decimal_separator);
        out.push_str(&frac);
    }
    out
}

/// Format an amount as currency, e.g. `Rp 1,000` or `1.000,00 Rp`
pub fn format_currency(
    value: Decimal,
    symbol: &str,
    symbol_before: bool,
    decimal_places: u32,
    thousands_separator: &str,
    decimal_separator: &str,
) -> String {
    let number = format_number(value, decimal_places, thousands_separator, decimal_separator);
    if symbol.is_empty() {
        number
    } else if symbol_before {
        format!("{} {}", symbol, number)
    } else {
        format!("{} {}", number, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1", ","), "1");
        assert_eq!(group_thousands("1000", ","), "1,000");
        assert_eq!(group_thousands("1234567", "."), "1.234.567");
        assert_eq!(group_thousands("123456", ","), "123,456");
    }

    #[test]
    fn test_format_number_rounding() {
        assert_eq!(format_number(dec!(1234.5), 0, ",", "."), "1,235");
        assert_eq!(format_number(dec!(-1234.5), 0, ",", "."), "-1,235");
        assert_eq!(format_number(dec!(0.4), 0, ",", "."), "0");
        assert_eq!(format_number(dec!(-0.4), 0, ",", "."), "0");
    }

    #[test]
    fn test_format_number_decimals() {
        assert_eq!(format_number(dec!(1000), 2, ".", ","), "1.000,00");
        assert_eq!(format_number(dec!(1000.5), 2, ",", "."), "1,000.50");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(400), "Rp", true, 0, ",", "."), "Rp 400");
        assert_eq!(format_currency(dec!(-1500000), "Rp", true, 0, ",", "."), "Rp -1,500,000");
        assert_eq!(format_currency(dec!(12.3), "IDR", false, 2, ".", ","), "12,30 IDR");
        assert_eq!(format_currency(dec!(12), "", true, 0, ",", "."), "12");
    }
}
