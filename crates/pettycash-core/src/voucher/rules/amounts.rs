//! Numeric coercion for OCR captures.
//!
//! Voucher amounts are printed with the cents in a separate box, so OCR
//! usually returns them as two digit groups (`450 00`). Captures arrive here
//! as strings and are parsed best-effort; callers substitute zero on `None`.

use std::borrow::Cow;

use rust_decimal::{Decimal, RoundingStrategy};

/// Replace letters OCR commonly confuses with digits.
///
/// Only call this on text already captured as a numeric column.
pub fn correct_ocr_digits(raw: &str) -> Cow<'_, str> {
    if !raw.chars().any(|c| matches!(c, 'O' | 'o' | 'I' | 'l' | 'S')) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.chars()
            .map(|c| match c {
                'O' | 'o' => '0',
                'I' | 'l' => '1',
                'S' => '5',
                other => other,
            })
            .collect(),
    )
}

/// Largest whole part a voucher amount can plausibly have. Longer digit runs
/// are OCR noise and would overflow a sum of line items.
pub const MAX_WHOLE_DIGITS: usize = 15;

fn whole_digits(cleaned: &str) -> usize {
    cleaned
        .split('.')
        .next()
        .map_or(0, |whole| whole.chars().filter(|c| c.is_ascii_digit()).count())
}

fn clean_number(raw: &str, auto_correct: bool) -> String {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("Rs.")
        .or_else(|| raw.strip_prefix("Rs"))
        .unwrap_or(raw);
    let raw = if auto_correct {
        correct_ocr_digits(raw)
    } else {
        Cow::Borrowed(raw)
    };
    // Commas and spaces are thousands separators on these vouchers.
    raw.chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{00a0}'))
        .collect()
}

/// Parse a currency figure such as `1,200.50` or `Rs 450`.
pub fn parse_amount(raw: &str, auto_correct: bool) -> Option<Decimal> {
    let cleaned = clean_number(raw, auto_correct);
    if cleaned.is_empty() || whole_digits(&cleaned) > MAX_WHOLE_DIGITS {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Parse an integer column such as a budget figure.
pub fn parse_integer(raw: &str, auto_correct: bool) -> Option<i64> {
    let cleaned = clean_number(raw, auto_correct);
    cleaned.parse::<i64>().ok()
}

/// Rebuild an amount captured as separate whole and fraction digit groups.
///
/// The groups are joined as `"{whole}.{fraction}"` and parsed, so `("45", "5")`
/// is 45.5 and `("1000", "00")` is 1000.00. A fraction longer than two digits
/// is rounded half away from zero to cents. An empty fraction yields the whole
/// part alone. A whole part longer than [`MAX_WHOLE_DIGITS`] is rejected.
pub fn combine_split_amount(whole: &str, fraction: &str, auto_correct: bool) -> Option<Decimal> {
    let whole = clean_number(whole, auto_correct);
    let fraction = clean_number(fraction, auto_correct);

    if whole.is_empty()
        || whole_digits(&whole) > MAX_WHOLE_DIGITS
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let joined = if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    };

    let amount = joined.parse::<Decimal>().ok()?;
    if amount.scale() > 2 {
        Some(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    } else {
        Some(amount)
    }
}

/// Format an amount with exactly two decimal places.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_combine_two_digit_cents() {
        let amount = combine_split_amount("1000", "00", false).unwrap();
        assert_eq!(amount, Decimal::new(100000, 2));
        assert_eq!(amount.to_string(), "1000.00");
    }

    #[test]
    fn test_combine_single_digit_fraction() {
        let amount = combine_split_amount("45", "5", false).unwrap();
        assert_eq!(amount, Decimal::new(455, 1));
        assert_eq!(amount.to_string(), "45.5");
    }

    #[test]
    fn test_combine_long_fraction_rounds_to_cents() {
        assert_eq!(
            combine_split_amount("12", "345", false),
            Some(Decimal::new(1235, 2))
        );
    }

    #[test]
    fn test_combine_thousands_and_empty_fraction() {
        assert_eq!(
            combine_split_amount("1,250", "", false),
            Some(Decimal::new(1250, 0))
        );
        assert_eq!(combine_split_amount("", "50", false), None);
        assert_eq!(combine_split_amount("12", "x5", false), None);
    }

    #[test]
    fn test_combine_with_ocr_correction() {
        assert_eq!(
            combine_split_amount("45O", "OO", true),
            Some(Decimal::new(45000, 2))
        );
        assert_eq!(combine_split_amount("45O", "00", false), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,200.50", false), Some(Decimal::new(120050, 2)));
        assert_eq!(parse_amount("Rs. 450", false), Some(Decimal::new(450, 0)));
        assert_eq!(parse_amount("4S0", true), Some(Decimal::new(450, 0)));
        assert_eq!(parse_amount("four hundred", true), None);
        assert_eq!(parse_amount("  ", false), None);
    }

    #[test]
    fn test_implausibly_long_amounts_rejected() {
        let huge = "50000000000000000000000000000";
        assert_eq!(combine_split_amount(huge, "00", false), None);
        assert_eq!(parse_amount(huge, false), None);
        assert_eq!(parse_amount("1234567890123456", false), None);

        assert_eq!(
            combine_split_amount("999,999,999,999,999", "99", false),
            Some(Decimal::new(99999999999999999, 2))
        );
        assert_eq!(
            parse_amount("123456789012345.50", false),
            Some(Decimal::new(12345678901234550, 2))
        );
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("1,000", false), Some(1000));
        assert_eq!(parse_integer("1O00", true), Some(1000));
        assert_eq!(parse_integer("5X0", true), None);
        assert_eq!(parse_integer("", false), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(450, 0)), "450.00");
        assert_eq!(format_amount(Decimal::new(455, 1)), "45.50");
    }

    #[test]
    fn test_correct_ocr_digits_borrowed_when_clean() {
        assert!(matches!(correct_ocr_digits("450"), Cow::Borrowed(_)));
        assert_eq!(correct_ocr_digits("l2O"), "120");
    }
}
