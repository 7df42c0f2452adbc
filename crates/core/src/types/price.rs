//! US dollar prices using decimal arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A US dollar amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    /// Amount in dollars, not cents.
    pub amount: Decimal,
}

impl Price {
    /// Create a US dollar price.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Format for display with grouped thousands (e.g., "$1,234.50").
    ///
    /// Rounds half away from zero to two decimal places.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        format!("{sign}${}.{fraction}", group_thousands(whole))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `,` separators every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(s: &str) -> String {
        Price::usd(s.parse().expect("decimal")).display()
    }

    #[test]
    fn test_display_small_amounts() {
        assert_eq!(usd("0"), "$0.00");
        assert_eq!(usd("5"), "$5.00");
        assert_eq!(usd("19.9"), "$19.90");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(usd("1234.5"), "$1,234.50");
        assert_eq!(usd("1000000"), "$1,000,000.00");
        assert_eq!(usd("999.99"), "$999.99");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(usd("2.005"), "$2.01");
        assert_eq!(usd("2.004"), "$2.00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(usd("-12.5"), "-$12.50");
        assert_eq!(usd("-0.001"), "$0.00");
    }

    #[test]
    fn test_display_largest_amount() {
        assert_eq!(
            Price::usd(Decimal::MAX).display(),
            "$79,228,162,514,264,337,593,543,950,335.00"
        );
    }
}
