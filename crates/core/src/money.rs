//! Integer-cent monetary amounts.

use std::{
    fmt,
    ops::{Add, AddAssign, Mul},
};

use serde::{Deserialize, Serialize};

/// A monetary value counted in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(0);

    /// Build an amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Build an amount from whole dollars.
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Raw value in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Reduce the amount by `percent` whole percentage points.
    ///
    /// Rounds toward zero, which is exact for whole-dollar amounts.
    pub const fn apply_percent_off(self, percent: u32) -> Self {
        Money(self.0 * (100 - percent as i64) / 100)
    }

    /// Parse `108`, `108.0`, `$108.50` and similar dollar notations.
    pub fn parse(input: &str) -> Option<Self> {
        let text = input.trim().trim_start_matches('$');
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let dollars: i64 = whole.parse().ok()?;
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().ok()? * 10,
            _ => fraction.parse::<i64>().ok()?,
        };
        Some(Money(dollars.checked_mul(100)?.checked_add(cents)?))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_dollars_and_cents() {
        assert_eq!(Money::from_dollars(120).to_string(), "$120.00");
        assert_eq!(Money::from_cents(9350).to_string(), "$93.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
    }

    #[test]
    fn percent_off_is_exact_for_whole_dollars() {
        assert_eq!(
            Money::from_dollars(110).apply_percent_off(15),
            Money::from_cents(9350)
        );
        assert_eq!(
            Money::from_dollars(170).apply_percent_off(25),
            Money::from_cents(12750)
        );
        assert_eq!(Money::from_dollars(40).apply_percent_off(0), Money::from_dollars(40));
    }

    #[test]
    fn parses_history_totals() {
        assert_eq!(Money::parse("$108.0"), Some(Money::from_cents(10800)));
        assert_eq!(Money::parse("93.5"), Some(Money::from_cents(9350)));
        assert_eq!(Money::parse("127.49"), Some(Money::from_cents(12749)));
        assert_eq!(Money::parse("40"), Some(Money::from_dollars(40)));
        assert_eq!(Money::parse("12.345"), None);
        assert_eq!(Money::parse("abc"), None);
        assert_eq!(Money::parse("$"), None);
    }
}
