//! Rental price computation.
//!
//! Base prices are linear in the number of days with a per-category daily
//! rate; electric vehicles add a fixed battery fee. Discounts are whole
//! percentage points that add up rather than compound.

use serde::{Deserialize, Serialize};

use crate::{models::Category, money::Money};

/// Rentals of at least this many days earn the long-rental discount.
pub const LONG_RENTAL_DAYS: u32 = 5;
/// Percentage points granted for a long rental.
pub const LONG_RENTAL_PERCENT: u32 = 10;
/// Percentage points granted for electric vehicles.
pub const ELECTRIC_PERCENT: u32 = 15;
/// One-off fee charged on every electric rental.
pub const ELECTRIC_BATTERY_FEE: Money = Money::from_dollars(20);

/// Daily rate for a category.
pub fn daily_rate(category: Category) -> Money {
    match category {
        Category::Sedan => Money::from_dollars(40),
        Category::Suv => Money::from_dollars(60),
        Category::Electric => Money::from_dollars(30),
    }
}

/// Price before discounts. `days` must be positive.
pub fn base_price(category: Category, days: u32) -> Money {
    let price = daily_rate(category) * i64::from(days);
    match category {
        Category::Electric => price + ELECTRIC_BATTERY_FEE,
        Category::Sedan | Category::Suv => price,
    }
}

/// Cumulative discount in whole percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Discount(u32);

impl Discount {
    /// No discount.
    pub const NONE: Discount = Discount(0);

    /// Discount for a rental of `category` lasting `days`.
    pub fn for_rental(category: Category, days: u32) -> Self {
        let mut percent = 0;
        if days >= LONG_RENTAL_DAYS {
            percent += LONG_RENTAL_PERCENT;
        }
        if category == Category::Electric {
            percent += ELECTRIC_PERCENT;
        }
        Discount(percent)
    }

    /// Whole percentage points, e.g. `25`.
    pub fn percent(self) -> u32 {
        self.0
    }

    /// Fraction of the base price removed, e.g. `0.25`.
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Apply the discount to a base price.
    pub fn apply(self, base: Money) -> Money {
        base.apply_percent_off(self.0)
    }
}

/// Discount the base price of a rental, returning the final price and the
/// discount that produced it.
pub fn apply_discount(category: Category, days: u32, base: Money) -> (Money, Discount) {
    let discount = Discount::for_rental(category, days);
    (discount.apply(base), discount)
}

/// Fully priced rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Category that was priced.
    pub category: Category,
    /// Rental length in days.
    pub days: u32,
    /// Price before discounts.
    pub base: Money,
    /// Discount applied to `base`.
    pub discount: Discount,
    /// Amount owed.
    pub total: Money,
}

/// Price a rental end to end.
pub fn quote(category: Category, days: u32) -> Quote {
    let base = base_price(category, days);
    let (total, discount) = apply_discount(category, days, base);
    Quote {
        category,
        days,
        base,
        discount,
        total,
    }
}
