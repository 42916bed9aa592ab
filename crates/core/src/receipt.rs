//! Printable rental receipt.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{fleet::RentalOutcome, money::Money};

/// Data shown to the renter after a successful rental.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    /// Who rented.
    pub renter: String,
    /// `brand model` of the vehicle.
    pub vehicle: String,
    /// Rental length.
    pub days: u32,
    /// Price before discounts.
    pub base: Money,
    /// Discount in whole percentage points.
    pub discount_percent: u32,
    /// Amount owed.
    pub total: Money,
    /// When the receipt was produced.
    pub issued_at: DateTime<Local>,
}

impl Receipt {
    /// Build a receipt stamped with the current local time.
    pub fn new(outcome: &RentalOutcome) -> Self {
        Self::issued(outcome, Local::now())
    }

    /// Build a receipt with an explicit timestamp.
    pub fn issued(outcome: &RentalOutcome, issued_at: DateTime<Local>) -> Self {
        Self {
            renter: outcome.renter.clone(),
            vehicle: outcome.label.clone(),
            days: outcome.quote.days,
            base: outcome.quote.base,
            discount_percent: outcome.quote.discount.percent(),
            total: outcome.quote.total,
            issued_at,
        }
    }

    /// Receipt body, one entry per printed line.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Date: {}", self.issued_at.format("%Y-%m-%d %H:%M")),
            format!("Client: {}", self.renter),
            format!("Car: {}", self.vehicle),
            format!("Days: {}", self.days),
            format!("Base Price: {}", self.base),
            format!("Discount: {}%", self.discount_percent),
            format!("Total Price: {}", self.total),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, fleet::Fleet};
    use chrono::TimeZone;

    #[test]
    fn lists_price_breakdown() {
        let mut fleet = Fleet::new(Catalog::seeded());
        let id = fleet.find_by_brand_model("Nissan", "Leaf").expect("leaf");
        let outcome = fleet.rent(id, "Alice", 3).expect("rental");
        let issued_at = Local
            .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp");

        let lines = Receipt::issued(&outcome, issued_at).lines();
        assert_eq!(
            lines,
            vec![
                "Date: 2024-05-01 09:30",
                "Client: Alice",
                "Car: Nissan Leaf",
                "Days: 3",
                "Base Price: $110.00",
                "Discount: 15%",
                "Total Price: $93.50",
            ]
        );
    }
}
