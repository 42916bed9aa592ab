//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Vehicle class; selects the pricing formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Standard passenger car.
    Sedan,
    /// Sport utility vehicle.
    Suv,
    /// Battery electric vehicle.
    Electric,
}

impl Category {
    /// Every category in catalog order.
    pub const ALL: [Category; 3] = [Category::Sedan, Category::Suv, Category::Electric];

    /// Short label used in listings.
    pub fn label(self) -> &'static str {
        match self {
            Category::Sedan => "Sedan",
            Category::Suv => "SUV",
            Category::Electric => "Electric",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identity of a catalog entry, unaffected by re-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub(crate) usize);

impl VehicleId {
    /// Raw numeric value, useful for logging.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rentable vehicle and its current assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Stable catalog identity.
    pub id: VehicleId,
    /// Manufacturer, e.g. `Toyota`.
    pub brand: String,
    /// Model name, e.g. `Land Cruiser`.
    pub model: String,
    /// Year of manufacture.
    pub year: u16,
    /// Pricing class.
    pub category: Category,
    /// Current renter; `None` while the vehicle is on the lot.
    #[serde(default)]
    pub renter: Option<String>,
}

impl Vehicle {
    /// Create an available vehicle.
    pub fn new(
        id: VehicleId,
        brand: impl Into<String>,
        model: impl Into<String>,
        year: u16,
        category: Category,
    ) -> Self {
        Self {
            id,
            brand: brand.into(),
            model: model.into(),
            year,
            category,
            renter: None,
        }
    }

    /// Whether the vehicle can be rented right now.
    pub fn is_available(&self) -> bool {
        self.renter.is_none()
    }

    /// `brand model`, as printed on receipts and history lines.
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// Case-insensitive comparison against a brand/model pair.
    pub fn matches(&self, brand: &str, model: &str) -> bool {
        self.brand.eq_ignore_ascii_case(brand) && self.model.eq_ignore_ascii_case(model)
    }

    /// Human-readable availability, e.g. `Rented by Alice`.
    pub fn status(&self) -> String {
        match self.renter.as_deref() {
            Some(renter) => format!("Rented by {renter}"),
            None => "Available".to_string(),
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) - {}",
            self.brand,
            self.model,
            self.year,
            self.status()
        )
    }
}
