//! Fleet state reducer.
//!
//! [`Fleet`] is the single authority on which vehicle is rented by whom.
//! Live actions validate first through `plan_*`, then apply the resulting
//! event with [`Fleet::commit`]. Replay feeds stored events through the same
//! transition without re-validating business rules.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    catalog::Catalog,
    history::RentalEvent,
    models::{Vehicle, VehicleId},
    pricing::{self, Quote},
};

/// Expected, recoverable reasons a rent or return is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RentalError {
    /// The vehicle reference does not resolve to a catalog entry.
    #[error("no such vehicle")]
    NotFound,
    /// Rental length must be at least one day.
    #[error("invalid rental duration: {days} days")]
    InvalidDuration {
        /// Rejected day count.
        days: i64,
    },
    /// Renter names must be a single non-empty word.
    #[error("invalid renter name {name:?}")]
    InvalidRenter {
        /// Rejected name.
        name: String,
    },
    /// The vehicle is out with someone.
    #[error("this car is already rented by {by}")]
    AlreadyRented {
        /// Current renter.
        by: String,
    },
    /// The vehicle is on the lot.
    #[error("this car is not rented currently")]
    NotCurrentlyRented,
    /// Somebody else has the vehicle.
    #[error("this car is rented by {actual}, not you")]
    WrongRenter {
        /// Current renter.
        actual: String,
    },
}

/// Result of a successful rental, carrying everything a receipt needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentalOutcome {
    /// Vehicle that was rented.
    pub vehicle: VehicleId,
    /// `brand model` of the vehicle.
    pub label: String,
    /// Who rented it.
    pub renter: String,
    /// Price breakdown.
    pub quote: Quote,
    /// History entry describing the rental.
    pub event: RentalEvent,
}

/// Result of a successful return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnOutcome {
    /// Vehicle that came back.
    pub vehicle: VehicleId,
    /// `brand model` of the vehicle.
    pub label: String,
    /// Who returned it.
    pub renter: String,
    /// History entry describing the return.
    pub event: RentalEvent,
}

/// Summary of a history replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Lines whose event changed fleet state.
    pub applied: usize,
    /// Lines ignored as malformed, unresolvable, or not matching the tracked renter.
    pub skipped: usize,
}

/// Catalog plus the in-memory event history.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    catalog: Catalog,
    history: Vec<RentalEvent>,
}

impl Fleet {
    /// Wrap a catalog with an empty history.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            history: Vec::new(),
        }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Look up a vehicle by identity.
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.catalog.get(id)
    }

    /// Events recorded so far, oldest first.
    pub fn history(&self) -> &[RentalEvent] {
        &self.history
    }

    /// Every vehicle in display order.
    pub fn list_all(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.catalog.iter()
    }

    /// Vehicles currently on the lot, in display order.
    pub fn list_available(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.catalog.iter().filter(|vehicle| vehicle.is_available())
    }

    /// Case-insensitive exact match on brand and model.
    pub fn find_by_brand_model(&self, brand: &str, model: &str) -> Option<VehicleId> {
        self.catalog.find(brand, model)
    }

    /// Vehicles whose brand or model equals `keyword`, ignoring case.
    pub fn search(&self, keyword: &str) -> Vec<VehicleId> {
        let keyword = keyword.trim();
        self.catalog
            .iter()
            .filter(|vehicle| {
                vehicle.brand.eq_ignore_ascii_case(keyword)
                    || vehicle.model.eq_ignore_ascii_case(keyword)
            })
            .map(|vehicle| vehicle.id)
            .collect()
    }

    /// Stable ascending sort of the display order by manufacture year.
    pub fn sort_by_year(&mut self) {
        self.catalog.sort_by_year();
    }

    /// Validate and price a rental without changing any state.
    pub fn plan_rent(
        &self,
        id: VehicleId,
        renter: &str,
        days: i64,
    ) -> Result<RentalOutcome, RentalError> {
        let vehicle = self.catalog.get(id).ok_or(RentalError::NotFound)?;
        let days = u32::try_from(days)
            .ok()
            .filter(|days| *days > 0)
            .ok_or(RentalError::InvalidDuration { days })?;
        let renter = validate_renter(renter)?;
        if let Some(by) = &vehicle.renter {
            return Err(RentalError::AlreadyRented { by: by.clone() });
        }

        let quote = pricing::quote(vehicle.category, days);
        Ok(RentalOutcome {
            vehicle: id,
            label: vehicle.label(),
            renter: renter.to_string(),
            quote,
            event: RentalEvent::Rented {
                renter: renter.to_string(),
                brand: vehicle.brand.clone(),
                model: vehicle.model.clone(),
                days: Some(days),
                total: Some(quote.total),
            },
        })
    }

    /// Validate a return without changing any state.
    pub fn plan_return(&self, id: VehicleId, renter: &str) -> Result<ReturnOutcome, RentalError> {
        let vehicle = self.catalog.get(id).ok_or(RentalError::NotFound)?;
        let Some(actual) = &vehicle.renter else {
            return Err(RentalError::NotCurrentlyRented);
        };
        if actual != renter {
            return Err(RentalError::WrongRenter {
                actual: actual.clone(),
            });
        }

        Ok(ReturnOutcome {
            vehicle: id,
            label: vehicle.label(),
            renter: renter.to_string(),
            event: RentalEvent::Returned {
                renter: renter.to_string(),
                brand: vehicle.brand.clone(),
                model: vehicle.model.clone(),
            },
        })
    }

    /// Rent a vehicle, recording the event in the in-memory history.
    pub fn rent(
        &mut self,
        id: VehicleId,
        renter: &str,
        days: i64,
    ) -> Result<RentalOutcome, RentalError> {
        let outcome = self.plan_rent(id, renter, days)?;
        self.commit(outcome.event.clone());
        Ok(outcome)
    }

    /// Return a vehicle, recording the event in the in-memory history.
    pub fn give_back(&mut self, id: VehicleId, renter: &str) -> Result<ReturnOutcome, RentalError> {
        let outcome = self.plan_return(id, renter)?;
        self.commit(outcome.event.clone());
        Ok(outcome)
    }

    /// Apply an event's effect and append it to the history.
    ///
    /// Returns whether any vehicle changed. The event is recorded either way.
    pub fn commit(&mut self, event: RentalEvent) -> bool {
        let changed = self.apply(&event);
        debug!(%event, changed, "Event committed");
        self.history.push(event);
        changed
    }

    /// Rebuild vehicle state from stored history lines, oldest first.
    ///
    /// Unparseable lines, unknown vehicles, and returns by someone other than
    /// the tracked renter are skipped with a warning.
    pub fn replay<I, S>(&mut self, lines: I) -> ReplayReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ReplayReport::default();
        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            let event = match RentalEvent::parse(line) {
                Ok(event) => event,
                Err(err) => {
                    warn!(line = index + 1, "Skipping history line: {err}");
                    report.skipped += 1;
                    continue;
                }
            };
            if self.commit(event) {
                report.applied += 1;
            } else {
                warn!(line = index + 1, "History line has no effect: {line}");
                report.skipped += 1;
            }
        }
        info!(
            applied = report.applied,
            skipped = report.skipped,
            "History replayed"
        );
        report
    }

    fn apply(&mut self, event: &RentalEvent) -> bool {
        let Some(id) = self.catalog.find_leading(event.brand(), event.model()) else {
            return false;
        };
        let Some(vehicle) = self.catalog.get_mut(id) else {
            return false;
        };
        match event {
            RentalEvent::Rented { renter, .. } => {
                vehicle.renter = Some(renter.clone());
                true
            }
            RentalEvent::Returned { renter, .. } => {
                if vehicle.renter.as_deref() == Some(renter.as_str()) {
                    vehicle.renter = None;
                    true
                } else {
                    false
                }
            }
        }
    }
}

fn validate_renter(renter: &str) -> Result<&str, RentalError> {
    let trimmed = renter.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(RentalError::InvalidRenter {
            name: renter.to_string(),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn fleet() -> Fleet {
        Fleet::new(Catalog::seeded())
    }

    fn camry(fleet: &Fleet) -> VehicleId {
        fleet
            .find_by_brand_model("Toyota", "Camry")
            .expect("camry in catalog")
    }

    #[test]
    fn rent_prices_and_marks_vehicle() {
        let mut fleet = fleet();
        let id = fleet.find_by_brand_model("tesla", "model 3").expect("model 3");

        let outcome = fleet.rent(id, "Alice", 5).expect("rental");
        assert_eq!(outcome.quote.base, Money::from_dollars(170));
        assert_eq!(outcome.quote.discount.fraction(), 0.25);
        assert_eq!(outcome.quote.total, Money::from_cents(12750));
        assert_eq!(outcome.label, "Tesla Model 3");

        let vehicle = fleet.vehicle(id).expect("vehicle");
        assert!(!vehicle.is_available());
        assert_eq!(vehicle.renter.as_deref(), Some("Alice"));
        assert_eq!(fleet.history().len(), 1);
        assert_eq!(fleet.list_available().count(), 14);
    }

    #[test]
    fn rent_then_return_restores_state() {
        let mut fleet = fleet();
        let id = camry(&fleet);
        let before = fleet.vehicle(id).cloned();

        fleet.rent(id, "Alice", 3).expect("rental");
        fleet.give_back(id, "Alice").expect("return");

        assert_eq!(fleet.vehicle(id).cloned(), before);
        assert_eq!(fleet.history().len(), 2);
    }

    #[test]
    fn rejects_invalid_requests_without_side_effects() {
        let mut fleet = fleet();
        let id = camry(&fleet);

        assert_eq!(
            fleet.rent(id, "Alice", 0),
            Err(RentalError::InvalidDuration { days: 0 })
        );
        assert_eq!(
            fleet.rent(id, "Alice", -2),
            Err(RentalError::InvalidDuration { days: -2 })
        );
        assert!(matches!(
            fleet.rent(id, "Mary Ann", 2),
            Err(RentalError::InvalidRenter { .. })
        ));
        assert_eq!(
            fleet.rent(VehicleId(99), "Alice", 2),
            Err(RentalError::NotFound)
        );
        assert_eq!(
            fleet.give_back(id, "Alice"),
            Err(RentalError::NotCurrentlyRented)
        );
        assert!(fleet.history().is_empty());
        assert!(fleet.vehicle(id).map(Vehicle::is_available).unwrap_or(false));
    }

    #[test]
    fn already_rented_is_refused() {
        let mut fleet = fleet();
        let id = camry(&fleet);
        fleet.rent(id, "Alice", 3).expect("rental");

        assert_eq!(
            fleet.rent(id, "Bob", 4),
            Err(RentalError::AlreadyRented {
                by: "Alice".to_string()
            })
        );
        assert_eq!(fleet.history().len(), 1);
        assert_eq!(
            fleet.vehicle(id).and_then(|v| v.renter.clone()),
            Some("Alice".to_string())
        );
    }

    #[test]
    fn wrong_renter_cannot_return() {
        let mut fleet = fleet();
        let id = camry(&fleet);
        fleet.rent(id, "Alice", 3).expect("rental");

        assert_eq!(
            fleet.give_back(id, "alice"),
            Err(RentalError::WrongRenter {
                actual: "Alice".to_string()
            })
        );
        assert_eq!(fleet.history().len(), 1);
        assert!(!fleet.vehicle(id).map(Vehicle::is_available).unwrap_or(true));
    }

    #[test]
    fn replay_matches_live_actions() {
        let mut live = fleet();
        let id = camry(&live);
        live.rent(id, "Alice", 3).expect("rental");
        live.give_back(id, "Alice").expect("return");

        let mut replayed = fleet();
        let report = replayed.replay([
            "Alice RENTED Toyota Camry for 3 days | Total: $108.0",
            "Alice RETURNED Toyota Camry",
        ]);
        assert_eq!(report, ReplayReport { applied: 2, skipped: 0 });

        let live_state: Vec<Vehicle> = live.list_all().cloned().collect();
        let replayed_state: Vec<Vehicle> = replayed.list_all().cloned().collect();
        assert_eq!(live_state, replayed_state);
    }

    #[test]
    fn replay_rebuilds_outstanding_rentals() {
        let mut fleet = fleet();
        let report = fleet.replay(vec![
            "Bob RENTED toyota land cruiser for 7 days | Total: $378.00".to_string(),
            "Carol RENTED Tesla Model Y for 2 days | Total: $68.00".to_string(),
            "Carol RETURNED Tesla Model Y".to_string(),
            "Dave RENTED Audi A4 for 1 days | Total: $40.00".to_string(),
        ]);
        assert_eq!(report.applied, 4);

        let cruiser = fleet
            .find_by_brand_model("Toyota", "Land Cruiser")
            .and_then(|id| fleet.vehicle(id))
            .expect("land cruiser");
        assert_eq!(cruiser.renter.as_deref(), Some("Bob"));
        assert_eq!(fleet.list_available().count(), 13);
        assert_eq!(fleet.history().len(), 4);
    }

    #[test]
    fn replay_skips_bad_lines_and_foreign_returns() {
        let mut fleet = fleet();
        let report = fleet.replay([
            "garbage",
            "",
            "Alice RENTED Lada Niva for 3 days | Total: $1.00",
            "Alice RENTED Honda Civic for 3 days | Total: $120.00",
            "Bob RETURNED Honda Civic",
            "Bob RENTED Honda Civic for 2 days | Total: $80.00",
        ]);
        assert_eq!(report, ReplayReport { applied: 2, skipped: 3 });

        let civic = fleet
            .find_by_brand_model("Honda", "Civic")
            .and_then(|id| fleet.vehicle(id))
            .expect("civic");
        // Replay does not re-check availability; the later rental wins.
        assert_eq!(civic.renter.as_deref(), Some("Bob"));
    }

    #[test]
    fn replay_ignores_text_after_the_model() {
        let mut fleet = fleet();
        let report = fleet.replay([
            "Alice RENTED Toyota Camry | Total: $120.00",
            "Bob RENTED Honda Civic for 3 days | Total: $120.00",
            "Bob RETURNED Honda Civic at noon",
            "Carol RENTED Toyota Land Cruiser today",
        ]);
        assert_eq!(report, ReplayReport { applied: 4, skipped: 0 });

        let renter_of = |brand: &str, model: &str| {
            fleet
                .find_by_brand_model(brand, model)
                .and_then(|id| fleet.vehicle(id))
                .and_then(|vehicle| vehicle.renter.clone())
        };
        assert_eq!(renter_of("Toyota", "Camry").as_deref(), Some("Alice"));
        assert_eq!(renter_of("Honda", "Civic"), None);
        assert_eq!(renter_of("Toyota", "Land Cruiser").as_deref(), Some("Carol"));
    }

    #[test]
    fn search_matches_brand_or_model_exactly() {
        let fleet = fleet();
        let labels: Vec<String> = fleet
            .search("toyota")
            .into_iter()
            .filter_map(|id| fleet.vehicle(id).map(Vehicle::label))
            .collect();
        assert_eq!(labels, vec!["Toyota Camry", "Toyota Land Cruiser"]);

        assert_eq!(fleet.search("LEAF").len(), 1);
        assert!(fleet.search("Toy").is_empty());
        assert!(fleet.search("Lada").is_empty());
    }

    #[test]
    fn ids_survive_sorting() {
        let mut fleet = fleet();
        let id = camry(&fleet);
        fleet.sort_by_year();
        fleet.rent(id, "Alice", 2).expect("rental");
        assert_eq!(
            fleet.vehicle(id).map(Vehicle::label).as_deref(),
            Some("Toyota Camry")
        );
        let years: Vec<u16> = fleet.list_all().map(|v| v.year).collect();
        assert!(years.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
