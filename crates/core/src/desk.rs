//! Live rental session: the fleet reducer backed by the history file.

use anyhow::Context;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    catalog::Catalog,
    fleet::{Fleet, RentalError, RentalOutcome, ReplayReport, ReturnOutcome},
    history::{HistoryStore, RentalEvent},
    models::VehicleId,
};

/// Failure of a live desk action.
#[derive(Debug, Error)]
pub enum DeskError {
    /// The request broke a rental rule; nothing changed.
    #[error(transparent)]
    Rental(#[from] RentalError),
    /// The event could not be persisted; nothing changed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DeskError {
    /// The rule violation, if this is one.
    pub fn as_rental(&self) -> Option<&RentalError> {
        match self {
            DeskError::Rental(err) => Some(err),
            DeskError::Storage(_) => None,
        }
    }
}

/// Fleet state kept in step with the persisted history.
pub struct RentalDesk {
    fleet: Fleet,
    store: HistoryStore,
    replay: ReplayReport,
}

impl RentalDesk {
    /// Open the desk over the seeded catalog, replaying any stored history.
    pub fn open(store: HistoryStore) -> anyhow::Result<Self> {
        Self::with_catalog(Catalog::seeded(), store)
    }

    /// Open the desk over a custom catalog.
    pub fn with_catalog(catalog: Catalog, store: HistoryStore) -> anyhow::Result<Self> {
        let lines = store
            .load()
            .with_context(|| format!("failed to load history {}", store.path().display()))?;
        let mut fleet = Fleet::new(catalog);
        let replay = fleet.replay(&lines);
        info!(
            path = %store.path().display(),
            available = fleet.list_available().count(),
            "Rental desk opened"
        );
        Ok(Self {
            fleet,
            store,
            replay,
        })
    }

    /// Read access to the fleet.
    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Outcome of the startup replay.
    pub fn replay_report(&self) -> ReplayReport {
        self.replay
    }

    /// Backing history store.
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Re-order the catalog by manufacture year.
    pub fn sort_by_year(&mut self) {
        self.fleet.sort_by_year();
    }

    /// Rent a vehicle and persist the event.
    pub fn rent(
        &mut self,
        id: VehicleId,
        renter: &str,
        days: i64,
    ) -> Result<RentalOutcome, DeskError> {
        let outcome = self.fleet.plan_rent(id, renter, days)?;
        self.persist(&outcome.event)?;
        self.fleet.commit(outcome.event.clone());
        info!(vehicle = %outcome.label, renter = %outcome.renter, total = %outcome.quote.total, "Vehicle rented");
        Ok(outcome)
    }

    /// Return a vehicle and persist the event.
    pub fn give_back(&mut self, id: VehicleId, renter: &str) -> Result<ReturnOutcome, DeskError> {
        let outcome = self.fleet.plan_return(id, renter)?;
        self.persist(&outcome.event)?;
        self.fleet.commit(outcome.event.clone());
        info!(vehicle = %outcome.label, renter = %outcome.renter, "Vehicle returned");
        Ok(outcome)
    }

    fn persist(&self, event: &RentalEvent) -> Result<(), DeskError> {
        self.store.append(event).map_err(|err| {
            error!(?err, "Failed to persist history event");
            DeskError::Storage(err)
        })
    }
}
