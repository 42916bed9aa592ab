#![warn(clippy::all, missing_docs)]

//! Core domain logic for the carrent rental desk.
//!
//! This crate hosts the vehicle catalog, pricing rules, the fleet state
//! reducer with its history replay, and the plain-text history store used
//! by the terminal UI and any future frontends.

pub mod catalog;
pub mod config;
pub mod desk;
pub mod fleet;
pub mod history;
pub mod models;
pub mod money;
pub mod pricing;
pub mod receipt;

pub use catalog::Catalog;
pub use config::AppConfig;
pub use desk::{DeskError, RentalDesk};
pub use fleet::{Fleet, RentalError, RentalOutcome, ReplayReport, ReturnOutcome};
pub use history::{HistoryStore, LineError, RentalEvent};
pub use models::{Category, Vehicle, VehicleId};
pub use money::Money;
pub use pricing::{Discount, Quote};
pub use receipt::Receipt;
