#![allow(missing_docs)]

//! Rental history events and their line-oriented storage.

mod event;
pub mod store;

pub use event::{LineError, RentalEvent, RENTED_MARKER, RETURNED_MARKER};
pub use store::HistoryStore;
