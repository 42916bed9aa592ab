use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Marker token identifying a rental line.
pub const RENTED_MARKER: &str = "RENTED";
/// Marker token identifying a return line.
pub const RETURNED_MARKER: &str = "RETURNED";

/// One entry of the append-only rental history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentalEvent {
    /// A vehicle left the lot.
    Rented {
        renter: String,
        brand: String,
        model: String,
        /// Rental length; absent when a stored line omits or garbles it.
        days: Option<u32>,
        /// Amount charged; absent when a stored line omits or garbles it.
        total: Option<Money>,
    },
    /// A vehicle came back.
    Returned {
        renter: String,
        brand: String,
        model: String,
    },
}

/// Reasons a stored line cannot be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("line is empty")]
    Empty,
    #[error("line carries neither a RENTED nor a RETURNED marker")]
    UnknownMarker,
    #[error("line is missing the {0} field")]
    MissingField(&'static str),
}

impl RentalEvent {
    /// Name of the renter involved.
    pub fn renter(&self) -> &str {
        match self {
            RentalEvent::Rented { renter, .. } | RentalEvent::Returned { renter, .. } => renter,
        }
    }

    /// Vehicle brand.
    pub fn brand(&self) -> &str {
        match self {
            RentalEvent::Rented { brand, .. } | RentalEvent::Returned { brand, .. } => brand,
        }
    }

    /// Vehicle model.
    pub fn model(&self) -> &str {
        match self {
            RentalEvent::Rented { model, .. } | RentalEvent::Returned { model, .. } => model,
        }
    }

    /// Parse one persisted history line.
    ///
    /// The renter is the first whitespace-separated token and the brand the
    /// third. The model starts at the fourth token and runs up to the
    /// ` for N days` tail on rental lines, or to the end on return lines.
    pub fn parse(line: &str) -> Result<Self, LineError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(LineError::Empty);
        }

        // RETURNED does not contain RENTED, so the checks cannot overlap.
        let is_rental = line.contains(RENTED_MARKER);
        if !is_rental && !line.contains(RETURNED_MARKER) {
            return Err(LineError::UnknownMarker);
        }

        let (head, tail) = if is_rental {
            match RENTAL_TAIL_RE.find(line) {
                Some(found) => (&line[..found.start()], Some(&line[found.start()..])),
                None => (line, None),
            }
        } else {
            (line, None)
        };

        let tokens: Vec<&str> = head.split_whitespace().collect();
        let renter = tokens.first().ok_or(LineError::MissingField("renter"))?;
        let brand = tokens.get(2).ok_or(LineError::MissingField("brand"))?;
        if tokens.len() < 4 {
            return Err(LineError::MissingField("model"));
        }
        let model = tokens[3..].join(" ");

        if !is_rental {
            return Ok(RentalEvent::Returned {
                renter: renter.to_string(),
                brand: brand.to_string(),
                model,
            });
        }

        let (days, total) = tail.map(parse_rental_tail).unwrap_or((None, None));
        Ok(RentalEvent::Rented {
            renter: renter.to_string(),
            brand: brand.to_string(),
            model,
            days,
            total,
        })
    }
}

impl fmt::Display for RentalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentalEvent::Rented {
                renter,
                brand,
                model,
                days,
                total,
            } => {
                write!(f, "{renter} {RENTED_MARKER} {brand} {model}")?;
                if let Some(days) = days {
                    write!(f, " for {days} days")?;
                }
                if let Some(total) = total {
                    write!(f, " | Total: {total}")?;
                }
                Ok(())
            }
            RentalEvent::Returned {
                renter,
                brand,
                model,
            } => write!(f, "{renter} {RETURNED_MARKER} {brand} {model}"),
        }
    }
}

fn parse_rental_tail(tail: &str) -> (Option<u32>, Option<Money>) {
    let Some(caps) = RENTAL_TAIL_RE.captures(tail) else {
        return (None, None);
    };
    let days = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
    let total = caps.get(2).and_then(|m| Money::parse(m.as_str()));
    (days, total)
}

static RENTAL_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+for\s+(\S+)\s+days?\b(?:\s*\|\s*Total:\s*(\S+))?")
        .expect("failed to compile rental tail regex")
});
