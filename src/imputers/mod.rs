//! Imputation module for handling missing values.
//!
//! The pipeline fills missing numeric listing attributes (engine size,
//! mileage, power, seat count) with the column mean, computed over the
//! rows that survive required-field filtering.

mod statistical;

pub use statistical::{ImputationOutcome, MeanImputer};
