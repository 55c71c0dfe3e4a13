//! Game data: the country/indicator dataset and the rounds built from it.
//!
//! - [`Dataset`] - Read-only table of indicator values per country
//! - [`Round`] - Two countries and the indicator they are compared on
//! - [`indicator_label`] / [`format_stat_value`] - Display helpers for indicators

pub use self::{dataset::*, indicator::*, round::*};

mod dataset;
mod indicator;
mod round;
