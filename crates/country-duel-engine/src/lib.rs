pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A round that could not have been served from the dataset.
///
/// Raised when a client submits a stale or tampered round.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum DataIntegrityError {
    #[display("invalid round: {country} has no value for {indicator}")]
    MissingValue {
        country: CountryCode,
        indicator: IndicatorKey,
    },
    #[display("invalid round: {_0} is on both sides")]
    SameCountry(#[error(not(source))] CountryCode),
    #[display("invalid round: {_0} is not an indicator")]
    UnknownIndicator(#[error(not(source))] IndicatorKey),
}
