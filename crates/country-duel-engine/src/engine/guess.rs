use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    DataIntegrityError,
    core::{CountryCode, Dataset, Round},
};

/// Result of comparing the two sides of a round against a guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessOutcome {
    pub correct: bool,
    /// Country with the strictly greater value, `None` on a tie.
    pub winner: Option<CountryCode>,
    pub left_value: f64,
    pub right_value: f64,
}

/// Evaluates `guess` against the values the dataset holds for `round`.
///
/// A tie is never won. Fails if the round pits a country against itself, names
/// a key outside the dataset's indicator list, or either side has no value for
/// the indicator. Any of these means the round did not come from this dataset.
pub fn evaluate_guess(
    dataset: &Dataset,
    round: &Round,
    guess: &CountryCode,
) -> Result<GuessOutcome, DataIntegrityError> {
    if round.left == round.right {
        return Err(DataIntegrityError::SameCountry(round.left.clone()));
    }
    if !dataset.indicators().contains(&round.indicator) {
        return Err(DataIntegrityError::UnknownIndicator(round.indicator.clone()));
    }
    let value_of = |country: &CountryCode| {
        dataset
            .value(country, &round.indicator)
            .ok_or_else(|| DataIntegrityError::MissingValue {
                country: country.clone(),
                indicator: round.indicator.clone(),
            })
    };
    let left_value = value_of(&round.left)?;
    let right_value = value_of(&round.right)?;

    let winner = match left_value.partial_cmp(&right_value) {
        Some(Ordering::Greater) => Some(round.left.clone()),
        Some(Ordering::Less) => Some(round.right.clone()),
        Some(Ordering::Equal) | None => None,
    };
    let correct = winner.as_ref() == Some(guess);

    Ok(GuessOutcome {
        correct,
        winner,
        left_value,
        right_value,
    })
}
