use serde::{Deserialize, Serialize};

use super::dataset::{CountryCode, IndicatorKey};

/// One comparison challenge: two distinct countries and an indicator both define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub left: CountryCode,
    pub right: CountryCode,
    pub indicator: IndicatorKey,
}

impl Round {
    #[must_use]
    pub fn new(
        left: impl Into<CountryCode>,
        right: impl Into<CountryCode>,
        indicator: impl Into<IndicatorKey>,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            indicator: indicator.into(),
        }
    }

    /// Whether `country` is one of the two sides of this round.
    #[must_use]
    pub fn involves(&self, country: &CountryCode) -> bool {
        self.left == *country || self.right == *country
    }
}
