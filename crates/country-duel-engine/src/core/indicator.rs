use super::dataset::IndicatorKey;

const INDICATOR_LABELS: &[(&str, &str)] = &[
    ("population", "population"),
    ("gdpPerCapita", "GDP per capita"),
    ("lifeExpectancy", "life expectancy"),
    ("educationExpenditure", "education expenditure (% of GDP)"),
    ("fertilityRate", "fertility rate (births per woman)"),
    ("literacyRate", "adult literacy rate (%)"),
    ("landArea", "land area (sq km)"),
    ("renewableElectricity", "renewable electricity (% of total)"),
    ("populationGrowth", "population growth (annual %)"),
    ("unemploymentRate", "unemployment rate (% of labor force)"),
    ("inflation", "inflation, consumer prices (annual %)"),
    ("netMigration", "net migration"),
    ("deathRate", "death rate (per 1,000 people)"),
    ("diabetesPrevalence", "diabetes prevalence (%)"),
    ("giniIndex", "wealth inequality (Gini index)"),
    (
        "intentionalHomicides",
        "intentional homicides (per 100,000 people)",
    ),
];

/// Human-readable label of an indicator.
///
/// Unknown indicators are labelled with their key.
#[must_use]
pub fn indicator_label(indicator: &IndicatorKey) -> &str {
    INDICATOR_LABELS
        .iter()
        .find(|(key, _)| *key == indicator.as_str())
        .map_or(indicator.as_str(), |(_, label)| label)
}

/// Formats an indicator value for display.
///
/// Integral values get thousands separators (`41,128,771`), everything else
/// is shown with two decimals (`415.71`).
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn format_stat_value(value: f64) -> String {
    // i64 covers every realistic indicator magnitude.
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        let digits = (value.abs() as i64).to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if value < 0.0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    } else {
        format!("{value:.2}")
    }
}
