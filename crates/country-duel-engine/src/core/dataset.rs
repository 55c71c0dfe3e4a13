use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    fs::File,
    io::{self, BufReader},
    path::Path,
};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};

/// ISO 3166-1 alpha-3 style country code as used by the World Bank (`"FRA"`, `"XKX"`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Key of a statistical indicator in the dataset (`"population"`, `"gdpPerCapita"`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct IndicatorKey(String);

impl IndicatorKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IndicatorKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DatasetError {
    #[display("failed to read dataset: {_0}")]
    Io(io::Error),
    #[display("failed to parse dataset: {_0}")]
    Parse(serde_json::Error),
    #[display("dataset needs at least two countries, found {count}")]
    #[from(ignore)]
    TooFewCountries { count: usize },
    #[display("dataset lists no indicators")]
    #[from(ignore)]
    NoIndicators,
    #[display("indicator {indicator} of {country} is not a finite number")]
    #[from(ignore)]
    InvalidValue {
        country: CountryCode,
        indicator: IndicatorKey,
    },
}

/// Indicator values of one country.
///
/// Unavailable indicators are absent, never stored as `null`.
#[derive(Debug, Clone)]
pub struct Country {
    code: CountryCode,
    values: HashMap<IndicatorKey, f64>,
}

impl Country {
    #[must_use]
    pub fn code(&self) -> &CountryCode {
        &self.code
    }

    #[must_use]
    pub fn value(&self, indicator: &IndicatorKey) -> Option<f64> {
        self.values.get(indicator).copied()
    }
}

/// Read-only table of countries, indicators and indicator years.
///
/// A dataset is loaded once at startup and shared as `Arc<Dataset>` by every
/// component that needs it. Country order is the order of the source document.
///
/// # Example
///
/// ```
/// use country_duel_engine::{CountryCode, Dataset, IndicatorKey};
///
/// let dataset = Dataset::from_json_str(
///     r#"{"countries": {"A": {"pop": 10}, "B": {"pop": 20}}, "indicators": ["pop"]}"#,
/// )
/// .unwrap();
///
/// assert_eq!(dataset.value(&CountryCode::from("B"), &IndicatorKey::from("pop")), Some(20.0));
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    countries: Vec<Country>,
    index: HashMap<CountryCode, usize>,
    indicators: Vec<IndicatorKey>,
    indicator_years: HashMap<IndicatorKey, i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    countries: OrderedCountries,
    indicators: Vec<IndicatorKey>,
    #[serde(default)]
    indicator_years: HashMap<IndicatorKey, i32>,
}

/// Country entries in document order.
#[derive(Debug)]
struct OrderedCountries(Vec<(CountryCode, BTreeMap<String, serde_json::Value>)>);

impl<'de> Deserialize<'de> for OrderedCountries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedCountries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of country code to indicator values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(OrderedCountries(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

impl Dataset {
    /// Loads a dataset from a JSON file.
    pub fn load<P>(path: P) -> Result<Self, DatasetError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let raw: RawDataset = serde_json::from_reader(reader)?;
        let dataset = Self::from_raw(raw)?;
        log::info!(
            "loaded dataset {}: {} countries, {} indicators",
            path.display(),
            dataset.countries.len(),
            dataset.indicators.len()
        );
        Ok(dataset)
    }

    /// Parses a dataset from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        Self::from_raw(serde_json::from_str(json)?)
    }

    fn from_raw(raw: RawDataset) -> Result<Self, DatasetError> {
        if raw.countries.0.len() < 2 {
            return Err(DatasetError::TooFewCountries {
                count: raw.countries.0.len(),
            });
        }
        if raw.indicators.is_empty() {
            return Err(DatasetError::NoIndicators);
        }

        let mut countries = Vec::with_capacity(raw.countries.0.len());
        let mut index = HashMap::with_capacity(raw.countries.0.len());
        for (code, fields) in raw.countries.0 {
            let mut values = HashMap::new();
            for (key, value) in fields {
                let key = IndicatorKey::new(key);
                match value {
                    serde_json::Value::Null => {}
                    serde_json::Value::Number(number) => {
                        let value = number.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
                            DatasetError::InvalidValue {
                                country: code.clone(),
                                indicator: key.clone(),
                            }
                        })?;
                        values.insert(key, value);
                    }
                    // Descriptive fields such as `name` or `region` are not indicators.
                    _ if !raw.indicators.contains(&key) => {}
                    _ => {
                        return Err(DatasetError::InvalidValue {
                            country: code,
                            indicator: key,
                        });
                    }
                }
            }
            // Later duplicates of a code would be unreachable; keep the first.
            if index.contains_key(&code) {
                log::warn!("duplicate country {code} in dataset ignored");
                continue;
            }
            index.insert(code.clone(), countries.len());
            countries.push(Country { code, values });
        }

        Ok(Self {
            countries,
            index,
            indicators: raw.indicators,
            indicator_years: raw.indicator_years,
        })
    }

    /// Country codes in dataset order.
    pub fn country_codes(&self) -> impl ExactSizeIterator<Item = &CountryCode> + '_ {
        self.countries.iter().map(Country::code)
    }

    #[must_use]
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    #[must_use]
    pub fn country(&self, code: &CountryCode) -> Option<&Country> {
        self.index.get(code).map(|&i| &self.countries[i])
    }

    #[must_use]
    pub fn contains(&self, code: &CountryCode) -> bool {
        self.index.contains_key(code)
    }

    #[must_use]
    pub fn indicators(&self) -> &[IndicatorKey] {
        &self.indicators
    }

    #[must_use]
    pub fn indicator_year(&self, indicator: &IndicatorKey) -> Option<i32> {
        self.indicator_years.get(indicator).copied()
    }

    /// Returns the value of `indicator` for `country`, if both exist.
    #[must_use]
    pub fn value(&self, country: &CountryCode, indicator: &IndicatorKey) -> Option<f64> {
        self.country(country)?.value(indicator)
    }

    /// Indicators, in list order, for which both countries have a value.
    #[must_use]
    pub fn shared_indicators(&self, left: &Country, right: &Country) -> Vec<&IndicatorKey> {
        self.indicators
            .iter()
            .filter(|ind| left.values.contains_key(*ind) && right.values.contains_key(*ind))
            .collect()
    }

    /// Number of countries that have a value for `indicator`.
    #[must_use]
    pub fn coverage(&self, indicator: &IndicatorKey) -> usize {
        self.countries
            .iter()
            .filter(|c| c.values.contains_key(indicator))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "countries": {
            "ZWE": {"population": 16000000, "gdpPerCapita": null},
            "AFG": {"population": 41000000, "gdpPerCapita": 415.7, "name": "Afghanistan"},
            "BRA": {"gdpPerCapita": 10043.6}
        },
        "indicators": ["population", "gdpPerCapita"],
        "indicatorYears": {"population": 2023, "gdpPerCapita": 2022}
    }"#;

    fn code(s: &str) -> CountryCode {
        CountryCode::from(s)
    }

    fn key(s: &str) -> IndicatorKey {
        IndicatorKey::from(s)
    }

    #[test]
    fn test_country_order_follows_document() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        let codes: Vec<_> = dataset.country_codes().map(CountryCode::as_str).collect();
        assert_eq!(codes, ["ZWE", "AFG", "BRA"]);
    }

    #[test]
    fn test_null_values_are_absent() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.value(&code("ZWE"), &key("gdpPerCapita")), None);
        assert_eq!(dataset.value(&code("ZWE"), &key("population")), Some(16e6));
        assert_eq!(dataset.value(&code("BRA"), &key("population")), None);
    }

    #[test]
    fn test_descriptive_fields_are_ignored() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.value(&code("AFG"), &key("name")), None);
    }

    #[test]
    fn test_indicator_years() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.indicator_year(&key("population")), Some(2023));
        assert_eq!(dataset.indicator_year(&key("landArea")), None);
    }

    #[test]
    fn test_indicator_years_are_optional() {
        let dataset = Dataset::from_json_str(
            r#"{"countries": {"A": {"pop": 1}, "B": {"pop": 2}}, "indicators": ["pop"]}"#,
        )
        .unwrap();
        assert_eq!(dataset.indicator_year(&key("pop")), None);
    }

    #[test]
    fn test_shared_indicators() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        let zwe = dataset.country(&code("ZWE")).unwrap();
        let afg = dataset.country(&code("AFG")).unwrap();
        let bra = dataset.country(&code("BRA")).unwrap();
        assert_eq!(dataset.shared_indicators(zwe, afg), [&key("population")]);
        assert_eq!(dataset.shared_indicators(afg, bra), [&key("gdpPerCapita")]);
        assert!(dataset.shared_indicators(zwe, bra).is_empty());
    }

    #[test]
    fn test_coverage() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.coverage(&key("population")), 2);
        assert_eq!(dataset.coverage(&key("gdpPerCapita")), 2);
    }

    #[test]
    fn test_error_too_few_countries() {
        let result = Dataset::from_json_str(r#"{"countries": {"A": {}}, "indicators": ["pop"]}"#);
        assert!(matches!(
            result,
            Err(DatasetError::TooFewCountries { count: 1 })
        ));
    }

    #[test]
    fn test_error_no_indicators() {
        let result =
            Dataset::from_json_str(r#"{"countries": {"A": {}, "B": {}}, "indicators": []}"#);
        assert!(matches!(result, Err(DatasetError::NoIndicators)));
    }

    #[test]
    fn test_error_non_numeric_indicator() {
        let result = Dataset::from_json_str(
            r#"{"countries": {"A": {"pop": "many"}, "B": {}}, "indicators": ["pop"]}"#,
        );
        assert!(matches!(result, Err(DatasetError::InvalidValue { .. })));
    }

    #[test]
    fn test_error_malformed_json() {
        let result = Dataset::from_json_str(r#"{"countries": []}"#);
        assert!(matches!(result, Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worldbank.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let dataset = Dataset::load(&path).unwrap();
        assert_eq!(dataset.countries().len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Dataset::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }
}
