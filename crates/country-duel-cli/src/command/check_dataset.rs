use std::path::PathBuf;

use country_duel_engine::{Dataset, IndicatorKey, indicator_label};

use crate::command::{DEFAULT_DATASET_PATH, load_dataset};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CheckDatasetArg {
    /// Dataset JSON file
    #[clap(long, default_value = DEFAULT_DATASET_PATH)]
    dataset: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IndicatorSummary<'a> {
    key: &'a IndicatorKey,
    label: &'a str,
    year: Option<i32>,
    coverage: usize,
}

impl IndicatorSummary<'_> {
    /// A round needs two countries with a value.
    fn is_playable(&self) -> bool {
        self.coverage >= 2
    }
}

pub(crate) fn run(arg: &CheckDatasetArg) -> anyhow::Result<()> {
    let dataset = load_dataset(&arg.dataset)?;
    let summaries = summarize(&dataset);

    println!("Dataset: {}", arg.dataset.display());
    println!("Countries: {}", dataset.countries().len());
    println!("Indicators: {}", summaries.len());
    for summary in &summaries {
        let year = summary
            .year
            .map_or_else(|| "----".to_owned(), |year| year.to_string());
        let warning = if summary.is_playable() {
            ""
        } else {
            "  (never played)"
        };
        println!(
            "  {:<24} {year}  {:>4}/{:<4} {}{warning}",
            summary.key.as_str(),
            summary.coverage,
            dataset.countries().len(),
            summary.label,
        );
    }

    let unplayable = summaries.iter().filter(|s| !s.is_playable()).count();
    if unplayable == summaries.len() {
        log::warn!("no indicator is shared by two countries; rounds cannot be verified");
    } else if unplayable > 0 {
        log::warn!("{unplayable} indicator(s) have fewer than two countries with data");
    }
    Ok(())
}

fn summarize(dataset: &Dataset) -> Vec<IndicatorSummary<'_>> {
    dataset
        .indicators()
        .iter()
        .map(|key| IndicatorSummary {
            key,
            label: indicator_label(key),
            year: dataset.indicator_year(key),
            coverage: dataset.coverage(key),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_summary_lists_indicators_in_order() {
        let dataset = Dataset::from_json_str(
            r#"{
                "countries": {
                    "FRA": {"population": 68000000, "giniIndex": 31.5},
                    "DEU": {"population": 84000000, "giniIndex": null},
                    "NRU": {"population": 12000}
                },
                "indicators": ["population", "giniIndex", "landArea"],
                "indicatorYears": {"population": 2023}
            }"#,
        )
        .unwrap();

        let summaries = summarize(&dataset);
        let keys: Vec<_> = summaries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["population", "giniIndex", "landArea"]);

        assert_eq!(summaries[0].coverage, 3);
        assert_eq!(summaries[0].year, Some(2023));
        assert_eq!(summaries[0].label, "population");
        assert!(summaries[0].is_playable());

        assert_eq!(summaries[1].coverage, 1);
        assert_eq!(summaries[1].label, "wealth inequality (Gini index)");
        assert!(!summaries[1].is_playable());

        assert_eq!(summaries[2].coverage, 0);
        assert_eq!(summaries[2].year, None);
    }

    #[test]
    fn test_bundled_dataset_is_playable() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(DEFAULT_DATASET_PATH);
        let dataset = load_dataset(&path).unwrap();
        assert!(dataset.countries().len() >= 10);
        assert!(summarize(&dataset).iter().all(IndicatorSummary::is_playable));
    }
}
