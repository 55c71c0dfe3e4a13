use std::path::PathBuf;

use chrono::TimeDelta;
use country_duel_engine::{BestScore, HIGH_SCORE_WINDOW_DAYS};

use crate::command::{DEFAULT_HIGH_SCORES_PATH, open_high_scores};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HighScoreArg {
    /// High score records file (JSON lines)
    #[clap(long, default_value = DEFAULT_HIGH_SCORES_PATH)]
    high_scores: PathBuf,
    /// Length of the window to look back on, in days
    #[clap(long, default_value_t = HIGH_SCORE_WINDOW_DAYS, value_parser = clap::value_parser!(i64).range(1..=36500))]
    days: i64,
    /// Print the result as JSON
    #[clap(long)]
    json: bool,
}

pub(crate) fn run(arg: &HighScoreArg) -> anyhow::Result<()> {
    let HighScoreArg {
        high_scores,
        days,
        json,
    } = arg;

    let scores = open_high_scores(high_scores)?;
    let best = scores.best_in_window(TimeDelta::days(*days))?;
    if *json {
        println!("{}", serde_json::to_string(&best)?);
    } else {
        println!("{}", describe(&best, *days));
    }
    Ok(())
}

fn describe(best: &BestScore, days: i64) -> String {
    let period = if days == 1 {
        "day".to_owned()
    } else {
        format!("{days} days")
    };
    match best.set_at {
        Some(set_at) => format!(
            "Best streak in the past {period}: {} (set {})",
            best.streak,
            set_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("No streaks recorded in the past {period}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone as _, Utc};
    use country_duel_engine::{HighScores, JsonLinesHighScoreStore};

    use super::*;

    #[test]
    fn test_describe_empty_window() {
        assert_eq!(
            describe(&BestScore::default(), 7),
            "No streaks recorded in the past 7 days"
        );
        assert_eq!(
            describe(&BestScore::default(), 1),
            "No streaks recorded in the past day"
        );
    }

    #[test]
    fn test_describe_best() {
        let best = BestScore {
            streak: 12,
            set_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 0).unwrap()),
        };
        assert_eq!(
            describe(&best, 7),
            "Best streak in the past 7 days: 12 (set 2026-03-02 09:05 UTC)"
        );
    }

    #[test]
    fn test_reads_records_written_by_a_game() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("high_scores.jsonl");
        let writer = HighScores::new(Arc::new(JsonLinesHighScoreStore::open(&path).unwrap()));
        writer.record(5).unwrap();

        let best = open_high_scores(&path)
            .unwrap()
            .best_in_window(TimeDelta::days(HIGH_SCORE_WINDOW_DAYS))
            .unwrap();
        assert_eq!(best.streak, 5);
    }
}
