use country_duel_engine::{
    CountryCode, CountryInfo, GuessOutcome, IndicatorKey, Round, Screen, format_stat_value,
    indicator_label,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block as BlockWidget, BlockExt as _, Borders, Paragraph, Widget, Wrap},
};

use crate::view::widgets::style;

/// The two countries of a round side by side, with values once the round is decided.
#[derive(Debug)]
pub struct DuelDisplay<'a> {
    screen: &'a Screen,
    left: &'a CountryInfo,
    right: &'a CountryInfo,
    block: Option<BlockWidget<'a>>,
}

impl<'a> DuelDisplay<'a> {
    pub fn new(screen: &'a Screen, left: &'a CountryInfo, right: &'a CountryInfo) -> Self {
        Self {
            screen,
            left,
            right,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }
}

/// Round, indicator year and outcome of whatever `screen` shows.
pub fn screen_parts(screen: &Screen) -> (&Round, Option<i32>, Option<&GuessOutcome>) {
    match screen {
        Screen::Round {
            round,
            indicator_year,
        } => (round, *indicator_year, None),
        Screen::CorrectResult { result } | Screen::GameOver { result } => {
            (&result.round, result.indicator_year, Some(&result.outcome))
        }
    }
}

pub fn question(indicator: &IndicatorKey, year: Option<i32>) -> String {
    let label = indicator_label(indicator);
    match year {
        Some(year) => format!("Which country has the higher {label} ({year})?"),
        None => format!("Which country has the higher {label}?"),
    }
}

/// One-line verdict for a decided round.
pub fn verdict(screen: &Screen, left: &CountryInfo, right: &CountryInfo) -> Option<String> {
    let (round, _, outcome) = screen_parts(screen);
    let outcome = outcome?;
    let label = indicator_label(&round.indicator);
    let Some(winner) = &outcome.winner else {
        return Some(format!("It's a tie! Both have the same {label}."));
    };
    let name = if *winner == round.left {
        &left.name
    } else {
        &right.name
    };
    Some(if outcome.correct {
        format!("Correct! {name} has the higher {label}.")
    } else {
        format!("Wrong! {name} has the higher {label}.")
    })
}

fn side_style(outcome: Option<&GuessOutcome>, code: &CountryCode) -> Style {
    match outcome {
        None => style::DEFAULT,
        Some(GuessOutcome { winner: None, .. }) => style::TIE,
        Some(GuessOutcome {
            winner: Some(winner),
            ..
        }) if winner == code => style::WINNER,
        Some(_) => style::LOSER,
    }
}

fn country_panel<'a>(
    key: &'a str,
    info: &'a CountryInfo,
    code: &CountryCode,
    value: Option<f64>,
    style: Style,
) -> Paragraph<'a> {
    let mut lines = vec![
        Line::styled(info.name.as_str(), style).centered(),
        Line::styled(format!("({code})"), style::DIM).centered(),
        Line::default(),
    ];
    match value {
        Some(value) => lines.push(Line::styled(format_stat_value(value), style).centered()),
        None => lines.push(Line::styled("?", style::DIM).centered()),
    }
    Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(
            BlockWidget::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(Line::styled(format!(" {key} "), style::KEY).centered()),
        )
}

impl Widget for DuelDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let (round, year, outcome) = screen_parts(self.screen);
        let [question_area, _, duel_area] = area.layout(&Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(6),
        ]));
        Line::styled(question(&round.indicator, year), style::TITLE)
            .centered()
            .render(question_area, buf);

        let [left_area, vs_area, right_area] = duel_area.layout(&Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(6),
            Constraint::Fill(1),
        ]));
        country_panel(
            "1 / ←",
            self.left,
            &round.left,
            outcome.map(|o| o.left_value),
            side_style(outcome, &round.left),
        )
        .render(left_area, buf);
        country_panel(
            "2 / →",
            self.right,
            &round.right,
            outcome.map(|o| o.right_value),
            side_style(outcome, &round.right),
        )
        .render(right_area, buf);

        let [_, vs_line, _] = vs_area.layout(&Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ]));
        Line::styled("vs", style::DIM).centered().render(vs_line, buf);
    }
}

#[cfg(test)]
mod tests {
    use country_duel_engine::RoundResult;

    use super::*;

    fn info(name: &str) -> CountryInfo {
        CountryInfo {
            name: name.to_owned(),
            flag_url: String::new(),
        }
    }

    fn decided(correct: bool, winner: Option<&str>) -> RoundResult {
        RoundResult {
            round: Round::new("FRA", "DEU", "population"),
            outcome: GuessOutcome {
                correct,
                winner: winner.map(CountryCode::from),
                left_value: 68_000_000.0,
                right_value: 84_000_000.0,
            },
            indicator_year: Some(2023),
        }
    }

    fn rendered(widget: DuelDisplay<'_>) -> String {
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_question_mentions_label_and_year() {
        assert_eq!(
            question(&IndicatorKey::from("giniIndex"), Some(2021)),
            "Which country has the higher wealth inequality (Gini index) (2021)?"
        );
        assert_eq!(
            question(&IndicatorKey::from("custom"), None),
            "Which country has the higher custom?"
        );
    }

    #[test]
    fn test_verdict() {
        let (france, germany) = (info("France"), info("Germany"));
        let round = Screen::Round {
            round: Round::new("FRA", "DEU", "population"),
            indicator_year: None,
        };
        assert_eq!(verdict(&round, &france, &germany), None);

        let correct = Screen::CorrectResult {
            result: decided(true, Some("DEU")),
        };
        assert_eq!(
            verdict(&correct, &france, &germany).unwrap(),
            "Correct! Germany has the higher population."
        );

        let wrong = Screen::GameOver {
            result: decided(false, Some("DEU")),
        };
        assert_eq!(
            verdict(&wrong, &france, &germany).unwrap(),
            "Wrong! Germany has the higher population."
        );

        let tie = Screen::GameOver {
            result: decided(false, None),
        };
        assert!(verdict(&tie, &france, &germany).unwrap().starts_with("It's a tie!"));
    }

    #[test]
    fn test_values_are_hidden_until_decided() {
        let (france, germany) = (info("France"), info("Germany"));
        let round = Screen::Round {
            round: Round::new("FRA", "DEU", "population"),
            indicator_year: Some(2023),
        };
        let text = rendered(DuelDisplay::new(&round, &france, &germany));
        assert!(text.contains("France"));
        assert!(text.contains("Germany"));
        assert!(!text.contains("84,000,000"));

        let result = Screen::CorrectResult {
            result: decided(true, Some("DEU")),
        };
        let text = rendered(DuelDisplay::new(&result, &france, &germany));
        assert!(text.contains("68,000,000"));
        assert!(text.contains("84,000,000"));
    }
}
