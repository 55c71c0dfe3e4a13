use std::iter;

use country_duel_engine::{BestScore, HIGH_SCORE_WINDOW_DAYS};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::style;

/// Current streak next to the best streak of the leaderboard window.
#[derive(Debug)]
pub struct ScoreDisplay<'a> {
    streak: u32,
    best: &'a BestScore,
    block: Option<BlockWidget<'a>>,
}

impl<'a> ScoreDisplay<'a> {
    pub fn new(streak: u32, best: &'a BestScore) -> Self {
        Self {
            streak,
            best,
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

fn best_text(best: &BestScore) -> String {
    match best.set_at {
        Some(set_at) => format!("{} ({})", best.streak, set_at.format("%b %-d")),
        None => "-".to_owned(),
    }
}

impl Widget for ScoreDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let best_label = format!("BEST ({HIGH_SCORE_WINDOW_DAYS} DAYS):");
        let rows = [
            ("STREAK:", self.streak.to_string()),
            (best_label.as_str(), best_text(self.best)),
        ];
        let columns = Layout::horizontal(rows.iter().map(|_| Constraint::Fill(1))).split(area);

        for ((label, value), area) in iter::zip(rows, columns.iter().copied()) {
            let [label_area, value_area] = area.layout(&Layout::horizontal([
                Constraint::Length(u16::try_from(label.len()).unwrap_or(u16::MAX) + 1),
                Constraint::Fill(1),
            ]));
            Line::styled(label, style::DIM)
                .left_aligned()
                .render(label_area, buf);
            Line::styled(value, style::TITLE)
                .left_aligned()
                .render(value_area, buf);
        }
    }
}
