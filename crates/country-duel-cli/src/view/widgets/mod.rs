use ratatui::text::{Line, Span};

pub use self::{duel_display::*, score_display::*};

mod duel_display;
mod score_display;

pub mod style {
    use ratatui::style::{Color, Modifier, Style};

    pub const DEFAULT: Style = Style::new().fg(Color::White);
    pub const DIM: Style = Style::new().fg(Color::DarkGray);
    pub const TITLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);
    pub const KEY: Style = Style::new().fg(Color::Cyan);
    pub const WINNER: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
    pub const LOSER: Style = Style::new().fg(Color::Red);
    pub const TIE: Style = Style::new().fg(Color::Yellow);
}

/// `keys description | keys description` help line.
pub fn key_help<'a>(bindings: &[(&'a str, &'a str)]) -> Line<'a> {
    let mut spans = vec![];
    for (i, (keys, description)) in bindings.iter().copied().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", style::DIM));
        }
        spans.push(Span::styled(keys, style::KEY));
        spans.push(Span::styled(" ", style::DIM));
        spans.push(Span::styled(description, style::DEFAULT));
    }
    Line::from(spans).centered()
}
