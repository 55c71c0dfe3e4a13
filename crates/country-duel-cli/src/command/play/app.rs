use std::time::{Duration, Instant};

use country_duel_engine::{
    BestScore, CountryInfo, CountryLookup, GameService, GuessRequest, Screen, SessionToken,
    SessionView,
};
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Line,
    widgets::{Block as BlockWidget, Borders},
};

use crate::{
    tui::{App, Tui},
    view::widgets::{DuelDisplay, ScoreDisplay, key_help, screen_parts, style, verdict},
};

const TICK_RATE: f64 = 10.0;

/// How long a correct result stays up before the next round appears.
const RESULT_DISPLAY_TIME: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug)]
pub(crate) struct PlayApp {
    service: GameService,
    lookup: CountryLookup,
    token: SessionToken,
    view: SessionView,
    left: CountryInfo,
    right: CountryInfo,
    best: BestScore,
    result_shown_at: Option<Instant>,
    error: Option<String>,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(service: GameService, lookup: CountryLookup) -> Self {
        let token = service.open_session();
        let view = service.view(&token);
        let best = service.best_score();
        let (left, right) = names(&lookup, &view);
        Self {
            service,
            lookup,
            token,
            view,
            left,
            right,
            best,
            result_shown_at: None,
            error: None,
            is_exiting: false,
        }
    }

    fn refresh(&mut self, now: Instant) {
        self.view = self.service.view(&self.token);
        self.result_shown_at =
            matches!(self.view.screen, Screen::CorrectResult { .. }).then_some(now);
        (self.left, self.right) = names(&self.lookup, &self.view);
    }

    fn guess(&mut self, side: Side, now: Instant) {
        let Screen::Round { round, .. } = &self.view.screen else {
            return;
        };
        let country = match side {
            Side::Left => &round.left,
            Side::Right => &round.right,
        };
        let request = GuessRequest::new(round, country);
        match self.service.submit_guess(&self.token, &request) {
            Ok(response) => {
                self.error = None;
                if response.game_over {
                    self.best = self.service.best_score();
                }
            }
            Err(e) => {
                log::warn!("guess rejected: {e}");
                self.error = Some(e.to_string());
            }
        }
        self.refresh(now);
    }

    fn restart(&mut self, now: Instant) {
        self.service.restart(&self.token);
        self.error = None;
        self.best = self.service.best_score();
        self.refresh(now);
    }

    /// Moves on from a correct result once it has been shown long enough.
    fn advance(&mut self, now: Instant) {
        if let Some(shown_at) = self.result_shown_at
            && now.saturating_duration_since(shown_at) >= RESULT_DISPLAY_TIME
        {
            self.refresh(now);
        }
    }

    fn handle_key(&mut self, code: KeyCode, now: Instant) {
        let is_round = matches!(self.view.screen, Screen::Round { .. });
        let is_result = self.result_shown_at.is_some();
        match code {
            KeyCode::Left | KeyCode::Char('1') if is_round => self.guess(Side::Left, now),
            KeyCode::Right | KeyCode::Char('2') if is_round => self.guess(Side::Right, now),
            KeyCode::Enter | KeyCode::Char(' ') if is_result => self.refresh(now),
            KeyCode::Char('r') => self.restart(now),
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            _ => {}
        }
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        match self.view.screen {
            Screen::Round { .. } => &[
                ("1/←", "Left"),
                ("2/→", "Right"),
                ("r", "Restart"),
                ("q", "Quit"),
            ],
            Screen::CorrectResult { .. } => &[("Enter", "Next"), ("r", "Restart"), ("q", "Quit")],
            Screen::GameOver { .. } => &[("r", "Play again"), ("q", "Quit")],
        }
    }
}

fn names(lookup: &CountryLookup, view: &SessionView) -> (CountryInfo, CountryInfo) {
    let (round, _, _) = screen_parts(&view.screen);
    (lookup.info(&round.left), lookup.info(&round.right))
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(Some(TICK_RATE));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: &Event) {
        if let Some(key) = event.as_key_press_event() {
            self.handle_key(key.code, Instant::now());
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [score_area, duel_area, message_area, help_area] = frame.area().layout(
            &Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(10),
                Constraint::Length(1),
                Constraint::Length(1),
            ]),
        );

        let score = ScoreDisplay::new(self.view.streak, &self.best).block(
            BlockWidget::default()
                .borders(Borders::ALL)
                .title(" Country Duel "),
        );
        frame.render_widget(score, score_area);

        let duel = DuelDisplay::new(&self.view.screen, &self.left, &self.right)
            .block(BlockWidget::default().borders(Borders::ALL));
        frame.render_widget(duel, duel_area);

        let message = match (&self.error, &self.view.screen) {
            (Some(error), _) => Line::styled(error.as_str(), style::LOSER),
            (None, Screen::GameOver { .. }) => Line::styled(
                format!(
                    "{} Final streak: {}",
                    verdict(&self.view.screen, &self.left, &self.right).unwrap_or_default(),
                    self.view.streak
                ),
                style::LOSER,
            ),
            (None, screen) => Line::styled(
                verdict(screen, &self.left, &self.right).unwrap_or_default(),
                style::WINNER,
            ),
        };
        frame.render_widget(message.centered(), message_area);
        frame.render_widget(key_help(self.help()), help_area);
    }

    fn update(&mut self, _tui: &mut Tui) {
        self.advance(Instant::now());
    }
}
