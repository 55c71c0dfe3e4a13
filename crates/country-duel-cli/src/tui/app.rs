use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// An application driven by [`Tui::run`].
pub trait App {
    /// Called once before the first frame; configure the tick rate here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    /// Handles terminal input (keys, resize).
    fn handle_event(&mut self, tui: &mut Tui, event: &Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances timers; called on every tick.
    fn update(&mut self, tui: &mut Tui);
}
