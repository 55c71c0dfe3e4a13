//! Minimal terminal runtime: a tick timer, redraws on change, and key input.

mod app;
mod event;
mod event_loop;
mod runner;

pub use self::{app::App, runner::Tui};
