use std::path::{Path, PathBuf};

use self::app::PlayApp;
use crate::{command::GameArgs, tui::Tui};

mod app;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    game: GameArgs,
    /// Append logs to this file; nothing is logged without it
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl PlayArg {
    pub(crate) fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let service = arg.game.build_service()?;
    let mut app = PlayApp::new(service, arg.game.country_lookup());
    Tui::new().run(&mut app)?;
    Ok(())
}
