use std::io::{self, BufRead, Write};

use anyhow::Context as _;
use country_duel_engine::{
    BestScore, GameService, GuessRequest, GuessResponse, SessionStore, SessionToken, SessionView,
};
use serde::{Deserialize, Serialize};

use crate::{command::GameArgs, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StdioArg {
    #[clap(flatten)]
    pub(crate) game: GameArgs,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    View,
    Guess(GuessRequest),
    Restart,
    HighScore,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Response {
    View(SessionView),
    Guess(GuessResponse),
    Restarted,
    HighScore(BestScore),
    Error { message: String },
}

pub(crate) fn run(arg: &StdioArg) -> anyhow::Result<()> {
    let service = arg.game.build_service()?;
    serve(&service, io::stdin().lock(), io::stdout().lock())
}

/// Answers one JSON request per input line for a single session.
///
/// Bad requests get an error response; only IO failures end the loop.
fn serve<S, R, W>(service: &GameService<S>, reader: R, mut writer: W) -> anyhow::Result<()>
where
    S: SessionStore,
    R: BufRead,
    W: Write,
{
    let token = service.open_session();
    for line in reader.lines() {
        let line = line.context("Failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str(&line) {
            Ok(request) => handle(service, &token, request),
            Err(e) => Response::Error {
                message: format!("malformed request: {e}"),
            },
        };
        util::write_json_line(&mut writer, &response)?;
    }
    Ok(())
}

fn handle<S>(service: &GameService<S>, token: &SessionToken, request: Request) -> Response
where
    S: SessionStore,
{
    match request {
        Request::View => Response::View(service.view(token)),
        Request::Guess(guess) => match service.submit_guess(token, &guess) {
            Ok(response) => Response::Guess(response),
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },
        Request::Restart => {
            service.restart(token);
            Response::Restarted
        }
        Request::HighScore => Response::HighScore(service.best_score()),
    }
}
