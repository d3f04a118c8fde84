//! The `gambit` binary: a text session over the rules engine on stdin and
//! stdout, with the banner and logs on stderr.

use std::io;

use clap::Parser;
use gambit::chess::core::Player;
use gambit::chess::game::GameState;
use gambit::Session;
use tracing_subscriber::EnvFilter;

/// Plays a game of chess through a line-oriented text session on stdin and
/// stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// Starts from this position (in FEN) instead of the standard one.
    #[arg(long)]
    fen: Option<String>,
    /// Renders the board from Black's side.
    #[arg(long)]
    black_perspective: bool,
    /// Log filter used when RUST_LOG is not set, e.g. "debug" or "trace".
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("gambit={}", config.log_level))),
        )
        .with_writer(io::stderr)
        .init();

    let state = match &config.fen {
        Some(fen) => GameState::try_from(fen.as_str())?,
        None => GameState::new(),
    };
    let perspective = if config.black_perspective {
        Player::Black
    } else {
        Player::White
    };

    gambit::print_engine_info();
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    Session::new(state, perspective, &mut input, &mut output).run()
}
