//! Text front end for the rules engine. It reads one command per line and
//! answers on the output stream, standing in for a graphical board: it only
//! talks to the engine through [`GameState`].
//!
//! Every command either succeeds with a short answer ("ok", "check", a FEN,
//! a board diagram, ...) or prints a single `error: ...` line. Rejected
//! commands never change the game, so play can go on.

use std::io::{BufRead, Write};

use anyhow::{anyhow, Context};
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::chess::core::{Move, Player, Square};
use crate::chess::game::GameState;
use crate::chess::perft::perft;
use crate::session::command::Command;

mod command;

/// Drives a single game from the input stream until "quit" is sent or the
/// input ends.
pub struct Session<'a, R: BufRead, W: Write> {
    state: GameState,
    perspective: Player,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Creates a session that starts from given game, rendering the board from
    /// `perspective`'s side.
    #[must_use]
    pub fn new(state: GameState, perspective: Player, input: &'a mut R, output: &'a mut W) -> Self {
        Self {
            state,
            perspective,
            input,
            output,
        }
    }

    /// Continuously reads the input stream and executes the commands.
    ///
    /// # Errors
    ///
    /// Only I/O failures are propagated: rejected commands are reported on
    /// the output and the loop goes on.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            debug!(command = line.trim(), "received");
            let result = match Command::parse(&line) {
                Command::NewGame => self.handle_new(),
                Command::SetPosition { fen, moves } => self.handle_position(fen.as_deref(), &moves),
                Command::Display => self.handle_display(),
                Command::Fen => self.handle_fen(),
                Command::Moves { square } => self.handle_moves(&square),
                Command::Move { uci } => self.handle_move(&uci),
                Command::Perft { depth } => self.handle_perft(depth),
                Command::Flip => self.handle_flip(),
                Command::Quit => break,
                Command::Unknown(command) => Err(anyhow!("unknown command: {command}")),
            };
            if let Err(e) = result {
                warn!(command = line.trim(), "{e:#}");
                writeln!(self.output, "error: {e:#}")?;
            }
            self.output.flush()?;
        }
        Ok(())
    }

    fn handle_new(&mut self) -> anyhow::Result<()> {
        self.state = GameState::new();
        writeln!(self.output, "ok")?;
        Ok(())
    }

    /// Replaces the game only if the position and all the moves are valid.
    fn handle_position(&mut self, fen: Option<&str>, moves: &[String]) -> anyhow::Result<()> {
        let mut state = match fen {
            Some(fen) => GameState::from_fen(fen)?,
            None => GameState::new(),
        };
        for next_move in moves {
            let parsed = Move::from_uci(next_move)?;
            state
                .make_move(parsed)
                .with_context(|| format!("playing {next_move}"))?;
        }
        self.state = state;
        writeln!(self.output, "ok")?;
        Ok(())
    }

    fn handle_display(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{}", self.state.board().render(self.perspective))?;
        writeln!(self.output, "side to move: {}", self.state.side_to_move())?;
        let in_check = [Player::White, Player::Black]
            .into_iter()
            .filter(|&player| self.state.is_in_check(player))
            .join(" ");
        writeln!(
            self.output,
            "in check: {}",
            if in_check.is_empty() { "-" } else { in_check.as_str() }
        )?;
        writeln!(self.output, "fen: {}", self.state)?;
        Ok(())
    }

    fn handle_fen(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{}", self.state)?;
        Ok(())
    }

    /// Lists legal destinations of the piece, "-" if there are none.
    fn handle_moves(&mut self, square: &str) -> anyhow::Result<()> {
        let square = Square::try_from(square)?;
        let piece = self.state.piece_at(square);
        let destinations = self.state.legal_moves(&piece).iter().join(" ");
        writeln!(
            self.output,
            "{}",
            if destinations.is_empty() {
                "-"
            } else {
                destinations.as_str()
            }
        )?;
        Ok(())
    }

    /// Answers "check" if the move attacks the opponent's king and "ok"
    /// otherwise.
    fn handle_move(&mut self, uci: &str) -> anyhow::Result<()> {
        let next_move = Move::from_uci(uci)?;
        let player = self.state.side_to_move();
        self.state.make_move(next_move)?;
        info!(%player, %next_move, "move played");
        let opponent = self.state.side_to_move();
        if self.state.is_in_check(opponent) {
            writeln!(self.output, "check")?;
        } else {
            writeln!(self.output, "ok")?;
        }
        Ok(())
    }

    fn handle_perft(&mut self, depth: u8) -> anyhow::Result<()> {
        writeln!(self.output, "{}", perft(&self.state, depth))?;
        Ok(())
    }

    fn handle_flip(&mut self) -> anyhow::Result<()> {
        self.perspective = self.perspective.opponent();
        writeln!(self.output, "ok")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(commands: &str) -> String {
        run_from(GameState::new(), commands)
    }

    fn run_from(state: GameState, commands: &str) -> String {
        let mut input = commands.as_bytes();
        let mut output = Vec::new();
        Session::new(state, Player::White, &mut input, &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn moves_and_fen() {
        assert_eq!(
            run("move e2e4\nfen\nmoves e7\nmoves e4\n"),
            "ok\n\
             rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1\n\
             e6 e5\n\
             -\n"
        );
    }

    #[test]
    fn rejected_commands() {
        assert_eq!(
            run("move e2e5\nmove e7e5\nfly away\nmoves a9\n\nfen\n"),
            "error: e2e5 is not a legal move\n\
             error: e7e5 is not a legal move\n\
             error: unknown command: fly away\n\
             error: rank should be within '1'..='8', got '9'\n\
             rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\n"
        );
    }

    #[test]
    fn position_is_atomic() {
        assert_eq!(
            run("position startpos moves e2e4 e7e5 e4e5\nfen\n"),
            "error: playing e4e5: e4e5 is not a legal move\n\
             rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\n"
        );
        assert_eq!(
            run("position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1 moves e1g1\nfen\n"),
            "ok\n4k3/8/8/8/8/8/8/5RK1 b - - 1 1\n"
        );
    }

    #[test]
    fn check_and_quit() {
        assert_eq!(
            run("move f2f3\nmove e7e5\nmove g2g4\nmove d8h4\nd\nquit\nfen\n"),
            "ok\n\
             ok\n\
             ok\n\
             check\n\
             8 r n b . k b n r\n\
             7 p p p p . p p p\n\
             6 . . . . . . . .\n\
             5 . . . . p . . .\n\
             4 . . . . . . P q\n\
             3 . . . . . P . .\n\
             2 P P P P P . . P\n\
             1 R N B Q K B N R\n  \
             a b c d e f g h\n\
             side to move: w\n\
             in check: w\n\
             fen: rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3\n"
        );
    }

    #[test]
    fn promotion_and_flip() {
        let state = GameState::from_fen("8/4P3/8/8/8/k7/8/K7 w - - 0 1").unwrap();
        assert_eq!(
            run_from(state, "move e7e8\nmove e7e8n\nflip\nd\nperft 1\n"),
            "error: e7e8 reaches the last rank and requires a promotion\n\
             ok\n\
             ok\n\
             1 . . . . . . . K\n\
             2 . . . . . . . .\n\
             3 . . . . . . . k\n\
             4 . . . . . . . .\n\
             5 . . . . . . . .\n\
             6 . . . . . . . .\n\
             7 . . . . . . . .\n\
             8 . . . N . . . .\n  \
             h g f e d c b a\n\
             side to move: b\n\
             in check: -\n\
             fen: 4N3/8/8/8/8/k7/8/K7 b - - 0 1\n\
             3\n"
        );
    }
}
