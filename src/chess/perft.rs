//! [Perft] (*per*formance *t*esting) counts the leaf nodes of the legal move
//! tree up to a given depth. The numbers for well-known positions are
//! published, which makes perft the standard way of checking move generation
//! and move execution together.
//!
//! [Perft]: https://www.chessprogramming.org/Perft

use crate::chess::game::GameState;

/// Number of distinct move sequences of given length. Each promotion kind is
/// a separate move.
///
/// ```
/// use gambit::chess::game::GameState;
/// use gambit::chess::perft::perft;
///
/// let game = GameState::new();
/// assert_eq!(perft(&game, 0), 1);
/// assert_eq!(perft(&game, 1), 20);
/// assert_eq!(perft(&game, 2), 400);
/// ```
#[must_use]
pub fn perft(state: &GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = state.generate_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|&next_move| {
            let mut next = state.clone();
            next.play(next_move);
            perft(&next, depth - 1)
        })
        .sum()
}
