//! Failures reported by the rules engine. All of them are local: a rejected
//! operation leaves the [`crate::chess::game::GameState`] untouched and the
//! game can go on.

use crate::chess::core::Square;

/// Errors produced by board access, move application and promotion.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// Coordinates outside the 8x8 board.
    #[error("square ({rank}, {file}) is outside of the board")]
    OutOfBounds { rank: u8, file: u8 },

    /// The destination is not among the legal moves of the piece, or the
    /// piece can not be moved at all (empty square, opponent's piece, stale
    /// piece value).
    #[error("{from}{to} is not a legal move")]
    IllegalMove { from: Square, to: Square },

    /// Promotion of something other than a pawn about to reach its farthest
    /// rank, or towards another rank.
    #[error("can not promote the piece on {square}: {reason}")]
    InvalidPromotion {
        square: Square,
        reason: PromotionFault,
    },

    /// A pawn reaching the last rank has to be promoted.
    #[error("{from}{to} reaches the last rank and requires a promotion")]
    PromotionRequired { from: Square, to: Square },
}

/// What is wrong with a requested promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PromotionFault {
    /// Only pawns are promoted.
    #[error("only pawns can be promoted")]
    NotAPawn,
    /// The pawn is not one step away from its farthest rank.
    #[error("the pawn is not on the rank before the last one")]
    NotReadyToPromote,
    /// The destination is not on the pawn's farthest rank.
    #[error("pawns are promoted on the farthest rank only")]
    NotOnLastRank,
}
