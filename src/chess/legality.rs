//! Narrows pseudo-legal moves down to the legal ones by playing each candidate
//! on a copy of the game and checking whether the mover's king is attacked
//! afterwards.
//!
//! The copy is cheap (a few hundred bytes, no heap allocations), so there is
//! no undo bookkeeping.

use tracing::trace;

use crate::chess::bitboard::Bitboard;
use crate::chess::board::Piece;
use crate::chess::core::{CastlingSide, Move, MoveList, PieceKind, Promotion, Square};
use crate::chess::game::GameState;

impl GameState {
    /// Squares the piece can legally move to.
    ///
    /// Empty for empty squares, for pieces of the player who is not on move
    /// and for piece values that are no longer on the board (e.g. taken
    /// before a move was made).
    ///
    /// ```
    /// use gambit::chess::core::Square;
    /// use gambit::chess::game::GameState;
    ///
    /// let game = GameState::new();
    /// let pawn = game.piece_at(Square::try_from("d2").unwrap());
    /// assert_eq!(game.legal_moves(&pawn).count(), 2);
    /// let black_pawn = game.piece_at(Square::try_from("d7").unwrap());
    /// assert!(game.legal_moves(&black_pawn).is_empty());
    /// ```
    #[must_use]
    pub fn legal_moves(&self, piece: &Piece) -> Bitboard {
        let Piece::Occupied {
            kind,
            owner,
            moved,
            position,
        } = *piece
        else {
            return Bitboard::empty();
        };
        if owner != self.side_to_move || self.board.at(position) != *piece {
            return Bitboard::empty();
        }
        let mut candidates = piece.pseudo_legal_moves(&self.board);
        // No castling out of check.
        if kind == PieceKind::King
            && !moved
            && position.file() == CastlingSide::KING_FILE
            && self.is_in_check(owner)
        {
            for side in CastlingSide::BOTH {
                let castling = Square::from_coords(owner.backrank(), side.king_target());
                candidates = candidates - Bitboard::from(castling);
            }
        }
        candidates
            .iter()
            .filter(|&to| {
                let mut simulation = self.clone();
                simulation.execute(*piece, to, None);
                let legal = !simulation.is_in_check(owner);
                if !legal {
                    trace!(from = %position, %to, "candidate leaves the king in check");
                }
                legal
            })
            .collect()
    }

    /// All legal moves of the side to move. A pawn reaching the last rank
    /// produces one move per promotion kind.
    ///
    /// ```
    /// use gambit::chess::game::GameState;
    ///
    /// assert_eq!(GameState::new().generate_moves().len(), 20);
    /// ```
    #[must_use]
    pub fn generate_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        for piece in self.board.pieces_of(self.side_to_move) {
            let from = piece.position();
            let promotes = piece.kind() == Some(PieceKind::Pawn);
            for to in self.legal_moves(&piece).iter() {
                if promotes && to.rank() == self.side_to_move.promotion_rank() {
                    for promotion in Promotion::ALL {
                        moves.push(Move::new(from, to, Some(promotion)));
                    }
                } else {
                    moves.push(Move::new(from, to, None));
                }
            }
        }
        moves
    }
}
