//! [`GameState`] owns the board and everything derived from it: the side to
//! move, the en passant target, king locations, check flags and the attacked
//! squares of both players.
//!
//! All mutations of a game go through the move executor here so that piece
//! positions, cached king squares and check flags never go out of sync with
//! the board.

use std::num::NonZeroU16;

use tracing::debug;

use crate::chess::bitboard::Bitboard;
use crate::chess::board::{Board, Piece};
use crate::chess::core::{CastlingSide, Move, PieceKind, Player, Promotion, Square};
use crate::chess::error::{PromotionFault, RulesError};
use crate::chess::movegen::attacked_squares;

/// State of a single game, mutated in place move by move.
///
/// ```
/// use gambit::chess::core::{Player, Square};
/// use gambit::chess::game::GameState;
///
/// let mut game = GameState::new();
/// let e2 = Square::try_from("e2").unwrap();
/// let e4 = Square::try_from("e4").unwrap();
/// let pawn = game.piece_at(e2);
/// game.apply_move(&pawn, e4).unwrap();
///
/// assert_eq!(game.side_to_move(), Player::Black);
/// assert_eq!(game.en_passant_target(), Some(Square::try_from("e3").unwrap()));
/// assert!(game.piece_at(e2).is_empty());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct GameState {
    pub(super) board: Board,
    pub(super) side_to_move: Player,
    pub(super) en_passant_target: Option<Square>,
    /// Indexed by [`Player::index`]. Boards built by hand may lack a king.
    kings: [Option<Square>; 2],
    in_check: [bool; 2],
    attacks: [Bitboard; 2],
    /// [Halfmove Clock] counts plies since the last capture or pawn move.
    ///
    /// [Halfmove Clock]: https://www.chessprogramming.org/Halfmove_Clock
    pub(super) halfmove_clock: u16,
    pub(super) fullmove_counter: NonZeroU16,
}

impl GameState {
    /// Standard starting position, White to move.
    #[must_use]
    pub fn new() -> Self {
        Self::with_board(Board::starting(), Player::White)
    }

    /// Board without any pieces, White to move. Use [`GameState::place`] to
    /// set up a position.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_board(Board::empty(), Player::White)
    }

    pub(super) fn with_board(board: Board, side_to_move: Player) -> Self {
        let mut state = Self {
            en_passant_target: board.en_passant_marker(),
            board,
            side_to_move,
            kings: [None; 2],
            in_check: [false; 2],
            attacks: [Bitboard::empty(); 2],
            halfmove_clock: 0,
            fullmove_counter: NonZeroU16::MIN,
        };
        state.locate_kings();
        state.refresh();
        state
    }

    /// Puts a piece on the board, replacing the previous occupant of its
    /// square, and recomputes the derived state.
    ///
    /// This is a setup operation: it does not check the rules and does not
    /// pass the turn. Placing an [`Piece::Empty`] clears the square.
    pub fn place(&mut self, piece: Piece) {
        let square = piece.position();
        if self.en_passant_target == Some(square) {
            self.en_passant_target = None;
        }
        self.board.put(piece);
        if piece.is_en_passant_marker() {
            if let Some(previous) = self.en_passant_target.replace(square) {
                self.board.clear(previous);
            }
        }
        self.locate_kings();
        self.refresh();
    }

    /// Hands the move over to the other player without moving any pieces.
    /// Only meant for setting up positions.
    pub fn set_side_to_move(&mut self, player: Player) {
        self.side_to_move = player;
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Contents of the square: a piece or an empty slot.
    #[must_use]
    pub const fn piece_at(&self, square: Square) -> Piece {
        self.board.at(square)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// Whether the king of the player is attacked by the opponent.
    #[must_use]
    pub const fn is_in_check(&self, player: Player) -> bool {
        self.in_check[player.index()]
    }

    /// Union of pseudo-legal destinations of all pieces of the player.
    #[must_use]
    pub const fn attacked_squares(&self, player: Player) -> Bitboard {
        self.attacks[player.index()]
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn king_position(&self, player: Player) -> Option<Square> {
        self.kings[player.index()]
    }

    /// Square skipped by a double pawn push on the last ply.
    #[must_use]
    pub const fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Starts at 1 and is incremented after each move of Black.
    #[must_use]
    pub const fn fullmove_counter(&self) -> NonZeroU16 {
        self.fullmove_counter
    }

    /// Moves the piece to given square. The piece has to be the current
    /// occupant of its square, belong to the side to move and `to` has to be
    /// one of its [legal moves](GameState::legal_moves).
    ///
    /// # Errors
    ///
    /// [`RulesError::IllegalMove`] if the move is not legal and
    /// [`RulesError::PromotionRequired`] if a pawn reaches the last rank: use
    /// [`GameState::promote`] instead. The state is left untouched on error.
    pub fn apply_move(&mut self, piece: &Piece, to: Square) -> Result<(), RulesError> {
        let from = piece.position();
        if !self.legal_moves(piece).contains(to) {
            return Err(RulesError::IllegalMove { from, to });
        }
        if let Piece::Occupied {
            kind: PieceKind::Pawn,
            owner,
            ..
        } = *piece
        {
            if to.rank() == owner.promotion_rank() {
                return Err(RulesError::PromotionRequired { from, to });
            }
        }
        self.execute(*piece, to, None);
        Ok(())
    }

    /// Moves a pawn to its last rank and replaces it with a piece of given
    /// kind, in one step.
    ///
    /// # Errors
    ///
    /// [`RulesError::InvalidPromotion`] if the piece is not a pawn, the pawn
    /// is not one step away from its farthest rank or `to` is not on that
    /// rank. [`RulesError::IllegalMove`] if the pawn can not legally go there.
    /// The state is left untouched on error.
    pub fn promote(
        &mut self,
        pawn: &Piece,
        promotion: Promotion,
        to: Square,
    ) -> Result<(), RulesError> {
        let square = pawn.position();
        let Piece::Occupied {
            kind: PieceKind::Pawn,
            owner,
            ..
        } = *pawn
        else {
            return Err(RulesError::InvalidPromotion {
                square,
                reason: PromotionFault::NotAPawn,
            });
        };
        let next_rank = square.shift(owner.push_direction()).map(Square::rank);
        if next_rank != Some(owner.promotion_rank()) {
            return Err(RulesError::InvalidPromotion {
                square,
                reason: PromotionFault::NotReadyToPromote,
            });
        }
        if to.rank() != owner.promotion_rank() {
            return Err(RulesError::InvalidPromotion {
                square,
                reason: PromotionFault::NotOnLastRank,
            });
        }
        if !self.legal_moves(pawn).contains(to) {
            return Err(RulesError::IllegalMove { from: square, to });
        }
        self.execute(*pawn, to, Some(promotion));
        Ok(())
    }

    /// Plays a move given in coordinate form, dispatching to
    /// [`GameState::apply_move`] or [`GameState::promote`].
    ///
    /// # Errors
    ///
    /// Same as the operation it dispatches to.
    pub fn make_move(&mut self, next_move: Move) -> Result<(), RulesError> {
        let piece = self.piece_at(next_move.from());
        match next_move.promotion() {
            Some(promotion) => self.promote(&piece, promotion, next_move.to()),
            None => self.apply_move(&piece, next_move.to()),
        }
    }

    /// Plays a move produced by [`GameState::generate_moves`] without
    /// validating it again.
    pub(super) fn play(&mut self, next_move: Move) {
        let piece = self.piece_at(next_move.from());
        self.execute(piece, next_move.to(), next_move.promotion());
    }

    /// The move executor. Callers have checked that the move is pseudo-legal.
    pub(super) fn execute(&mut self, piece: Piece, to: Square, promotion: Option<Promotion>) {
        let Piece::Occupied {
            kind,
            owner,
            moved,
            position: from,
        } = piece
        else {
            return;
        };
        let target = self.board.at(to);
        let mut irreversible = kind == PieceKind::Pawn || target.owner().is_some();

        if kind == PieceKind::Pawn && target.is_en_passant_marker() {
            // The captured pawn stands right behind the skipped square.
            if let Some(captured) = to.shift(owner.push_direction().opposite()) {
                debug!(%from, %to, %captured, "en passant capture");
                self.board.clear(captured);
                irreversible = true;
            }
        }

        // The previous marker only lives for a single reply.
        if let Some(marker) = self.en_passant_target.take() {
            self.board.clear(marker);
        }

        if kind == PieceKind::Pawn && !moved && from.rank().abs_diff(to.rank()) == 2 {
            if let Some(skipped) = from.shift(owner.push_direction()) {
                debug!(%from, %to, marker = %skipped, "double pawn push");
                self.board.put(Piece::en_passant_marker(skipped));
                self.en_passant_target = Some(skipped);
            }
        }

        if kind == PieceKind::King && !moved && from.file() == CastlingSide::KING_FILE {
            if let Some(side) = CastlingSide::from_king_target(to.file()) {
                self.castle_rook(owner, side);
            }
        }

        let landed = match promotion {
            Some(promotion) => {
                debug!(%from, %to, %promotion, "promotion");
                Piece::new(promotion.into(), owner, to).with_moved(true)
            },
            None => piece.relocate(to),
        };
        self.board.clear(from);
        self.board.put(landed);

        if kind == PieceKind::King {
            self.kings[owner.index()] = Some(to);
        }

        self.refresh();

        debug!(player = %owner, piece = %kind, %from, %to, "move applied");
        self.halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        if owner == Player::Black {
            self.fullmove_counter = self.fullmove_counter.saturating_add(1);
        }
        self.side_to_move = owner.opponent();
    }

    fn castle_rook(&mut self, owner: Player, side: CastlingSide) {
        let rank = owner.backrank();
        let corner = Square::from_coords(rank, side.rook_file());
        let rook = self.board.at(corner);
        if rook.kind() != Some(PieceKind::Rook) || rook.owner() != Some(owner) {
            return;
        }
        let target = Square::from_coords(rank, side.rook_target());
        debug!(player = %owner, ?side, rook = %corner, to = %target, "castling");
        self.board.clear(corner);
        self.board.put(rook.relocate(target));
    }

    fn locate_kings(&mut self) {
        self.kings = [None; 2];
        for piece in self.board.pieces() {
            if let Piece::Occupied {
                kind: PieceKind::King,
                owner,
                position,
                ..
            } = piece
            {
                self.kings[owner.index()] = Some(position);
            }
        }
    }

    /// Recomputes attacked squares and check flags of both players from
    /// scratch.
    fn refresh(&mut self) {
        for player in [Player::White, Player::Black] {
            self.attacks[player.index()] = attacked_squares(&self.board, player);
        }
        for player in [Player::White, Player::Black] {
            let attacked = self.attacks[player.opponent().index()];
            self.in_check[player.index()] =
                self.kings[player.index()].is_some_and(|king| attacked.contains(king));
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn square(name: &str) -> Square {
        Square::try_from(name).unwrap()
    }

    fn play(game: &mut GameState, uci: &str) {
        game.make_move(Move::from_uci(uci).unwrap()).unwrap();
    }

    #[test]
    fn starting_state() {
        let game = GameState::new();
        assert_eq!(game.side_to_move(), Player::White);
        assert_eq!(game.king_position(Player::White), Some(square("e1")));
        assert_eq!(game.king_position(Player::Black), Some(square("e8")));
        assert!(!game.is_in_check(Player::White));
        assert!(!game.is_in_check(Player::Black));
        assert_eq!(game.en_passant_target(), None);
        assert_eq!(game.halfmove_clock(), 0);
        assert_eq!(game.fullmove_counter().get(), 1);
        assert_eq!(game, GameState::default());
    }

    #[test]
    fn clocks() {
        let mut game = GameState::new();
        play(&mut game, "g1f3");
        assert_eq!(game.halfmove_clock(), 1);
        assert_eq!(game.fullmove_counter().get(), 1);
        play(&mut game, "b8c6");
        assert_eq!(game.halfmove_clock(), 2);
        assert_eq!(game.fullmove_counter().get(), 2);
        play(&mut game, "e2e4");
        assert_eq!(game.halfmove_clock(), 0);
    }

    #[test]
    fn rejected_moves_leave_state_untouched() {
        let mut game = GameState::new();
        let before = game.clone();
        let e2 = game.piece_at(square("e2"));
        assert_eq!(
            game.apply_move(&e2, square("e5")),
            Err(RulesError::IllegalMove {
                from: square("e2"),
                to: square("e5")
            })
        );
        // Not Black's turn.
        let e7 = game.piece_at(square("e7"));
        assert!(game.apply_move(&e7, square("e5")).is_err());
        // Nothing to move.
        let empty = game.piece_at(square("e4"));
        assert!(game.apply_move(&empty, square("e5")).is_err());
        // Stale piece: the board holds an unmoved pawn on e2.
        let stale = Piece::new(PieceKind::Pawn, Player::White, square("e3"));
        assert!(game.apply_move(&stale, square("e4")).is_err());
        assert_eq!(game, before);
    }

    #[test]
    fn promotion_needs_a_pawn_one_step_away() {
        let mut game = GameState::new();
        let before = game.clone();
        let e2 = game.piece_at(square("e2"));
        assert_eq!(
            game.promote(&e2, Promotion::Queen, square("e8")),
            Err(RulesError::InvalidPromotion {
                square: square("e2"),
                reason: PromotionFault::NotReadyToPromote,
            })
        );
        let e7 = game.piece_at(square("e7"));
        assert_eq!(
            game.promote(&e7, Promotion::Knight, square("e1")),
            Err(RulesError::InvalidPromotion {
                square: square("e7"),
                reason: PromotionFault::NotReadyToPromote,
            })
        );
        let g1 = game.piece_at(square("g1"));
        assert_eq!(
            game.promote(&g1, Promotion::Rook, square("g8")),
            Err(RulesError::InvalidPromotion {
                square: square("g1"),
                reason: PromotionFault::NotAPawn,
            })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn place_pieces() {
        let mut game = GameState::empty();
        assert_eq!(game.king_position(Player::White), None);
        game.place(Piece::new(PieceKind::King, Player::White, square("e1")));
        game.place(Piece::new(PieceKind::Rook, Player::Black, square("e8")));
        assert_eq!(game.king_position(Player::White), Some(square("e1")));
        assert!(game.is_in_check(Player::White));
        game.place(Piece::new(PieceKind::Knight, Player::White, square("e4")));
        assert!(!game.is_in_check(Player::White));
        game.place(Piece::empty(square("e4")));
        assert!(game.is_in_check(Player::White));
    }

    #[test]
    fn king_position_follows_the_king() {
        let mut game = GameState::new();
        play(&mut game, "e2e4");
        play(&mut game, "e7e5");
        play(&mut game, "e1e2");
        assert_eq!(game.king_position(Player::White), Some(square("e2")));
        assert!(game.piece_at(square("e2")).has_moved());
    }
}
