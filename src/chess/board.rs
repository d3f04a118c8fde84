//! Square-centric board representation: every one of the 64 slots holds a
//! [`Piece`] value, empty squares included.
//!
//! A piece knows its own coordinates. [`Board::put`] always writes a piece
//! into the slot its position points to, which keeps both in sync as long as
//! all moves go through [`crate::chess::game::GameState`].

use std::fmt::{self, Write};

use itertools::Itertools;

use crate::chess::bitboard::Bitboard;
use crate::chess::core::{PieceKind, Player, Square, BOARD_WIDTH};
use crate::chess::error::RulesError;

/// Occupant of a single board slot.
///
/// ```
/// use gambit::chess::board::Piece;
/// use gambit::chess::core::{PieceKind, Player, Square};
///
/// let e2 = Square::try_from("e2").unwrap();
/// let pawn = Piece::new(PieceKind::Pawn, Player::White, e2);
/// assert_eq!(pawn.owner(), Some(Player::White));
/// assert!(!pawn.has_moved());
/// assert_eq!(pawn.to_string(), "P");
///
/// let empty = Piece::empty(e2);
/// assert!(empty.is_empty());
/// assert_eq!(empty.kind(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Piece {
    /// Unoccupied square. `en_passant` marks the square a pawn has just
    /// skipped with a double push: it can be captured onto for one ply.
    Empty {
        #[allow(missing_docs)]
        position: Square,
        #[allow(missing_docs)]
        en_passant: bool,
    },
    /// A piece of one of the players.
    Occupied {
        #[allow(missing_docs)]
        kind: PieceKind,
        #[allow(missing_docs)]
        owner: Player,
        /// Set once the piece leaves its original square. Drives pawn double
        /// pushes and castling eligibility.
        moved: bool,
        #[allow(missing_docs)]
        position: Square,
    },
}

impl Piece {
    /// Creates a piece that has not moved yet.
    #[must_use]
    pub const fn new(kind: PieceKind, owner: Player, position: Square) -> Self {
        Self::Occupied {
            kind,
            owner,
            moved: false,
            position,
        }
    }

    /// Overrides the "has moved" flag. Empty squares are returned unchanged.
    #[must_use]
    pub const fn with_moved(self, moved: bool) -> Self {
        match self {
            Self::Occupied {
                kind,
                owner,
                position,
                ..
            } => Self::Occupied {
                kind,
                owner,
                moved,
                position,
            },
            empty @ Self::Empty { .. } => empty,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn empty(position: Square) -> Self {
        Self::Empty {
            position,
            en_passant: false,
        }
    }

    pub(crate) const fn en_passant_marker(position: Square) -> Self {
        Self::Empty {
            position,
            en_passant: true,
        }
    }

    /// Coordinates of the slot holding this piece.
    #[must_use]
    pub const fn position(&self) -> Square {
        match *self {
            Self::Empty { position, .. } | Self::Occupied { position, .. } => position,
        }
    }

    /// [`None`] for empty squares.
    #[must_use]
    pub const fn owner(&self) -> Option<Player> {
        match *self {
            Self::Empty { .. } => None,
            Self::Occupied { owner, .. } => Some(owner),
        }
    }

    /// [`None`] for empty squares.
    #[must_use]
    pub const fn kind(&self) -> Option<PieceKind> {
        match *self {
            Self::Empty { .. } => None,
            Self::Occupied { kind, .. } => Some(kind),
        }
    }

    /// Empty squares never move.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        matches!(*self, Self::Occupied { moved: true, .. })
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(*self, Self::Empty { .. })
    }

    /// True for the square skipped by a double pawn push on the last ply.
    #[must_use]
    pub const fn is_en_passant_marker(&self) -> bool {
        matches!(
            *self,
            Self::Empty {
                en_passant: true,
                ..
            }
        )
    }

    /// Same piece after moving to `to`.
    pub(crate) const fn relocate(self, to: Square) -> Self {
        match self {
            Self::Occupied { kind, owner, .. } => Self::Occupied {
                kind,
                owner,
                moved: true,
                position: to,
            },
            Self::Empty { .. } => Self::empty(to),
        }
    }

    /// FEN symbol of the piece, '.' for empty squares.
    #[must_use]
    pub fn symbol(&self) -> char {
        match *self {
            Self::Empty { .. } => '.',
            Self::Occupied { kind, owner, .. } => kind.symbol(owner),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.symbol())
    }
}

const BACK_RANK: [PieceKind; BOARD_WIDTH as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// 8x8 grid of [`Piece`]s, indexed by rank and then by file.
///
/// Every slot always holds exactly one value: emptiness is represented by
/// [`Piece::Empty`].
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    slots: [[Piece; BOARD_WIDTH as usize]; BOARD_WIDTH as usize],
}

impl Board {
    /// Board without any pieces.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|rank| {
                std::array::from_fn(|file| {
                    Piece::empty(Square::from_coords(rank as u8, file as u8))
                })
            }),
        }
    }

    /// Standard starting position.
    ///
    /// ```
    /// use gambit::chess::board::Board;
    ///
    /// assert_eq!(
    ///     Board::starting().to_string(),
    ///     "8 r n b q k b n r\n\
    ///      7 p p p p p p p p\n\
    ///      6 . . . . . . . .\n\
    ///      5 . . . . . . . .\n\
    ///      4 . . . . . . . .\n\
    ///      3 . . . . . . . .\n\
    ///      2 P P P P P P P P\n\
    ///      1 R N B Q K B N R\n  \
    ///      a b c d e f g h"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut board = Self::empty();
        for player in [Player::White, Player::Black] {
            for (file, kind) in (0..BOARD_WIDTH).zip(BACK_RANK) {
                board.put(Piece::new(
                    kind,
                    player,
                    Square::from_coords(player.backrank(), file),
                ));
                board.put(Piece::new(
                    PieceKind::Pawn,
                    player,
                    Square::from_coords(player.pawn_rank(), file),
                ));
            }
        }
        board
    }

    /// Piece (or empty slot) on given square.
    #[must_use]
    pub const fn at(&self, square: Square) -> Piece {
        self.slots[square.rank() as usize][square.file() as usize]
    }

    /// Bounds-checked read by raw coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::OutOfBounds`] if the coordinates are outside of
    /// the board.
    pub fn get(&self, rank: u8, file: u8) -> Result<Piece, RulesError> {
        Ok(self.at(Square::new(rank, file)?))
    }

    /// Writes the piece into the slot it points to, discarding the previous
    /// occupant.
    pub(crate) fn put(&mut self, piece: Piece) {
        let square = piece.position();
        self.slots[usize::from(square.rank())][usize::from(square.file())] = piece;
    }

    pub(crate) fn clear(&mut self, square: Square) {
        self.put(Piece::empty(square));
    }

    /// All occupied slots, in a8 to h1 order.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.slots
            .iter()
            .flatten()
            .copied()
            .filter(|piece| !piece.is_empty())
    }

    /// Pieces of one player.
    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = Piece> + '_ {
        self.pieces()
            .filter(move |piece| piece.owner() == Some(player))
    }

    /// Squares occupied by the player's pieces.
    #[must_use]
    pub fn occupancy(&self, player: Player) -> Bitboard {
        self.pieces_of(player).map(|piece| piece.position()).collect()
    }

    /// Square skipped by the last double pawn push, if any.
    #[must_use]
    pub fn en_passant_marker(&self) -> Option<Square> {
        self.slots
            .iter()
            .flatten()
            .find(|piece| piece.is_en_passant_marker())
            .map(Piece::position)
    }

    /// Diagram of the board as seen by given player: their pieces at the
    /// bottom, rank and file labels on the edges.
    #[must_use]
    pub fn render(&self, perspective: Player) -> String {
        let (ranks, files): (Vec<u8>, Vec<u8>) = match perspective {
            Player::White => ((0..BOARD_WIDTH).collect(), (0..BOARD_WIDTH).collect()),
            Player::Black => (
                (0..BOARD_WIDTH).rev().collect(),
                (0..BOARD_WIDTH).rev().collect(),
            ),
        };
        let mut lines = ranks
            .iter()
            .map(|&rank| {
                let label = char::from(b'8' - rank);
                let row = files
                    .iter()
                    .map(|&file| self.at(Square::from_coords(rank, file)).symbol())
                    .join(" ");
                format!("{label} {row}")
            })
            .collect_vec();
        lines.push(format!(
            "  {}",
            files.iter().map(|&file| char::from(b'a' + file)).join(" ")
        ));
        lines.join("\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for Board {
    /// Diagram from White's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Player::White))
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Player::White))?;
        if let Some(marker) = self.en_passant_marker() {
            write!(f, "\nen passant: {marker}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn square(name: &str) -> Square {
        Square::try_from(name).unwrap()
    }

    #[test]
    fn starting_board() {
        let board = Board::starting();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.pieces_of(Player::White).count(), 16);
        assert_eq!(board.pieces_of(Player::Black).count(), 16);
        assert_eq!(
            board.at(square("e1")),
            Piece::new(PieceKind::King, Player::White, square("e1"))
        );
        assert_eq!(
            board.at(square("d8")),
            Piece::new(PieceKind::Queen, Player::Black, square("d8"))
        );
        assert!(board.at(square("e4")).is_empty());
        assert_eq!(board.en_passant_marker(), None);
    }

    #[test]
    fn positions_match_slots() {
        let board = Board::starting();
        for square in Square::iter() {
            assert_eq!(board.at(square).position(), square);
        }
    }

    #[test]
    fn bounds_checked_access() {
        let board = Board::starting();
        assert_eq!(
            board.get(7, 4).unwrap().kind(),
            Some(PieceKind::King)
        );
        assert_eq!(
            board.get(8, 4),
            Err(RulesError::OutOfBounds { rank: 8, file: 4 })
        );
        assert_eq!(
            board.get(0, 200),
            Err(RulesError::OutOfBounds { rank: 0, file: 200 })
        );
    }

    #[test]
    fn put_and_clear() {
        let mut board = Board::empty();
        let knight = Piece::new(PieceKind::Knight, Player::Black, square("c6"));
        board.put(knight);
        assert_eq!(board.at(square("c6")), knight);
        assert_eq!(board.occupancy(Player::Black), Bitboard::from(square("c6")));
        assert!(board.occupancy(Player::White).is_empty());

        board.put(Piece::en_passant_marker(square("e3")));
        assert_eq!(board.en_passant_marker(), Some(square("e3")));
        board.clear(square("e3"));
        assert_eq!(board.en_passant_marker(), None);

        board.clear(square("c6"));
        assert_eq!(board, Board::empty());
    }

    #[test]
    fn relocation_marks_moved() {
        let rook = Piece::new(PieceKind::Rook, Player::White, square("h1"));
        let moved = rook.relocate(square("f1"));
        assert_eq!(moved.position(), square("f1"));
        assert!(moved.has_moved());
        assert_eq!(moved.kind(), Some(PieceKind::Rook));
        assert!(!Piece::empty(square("a1")).with_moved(true).has_moved());
    }

    #[test]
    fn black_perspective() {
        assert_eq!(
            Board::starting().render(Player::Black),
            "1 R N B K Q B N R\n\
             2 P P P P P P P P\n\
             3 . . . . . . . .\n\
             4 . . . . . . . .\n\
             5 . . . . . . . .\n\
             6 . . . . . . . .\n\
             7 p p p p p p p p\n\
             8 r n b k q b n r\n  \
             h g f e d c b a"
        );
    }
}
