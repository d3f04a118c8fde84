//! Pseudo-legal [move generation]: destinations consistent with the movement
//! pattern of a piece and the blocking rules, without looking at whether the
//! mover's king ends up attacked. [`crate::chess::legality`] narrows these
//! down to legal moves.
//!
//! Sliding pieces walk their rays square by square, which is plenty for a
//! mailbox board of 64 squares.
//!
//! [move generation]: https://www.chessprogramming.org/Move_Generation

use crate::chess::bitboard::Bitboard;
use crate::chess::board::{Board, Piece};
use crate::chess::core::{CastlingSide, Direction, PieceKind, Player, Square};

const ORTHOGONAL: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

const DIAGONAL: [Direction; 4] = [
    Direction::UpLeft,
    Direction::UpRight,
    Direction::DownLeft,
    Direction::DownRight,
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Piece {
    /// Squares this piece can move to on given board, ignoring checks.
    ///
    /// Castling destinations of an unmoved king are included when the rook
    /// has not moved and the squares between them are empty; whether the king
    /// is in check is left to the legality filter.
    ///
    /// ```
    /// use gambit::chess::board::Board;
    /// use gambit::chess::core::Square;
    ///
    /// let board = Board::starting();
    /// let knight = board.at(Square::try_from("g1").unwrap());
    /// let moves: Vec<_> = knight
    ///     .pseudo_legal_moves(&board)
    ///     .iter()
    ///     .map(|square| square.to_string())
    ///     .collect();
    /// assert_eq!(moves, vec!["f3", "h3"]);
    /// ```
    #[must_use]
    pub fn pseudo_legal_moves(&self, board: &Board) -> Bitboard {
        match *self {
            Self::Empty { .. } => Bitboard::empty(),
            Self::Occupied {
                kind,
                owner,
                moved,
                position,
            } => match kind {
                PieceKind::Pawn => pawn_moves(board, position, owner, moved),
                PieceKind::Knight => jumps(board, position, owner, &KNIGHT_OFFSETS),
                PieceKind::Bishop => slides(board, position, owner, &DIAGONAL),
                PieceKind::Rook => slides(board, position, owner, &ORTHOGONAL),
                PieceKind::Queen => {
                    slides(board, position, owner, &DIAGONAL)
                        | slides(board, position, owner, &ORTHOGONAL)
                },
                PieceKind::King => {
                    jumps(board, position, owner, &KING_OFFSETS)
                        | castling_moves(board, position, owner, moved)
                },
            },
        }
    }
}

/// Union of pseudo-legal destinations of all pieces of the player. A king
/// standing on any of these squares is in check.
#[must_use]
pub fn attacked_squares(board: &Board, player: Player) -> Bitboard {
    board
        .pieces_of(player)
        .fold(Bitboard::empty(), |attacks, piece| {
            attacks | piece.pseudo_legal_moves(board)
        })
}

/// Walks each ray until the edge of the board or the first occupied square,
/// which is included only if it holds an opponent's piece.
fn slides(board: &Board, from: Square, owner: Player, directions: &[Direction]) -> Bitboard {
    let mut result = Bitboard::empty();
    for &direction in directions {
        let mut current = from;
        while let Some(next) = current.shift(direction) {
            match board.at(next).owner() {
                Some(player) if player == owner => break,
                Some(_) => {
                    result |= next;
                    break;
                },
                None => result |= next,
            }
            current = next;
        }
    }
    result
}

fn jumps(board: &Board, from: Square, owner: Player, offsets: &[(i8, i8)]) -> Bitboard {
    offsets
        .iter()
        .filter_map(|&(d_rank, d_file)| from.offset(d_rank, d_file))
        .filter(|&target| board.at(target).owner() != Some(owner))
        .collect()
}

fn pawn_moves(board: &Board, from: Square, owner: Player, moved: bool) -> Bitboard {
    let mut result = Bitboard::empty();
    let forward = owner.push_direction();
    let is_empty = |square: &Square| board.at(*square).is_empty();
    if let Some(single) = from.shift(forward).filter(is_empty) {
        result |= single;
        if !moved {
            if let Some(double) = single.shift(forward).filter(is_empty) {
                result |= double;
            }
        }
    }
    let (d_rank, _) = forward.delta();
    for d_file in [-1, 1] {
        let Some(target) = from.offset(d_rank, d_file) else {
            continue;
        };
        let occupant = board.at(target);
        let capture = matches!(occupant.owner(), Some(player) if player != owner);
        // Only the marker left by the opponent's double push can be taken.
        let en_passant = occupant.is_en_passant_marker()
            && target.rank() == owner.opponent().en_passant_rank();
        if capture || en_passant {
            result |= target;
        }
    }
    result
}

fn castling_moves(board: &Board, king: Square, owner: Player, moved: bool) -> Bitboard {
    let rank = owner.backrank();
    if moved || king != Square::from_coords(rank, CastlingSide::KING_FILE) {
        return Bitboard::empty();
    }
    CastlingSide::BOTH
        .iter()
        .filter(|side| {
            let rook_in_place = matches!(
                board.at(Square::from_coords(rank, side.rook_file())),
                Piece::Occupied {
                    kind: PieceKind::Rook,
                    owner: rook_owner,
                    moved: false,
                    ..
                } if rook_owner == owner
            );
            rook_in_place
                && side
                    .between()
                    .iter()
                    .all(|&file| board.at(Square::from_coords(rank, file)).is_empty())
        })
        .map(|side| Square::from_coords(rank, side.king_target()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn square(name: &str) -> Square {
        Square::try_from(name).unwrap()
    }

    fn place(board: &mut Board, kind: PieceKind, owner: Player, name: &str) -> Piece {
        let piece = Piece::new(kind, owner, square(name));
        board.put(piece);
        piece
    }

    fn names(moves: Bitboard) -> Vec<String> {
        let mut result: Vec<_> = moves.iter().map(|square| square.to_string()).collect();
        result.sort();
        result
    }

    #[test]
    fn knight_in_the_corner() {
        let mut board = Board::empty();
        let knight = place(&mut board, PieceKind::Knight, Player::White, "a1");
        assert_eq!(names(knight.pseudo_legal_moves(&board)), vec!["b3", "c2"]);
        let _ = place(&mut board, PieceKind::Pawn, Player::White, "c2");
        let _ = place(&mut board, PieceKind::Pawn, Player::Black, "b3");
        assert_eq!(names(knight.pseudo_legal_moves(&board)), vec!["b3"]);
    }

    #[test]
    fn rook_rays_stop_at_blockers() {
        let mut board = Board::empty();
        let rook = place(&mut board, PieceKind::Rook, Player::White, "d4");
        let _ = place(&mut board, PieceKind::Pawn, Player::White, "d6");
        let _ = place(&mut board, PieceKind::Knight, Player::Black, "f4");
        let _ = place(&mut board, PieceKind::Queen, Player::Black, "g4");
        assert_eq!(
            names(rook.pseudo_legal_moves(&board)),
            vec!["a4", "b4", "c4", "d1", "d2", "d3", "d5", "e4", "f4"]
        );
    }

    #[test]
    fn bishop_and_queen() {
        let mut board = Board::empty();
        let bishop = place(&mut board, PieceKind::Bishop, Player::Black, "c8");
        let _ = place(&mut board, PieceKind::Pawn, Player::White, "e6");
        assert_eq!(
            names(bishop.pseudo_legal_moves(&board)),
            vec!["a6", "b7", "d7", "e6"]
        );

        let mut board = Board::empty();
        let queen = place(&mut board, PieceKind::Queen, Player::White, "d4");
        assert_eq!(queen.pseudo_legal_moves(&board).count(), 27);
    }

    #[test]
    fn pawn_pushes() {
        let mut board = Board::empty();
        let pawn = place(&mut board, PieceKind::Pawn, Player::White, "e2");
        assert_eq!(names(pawn.pseudo_legal_moves(&board)), vec!["e3", "e4"]);
        assert_eq!(
            names(pawn.with_moved(true).pseudo_legal_moves(&board)),
            vec!["e3"]
        );

        // Blocked double push.
        let blocker = place(&mut board, PieceKind::Knight, Player::Black, "e4");
        assert_eq!(names(pawn.pseudo_legal_moves(&board)), vec!["e3"]);
        // Blocked single push blocks the double push too.
        board.clear(blocker.position());
        let _ = place(&mut board, PieceKind::Knight, Player::White, "e3");
        assert!(pawn.pseudo_legal_moves(&board).is_empty());

        let black = place(&mut board, PieceKind::Pawn, Player::Black, "a7");
        assert_eq!(names(black.pseudo_legal_moves(&board)), vec!["a5", "a6"]);
    }

    #[test]
    fn pawn_captures() {
        let mut board = Board::empty();
        let pawn = place(&mut board, PieceKind::Pawn, Player::White, "d4")
            .with_moved(true);
        let _ = place(&mut board, PieceKind::Rook, Player::Black, "c5");
        let _ = place(&mut board, PieceKind::Rook, Player::White, "e5");
        assert_eq!(names(pawn.pseudo_legal_moves(&board)), vec!["c5", "d5"]);

        // No wrapping around the edge of the board.
        let edge = place(&mut board, PieceKind::Pawn, Player::White, "h3").with_moved(true);
        let _ = place(&mut board, PieceKind::Pawn, Player::Black, "a5");
        assert_eq!(names(edge.pseudo_legal_moves(&board)), vec!["h4"]);

        // Pawns on the last rank have nowhere to go.
        let stuck = place(&mut board, PieceKind::Pawn, Player::Black, "b1").with_moved(true);
        assert!(stuck.pseudo_legal_moves(&board).is_empty());
    }

    #[test]
    fn en_passant_marker() {
        let mut board = Board::empty();
        let pawn = place(&mut board, PieceKind::Pawn, Player::White, "e5").with_moved(true);
        let _ = place(&mut board, PieceKind::Pawn, Player::Black, "d5");
        board.put(Piece::en_passant_marker(square("d6")));
        assert_eq!(names(pawn.pseudo_legal_moves(&board)), vec!["d6", "e6"]);

        // A marker on the wrong rank is not the opponent's.
        let mut board = Board::empty();
        let pawn = place(&mut board, PieceKind::Pawn, Player::White, "e2");
        board.put(Piece::en_passant_marker(square("d3")));
        assert_eq!(names(pawn.pseudo_legal_moves(&board)), vec!["e3", "e4"]);
    }

    #[test]
    fn castling() {
        let mut board = Board::empty();
        let king = place(&mut board, PieceKind::King, Player::White, "e1");
        let _ = place(&mut board, PieceKind::Rook, Player::White, "h1");
        let _ = place(&mut board, PieceKind::Rook, Player::White, "a1");
        assert_eq!(
            names(king.pseudo_legal_moves(&board)),
            vec!["c1", "d1", "d2", "e2", "f1", "f2", "g1"]
        );

        // Moved rook.
        board.put(Piece::new(PieceKind::Rook, Player::White, square("h1")).with_moved(true));
        assert_eq!(
            names(king.pseudo_legal_moves(&board)),
            vec!["c1", "d1", "d2", "e2", "f1", "f2"]
        );

        // Something between the king and the rook.
        let _ = place(&mut board, PieceKind::Knight, Player::Black, "b1");
        assert_eq!(
            names(king.pseudo_legal_moves(&board)),
            vec!["d1", "d2", "e2", "f1", "f2"]
        );

        // Moved king.
        board.clear(square("b1"));
        assert_eq!(
            names(king.with_moved(true).pseudo_legal_moves(&board)),
            vec!["d1", "d2", "e2", "f1", "f2"]
        );

        // Rook of the wrong color.
        let mut board = Board::empty();
        let king = place(&mut board, PieceKind::King, Player::Black, "e8");
        let _ = place(&mut board, PieceKind::Rook, Player::White, "h8");
        assert!(!king.pseudo_legal_moves(&board).contains(square("g8")));
    }

    #[test]
    fn attacks() {
        let board = Board::starting();
        let white = attacked_squares(&board, Player::White);
        // Pawn pushes cover ranks 3 and 4, knight jumps land on rank 3 too.
        assert_eq!(white.count(), 16);
        assert!(white.contains(square("e4")));
        assert!(white.contains(square("a3")));
        assert!(!white.contains(square("e5")));
        assert_eq!(attacked_squares(&Board::empty(), Player::Black), Bitboard::empty());
    }
}
