//! Implementation of chess rules: board representation, move generation,
//! legality checks and move execution.

pub mod bitboard;
pub mod board;
pub mod core;
pub mod error;
pub mod fen;
pub mod game;
pub mod legality;
pub mod movegen;
pub mod perft;
