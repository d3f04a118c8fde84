#![no_main]
use gambit::chess::game::GameState;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(state) = GameState::from_fen(input) else {
        return;
    };
    let mover = state.side_to_move();
    let moves = state.generate_moves();
    assert!(moves.iter().all_unique());
    for next_move in &moves {
        let piece = state.piece_at(next_move.from());
        let pseudo_legal = piece.pseudo_legal_moves(state.board());
        assert!(pseudo_legal.contains(next_move.to()));
        assert_ne!(state.piece_at(next_move.to()).owner(), Some(mover));

        let mut next = state.clone();
        next.make_move(*next_move)
            .expect("generated moves should be accepted");
        assert!(!next.is_in_check(mover));
        assert_eq!(next.side_to_move(), mover.opponent());
        assert!(next.piece_at(next_move.from()).is_empty());
    }
});
