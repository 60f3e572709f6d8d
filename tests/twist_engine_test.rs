//! Scenario tests for the TwistTacToe rules engine.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use twist_tac_toe::{
    ArrangementStep, BlockSequence, Board, End, Outcome, Phase, Position, Rejection, Square,
    Symbol, Transition, TwistGame, Variant,
};

fn game(symbols: &str) -> TwistGame {
    let symbols: Vec<Symbol> = symbols
        .chars()
        .map(|c| if c == 'X' { Symbol::X } else { Symbol::O })
        .collect();
    let symbols: [Symbol; 10] = symbols.try_into().expect("ten symbols");
    TwistGame::with_sequence(BlockSequence::from_symbols(symbols).expect("balanced"))
}

fn play(game: &mut TwistGame, end: End, cell: usize) -> Transition {
    game.reveal(end).expect("reveal");
    game.place(cell).expect("place")
}

#[test]
fn test_three_front_x_win_on_the_third() {
    let mut game = game("XXXOOXXOOO");
    assert_eq!(play(&mut game, End::Front, 0), Transition::Continue);
    assert_eq!(play(&mut game, End::Back, 3), Transition::Continue);
    assert_eq!(play(&mut game, End::Front, 1), Transition::Continue);
    assert_eq!(play(&mut game, End::Back, 4), Transition::Continue);
    assert_eq!(
        play(&mut game, End::Front, 2),
        Transition::Finished(Outcome::Winner(Symbol::X))
    );
    assert_eq!(game.last_placed(), Some(End::Front));
}

#[test]
fn test_nothing_succeeds_after_a_win() {
    let mut game = game("XXXOOXXOOO");
    for (end, cell) in [(End::Front, 0), (End::Back, 3), (End::Front, 1), (End::Back, 4)] {
        play(&mut game, end, cell);
    }
    play(&mut game, End::Front, 2);

    assert_eq!(game.reveal(End::Back), Err(Rejection::GameOver));
    assert_eq!(game.reveal(End::Front), Err(Rejection::GameOver));
    assert_eq!(game.place(8), Err(Rejection::GameOver));
    assert_eq!(game.deque().remaining(), 5);
}

#[test]
fn test_full_board_with_blocks_left_is_a_draw() {
    let mut game = game("XXXXXOOOOO");
    let moves = [
        (End::Front, 0),
        (End::Back, 1),
        (End::Front, 2),
        (End::Back, 3),
        (End::Front, 5),
        (End::Back, 6),
        (End::Front, 4),
        (End::Back, 8),
    ];
    for (end, cell) in moves {
        assert_eq!(play(&mut game, end, cell), Transition::Continue);
    }
    assert_eq!(
        play(&mut game, End::Front, 7),
        Transition::Finished(Outcome::Draw)
    );
    assert_eq!(game.deque().remaining(), 1);
    assert_eq!(game.board().filled(), 9);
}

#[test]
fn test_running_out_of_blocks_is_a_draw() {
    // Rewinding to the empty board after every placement lets all ten
    // blocks be revealed while only one cell is ever filled.
    let mut game = game("XOXOXOXOXO");
    for turn in 0..10 {
        let end = if turn % 2 == 0 { End::Front } else { End::Back };
        let transition = play(&mut game, end, 0);
        if turn < 9 {
            assert_eq!(transition, Transition::Continue);
            game.jump_to(0).expect("rewind");
        } else {
            assert_eq!(transition, Transition::Finished(Outcome::Draw));
        }
    }
    assert!(game.deque().is_exhausted());
    assert_eq!(game.board().filled(), 1);
    assert_eq!(game.history().len(), 2);
    assert_eq!(game.reveal(End::Front), Err(Rejection::GameOver));
}

#[test]
fn test_reveal_preconditions() {
    let mut game = game("XOXOXOXOXO");
    assert_eq!(game.place(0), Err(Rejection::NothingRevealed));
    assert_eq!(game.reveal(End::Back), Err(Rejection::WrongSide(End::Front)));

    assert_eq!(game.reveal(End::Front), Ok(Symbol::X));
    assert_eq!(game.reveal(End::Front), Err(Rejection::AlreadyRevealed));
    assert_eq!(game.reveal(End::Back), Err(Rejection::AlreadyRevealed));
    assert_eq!(game.deque().revealed(), &[0]);

    assert_eq!(game.place(9), Err(Rejection::OutOfBounds(9)));
    game.place(4).expect("place");
    assert_eq!(
        game.place(4),
        Err(Rejection::SquareOccupied(Position::Center))
    );
}

#[test]
fn test_rejection_leaves_game_unchanged() {
    let mut game = game("XOXOXOXOXO");
    game.reveal(End::Front).expect("reveal");
    game.place(0).expect("place");
    let before = game.clone();

    assert!(game.reveal(End::Front).is_err());
    assert!(game.place(0).is_err());
    assert!(game.jump_to(5).is_err());
    assert_eq!(game, before);
}

#[test]
fn test_jump_keeps_the_pending_symbol_and_truncates_on_place() {
    let mut game = game("XOXOXOXOXO");
    play(&mut game, End::Front, 0);
    play(&mut game, End::Back, 1);
    play(&mut game, End::Front, 2);
    let pending = game.reveal(End::Back).expect("reveal");

    game.jump_to(1).expect("jump");
    assert_eq!(game.step(), 1);
    assert_eq!(game.pending(), Some(pending));
    assert_eq!(game.history().len(), 4);

    game.place(8).expect("place");
    assert_eq!(game.history().len(), 3);
    let mut expected = Board::new();
    expected.set(Position::TopLeft, Square::Occupied(Symbol::X));
    expected.set(Position::BottomRight, Square::Occupied(pending));
    assert_eq!(game.board(), &expected);
}

#[test]
fn test_jump_to_a_won_record_shows_the_result() {
    let mut game = game("XXXOOXXOOO");
    for (end, cell) in [(End::Front, 0), (End::Back, 3), (End::Front, 1), (End::Back, 4)] {
        play(&mut game, end, cell);
    }
    play(&mut game, End::Front, 2);
    game.jump_to(2).expect("jump back");
    assert_eq!(game.phase(), &Phase::AwaitingReveal);
    game.jump_to(5).expect("jump forward");
    assert_eq!(game.outcome(), Some(Outcome::Winner(Symbol::X)));
    assert_eq!(game.jump_to(6), Err(Rejection::StepOutOfRange(6)));
}

#[test]
fn test_revealed_symbol_survives_viewing_a_won_record() {
    let mut game = game("XXOOOOOXXX");
    play(&mut game, End::Front, 0);
    play(&mut game, End::Back, 1);
    assert_eq!(
        play(&mut game, End::Front, 2),
        Transition::Finished(Outcome::Winner(Symbol::X))
    );

    game.jump_to(1).expect("jump back");
    assert_eq!(game.reveal(End::Back), Ok(Symbol::X));
    assert_eq!(game.deque().remaining(), 6);

    game.jump_to(3).expect("view the win");
    assert_eq!(game.outcome(), Some(Outcome::Winner(Symbol::X)));
    assert_eq!(game.pending(), None);
    assert_eq!(game.place(5), Err(Rejection::GameOver));

    game.jump_to(1).expect("jump back again");
    assert_eq!(game.pending(), Some(Symbol::X));
    assert_eq!(game.deque().remaining(), 6);
    assert_eq!(game.place(5), Ok(Transition::Continue));
    assert_eq!(game.history().len(), 3);
}

#[test]
fn test_peer_symbol_is_written_into_the_revealed_slot() {
    let mut game = game("XOXOXOXOXO");
    game.accept_reveal(End::Front, 0, Symbol::O).expect("accepted");

    assert_eq!(game.pending(), Some(Symbol::O));
    let sequence = game.deque().sequence();
    assert_eq!(sequence.get(0), Some(Symbol::O));
    assert_eq!(sequence.get(1), Some(Symbol::X));
    assert!(sequence.is_balanced());
    assert_eq!(game.deque().front_index(), 1);

    game.place(4).expect("place");
    assert_eq!(
        game.board().get(Position::Center),
        Square::Occupied(Symbol::O)
    );
}

#[test]
fn test_fixed_arrangement_scenario() {
    let mut game = TwistGame::arranged_with_anchor(Symbol::X);
    assert_eq!(game.reveal(End::Front), Err(Rejection::StillArranging));
    assert_eq!(game.commit(6), Err(Rejection::NothingStaged));

    // Player 1 hides its pool in the back half, O in slot 9.
    game.select(2).expect("select O");
    assert_eq!(game.commit(1), Err(Rejection::InvalidSlot(1)));
    assert_eq!(game.commit(9), Ok(ArrangementStep::Continue));
    assert_eq!(game.select(2), Err(Rejection::PoolEntryUnavailable(2)));
    game.select(0).expect("select");
    game.commit(6).expect("commit");
    game.select(1).expect("select");
    assert_eq!(game.commit(6), Err(Rejection::SlotFilled(6)));
    game.commit(7).expect("commit");
    game.select(3).expect("select");
    assert_eq!(game.commit(8), Ok(ArrangementStep::TurnPassed(End::Back)));

    // Player 2 fills the front half, X in slot 1.
    for (pool, slot) in [(0, 1), (2, 2), (1, 3)] {
        game.select(pool).expect("select");
        assert_eq!(game.commit(slot), Ok(ArrangementStep::Continue));
    }
    game.select(3).expect("select");
    assert_eq!(game.commit(4), Ok(ArrangementStep::Complete));

    assert_eq!(game.phase(), &Phase::AwaitingReveal);
    let sequence = game.deque().sequence();
    assert!(sequence.is_complete());
    assert!(sequence.is_balanced());
    assert_eq!(sequence.get(0), Some(Symbol::X));
    assert_eq!(sequence.get(5), Some(Symbol::O));

    assert_eq!(game.reveal(End::Front), Ok(Symbol::X));
    game.place(0).expect("place");
    assert_eq!(game.reveal(End::Back), Ok(Symbol::O));
    game.place(4).expect("place");
    assert_eq!(game.reveal(End::Front), Ok(Symbol::X));
    assert_eq!(game.place(1), Ok(Transition::Continue));
}

#[test]
fn test_auto_arrangement_completes_the_sequence() {
    let mut rng = ChaCha20Rng::seed_from_u64(9);
    let mut game = TwistGame::new(Variant::Arranged, &mut rng);
    assert_eq!(
        game.auto_arrange(&mut rng),
        Ok(ArrangementStep::TurnPassed(End::Back))
    );
    assert_eq!(game.auto_arrange(&mut rng), Ok(ArrangementStep::Complete));
    assert!(game.deque().sequence().is_balanced());
    assert!(game.deque().sequence().anchors_differ());
    assert_eq!(game.auto_arrange(&mut rng), Err(Rejection::NotArranging));
}

#[test]
fn test_random_games_keep_invariants() {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    for round in 0..50 {
        let variant = if round % 2 == 0 {
            Variant::Shuffled
        } else {
            Variant::Arranged
        };
        let mut game = TwistGame::new(variant, &mut rng);
        while game.arrangement().is_some() {
            game.auto_arrange(&mut rng).expect("arrange");
        }
        while game.outcome().is_none() {
            game.reveal(game.end_to_move()).expect("reveal");
            let cell = *Position::valid_moves(game.board())
                .choose(&mut rng)
                .expect("empty cell");
            game.place(cell.to_index()).expect("place");
            assert_eq!(game.verify(), Ok(()));
        }
        assert_eq!(game.deque().sequence().count(Symbol::X), 5);
        assert_eq!(game.deque().sequence().count(Symbol::O), 5);
        assert_eq!(
            game.deque().revealed().len(),
            10 - game.deque().remaining()
        );
    }
}
