use megaminx_core::{MoveEngine, PieceState, scramble};
use megaminx_solver::{Session, Solver, SolverError};
use std::time::Duration;

#[test_log::test]
fn reference_scramble_solves_within_budget() {
    let (state, record) = scramble(20, 42);
    assert_eq!(record.len(), 20);
    let solver = Solver::new()
        .with_max_depth(200)
        .with_time_budget(Duration::from_secs(30));
    let solution = solver.solve(&state).unwrap();
    assert!(solution.len() <= 200);
    assert!(state.apply_all(&solution).is_solved());
}

#[test_log::test]
fn solving_is_deterministic() {
    let (state, _) = scramble(15, 9);
    let a = Solver::new().solve(&state).unwrap();
    let b = Solver::new().solve(&state).unwrap();
    assert_eq!(a, b);
}

#[test_log::test]
fn inverse_of_the_scramble_verifies_the_solution_checker() {
    let (state, record) = scramble(25, 4);
    let undo = MoveEngine::inverse_sequence(&record);
    assert!(state.apply_all(&undo).is_solved());
}

#[test_log::test]
fn cancelling_a_background_solve_times_out() {
    let mut session = Session::new();
    session.scramble(70, 13);
    let handle = session.solve(&Solver::new());
    handle.cancel();
    assert_eq!(handle.wait(), Err(SolverError::Timeout));
}

#[test_log::test]
fn solutions_never_contain_trivial_pairs() {
    let (state, _) = scramble(18, 77);
    let solution = Solver::new().solve(&state).unwrap();
    for pair in solution.windows(2) {
        assert_ne!(pair[0].face(), pair[1].face());
    }
    assert!(state.apply_all(&solution).is_solved());
}

#[test_log::test]
fn a_spread_of_seeds_solves() {
    for seed in [1, 5, 23, 58, 91] {
        let (state, _) = scramble(60, seed);
        let solution = Solver::new()
            .with_time_budget(Duration::from_secs(30))
            .solve(&state)
            .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
        assert!(
            state.apply_all(&solution).is_solved(),
            "seed {seed} not solved"
        );
    }
}

#[test_log::test]
#[ignore = "long soak; run on demand"]
fn many_seeds_soak() {
    for seed in 0..50 {
        let (state, _) = scramble(100, seed);
        let solution = Solver::new()
            .with_time_budget(Duration::from_secs(60))
            .solve(&state)
            .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
        assert!(
            state.apply_all(&solution).is_solved(),
            "seed {seed} not solved"
        );
    }
}

#[test_log::test]
fn solved_state_needs_no_moves() {
    let solution = Solver::new().solve(&PieceState::solved()).unwrap();
    assert!(solution.is_empty());
}
