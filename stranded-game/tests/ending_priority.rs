use stranded_game::{
    DecisionCatalog, EndReason, EngineError, GameState, GameStatus, OutcomeKind, Scenario,
    SequenceRng, evaluate_end_condition, resolve_transition,
};

fn active_state() -> GameState {
    GameState::new(Scenario::forest_autumn(), Vec::new())
}

#[test]
fn fatal_metric_beats_signal_rescue_when_both_hold() {
    let mut state = active_state();
    state.turn = 10;
    state.successful_signals = 3;
    state.metrics.signal_effectiveness = 95.0;
    state.metrics.survival_probability = 70.0;
    state.metrics.energy = 2.0;
    assert_eq!(
        evaluate_end_condition(&state),
        Some((OutcomeKind::Died, EndReason::Exhaustion)),
        "priority rule 1 beats rule 3"
    );
}

#[test]
fn injury_overrides_clean_survival_at_turn_sixteen() {
    let mut state = active_state();
    state.turn = 16;
    state.metrics.survival_probability = 60.0;
    state.metrics.injury_severity = 60.0;
    state.metrics.hydration = 50.0;
    assert_eq!(
        evaluate_end_condition(&state),
        Some((OutcomeKind::BarelySurvived, EndReason::EnduranceRescue))
    );
}

#[test]
fn exhaustion_uses_inclusive_boundary_through_a_real_transition() {
    let catalog = DecisionCatalog::default_catalog();
    let mut state = active_state();
    state.metrics.energy = 8.0;
    let inputs = state.derived_inputs();
    state.metrics.recompute_derived(&inputs);

    // A plain success: no tier bonus can offset a cost that deep.
    let mut rng = SequenceRng::new(vec![0.6]);
    let next = resolve_transition(&state, "navigate", &catalog, &mut rng).unwrap();
    assert!(next.metrics.energy <= 3.0);
    assert_eq!(next.status, GameStatus::Ended);
    let outcome = next.outcome.expect("game ended");
    assert_eq!(outcome.kind, OutcomeKind::Died);
    assert_eq!(outcome.reason, EndReason::Exhaustion);
}

#[test]
fn turn_number_increments_only_on_accepted_decisions() {
    let catalog = DecisionCatalog::default_catalog();
    let state = active_state();

    let mut rng = SequenceRng::new(vec![0.5]);
    let accepted = resolve_transition(&state, "rest", &catalog, &mut rng).unwrap();
    assert_eq!(accepted.turn, state.turn + 1);

    let mut rng = SequenceRng::new(vec![0.5]);
    let rejected = resolve_transition(&state, "call-a-cab", &catalog, &mut rng);
    assert!(matches!(
        rejected,
        Err(EngineError::UnknownDecision { .. })
    ));
    assert_eq!(state.turn, 1, "rejected transition leaves state untouched");

    let mut ended = accepted;
    ended.status = GameStatus::Ended;
    let mut rng = SequenceRng::new(vec![0.5]);
    assert!(matches!(
        resolve_transition(&ended, "rest", &catalog, &mut rng),
        Err(EngineError::GameEnded)
    ));
    assert_eq!(ended.turn, 2);
}

#[test]
fn terminal_status_is_absorbing() {
    let catalog = DecisionCatalog::default_catalog();
    let mut state = active_state();
    state.metrics.energy = 8.0;
    let inputs = state.derived_inputs();
    state.metrics.recompute_derived(&inputs);
    let mut rng = SequenceRng::new(vec![0.6]);
    let dead = resolve_transition(&state, "navigate", &catalog, &mut rng).unwrap();
    assert!(dead.is_ended());

    let mut rng = SequenceRng::new(vec![0.6]);
    let retry = resolve_transition(&dead, "rest", &catalog, &mut rng);
    assert!(matches!(retry, Err(EngineError::GameEnded)));
    assert_eq!(
        dead.outcome.as_ref().map(|o| o.kind),
        Some(OutcomeKind::Died)
    );
}

#[test]
fn dehydration_and_collapse_paths_stay_distinct() {
    let mut state = active_state();
    state.metrics.hydration = 4.0;
    state.metrics.energy = 60.0;
    assert_eq!(
        evaluate_end_condition(&state),
        Some((OutcomeKind::Died, EndReason::Dehydration))
    );

    let mut combined = active_state();
    combined.metrics.hydration = 8.0;
    combined.metrics.energy = 4.0;
    assert_eq!(
        evaluate_end_condition(&combined),
        Some((OutcomeKind::Died, EndReason::Collapse))
    );
}

#[test]
fn navigation_escape_beats_endurance_gates() {
    let mut state = active_state();
    state.turn = 16;
    state.successful_navigations = 3;
    state.last_action_succeeded = true;
    state.metrics.energy = 50.0;
    state.metrics.survival_probability = 60.0;
    assert_eq!(
        evaluate_end_condition(&state),
        Some((OutcomeKind::Survived, EndReason::NavigatedOut)),
        "rule 2 outranks rule 4"
    );
}
