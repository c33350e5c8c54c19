//! Turn orchestration: one decision in, one fresh state out.
use crate::EngineError;
use crate::catalog::{Decision, DecisionCatalog, DecisionCategory, available_decisions};
use crate::causality::build_causality_chain;
use crate::constants::LOW_ENERGY_ASSESSMENT_GATE;
use crate::endings::evaluate_end_condition;
use crate::resolver::resolve;
use crate::rng::{TurnRng, UnitRng};
use crate::rules::{assess_history, discovered_principles};
use crate::state::{GameOutcome, GameState, OutcomeKind};
use crate::thresholds::{DecisionRef, detect_crossings};

/// Resolve one decision against `state` and return the successor state.
///
/// The input state is never touched; an error leaves the game exactly
/// where it was. Draws exactly one uniform value from `rng` per accepted
/// decision and none at all for rejected ones.
///
/// # Errors
///
/// - `EngineError::GameEnded` when the game has already ended.
/// - `EngineError::UnknownDecision` when the id is not in the catalog.
pub fn resolve_transition<R: UnitRng>(
    state: &GameState,
    decision_id: &str,
    catalog: &DecisionCatalog,
    rng: &mut R,
) -> Result<GameState, EngineError> {
    if state.is_ended() {
        return Err(EngineError::GameEnded);
    }
    let decision = catalog
        .get(decision_id)
        .ok_or_else(|| EngineError::UnknownDecision {
            id: decision_id.to_string(),
        })?
        .clone();

    let mut next = state.clone();
    let mut outcome = resolve(&decision, state, rng);

    // Merge delayed effects that come due this turn into the applied
    // delta; the schedule is turn-indexed so this is a single lookup.
    if let Some(due) = next.pending_effects.remove(&state.turn) {
        for effect in due {
            log::debug!("delayed effect {} fires on turn {}", effect.token, state.turn);
            outcome.metrics_change = outcome.metrics_change.combined(&effect.delta);
            outcome.tokens.push(effect.token);
        }
    }
    for effect in &outcome.delayed_effects {
        next.pending_effects
            .entry(effect.trigger_turn)
            .or_default()
            .push(effect.clone());
    }

    if let Some(weather) = outcome.weather_change {
        next.weather = weather;
    }
    for tag in &outcome.equipment_added {
        next.equipment.insert(tag.clone());
    }
    for tag in &outcome.equipment_removed {
        next.equipment.remove(tag);
    }

    let previous_metrics = next.metrics;
    next.metrics = previous_metrics.apply_delta(&outcome.metrics_change, &next.derived_inputs());

    let cause = DecisionRef {
        turn: state.turn,
        id: decision.id.clone(),
        text_key: decision.text_key.clone(),
    };
    next.crossings
        .extend(detect_crossings(&previous_metrics, &next.metrics, state.turn, &cause));

    next.last_action_succeeded = outcome.tier.is_success();
    if outcome.tier.is_success() {
        match outcome.category {
            DecisionCategory::Signal => {
                next.successful_signals = next.successful_signals.saturating_add(1);
            }
            DecisionCategory::Navigation => {
                next.successful_navigations = next.successful_navigations.saturating_add(1);
            }
            _ => {}
        }
        for principle in discovered_principles(&decision, state) {
            next.principles.insert(principle.to_string());
        }
    }
    if next.metrics.energy < LOW_ENERGY_ASSESSMENT_GATE {
        next.low_energy_turns = next.low_energy_turns.saturating_add(1);
    }

    next.history.push(outcome);
    next.advance_time(decision.time_hours);
    next.turn = state.turn + 1;

    if let Some((kind, reason)) = evaluate_end_condition(&next) {
        if kind == OutcomeKind::Died
            && let Some(metric) = reason.fatal_metric()
        {
            match build_causality_chain(&next, metric) {
                Ok(chain) => next.causality = Some(chain),
                Err(err) => log::debug!("causality reconstruction degraded: {err}"),
            }
        }
        let assessment = assess_history(&next);
        let turn = next.turn;
        next.set_outcome(GameOutcome {
            kind,
            reason,
            turn,
            assessment,
        });
    }

    Ok(next)
}

/// Owns the catalog and the seeded decision stream for one game.
#[derive(Debug, Clone)]
pub struct GameController {
    catalog: DecisionCatalog,
    rng: TurnRng,
    seed: u64,
}

impl GameController {
    /// Controller over the default catalog.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(DecisionCatalog::default_catalog(), seed)
    }

    /// Controller over a platform-supplied catalog.
    #[must_use]
    pub fn with_catalog(catalog: DecisionCatalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: TurnRng::from_user_seed(seed),
            seed,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn catalog(&self) -> &DecisionCatalog {
        &self.catalog
    }

    /// Deterministically rewind the decision stream to its seed.
    pub fn reseed(&mut self) {
        self.rng = TurnRng::from_user_seed(self.seed);
    }

    /// Decisions currently offered for `state`.
    #[must_use]
    pub fn available_decisions(&self, state: &GameState) -> Vec<Decision> {
        available_decisions(&self.catalog, state)
    }

    /// Accept one decision and produce the successor state.
    ///
    /// # Errors
    ///
    /// See [`resolve_transition`].
    pub fn make_decision(
        &mut self,
        state: &GameState,
        decision_id: &str,
    ) -> Result<GameState, EngineError> {
        resolve_transition(state, decision_id, &self.catalog, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsDelta;
    use crate::resolver::{ConsequenceToken, DelayedEffect};
    use crate::rng::SequenceRng;
    use crate::state::{GameStatus, Scenario};

    fn catalog() -> DecisionCatalog {
        DecisionCatalog::default_catalog()
    }

    #[test]
    fn accepted_decision_advances_turn_by_one() {
        let state = GameState::default();
        let mut rng = SequenceRng::new(vec![0.5]);
        let next = resolve_transition(&state, "rest", &catalog(), &mut rng).unwrap();
        assert_eq!(next.turn, state.turn + 1);
        assert_eq!(next.history.len(), 1);
        assert_eq!(state.history.len(), 0, "input state untouched");
    }

    #[test]
    fn unknown_decision_is_a_configuration_error() {
        let state = GameState::default();
        let mut rng = SequenceRng::new(vec![0.5]);
        let err = resolve_transition(&state, "summon-helicopter", &catalog(), &mut rng)
            .expect_err("must reject");
        assert!(matches!(err, EngineError::UnknownDecision { .. }));
    }

    #[test]
    fn ended_game_rejects_decisions_without_drawing() {
        let mut controller = GameController::new(99);
        let mut state = GameState::default();
        state.status = GameStatus::Ended;
        let before = controller.rng.draws();
        let err = controller.make_decision(&state, "rest").expect_err("ended");
        assert!(matches!(err, EngineError::GameEnded));
        assert_eq!(controller.rng.draws(), before);
    }

    #[test]
    fn delayed_effects_fire_on_their_turn() {
        let mut state = GameState::default();
        state.pending_effects.insert(
            1,
            vec![DelayedEffect {
                trigger_turn: 1,
                delta: MetricsDelta {
                    energy: -12.0,
                    ..MetricsDelta::zero()
                },
                token: ConsequenceToken::FoodPoisoning,
            }],
        );
        let mut rng = SequenceRng::new(vec![0.5]);
        let next = resolve_transition(&state, "rest", &catalog(), &mut rng).unwrap();
        let outcome = next.history.last().unwrap();
        assert!(outcome.tokens.contains(&ConsequenceToken::FoodPoisoning));
        assert!(outcome.metrics_change.energy < 18.0 - 12.0 + 1.0);
        assert!(next.pending_effects.get(&1).is_none(), "schedule drained");
    }

    #[test]
    fn scheduled_effects_wait_for_their_turn() {
        let state = GameState::default();
        // Critical-failure forage schedules poisoning for turn + 1.
        let mut rng = SequenceRng::new(vec![0.01]);
        let next = resolve_transition(&state, "forage", &catalog(), &mut rng).unwrap();
        assert!(next.pending_effects.contains_key(&2));
    }

    #[test]
    fn successful_signal_counts_toward_rescue() {
        let state = GameState::default();
        let mut rng = SequenceRng::new(vec![0.6]);
        let next = resolve_transition(&state, "signal-mirror", &catalog(), &mut rng).unwrap();
        assert_eq!(next.successful_signals, 1);
        assert!(next.last_action_succeeded);
    }

    #[test]
    fn exhaustion_ends_the_game_with_a_chain() {
        let mut state = GameState::default();
        state.metrics.energy = 8.0;
        state.metrics.recompute_derived(&state.derived_inputs());
        // Navigation from energy 8 cannot pay its own cost; the net
        // effect lands at the floor and that means death at the <=3 gate.
        let mut rng = SequenceRng::new(vec![0.6]);
        let next = resolve_transition(&state, "navigate", &catalog(), &mut rng).unwrap();
        assert_eq!(next.status, GameStatus::Ended);
        let outcome = next.outcome.as_ref().expect("ended");
        assert_eq!(outcome.kind, OutcomeKind::Died);
        assert_eq!(outcome.reason, crate::state::EndReason::Exhaustion);
        let chain = next.causality.as_ref().expect("chain built");
        assert_eq!(chain.fatal_metric, crate::metrics::MetricId::Energy);
    }

    #[test]
    fn controller_replays_identically_after_reseed() {
        let mut controller = GameController::new(0xBEEF);
        let state = GameState::new(Scenario::forest_autumn(), Vec::new());
        let first = controller.make_decision(&state, "forage").unwrap();
        controller.reseed();
        let second = controller.make_decision(&state, "forage").unwrap();
        assert_eq!(first, second);
    }
}
