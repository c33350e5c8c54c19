//! End-condition state machine: active → ended, first match wins.
use crate::constants::{
    COLLAPSE_MIN_TURN, COLLAPSE_SURVIVAL_FLOOR, COMBINED_FATAL_ENERGY, COMBINED_FATAL_HYDRATION,
    ENDURANCE_CLEAN_MAX_INJURY, ENDURANCE_CLEAN_MIN_HYDRATION, ENDURANCE_EARLY_SURVIVAL,
    ENDURANCE_EARLY_TURN, ENDURANCE_LATE_BARELY, ENDURANCE_LATE_SURVIVED, ENDURANCE_LATE_TURN,
    FATAL_BODY_TEMP_HIGH, FATAL_BODY_TEMP_LOW, FATAL_ENERGY, FATAL_HYDRATION, FATAL_INJURY,
    NAV_ESCAPE_MIN_ENERGY, NAV_ESCAPE_MIN_SUCCESSES, NAV_ESCAPE_MIN_TURN,
    SIGNAL_RESCUE_LUCKY_EFFECT, SIGNAL_RESCUE_LUCKY_SIGNALS, SIGNAL_RESCUE_LUCKY_SURVIVAL,
    SIGNAL_RESCUE_LUCKY_TURN, SIGNAL_RESCUE_PRIMARY_EFFECT, SIGNAL_RESCUE_PRIMARY_SIGNALS,
    SIGNAL_RESCUE_PRIMARY_TURN,
};
use crate::state::{EndReason, GameState, OutcomeKind};

/// Rule 1: fatal metric thresholds, most lethal first.
fn fatal_metrics(state: &GameState) -> Option<EndReason> {
    let metrics = &state.metrics;
    // The domain floor (32.0) sits inside the fatal band; a reading
    // pinned there means the unclamped sum fell through 31.5.
    if metrics.body_temperature <= FATAL_BODY_TEMP_LOW
        || metrics.body_temperature <= crate::constants::BODY_TEMP_FLOOR
    {
        return Some(EndReason::Hypothermia);
    }
    if metrics.body_temperature >= FATAL_BODY_TEMP_HIGH {
        return Some(EndReason::Heatstroke);
    }
    if metrics.energy <= FATAL_ENERGY {
        return Some(EndReason::Exhaustion);
    }
    if metrics.hydration <= FATAL_HYDRATION {
        return Some(EndReason::Dehydration);
    }
    if metrics.energy <= COMBINED_FATAL_ENERGY && metrics.hydration <= COMBINED_FATAL_HYDRATION {
        return Some(EndReason::Collapse);
    }
    if metrics.injury_severity >= FATAL_INJURY {
        return Some(EndReason::InjuryShock);
    }
    None
}

/// Rule 2: the player walked themselves out.
fn navigation_escape(state: &GameState) -> bool {
    state.successful_navigations >= NAV_ESCAPE_MIN_SUCCESSES
        && state.turn >= NAV_ESCAPE_MIN_TURN
        && state.last_action_succeeded
        && state.metrics.energy > NAV_ESCAPE_MIN_ENERGY
}

/// Rule 3: rescuers spotted a signal, via either gate.
fn signal_rescue(state: &GameState) -> bool {
    let metrics = &state.metrics;
    let primary = state.successful_signals >= SIGNAL_RESCUE_PRIMARY_SIGNALS
        && metrics.signal_effectiveness >= SIGNAL_RESCUE_PRIMARY_EFFECT
        && state.turn >= SIGNAL_RESCUE_PRIMARY_TURN;
    let lucky = state.successful_signals >= SIGNAL_RESCUE_LUCKY_SIGNALS
        && metrics.signal_effectiveness >= SIGNAL_RESCUE_LUCKY_EFFECT
        && metrics.survival_probability >= SIGNAL_RESCUE_LUCKY_SURVIVAL
        && state.turn >= SIGNAL_RESCUE_LUCKY_TURN;
    primary || lucky
}

/// Rule 4: turn-gated endurance bands.
fn endurance(state: &GameState) -> Option<(OutcomeKind, EndReason)> {
    let metrics = &state.metrics;
    if state.turn >= ENDURANCE_EARLY_TURN && metrics.survival_probability > ENDURANCE_EARLY_SURVIVAL
    {
        // A searcher finds the camp; whether the player walks out clean
        // depends on the shape they kept themselves in.
        let clean = metrics.injury_severity <= ENDURANCE_CLEAN_MAX_INJURY
            && metrics.hydration >= ENDURANCE_CLEAN_MIN_HYDRATION;
        let kind = if clean {
            OutcomeKind::Survived
        } else {
            OutcomeKind::BarelySurvived
        };
        return Some((kind, EndReason::EnduranceRescue));
    }
    if state.turn >= ENDURANCE_LATE_TURN {
        if metrics.survival_probability >= ENDURANCE_LATE_SURVIVED {
            return Some((OutcomeKind::Survived, EndReason::LateRescue));
        }
        if metrics.survival_probability >= ENDURANCE_LATE_BARELY {
            return Some((OutcomeKind::BarelySurvived, EndReason::LateRescue));
        }
        return Some((OutcomeKind::Died, EndReason::Attrition));
    }
    None
}

/// Classify the state after a metrics update.
///
/// Evaluated in fixed priority order; the first matching rule wins and
/// the numeric gates are contractual balance constants.
#[must_use]
pub fn evaluate_end_condition(state: &GameState) -> Option<(OutcomeKind, EndReason)> {
    if let Some(reason) = fatal_metrics(state) {
        return Some((OutcomeKind::Died, reason));
    }
    if navigation_escape(state) {
        return Some((OutcomeKind::Survived, EndReason::NavigatedOut));
    }
    if signal_rescue(state) {
        return Some((OutcomeKind::Survived, EndReason::SignalRescue));
    }
    if let Some(ended) = endurance(state) {
        return Some(ended);
    }
    if state.metrics.survival_probability < COLLAPSE_SURVIVAL_FLOOR && state.turn > COLLAPSE_MIN_TURN
    {
        return Some((OutcomeKind::Died, EndReason::Attrition));
    }
    None
}
