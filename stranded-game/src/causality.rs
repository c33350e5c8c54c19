//! Post-hoc causality reconstruction for fatal outcomes.
//!
//! Walks the crossing log and the resolution ledger backwards from a
//! death to name the decision that started the slide, the cascade that
//! followed, and what would have broken the chain.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EngineError;
use crate::constants::{CASCADE_HIGH_MAGNITUDE, CASCADE_MEDIUM_MAGNITUDE};
use crate::metrics::MetricId;
use crate::resolver::DecisionOutcome;
use crate::state::GameState;
use crate::thresholds::{Band, ThresholdCrossing};

/// Severity of one cascade step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepSeverity {
    Low,
    Medium,
    High,
}

impl StepSeverity {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for StepSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The decision a death traces back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    pub turn: u32,
    pub decision_id: String,
    pub text_key: String,
    /// Delta the root decision put on the fatal metric that turn.
    pub immediate_effect: f32,
}

/// One turn in the reconstructed slide toward the fatal threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    pub turn: u32,
    pub decision_id: String,
    pub text_key: String,
    pub metric_delta: f32,
    pub severity: StepSeverity,
}

/// Complete reconstructed explanation of a fatal outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalityChain {
    pub fatal_metric: MetricId,
    pub root_cause: RootCause,
    pub cascade: Vec<CascadeStep>,
    pub fatal_crossing: ThresholdCrossing,
    /// Fixed remediation token keyed by fatal-metric category.
    pub alternative_path: String,
}

/// Static remediation token per fatal-metric category; a fixed lookup,
/// nothing learned.
#[must_use]
pub const fn remediation_key(metric: MetricId) -> &'static str {
    match metric {
        MetricId::Energy => "remediation.energy",
        MetricId::Hydration => "remediation.hydration",
        MetricId::BodyTemperature => "remediation.temperature",
        MetricId::InjurySeverity => "remediation.injury",
        _ => "remediation.attrition",
    }
}

/// Delta a resolved turn put on the fatal metric.
///
/// Survival probability is derived and has no delta channel, so its
/// history is reconstructed from the direct channels with the derived-
/// field coefficients. Best effort only; it feeds analysis, not play.
fn cascade_delta(outcome: &DecisionOutcome, metric: MetricId) -> f32 {
    if metric == MetricId::SurvivalProbability {
        let change = &outcome.metrics_change;
        return 0.3 * change.energy + 0.25 * change.hydration + 0.15 * change.morale
            - 0.6 * change.injury_severity
            - 0.3 * change.cumulative_risk;
    }
    outcome.metrics_change.get(metric)
}

fn adverse_magnitude(outcome: &DecisionOutcome, metric: MetricId) -> f32 {
    let delta = cascade_delta(outcome, metric);
    let adverse = if metric.ascending_is_worse() {
        delta
    } else {
        -delta
    };
    adverse.max(0.0)
}

const fn band_severity(band: Band) -> StepSeverity {
    match band {
        Band::Fatal | Band::Critical => StepSeverity::High,
        Band::Danger => StepSeverity::Medium,
        Band::Warning => StepSeverity::Low,
    }
}

fn magnitude_severity(delta: f32) -> StepSeverity {
    let magnitude = delta.abs();
    if magnitude > CASCADE_HIGH_MAGNITUDE {
        StepSeverity::High
    } else if magnitude > CASCADE_MEDIUM_MAGNITUDE {
        StepSeverity::Medium
    } else {
        StepSeverity::Low
    }
}

fn fatal_crossing(state: &GameState, metric: MetricId) -> Option<ThresholdCrossing> {
    let on_metric = || state.crossings.iter().filter(|c| c.metric == metric);
    on_metric()
        .find(|c| c.band == Band::Fatal)
        .or_else(|| on_metric().max_by_key(|c| (c.band, c.turn)))
        .cloned()
}

fn root_cause(state: &GameState, metric: MetricId) -> Result<RootCause, EngineError> {
    // Earliest danger-or-worse crossing wins; the crossing log is already
    // in ascending turn order.
    if let Some(crossing) = state
        .crossings
        .iter()
        .filter(|c| c.metric == metric && c.band >= Band::Danger)
        .min_by_key(|c| c.turn)
    {
        let immediate_effect = state
            .history
            .iter()
            .find(|o| o.turn == crossing.caused_by.turn)
            .map_or(0.0, |o| cascade_delta(o, metric));
        return Ok(RootCause {
            turn: crossing.caused_by.turn,
            decision_id: crossing.caused_by.id.clone(),
            text_key: crossing.caused_by.text_key.clone(),
            immediate_effect,
        });
    }

    // No recorded crossing: fall back to the single worst single-turn hit.
    state
        .history
        .iter()
        .max_by(|a, b| {
            adverse_magnitude(a, metric)
                .partial_cmp(&adverse_magnitude(b, metric))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .filter(|o| adverse_magnitude(o, metric) > 0.0)
        .map(|o| RootCause {
            turn: o.turn,
            decision_id: o.decision_id.clone(),
            text_key: o.text_key.clone(),
            immediate_effect: cascade_delta(o, metric),
        })
        .ok_or_else(|| EngineError::HistoryReconstruction {
            detail: format!("no adverse history recorded for {metric}"),
        })
}

/// Reconstruct the cause-and-effect chain behind a death on `fatal_metric`.
///
/// # Errors
///
/// Returns `EngineError::HistoryReconstruction` when the ledger is too
/// sparse to attribute the death. Callers degrade to no chain; the game
/// outcome itself is unaffected.
pub fn build_causality_chain(
    state: &GameState,
    fatal_metric: MetricId,
) -> Result<CausalityChain, EngineError> {
    if state.history.is_empty() {
        return Err(EngineError::HistoryReconstruction {
            detail: "empty resolution history".to_string(),
        });
    }
    let fatal_crossing =
        fatal_crossing(state, fatal_metric).ok_or_else(|| EngineError::HistoryReconstruction {
            detail: format!("no crossing recorded for fatal metric {fatal_metric}"),
        })?;
    let root = root_cause(state, fatal_metric)?;

    let cascade = state
        .history
        .iter()
        .filter(|o| o.turn >= root.turn)
        .filter(|o| cascade_delta(o, fatal_metric).abs() > f32::EPSILON)
        .map(|o| {
            let delta = cascade_delta(o, fatal_metric);
            let severity = state
                .crossings
                .iter()
                .find(|c| c.metric == fatal_metric && c.turn == o.turn)
                .map_or_else(|| magnitude_severity(delta), |c| band_severity(c.band));
            CascadeStep {
                turn: o.turn,
                decision_id: o.decision_id.clone(),
                text_key: o.text_key.clone(),
                metric_delta: delta,
                severity,
            }
        })
        .collect();

    Ok(CausalityChain {
        fatal_metric,
        root_cause: root,
        cascade,
        fatal_crossing,
        alternative_path: remediation_key(fatal_metric).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DecisionCategory;
    use crate::metrics::MetricsDelta;
    use crate::resolver::{ConsequenceSet, SuccessTier};
    use crate::rules::DecisionQuality;
    use crate::state::Scenario;
    use crate::thresholds::DecisionRef;

    fn outcome(turn: u32, id: &str, energy: f32) -> DecisionOutcome {
        DecisionOutcome {
            decision_id: id.to_string(),
            text_key: format!("decision.{id}"),
            category: DecisionCategory::Navigation,
            risk_level: 6,
            turn,
            tier: SuccessTier::Failure,
            quality: DecisionQuality::Poor,
            tokens: ConsequenceSet::new(),
            metrics_change: MetricsDelta {
                energy,
                ..MetricsDelta::zero()
            },
            equipment_added: Vec::new(),
            equipment_removed: Vec::new(),
            weather_change: None,
            delayed_effects: Vec::new(),
        }
    }

    fn crossing(turn: u32, band: Band, caused_turn: u32, id: &str) -> ThresholdCrossing {
        ThresholdCrossing {
            metric: MetricId::Energy,
            band,
            previous: 50.0,
            new_value: 20.0,
            turn,
            caused_by: DecisionRef {
                turn: caused_turn,
                id: id.to_string(),
                text_key: format!("decision.{id}"),
            },
        }
    }

    fn state_with(
        history: Vec<DecisionOutcome>,
        crossings: Vec<ThresholdCrossing>,
    ) -> GameState {
        let mut state = GameState::new(Scenario::forest_autumn(), Vec::new());
        state.history = history;
        state.crossings = crossings;
        state
    }

    #[test]
    fn root_cause_is_earliest_danger_crossing() {
        let state = state_with(
            vec![
                outcome(2, "navigate", -20.0),
                outcome(5, "forage", -10.0),
                outcome(7, "navigate", -30.0),
            ],
            vec![
                crossing(2, Band::Danger, 2, "navigate"),
                crossing(7, Band::Fatal, 7, "navigate"),
            ],
        );
        let chain = build_causality_chain(&state, MetricId::Energy).unwrap();
        assert_eq!(chain.root_cause.turn, 2);
        assert_eq!(chain.fatal_crossing.band, Band::Fatal);
        assert_eq!(chain.alternative_path, "remediation.energy");
    }

    #[test]
    fn cascade_spans_root_to_end_with_severities() {
        let state = state_with(
            vec![
                outcome(1, "rest", 10.0),
                outcome(2, "navigate", -20.0),
                outcome(3, "signal-mirror", 0.0),
                outcome(4, "forage", -9.0),
                outcome(5, "navigate", -30.0),
            ],
            vec![
                crossing(2, Band::Danger, 2, "navigate"),
                crossing(5, Band::Fatal, 5, "navigate"),
            ],
        );
        let chain = build_causality_chain(&state, MetricId::Energy).unwrap();
        // Turn 1 precedes the root; turn 3 has no energy delta.
        let turns: Vec<u32> = chain.cascade.iter().map(|s| s.turn).collect();
        assert_eq!(turns, vec![2, 4, 5]);
        assert_eq!(chain.cascade[0].severity, StepSeverity::Medium);
        assert_eq!(chain.cascade[1].severity, StepSeverity::Medium);
        assert_eq!(chain.cascade[2].severity, StepSeverity::High);
    }

    #[test]
    fn fallback_blames_largest_single_hit_without_danger_crossings() {
        // Only a warning-band crossing exists, so root resolution falls
        // back to the largest single-turn adverse delta.
        let state = state_with(
            vec![
                outcome(2, "forage", -8.0),
                outcome(4, "navigate", -35.0),
                outcome(6, "rest", 5.0),
            ],
            vec![crossing(2, Band::Warning, 2, "forage")],
        );
        let chain = build_causality_chain(&state, MetricId::Energy).unwrap();
        assert_eq!(chain.root_cause.turn, 4);
        assert_eq!(chain.root_cause.decision_id, "navigate");
        assert!((chain.root_cause.immediate_effect - -35.0).abs() < f32::EPSILON);
        assert_eq!(chain.fatal_crossing.band, Band::Warning);
    }

    #[test]
    fn sparse_history_degrades_to_error() {
        let state = state_with(Vec::new(), Vec::new());
        assert!(matches!(
            build_causality_chain(&state, MetricId::Energy),
            Err(EngineError::HistoryReconstruction { .. })
        ));
    }
}
