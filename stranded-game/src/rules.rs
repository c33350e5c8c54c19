//! Weighted survival-rule evaluator: decision quality plus the
//! end-of-game strengths/weaknesses/lessons aggregation.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Decision, DecisionCategory};
use crate::constants::{
    HIGH_RISK_LEVEL, HIGH_RISK_WEAKNESS_COUNT, LOW_ENERGY_TURNS_FOR_REST_LESSON,
    PRINCIPLE_DISCOVERY_SCORE, QUALITY_CRITICAL_SCORE, QUALITY_EXCELLENT_SCORE,
    QUALITY_GOOD_SCORE, SHELTER_STRENGTH_COUNT, SIGNAL_STRENGTH_COUNT,
};
use crate::environment::effective_temperature;
use crate::resolver::SuccessTier;
use crate::state::GameState;

// Assessment tokens ---------------------------------------------------------
pub const ASSESS_STRENGTH_SHELTER: &str = "assessment.strength.shelter-discipline";
pub const ASSESS_STRENGTH_SIGNALING: &str = "assessment.strength.persistent-signaling";
pub const ASSESS_STRENGTH_CAUTION: &str = "assessment.strength.risk-aversion";
pub const ASSESS_WEAKNESS_NO_REST: &str = "assessment.weakness.no-rest";
pub const ASSESS_WEAKNESS_RISK_APPETITE: &str = "assessment.weakness.risk-appetite";
pub const ASSESS_WEAKNESS_NO_SIGNALING: &str = "assessment.weakness.no-signaling";
pub const ASSESS_LESSON_REST_EARLY: &str = "assessment.lesson.rest-early";
pub const ASSESS_LESSON_WEIGH_RISK: &str = "assessment.lesson.weigh-risk";
pub const ASSESS_LESSON_SIGNAL_FIRST: &str = "assessment.lesson.signal-first";

/// Quality tag attached to every resolved decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionQuality {
    Excellent,
    Good,
    Poor,
    CriticalError,
}

impl DecisionQuality {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Poor => "poor",
            Self::CriticalError => "critical_error",
        }
    }
}

impl fmt::Display for DecisionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The fixed rule set, in priority order (1 is most important).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ElementProtection,
    EnergyConservation,
    Signaling,
    RiskMinimization,
    MovementRestraint,
}

impl RuleId {
    pub const ALL: [Self; 5] = [
        Self::ElementProtection,
        Self::EnergyConservation,
        Self::Signaling,
        Self::RiskMinimization,
        Self::MovementRestraint,
    ];

    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::ElementProtection => 1,
            Self::EnergyConservation => 2,
            Self::Signaling => 3,
            Self::RiskMinimization => 4,
            Self::MovementRestraint => 5,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ElementProtection => "element-protection",
            Self::EnergyConservation => "energy-conservation",
            Self::Signaling => "signaling",
            Self::RiskMinimization => "risk-minimization",
            Self::MovementRestraint => "movement-restraint",
        }
    }

    #[must_use]
    pub const fn principle_key(self) -> &'static str {
        match self {
            Self::ElementProtection => "principle.element-protection",
            Self::EnergyConservation => "principle.energy-conservation",
            Self::Signaling => "principle.signaling",
            Self::RiskMinimization => "principle.risk-minimization",
            Self::MovementRestraint => "principle.movement-restraint",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn conditions_are_harsh(state: &GameState) -> bool {
    let felt = effective_temperature(state.scenario.temperature_c, state.scenario.wind_kmh);
    felt < 5.0 || state.weather.is_severe()
}

fn element_protection_score(decision: &Decision, state: &GameState) -> f32 {
    match decision.category {
        DecisionCategory::Shelter | DecisionCategory::Fire => {
            if conditions_are_harsh(state) {
                95.0
            } else {
                80.0
            }
        }
        DecisionCategory::Rest => 60.0,
        _ if decision.category.is_movement() && conditions_are_harsh(state) => 25.0,
        _ if state.metrics.body_temperature < 36.0 => 30.0,
        _ => 55.0,
    }
}

fn energy_conservation_score(decision: &Decision, state: &GameState) -> f32 {
    if decision.category == DecisionCategory::Rest {
        return if state.metrics.energy < 40.0 { 95.0 } else { 70.0 };
    }
    if decision.base_energy_cost <= 6.0 {
        75.0
    } else if decision.base_energy_cost <= 12.0 {
        60.0
    } else if state.metrics.energy < 30.0 {
        10.0
    } else if state.metrics.energy < 50.0 {
        35.0
    } else {
        50.0
    }
}

fn signaling_score(decision: &Decision, state: &GameState) -> f32 {
    match decision.category {
        DecisionCategory::Signal => {
            if state.metrics.signal_effectiveness >= 60.0 {
                95.0
            } else {
                85.0
            }
        }
        DecisionCategory::Fire => 65.0,
        _ if state.successful_signals == 0 && state.turn >= 6 => 35.0,
        _ => 55.0,
    }
}

fn risk_minimization_score(decision: &Decision, state: &GameState) -> f32 {
    if decision.risk_level >= HIGH_RISK_LEVEL && state.metrics.survival_probability < 40.0 {
        return 5.0;
    }
    (100.0 - 10.0 * f32::from(decision.risk_level)).clamp(0.0, 100.0)
}

fn movement_restraint_score(decision: &Decision, state: &GameState) -> f32 {
    if !decision.category.is_movement() {
        return 70.0;
    }
    if state.metrics.injury_severity > 30.0 || state.metrics.energy < 35.0 {
        10.0
    } else if state.scenario.terrain_difficulty >= 7 {
        30.0
    } else {
        50.0
    }
}

/// Score one rule against a prospective decision, in `[0, 100]`.
#[must_use]
pub fn rule_score(rule: RuleId, decision: &Decision, state: &GameState) -> f32 {
    let score = match rule {
        RuleId::ElementProtection => element_protection_score(decision, state),
        RuleId::EnergyConservation => energy_conservation_score(decision, state),
        RuleId::Signaling => signaling_score(decision, state),
        RuleId::RiskMinimization => risk_minimization_score(decision, state),
        RuleId::MovementRestraint => movement_restraint_score(decision, state),
    };
    score.clamp(0.0, 100.0)
}

/// Weighted average over all rules; weight = (max priority + 1) - priority.
#[must_use]
pub fn overall_score(decision: &Decision, state: &GameState) -> f32 {
    let max_priority = RuleId::ALL
        .iter()
        .map(|r| r.priority())
        .max()
        .unwrap_or(1);
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for rule in RuleId::ALL {
        let weight = f32::from(max_priority + 1 - rule.priority());
        weighted += weight * rule_score(rule, decision, state);
        total_weight += weight;
    }
    weighted / total_weight
}

/// Quality tag for a resolved decision. The success tier only forces the
/// floor: a critical failure is always a critical error, but a lucky roll
/// does not redeem a reckless choice.
#[must_use]
pub fn classify_decision(
    decision: &Decision,
    state: &GameState,
    tier: SuccessTier,
) -> DecisionQuality {
    let score = overall_score(decision, state);
    if tier == SuccessTier::CriticalFailure || score < QUALITY_CRITICAL_SCORE {
        DecisionQuality::CriticalError
    } else if score >= QUALITY_EXCELLENT_SCORE {
        DecisionQuality::Excellent
    } else if score >= QUALITY_GOOD_SCORE {
        DecisionQuality::Good
    } else {
        DecisionQuality::Poor
    }
}

/// Rules this decision demonstrated well enough to count as discovered.
#[must_use]
pub fn discovered_principles(decision: &Decision, state: &GameState) -> Vec<&'static str> {
    RuleId::ALL
        .iter()
        .filter(|rule| rule_score(**rule, decision, state) >= PRINCIPLE_DISCOVERY_SCORE)
        .map(|rule| rule.principle_key())
        .collect()
}

/// End-of-game behavioral summary, expressed as token keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SurvivalAssessment {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub lessons: Vec<String>,
}

/// Aggregate the full history into strengths, weaknesses, and lessons.
#[must_use]
pub fn assess_history(state: &GameState) -> SurvivalAssessment {
    let mut shelter_successes: u32 = 0;
    let mut rest_actions: u32 = 0;
    let mut high_risk_actions: u32 = 0;
    for outcome in &state.history {
        if outcome.category == DecisionCategory::Shelter && outcome.tier.is_success() {
            shelter_successes += 1;
        }
        if outcome.category == DecisionCategory::Rest {
            rest_actions += 1;
        }
        if outcome.risk_level >= HIGH_RISK_LEVEL {
            high_risk_actions += 1;
        }
    }

    let mut assessment = SurvivalAssessment::default();
    if shelter_successes >= SHELTER_STRENGTH_COUNT {
        assessment.strengths.push(ASSESS_STRENGTH_SHELTER.to_string());
    }
    if state.successful_signals >= SIGNAL_STRENGTH_COUNT {
        assessment
            .strengths
            .push(ASSESS_STRENGTH_SIGNALING.to_string());
    }
    if high_risk_actions == 0 && state.turn >= 8 {
        assessment.strengths.push(ASSESS_STRENGTH_CAUTION.to_string());
    }

    if rest_actions == 0 && state.low_energy_turns >= LOW_ENERGY_TURNS_FOR_REST_LESSON {
        assessment.weaknesses.push(ASSESS_WEAKNESS_NO_REST.to_string());
        assessment.lessons.push(ASSESS_LESSON_REST_EARLY.to_string());
    }
    if high_risk_actions >= HIGH_RISK_WEAKNESS_COUNT {
        assessment
            .weaknesses
            .push(ASSESS_WEAKNESS_RISK_APPETITE.to_string());
        assessment.lessons.push(ASSESS_LESSON_WEIGH_RISK.to_string());
    }
    if state.successful_signals == 0 && state.turn >= 10 {
        assessment
            .weaknesses
            .push(ASSESS_WEAKNESS_NO_SIGNALING.to_string());
        assessment
            .lessons
            .push(ASSESS_LESSON_SIGNAL_FIRST.to_string());
    }
    assessment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DecisionCatalog;
    use crate::state::Scenario;

    fn decision(id: &str) -> Decision {
        DecisionCatalog::default_catalog().get(id).unwrap().clone()
    }

    fn state() -> GameState {
        GameState::new(Scenario::forest_autumn(), Vec::new())
    }

    #[test]
    fn weights_favor_high_priority_rules() {
        // Element protection carries weight 5, movement restraint 1.
        let max_priority = RuleId::ALL.iter().map(|r| r.priority()).max().unwrap();
        assert_eq!(max_priority + 1 - RuleId::ElementProtection.priority(), 5);
        assert_eq!(max_priority + 1 - RuleId::MovementRestraint.priority(), 1);
    }

    #[test]
    fn shelter_in_a_storm_scores_high() {
        let mut stormy = state();
        stormy.weather = crate::environment::Weather::Storm;
        let score = rule_score(RuleId::ElementProtection, &decision("build-shelter"), &stormy);
        assert!((score - 95.0).abs() < f32::EPSILON);
    }

    #[test]
    fn desperate_navigation_is_a_critical_error() {
        let mut desperate = state();
        desperate.turn = 7;
        desperate.metrics.energy = 18.0;
        desperate.metrics.injury_severity = 45.0;
        desperate.metrics.survival_probability = 25.0;
        let quality = classify_decision(&decision("navigate"), &desperate, SuccessTier::Success);
        assert_eq!(quality, DecisionQuality::CriticalError);
    }

    #[test]
    fn lucky_roll_does_not_redeem_recklessness() {
        let mut desperate = state();
        desperate.turn = 7;
        desperate.metrics.energy = 18.0;
        desperate.metrics.injury_severity = 45.0;
        desperate.metrics.survival_probability = 25.0;
        let excellent_roll =
            classify_decision(&decision("navigate"), &desperate, SuccessTier::Excellent);
        assert_eq!(excellent_roll, DecisionQuality::CriticalError);
    }

    #[test]
    fn critical_failure_forces_critical_error() {
        let quality =
            classify_decision(&decision("rest"), &state(), SuccessTier::CriticalFailure);
        assert_eq!(quality, DecisionQuality::CriticalError);
    }

    #[test]
    fn resting_while_drained_is_good_judgment() {
        let mut drained = state();
        drained.metrics.energy = 25.0;
        let quality = classify_decision(&decision("rest"), &drained, SuccessTier::Success);
        assert!(matches!(
            quality,
            DecisionQuality::Good | DecisionQuality::Excellent
        ));
    }

    #[test]
    fn principles_surface_from_strong_scores() {
        let mut drained = state();
        drained.metrics.energy = 25.0;
        drained.weather = crate::environment::Weather::Snow;
        let principles = discovered_principles(&decision("build-shelter"), &drained);
        assert!(principles.contains(&RuleId::ElementProtection.principle_key()));
    }

    #[test]
    fn assessment_flags_missing_rest() {
        let mut state = state();
        state.turn = 12;
        state.low_energy_turns = 4;
        let assessment = assess_history(&state);
        assert!(assessment.weaknesses.contains(&ASSESS_WEAKNESS_NO_REST.to_string()));
        assert!(assessment.lessons.contains(&ASSESS_LESSON_REST_EARLY.to_string()));
    }

    #[test]
    fn assessment_credits_signal_persistence() {
        let mut state = state();
        state.successful_signals = 2;
        let assessment = assess_history(&state);
        assert!(
            assessment
                .strengths
                .contains(&ASSESS_STRENGTH_SIGNALING.to_string())
        );
    }
}
