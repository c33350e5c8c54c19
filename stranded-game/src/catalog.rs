//! Decision catalog and the availability filter.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    CRITICAL_BODY_TEMP_GATE, CRITICAL_ENERGY_GATE, CRITICAL_HYDRATION_GATE,
    EXCELLENT_THRESHOLD_DEFAULT, FORAGE_MIN_ENERGY, NAVIGATE_MIN_ENERGY, TEND_FIRE_MIN_QUALITY,
};
use crate::state::GameState;

/// Equipment tags consulted by gating and resolution.
pub const TAG_RATIONS: &str = "rations";
pub const TAG_IGNITION_KIT: &str = "ignition-kit";
pub const TAG_SIGNAL_MIRROR: &str = "signal-mirror";
pub const TAG_FIRST_AID: &str = "first-aid-kit";
pub const TAG_TRAIL_MARKERS: &str = "trail-markers";

/// Broad behavioral family a decision belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionCategory {
    Rest,
    Food,
    Water,
    Forage,
    Shelter,
    Fire,
    Signal,
    Navigation,
    Scout,
    Medical,
}

impl DecisionCategory {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Food => "food",
            Self::Water => "water",
            Self::Forage => "forage",
            Self::Shelter => "shelter",
            Self::Fire => "fire",
            Self::Signal => "signal",
            Self::Navigation => "navigation",
            Self::Scout => "scout",
            Self::Medical => "medical",
        }
    }

    /// Categories whose work keeps the player out of the weather.
    #[must_use]
    pub const fn suppresses_exposure(self) -> bool {
        matches!(self, Self::Rest | Self::Shelter)
    }

    /// Categories that move the player across terrain.
    #[must_use]
    pub const fn is_movement(self) -> bool {
        matches!(self, Self::Navigation | Self::Scout)
    }
}

impl fmt::Display for DecisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn default_excellent_threshold() -> f64 {
    EXCELLENT_THRESHOLD_DEFAULT
}

/// One selectable action: cost/risk/time profile plus its tier gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub text_key: String,
    pub category: DecisionCategory,
    pub base_energy_cost: f32,
    /// 1 (trivial) through 10 (desperate).
    pub risk_level: u8,
    pub time_hours: f32,
    #[serde(default)]
    pub critical_failure_chance: f64,
    #[serde(default)]
    pub failure_chance: f64,
    #[serde(default = "default_excellent_threshold")]
    pub excellent_threshold: f64,
}

impl Decision {
    fn new(
        id: &str,
        category: DecisionCategory,
        base_energy_cost: f32,
        risk_level: u8,
        time_hours: f32,
        critical_failure_chance: f64,
        failure_chance: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            text_key: format!("decision.{id}"),
            category,
            base_energy_cost,
            risk_level,
            time_hours,
            critical_failure_chance,
            failure_chance,
            excellent_threshold: EXCELLENT_THRESHOLD_DEFAULT,
        }
    }
}

/// Ordered set of every decision the engine knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DecisionCatalog {
    decisions: Vec<Decision>,
}

impl DecisionCatalog {
    /// The fixed shipping catalog. Tuning happens here, in reviewed code.
    #[must_use]
    pub fn default_catalog() -> Self {
        use DecisionCategory as C;
        Self {
            decisions: vec![
                Decision::new("rest", C::Rest, 5.0, 1, 3.0, 0.02, 0.10),
                Decision::new("eat-rations", C::Food, 3.0, 1, 1.0, 0.03, 0.08),
                Decision::new("drink-water", C::Water, 2.0, 2, 1.0, 0.05, 0.10),
                Decision::new("purify-water", C::Water, 6.0, 1, 2.0, 0.02, 0.12),
                Decision::new("forage", C::Forage, 12.0, 4, 3.0, 0.0, 0.25),
                Decision::new("build-shelter", C::Shelter, 18.0, 3, 4.0, 0.05, 0.20),
                Decision::new("improve-shelter", C::Shelter, 10.0, 2, 2.0, 0.03, 0.15),
                Decision::new("start-fire", C::Fire, 8.0, 2, 2.0, 0.04, 0.25),
                Decision::new("tend-fire", C::Fire, 4.0, 1, 1.0, 0.02, 0.10),
                Decision::new("signal-mirror", C::Signal, 6.0, 2, 2.0, 0.03, 0.30),
                Decision::new("signal-fire", C::Signal, 10.0, 3, 2.0, 0.05, 0.25),
                Decision::new("navigate", C::Navigation, 20.0, 6, 5.0, 0.10, 0.30),
                Decision::new("scout-area", C::Scout, 10.0, 4, 2.0, 0.06, 0.25),
                Decision::new("treat-injury", C::Medical, 6.0, 2, 1.0, 0.04, 0.20),
            ],
        }
    }

    /// Build a catalog from pre-parsed decisions (platform data loaders).
    #[must_use]
    pub fn from_decisions(decisions: Vec<Decision>) -> Self {
        Self { decisions }
    }

    /// Load a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid decisions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

// Recovery subsets promoted to the front of the offer list when a hard
// threshold is breached. Promotion bypasses the entries' normal gates:
// a starving player is offered foraging precisely because energy is gone.
const ENERGY_RECOVERY: [&str; 3] = ["rest", "eat-rations", "forage"];
const HYDRATION_RECOVERY: [&str; 2] = ["drink-water", "purify-water"];
const WARMTH_RECOVERY: [&str; 3] = ["start-fire", "build-shelter", "improve-shelter"];

fn passes_gate(decision: &Decision, state: &GameState) -> bool {
    let metrics = &state.metrics;
    match decision.id.as_str() {
        "forage" => metrics.energy > FORAGE_MIN_ENERGY,
        "navigate" => metrics.energy > NAVIGATE_MIN_ENERGY,
        "scout-area" => metrics.energy > 15.0,
        "eat-rations" => state.equipment.contains(TAG_RATIONS),
        "build-shelter" => metrics.shelter < 60.0,
        "improve-shelter" => metrics.shelter >= 20.0 && metrics.shelter < 100.0,
        "start-fire" => metrics.fire_quality < 40.0,
        "tend-fire" => metrics.fire_quality >= TEND_FIRE_MIN_QUALITY,
        "signal-fire" => {
            metrics.fire_quality > 10.0 || state.equipment.contains(TAG_IGNITION_KIT)
        }
        "signal-mirror" => {
            state.equipment.contains(TAG_SIGNAL_MIRROR) && !state.time_of_day.is_dark()
        }
        "treat-injury" => metrics.injury_severity > 0.0,
        _ => true,
    }
}

/// Ordered list of decisions currently offered for this state.
///
/// Deterministic: identical state always yields the identical list.
#[must_use]
pub fn available_decisions(catalog: &DecisionCatalog, state: &GameState) -> Vec<Decision> {
    let metrics = &state.metrics;
    let mut promoted_ids: Vec<&str> = Vec::new();
    if metrics.energy < CRITICAL_ENERGY_GATE {
        promoted_ids.extend(ENERGY_RECOVERY);
    }
    if metrics.hydration < CRITICAL_HYDRATION_GATE {
        promoted_ids.extend(HYDRATION_RECOVERY);
    }
    if metrics.body_temperature < CRITICAL_BODY_TEMP_GATE {
        promoted_ids.extend(WARMTH_RECOVERY);
    }

    let mut offered: Vec<Decision> = Vec::with_capacity(catalog.len());
    for id in &promoted_ids {
        if offered.iter().any(|d| d.id == *id) {
            continue;
        }
        if let Some(decision) = catalog.get(id) {
            offered.push(decision.clone());
        }
    }
    for decision in catalog.iter() {
        if offered.iter().any(|d| d.id == decision.id) {
            continue;
        }
        if passes_gate(decision, state) {
            offered.push(decision.clone());
        }
    }
    offered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Scenario;

    fn state() -> GameState {
        GameState::new(Scenario::default(), Vec::new())
    }

    #[test]
    fn catalog_ids_are_unique() {
        let catalog = DecisionCatalog::default_catalog();
        for decision in catalog.iter() {
            assert_eq!(
                catalog.iter().filter(|d| d.id == decision.id).count(),
                1,
                "duplicate id {}",
                decision.id
            );
        }
    }

    #[test]
    fn availability_is_idempotent() {
        let catalog = DecisionCatalog::default_catalog();
        let state = state();
        let first = available_decisions(&catalog, &state);
        let second = available_decisions(&catalog, &state);
        assert_eq!(first, second);
    }

    #[test]
    fn foraging_gated_by_energy() {
        let catalog = DecisionCatalog::default_catalog();
        let mut state = state();
        state.metrics.energy = 22.0;
        assert!(
            available_decisions(&catalog, &state)
                .iter()
                .any(|d| d.id == "forage")
        );
        // Below the gate but above the critical threshold there is a sliver
        // where foraging is simply too demanding to offer.
        state.metrics.energy = 20.0;
        assert!(
            !available_decisions(&catalog, &state)
                .iter()
                .any(|d| d.id == "forage")
        );
    }

    #[test]
    fn critical_energy_promotes_recovery_to_front() {
        let catalog = DecisionCatalog::default_catalog();
        let mut state = state();
        state.metrics.energy = 12.0;
        let offers = available_decisions(&catalog, &state);
        let ids: Vec<&str> = offers.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(&ids[..3], &["rest", "eat-rations", "forage"]);
    }

    #[test]
    fn multiple_breaches_promote_in_fixed_order() {
        let catalog = DecisionCatalog::default_catalog();
        let mut state = state();
        state.metrics.energy = 10.0;
        state.metrics.hydration = 10.0;
        let offers = available_decisions(&catalog, &state);
        let ids: Vec<&str> = offers.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            &ids[..5],
            &["rest", "eat-rations", "forage", "drink-water", "purify-water"]
        );
    }

    #[test]
    fn mirror_signalling_needs_daylight() {
        let catalog = DecisionCatalog::default_catalog();
        let mut state = state();
        state.time_of_day = crate::environment::TimeOfDay::Night;
        assert!(
            !available_decisions(&catalog, &state)
                .iter()
                .any(|d| d.id == "signal-mirror")
        );
    }

    #[test]
    fn treat_injury_offered_only_when_hurt() {
        let catalog = DecisionCatalog::default_catalog();
        let mut state = state();
        assert!(
            !available_decisions(&catalog, &state)
                .iter()
                .any(|d| d.id == "treat-injury")
        );
        state.metrics.injury_severity = 15.0;
        assert!(
            available_decisions(&catalog, &state)
                .iter()
                .any(|d| d.id == "treat-injury")
        );
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = DecisionCatalog::default_catalog();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed = DecisionCatalog::from_json(&json).unwrap();
        assert_eq!(catalog, parsed);
    }
}
