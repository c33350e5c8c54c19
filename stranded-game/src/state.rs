//! Immutable per-game context and the evolving game state.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::causality::CausalityChain;
use crate::environment::{EnvironmentKind, TimeOfDay, Weather};
use crate::metrics::{DerivedInputs, MetricId, PlayerMetrics};
use crate::resolver::{DecisionOutcome, DelayedEffect};
use crate::rules::SurvivalAssessment;
use crate::thresholds::ThresholdCrossing;

/// Immutable setup for one game: where, when, and how bad it is outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub environment: EnvironmentKind,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub temperature_c: f32,
    pub wind_kmh: f32,
    /// 1 (gentle) through 10 (hostile).
    pub terrain_difficulty: u8,
    #[serde(default)]
    pub wetness: bool,
    /// Token describing the player's state at the moment of stranding.
    pub condition_key: String,
    #[serde(default)]
    pub initial_injury: f32,
    #[serde(default)]
    pub starting_equipment: Vec<String>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::forest_autumn()
    }
}

impl Scenario {
    /// Temperate forest after a wrong turn on a day hike.
    #[must_use]
    pub fn forest_autumn() -> Self {
        Self {
            environment: EnvironmentKind::Forest,
            weather: Weather::Clear,
            time_of_day: TimeOfDay::Day,
            temperature_c: 12.0,
            wind_kmh: 8.0,
            terrain_difficulty: 4,
            wetness: false,
            condition_key: "condition.shaken-but-unhurt".to_string(),
            initial_injury: 0.0,
            starting_equipment: vec![
                crate::catalog::TAG_RATIONS.to_string(),
                crate::catalog::TAG_FIRST_AID.to_string(),
                crate::catalog::TAG_SIGNAL_MIRROR.to_string(),
            ],
        }
    }

    /// High-country blizzard aftermath; the hardest shipped scenario.
    #[must_use]
    pub fn mountain_winter() -> Self {
        Self {
            environment: EnvironmentKind::Mountain,
            weather: Weather::Snow,
            time_of_day: TimeOfDay::Dusk,
            temperature_c: -8.0,
            wind_kmh: 35.0,
            terrain_difficulty: 8,
            wetness: true,
            condition_key: "condition.sprained-ankle".to_string(),
            initial_injury: 20.0,
            starting_equipment: vec![
                crate::catalog::TAG_RATIONS.to_string(),
                crate::catalog::TAG_IGNITION_KIT.to_string(),
            ],
        }
    }

    /// Exposed desert wash after a vehicle failure.
    #[must_use]
    pub fn desert_summer() -> Self {
        Self {
            environment: EnvironmentKind::Desert,
            weather: Weather::Clear,
            time_of_day: TimeOfDay::Day,
            temperature_c: 38.0,
            wind_kmh: 12.0,
            terrain_difficulty: 6,
            wetness: false,
            condition_key: "condition.sunstruck".to_string(),
            initial_injury: 5.0,
            starting_equipment: vec![
                crate::catalog::TAG_RATIONS.to_string(),
                crate::catalog::TAG_SIGNAL_MIRROR.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Active,
    Ended,
}

/// Terminal classification once a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Survived,
    BarelySurvived,
    Died,
}

impl OutcomeKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Survived => "survived",
            Self::BarelySurvived => "barely_survived",
            Self::Died => "died",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why the game ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Hypothermia,
    Heatstroke,
    Exhaustion,
    Dehydration,
    Collapse,
    InjuryShock,
    NavigatedOut,
    SignalRescue,
    EnduranceRescue,
    LateRescue,
    Attrition,
}

impl EndReason {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hypothermia => "hypothermia",
            Self::Heatstroke => "heatstroke",
            Self::Exhaustion => "exhaustion",
            Self::Dehydration => "dehydration",
            Self::Collapse => "collapse",
            Self::InjuryShock => "injury_shock",
            Self::NavigatedOut => "navigated_out",
            Self::SignalRescue => "signal_rescue",
            Self::EnduranceRescue => "endurance_rescue",
            Self::LateRescue => "late_rescue",
            Self::Attrition => "attrition",
        }
    }

    /// The metric whose collapse this reason pins the death on, for
    /// causality reconstruction. Rescue reasons have none.
    #[must_use]
    pub const fn fatal_metric(self) -> Option<MetricId> {
        match self {
            Self::Hypothermia | Self::Heatstroke => Some(MetricId::BodyTemperature),
            Self::Exhaustion | Self::Collapse => Some(MetricId::Energy),
            Self::Dehydration => Some(MetricId::Hydration),
            Self::InjuryShock => Some(MetricId::InjurySeverity),
            Self::Attrition => Some(MetricId::SurvivalProbability),
            Self::NavigatedOut
            | Self::SignalRescue
            | Self::EnduranceRescue
            | Self::LateRescue => None,
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Final record attached to an ended game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub kind: OutcomeKind,
    pub reason: EndReason,
    pub turn: u32,
    pub assessment: SurvivalAssessment,
}

/// Complete state of one game. Produced fresh by every accepted
/// transition; never mutated in place by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub scenario: Scenario,
    /// Current weather; starts from the scenario, shifts via outcomes.
    pub weather: Weather,
    pub metrics: PlayerMetrics,
    #[serde(default)]
    pub equipment: HashSet<String>,
    /// Starts at 1 and increases by exactly one per accepted decision.
    pub turn: u32,
    #[serde(default)]
    pub elapsed_hours: f32,
    pub time_of_day: TimeOfDay,
    /// Append-only resolution ledger.
    #[serde(default)]
    pub history: Vec<DecisionOutcome>,
    /// Delayed effects indexed by the turn they fire on.
    #[serde(default)]
    pub pending_effects: BTreeMap<u32, Vec<DelayedEffect>>,
    /// Append-only threshold crossing log, non-decreasing in turn.
    #[serde(default)]
    pub crossings: Vec<ThresholdCrossing>,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub outcome: Option<GameOutcome>,
    #[serde(default)]
    pub causality: Option<CausalityChain>,
    /// Survival principles the player has demonstrated so far. Explicit
    /// state, threaded through every transition.
    #[serde(default)]
    pub principles: HashSet<String>,
    #[serde(default)]
    pub successful_signals: u32,
    #[serde(default)]
    pub successful_navigations: u32,
    #[serde(default)]
    pub last_action_succeeded: bool,
    /// Turns that ended with energy under the assessment gate.
    #[serde(default)]
    pub low_energy_turns: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Scenario::default(), Vec::new())
    }
}

impl GameState {
    /// Start a fresh game from a scenario plus optional extra equipment.
    #[must_use]
    pub fn new(scenario: Scenario, extra_equipment: Vec<String>) -> Self {
        let mut equipment: HashSet<String> = scenario.starting_equipment.iter().cloned().collect();
        equipment.extend(extra_equipment);
        let mut metrics = PlayerMetrics {
            injury_severity: scenario.initial_injury.clamp(0.0, 100.0),
            ..PlayerMetrics::default()
        };
        let weather = scenario.weather;
        let time_of_day = scenario.time_of_day;
        metrics.recompute_derived(&DerivedInputs {
            weather,
            time_of_day,
            terrain_difficulty: scenario.terrain_difficulty,
        });
        Self {
            scenario,
            weather,
            metrics,
            equipment,
            turn: 1,
            elapsed_hours: 0.0,
            time_of_day,
            history: Vec::new(),
            pending_effects: BTreeMap::new(),
            crossings: Vec::new(),
            status: GameStatus::Active,
            outcome: None,
            causality: None,
            principles: HashSet::new(),
            successful_signals: 0,
            successful_navigations: 0,
            last_action_succeeded: false,
            low_energy_turns: 0,
        }
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self.status, GameStatus::Ended)
    }

    /// Context for derived-metric recomputation at this moment.
    #[must_use]
    pub const fn derived_inputs(&self) -> DerivedInputs {
        DerivedInputs {
            weather: self.weather,
            time_of_day: self.time_of_day,
            terrain_difficulty: self.scenario.terrain_difficulty,
        }
    }

    /// Advance elapsed time and recompute the day phase.
    pub fn advance_time(&mut self, hours: f32) {
        self.elapsed_hours += hours.max(0.0);
        let offset = crate::numbers::round_f32_to_i32(self.elapsed_hours).max(0);
        let hour = self.scenario.time_of_day.anchor_hour() + u32::try_from(offset).unwrap_or(0);
        self.time_of_day = TimeOfDay::from_hour(hour);
    }

    /// Set the terminal record; the first ending wins and later
    /// evaluations can never overwrite it.
    pub(crate) fn set_outcome(&mut self, outcome: GameOutcome) {
        if self.outcome.is_none() {
            self.status = GameStatus::Ended;
            self.outcome = Some(outcome);
        }
    }
}
