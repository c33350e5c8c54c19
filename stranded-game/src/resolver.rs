//! Decision resolution: cost scaling, the success-tier roll, per-tier
//! consequence math, and delayed-effect scheduling.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::catalog::{Decision, DecisionCategory, TAG_FIRST_AID, TAG_IGNITION_KIT, TAG_TRAIL_MARKERS};
use crate::constants::{
    BAD_WATER_DELAY_TURNS, BAD_WATER_ENERGY_DRAIN, BAD_WATER_HYDRATION_DRAIN,
    CONDITION_CEILING, CONDITION_FLOOR, CONDITION_INJURY_PENALTY, CONDITION_LOW_ENERGY_PENALTY,
    CONDITION_LOW_HYDRATION_PENALTY, CONDITION_MID_ENERGY_PENALTY, CONDITION_RESTED_DISCOUNT,
    CONDITION_SEVERE_INJURY_PENALTY, EXPOSURE_COLD_PER_HOUR, EXPOSURE_COOL_PER_HOUR,
    EXPOSURE_FIRE_RELIEF_PER_HOUR, EXPOSURE_FREEZING_PER_HOUR, EXPOSURE_HOT_PER_HOUR,
    EXPOSURE_HOT_TEMP_C, EXPOSURE_SHELTER_DAMPING, EXPOSURE_WETNESS_FACTOR,
    FIRE_RELIEF_QUALITY_GATE, FOOD_POISON_DELAY_TURNS, FOOD_POISON_ENERGY_DRAIN,
    FOOD_POISON_HYDRATION_DRAIN, INJURY_COST_GATE, LOW_ENERGY_COST_GATE, LOW_HYDRATION_COST_GATE,
    MID_ENERGY_COST_GATE, RESTED_ENERGY_GATE, RESTED_HYDRATION_GATE, RESTED_INJURY_GATE,
    RISK_COST_CRITICAL, RISK_COST_EXCELLENT, RISK_COST_FAILURE, RISK_COST_SUCCESS,
    SEVERE_INJURY_COST_GATE, UNTREATED_INJURY_DELAY_TURNS, UNTREATED_INJURY_ENERGY_DRAIN,
    UNTREATED_INJURY_MORALE_DRAIN,
};
use crate::environment::{
    EnvironmentKind, Weather, effective_temperature, environmental_multiplier,
};
use crate::metrics::MetricsDelta;
use crate::rng::UnitRng;
use crate::rules::DecisionQuality;
use crate::state::GameState;

/// Inline-capacity set of consequence tokens for one resolution.
pub type ConsequenceSet = SmallVec<[ConsequenceToken; 4]>;

/// Structured consequence data handed to the narrative collaborator.
/// The engine emits these tokens and nothing more; prose is someone
/// else's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceToken {
    RestRecovered,
    RestDisturbed,
    MealEaten,
    AteSpoiledFood,
    FoodPoisoning,
    WaterDrunk,
    DrankSuspectWater,
    WaterborneIllness,
    PurificationFailed,
    ForageSuccess,
    ForageRich,
    ForageEmpty,
    AtePoisonousPlants,
    ShelterBuilt,
    ShelterImproved,
    ShelterCollapse,
    FireStarted,
    FireStrengthened,
    FireSputtered,
    FireBurn,
    EmbersScattered,
    SignalAttempted,
    SignalWasted,
    NavigationProgress,
    NavigationSetback,
    NavigationInjury,
    ScoutReturned,
    FoundTrailMarkers,
    ScoutMishap,
    InjuryTreated,
    InjuryFestering,
    KitSpoiled,
    WeatherBreaking,
}

impl ConsequenceToken {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::RestRecovered => "consequence.rest.recovered",
            Self::RestDisturbed => "consequence.rest.disturbed",
            Self::MealEaten => "consequence.food.meal",
            Self::AteSpoiledFood => "consequence.food.spoiled",
            Self::FoodPoisoning => "consequence.food.poisoning",
            Self::WaterDrunk => "consequence.water.drunk",
            Self::DrankSuspectWater => "consequence.water.suspect",
            Self::WaterborneIllness => "consequence.water.illness",
            Self::PurificationFailed => "consequence.water.purify-failed",
            Self::ForageSuccess => "consequence.forage.success",
            Self::ForageRich => "consequence.forage.rich",
            Self::ForageEmpty => "consequence.forage.empty",
            Self::AtePoisonousPlants => "consequence.forage.poisonous",
            Self::ShelterBuilt => "consequence.shelter.built",
            Self::ShelterImproved => "consequence.shelter.improved",
            Self::ShelterCollapse => "consequence.shelter.collapse",
            Self::FireStarted => "consequence.fire.started",
            Self::FireStrengthened => "consequence.fire.strengthened",
            Self::FireSputtered => "consequence.fire.sputtered",
            Self::FireBurn => "consequence.fire.burn",
            Self::EmbersScattered => "consequence.fire.embers-scattered",
            Self::SignalAttempted => "consequence.signal.attempted",
            Self::SignalWasted => "consequence.signal.wasted",
            Self::NavigationProgress => "consequence.navigation.progress",
            Self::NavigationSetback => "consequence.navigation.setback",
            Self::NavigationInjury => "consequence.navigation.injury",
            Self::ScoutReturned => "consequence.scout.returned",
            Self::FoundTrailMarkers => "consequence.scout.trail-markers",
            Self::ScoutMishap => "consequence.scout.mishap",
            Self::InjuryTreated => "consequence.medical.treated",
            Self::InjuryFestering => "consequence.medical.festering",
            Self::KitSpoiled => "consequence.medical.kit-spoiled",
            Self::WeatherBreaking => "consequence.weather.breaking",
        }
    }
}

impl fmt::Display for ConsequenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Success tier resolved from the single uniform draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessTier {
    CriticalFailure,
    Failure,
    Success,
    Excellent,
}

impl SuccessTier {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CriticalFailure => "critical_failure",
            Self::Failure => "failure",
            Self::Success => "success",
            Self::Excellent => "excellent",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Excellent)
    }
}

impl fmt::Display for SuccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A consequence deferred to a later turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedEffect {
    pub trigger_turn: u32,
    pub delta: MetricsDelta,
    pub token: ConsequenceToken,
}

/// Everything that came out of resolving one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub decision_id: String,
    pub text_key: String,
    pub category: DecisionCategory,
    pub risk_level: u8,
    pub turn: u32,
    pub tier: SuccessTier,
    pub quality: DecisionQuality,
    pub tokens: ConsequenceSet,
    /// Net delta applied this turn, including any delayed effects that
    /// came due.
    pub metrics_change: MetricsDelta,
    #[serde(default)]
    pub equipment_added: Vec<String>,
    #[serde(default)]
    pub equipment_removed: Vec<String>,
    #[serde(default)]
    pub weather_change: Option<Weather>,
    /// Effects this resolution scheduled for future turns.
    #[serde(default)]
    pub delayed_effects: Vec<DelayedEffect>,
}

/// Per-biome foraging profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForageTable {
    pub poison_risk: f64,
    pub energy_yield: f32,
    pub hydration_yield: f32,
}

/// Fixed yield and poison-risk profile per biome.
#[must_use]
pub const fn forage_table(environment: EnvironmentKind) -> ForageTable {
    match environment {
        EnvironmentKind::Forest => ForageTable {
            poison_risk: 0.08,
            energy_yield: 14.0,
            hydration_yield: 4.0,
        },
        EnvironmentKind::Mountain => ForageTable {
            poison_risk: 0.10,
            energy_yield: 9.0,
            hydration_yield: 3.0,
        },
        EnvironmentKind::Desert => ForageTable {
            poison_risk: 0.15,
            energy_yield: 6.0,
            hydration_yield: 2.0,
        },
        EnvironmentKind::Coastline => ForageTable {
            poison_risk: 0.06,
            energy_yield: 12.0,
            hydration_yield: 6.0,
        },
        EnvironmentKind::Tundra => ForageTable {
            poison_risk: 0.12,
            energy_yield: 7.0,
            hydration_yield: 2.0,
        },
    }
}

/// Readiness multiplier on the energy cost of any action.
///
/// Penalizes a depleted body, discounts a well-rested one, and is
/// clamped to a fixed band so no state makes actions free or impossible.
#[must_use]
pub fn condition_multiplier(state: &GameState) -> f32 {
    let metrics = &state.metrics;
    let mut multiplier = 1.0;
    if metrics.energy < LOW_ENERGY_COST_GATE {
        multiplier += CONDITION_LOW_ENERGY_PENALTY;
    } else if metrics.energy < MID_ENERGY_COST_GATE {
        multiplier += CONDITION_MID_ENERGY_PENALTY;
    }
    if metrics.hydration < LOW_HYDRATION_COST_GATE {
        multiplier += CONDITION_LOW_HYDRATION_PENALTY;
    }
    if metrics.injury_severity >= SEVERE_INJURY_COST_GATE {
        multiplier += CONDITION_SEVERE_INJURY_PENALTY;
    } else if metrics.injury_severity >= INJURY_COST_GATE {
        multiplier += CONDITION_INJURY_PENALTY;
    }
    if metrics.energy >= RESTED_ENERGY_GATE
        && metrics.hydration >= RESTED_HYDRATION_GATE
        && metrics.injury_severity <= RESTED_INJURY_GATE
    {
        multiplier -= CONDITION_RESTED_DISCOUNT;
    }
    multiplier.clamp(CONDITION_FLOOR, CONDITION_CEILING)
}

/// Scaled energy cost of a decision in the current state.
#[must_use]
pub fn scaled_energy_cost(decision: &Decision, state: &GameState) -> f32 {
    let env = environmental_multiplier(
        state.weather,
        state.scenario.temperature_c,
        state.scenario.wind_kmh,
        state.time_of_day,
    );
    decision.base_energy_cost * env * condition_multiplier(state)
}

fn adjusted_chances(decision: &Decision, state: &GameState) -> (f64, f64) {
    let mut crit = decision.critical_failure_chance;
    let mut fail = decision.failure_chance;
    match decision.category {
        DecisionCategory::Forage => {
            crit = forage_table(state.scenario.environment).poison_risk;
        }
        DecisionCategory::Fire => {
            if state.weather.is_wet() {
                fail += 0.15;
            }
            if state.equipment.contains(TAG_IGNITION_KIT) {
                fail = (fail - 0.10).max(0.0);
            }
        }
        DecisionCategory::Signal => {
            if matches!(state.weather, Weather::Fog | Weather::Storm) {
                fail += 0.10;
            }
        }
        DecisionCategory::Navigation => {
            if state.equipment.contains(TAG_TRAIL_MARKERS) {
                fail = (fail - 0.10).max(0.0);
            }
        }
        DecisionCategory::Medical => {
            if state.equipment.contains(TAG_FIRST_AID) {
                crit = (crit - 0.02).max(0.0);
                fail = (fail - 0.05).max(0.0);
            }
        }
        _ => {}
    }
    // The tier ladder must stay ordered: crit < crit+fail <= excellent.
    let crit = crit.clamp(0.0, 0.5);
    let fail_ceiling = (decision.excellent_threshold - crit).max(0.0);
    (crit, fail.clamp(0.0, fail_ceiling))
}

/// Map the single uniform draw onto a success tier.
#[must_use]
pub fn roll_tier(decision: &Decision, state: &GameState, roll: f64) -> SuccessTier {
    let (crit, fail) = adjusted_chances(decision, state);
    if roll < crit {
        SuccessTier::CriticalFailure
    } else if roll < crit + fail {
        SuccessTier::Failure
    } else if roll >= decision.excellent_threshold {
        SuccessTier::Excellent
    } else {
        SuccessTier::Success
    }
}

/// Body-temperature drift from exposure over the hours a decision takes.
///
/// Shelter quality damps the drift; a healthy fire pushes back against
/// the cold. Rest and shelter work keep the player out of the weather
/// entirely, so heat loss (not heat gain) is suppressed for them.
fn exposure_drift(decision: &Decision, state: &GameState) -> f32 {
    let felt = effective_temperature(state.scenario.temperature_c, state.scenario.wind_kmh);
    let mut per_hour = if felt < 0.0 {
        EXPOSURE_FREEZING_PER_HOUR
    } else if felt < 10.0 {
        EXPOSURE_COLD_PER_HOUR
    } else if felt < 20.0 {
        EXPOSURE_COOL_PER_HOUR
    } else if state.scenario.temperature_c >= EXPOSURE_HOT_TEMP_C {
        EXPOSURE_HOT_PER_HOUR
    } else {
        0.0
    };

    if per_hour < 0.0 {
        if decision.category.suppresses_exposure() {
            return 0.0;
        }
        if state.scenario.wetness || state.weather.is_wet() {
            per_hour *= EXPOSURE_WETNESS_FACTOR;
        }
        per_hour *= 1.0 - (state.metrics.shelter / EXPOSURE_SHELTER_DAMPING).clamp(0.0, 0.6);
        let mut drift = per_hour * decision.time_hours;
        if state.metrics.fire_quality >= FIRE_RELIEF_QUALITY_GATE {
            drift += EXPOSURE_FIRE_RELIEF_PER_HOUR * decision.time_hours;
        }
        drift.min(0.0)
    } else {
        per_hour * decision.time_hours
    }
}

/// Ongoing dehydration over the hours a decision takes.
fn metabolic_drain(decision: &Decision, state: &GameState) -> f32 {
    let mut per_hour = 1.0;
    if state.scenario.environment == EnvironmentKind::Desert
        || state.scenario.temperature_c >= EXPOSURE_HOT_TEMP_C
    {
        per_hour *= 1.5;
    }
    -per_hour * decision.time_hours
}

const fn risk_factor(tier: SuccessTier) -> f32 {
    match tier {
        SuccessTier::CriticalFailure => RISK_COST_CRITICAL,
        SuccessTier::Failure => RISK_COST_FAILURE,
        SuccessTier::Success => RISK_COST_SUCCESS,
        SuccessTier::Excellent => RISK_COST_EXCELLENT,
    }
}

struct Resolution {
    delta: MetricsDelta,
    tokens: ConsequenceSet,
    delayed: Vec<DelayedEffect>,
    equipment_added: Vec<String>,
    equipment_removed: Vec<String>,
}

impl Resolution {
    fn new() -> Self {
        Self {
            delta: MetricsDelta::zero(),
            tokens: ConsequenceSet::new(),
            delayed: Vec::new(),
            equipment_added: Vec::new(),
            equipment_removed: Vec::new(),
        }
    }
}

#[allow(clippy::too_many_lines)]
fn tier_resolution(decision: &Decision, tier: SuccessTier, state: &GameState) -> Resolution {
    use ConsequenceToken as T;
    use SuccessTier::{CriticalFailure, Excellent, Failure, Success};

    let mut r = Resolution::new();
    let delta = &mut r.delta;
    match decision.category {
        DecisionCategory::Rest => match tier {
            Success => {
                delta.energy += 18.0;
                delta.morale += 5.0;
                r.tokens.push(T::RestRecovered);
            }
            Excellent => {
                delta.energy += 28.0;
                delta.morale += 8.0;
                r.tokens.push(T::RestRecovered);
            }
            Failure => {
                delta.energy += 8.0;
                delta.morale -= 2.0;
                r.tokens.push(T::RestDisturbed);
            }
            CriticalFailure => {
                delta.energy += 2.0;
                delta.morale -= 6.0;
                delta.injury_severity += 4.0;
                r.tokens.push(T::RestDisturbed);
            }
        },
        DecisionCategory::Food => match tier {
            Success => {
                delta.energy += 15.0;
                delta.morale += 4.0;
                r.tokens.push(T::MealEaten);
            }
            Excellent => {
                delta.energy += 22.0;
                delta.morale += 6.0;
                r.tokens.push(T::MealEaten);
            }
            Failure => {
                delta.energy += 5.0;
                delta.morale -= 2.0;
                r.tokens.push(T::MealEaten);
            }
            CriticalFailure => {
                delta.energy += 4.0;
                r.tokens.push(T::AteSpoiledFood);
                r.delayed.push(DelayedEffect {
                    trigger_turn: state.turn + FOOD_POISON_DELAY_TURNS,
                    delta: MetricsDelta {
                        energy: FOOD_POISON_ENERGY_DRAIN,
                        hydration: FOOD_POISON_HYDRATION_DRAIN,
                        morale: -4.0,
                        ..MetricsDelta::zero()
                    },
                    token: T::FoodPoisoning,
                });
            }
        },
        DecisionCategory::Water => {
            let purifying = decision.id == "purify-water";
            match tier {
                Success => {
                    delta.hydration += if purifying { 25.0 } else { 20.0 };
                    if purifying {
                        delta.morale += 2.0;
                    }
                    r.tokens.push(T::WaterDrunk);
                }
                Excellent => {
                    delta.hydration += if purifying { 35.0 } else { 30.0 };
                    delta.morale += 2.0;
                    r.tokens.push(T::WaterDrunk);
                }
                Failure => {
                    delta.hydration += if purifying { 5.0 } else { 8.0 };
                    if purifying {
                        r.tokens.push(T::PurificationFailed);
                    } else {
                        r.tokens.push(T::WaterDrunk);
                    }
                }
                CriticalFailure => {
                    if purifying {
                        delta.hydration += 2.0;
                        delta.morale -= 4.0;
                        r.tokens.push(T::PurificationFailed);
                    } else {
                        delta.hydration += 10.0;
                        r.tokens.push(T::DrankSuspectWater);
                        r.delayed.push(DelayedEffect {
                            trigger_turn: state.turn + BAD_WATER_DELAY_TURNS,
                            delta: MetricsDelta {
                                hydration: BAD_WATER_HYDRATION_DRAIN,
                                energy: BAD_WATER_ENERGY_DRAIN,
                                morale: -3.0,
                                ..MetricsDelta::zero()
                            },
                            token: T::WaterborneIllness,
                        });
                    }
                }
            }
        }
        DecisionCategory::Forage => {
            let table = forage_table(state.scenario.environment);
            match tier {
                Success => {
                    delta.energy += table.energy_yield;
                    delta.hydration += table.hydration_yield;
                    delta.morale += 3.0;
                    r.tokens.push(T::ForageSuccess);
                }
                Excellent => {
                    delta.energy += table.energy_yield * 1.6;
                    delta.hydration += table.hydration_yield * 1.6;
                    delta.morale += 5.0;
                    r.tokens.push(T::ForageRich);
                    r.equipment_added.push("food-cache".to_string());
                }
                Failure => {
                    delta.morale -= 4.0;
                    r.tokens.push(T::ForageEmpty);
                }
                CriticalFailure => {
                    delta.morale -= 6.0;
                    delta.injury_severity += 6.0;
                    r.tokens.push(T::AtePoisonousPlants);
                    r.delayed.push(DelayedEffect {
                        trigger_turn: state.turn + FOOD_POISON_DELAY_TURNS,
                        delta: MetricsDelta {
                            energy: FOOD_POISON_ENERGY_DRAIN,
                            hydration: -8.0,
                            ..MetricsDelta::zero()
                        },
                        token: T::FoodPoisoning,
                    });
                }
            }
        }
        DecisionCategory::Shelter => {
            let building = decision.id == "build-shelter";
            match tier {
                Success => {
                    delta.shelter += if building { 30.0 } else { 18.0 };
                    delta.morale += if building { 4.0 } else { 2.0 };
                    r.tokens
                        .push(if building { T::ShelterBuilt } else { T::ShelterImproved });
                }
                Excellent => {
                    delta.shelter += if building { 45.0 } else { 28.0 };
                    delta.morale += if building { 6.0 } else { 4.0 };
                    r.tokens
                        .push(if building { T::ShelterBuilt } else { T::ShelterImproved });
                }
                Failure => {
                    delta.shelter += if building { 10.0 } else { 6.0 };
                    delta.morale -= 3.0;
                    r.tokens.push(T::ShelterCollapse);
                }
                CriticalFailure => {
                    delta.shelter += if building { 5.0 } else { -5.0 };
                    delta.injury_severity += if building { 8.0 } else { 5.0 };
                    delta.morale -= 4.0;
                    r.tokens.push(T::ShelterCollapse);
                }
            }
        }
        DecisionCategory::Fire => {
            let starting = decision.id == "start-fire";
            match tier {
                Success => {
                    delta.fire_quality += if starting { 35.0 } else { 15.0 };
                    delta.body_temperature += if starting { 0.4 } else { 0.3 };
                    delta.morale += if starting { 5.0 } else { 1.0 };
                    r.tokens
                        .push(if starting { T::FireStarted } else { T::FireStrengthened });
                }
                Excellent => {
                    delta.fire_quality += if starting { 50.0 } else { 25.0 };
                    delta.body_temperature += if starting { 0.6 } else { 0.4 };
                    delta.morale += if starting { 7.0 } else { 2.0 };
                    r.tokens
                        .push(if starting { T::FireStarted } else { T::FireStrengthened });
                }
                Failure => {
                    delta.fire_quality += if starting { 5.0 } else { 3.0 };
                    delta.morale -= 3.0;
                    r.tokens.push(T::FireSputtered);
                }
                CriticalFailure => {
                    if starting {
                        delta.injury_severity += 5.0;
                        delta.morale -= 5.0;
                        r.tokens.push(T::FireBurn);
                    } else {
                        delta.fire_quality -= 10.0;
                        delta.body_temperature -= 0.1;
                        delta.morale -= 4.0;
                        r.tokens.push(T::EmbersScattered);
                    }
                }
            }
        }
        DecisionCategory::Signal => {
            let fire_signal = decision.id == "signal-fire";
            match tier {
                Success => {
                    delta.morale += if fire_signal { 4.0 } else { 3.0 };
                    if fire_signal {
                        delta.fire_quality -= 5.0;
                    }
                    r.tokens.push(T::SignalAttempted);
                }
                Excellent => {
                    delta.morale += if fire_signal { 7.0 } else { 6.0 };
                    r.tokens.push(T::SignalAttempted);
                }
                Failure => {
                    delta.morale -= 3.0;
                    if fire_signal {
                        delta.fire_quality -= 5.0;
                    }
                    r.tokens.push(T::SignalWasted);
                }
                CriticalFailure => {
                    delta.morale -= 6.0;
                    if fire_signal {
                        delta.fire_quality -= 15.0;
                        delta.injury_severity += 3.0;
                    }
                    r.tokens.push(T::SignalWasted);
                }
            }
        }
        DecisionCategory::Navigation => match tier {
            Success => {
                delta.morale += 4.0;
                r.tokens.push(T::NavigationProgress);
            }
            Excellent => {
                delta.morale += 8.0;
                r.tokens.push(T::NavigationProgress);
            }
            Failure => {
                delta.morale -= 5.0;
                delta.energy -= 5.0;
                r.tokens.push(T::NavigationSetback);
            }
            CriticalFailure => {
                delta.injury_severity += 12.0;
                delta.morale -= 8.0;
                r.tokens.push(T::NavigationInjury);
            }
        },
        DecisionCategory::Scout => match tier {
            Success => {
                delta.morale += 3.0;
                r.tokens.push(T::ScoutReturned);
            }
            Excellent => {
                delta.morale += 5.0;
                r.tokens.push(T::FoundTrailMarkers);
                r.equipment_added.push(TAG_TRAIL_MARKERS.to_string());
            }
            Failure => {
                delta.morale -= 3.0;
                r.tokens.push(T::ScoutReturned);
            }
            CriticalFailure => {
                delta.injury_severity += 8.0;
                delta.morale -= 5.0;
                r.tokens.push(T::ScoutMishap);
            }
        },
        DecisionCategory::Medical => match tier {
            Success => {
                delta.injury_severity -= 20.0;
                delta.morale += 3.0;
                r.tokens.push(T::InjuryTreated);
            }
            Excellent => {
                delta.injury_severity -= 32.0;
                delta.morale += 5.0;
                r.tokens.push(T::InjuryTreated);
            }
            Failure => {
                delta.injury_severity -= 5.0;
                r.tokens.push(T::InjuryTreated);
            }
            CriticalFailure => {
                delta.injury_severity += 5.0;
                delta.morale -= 4.0;
                r.tokens.push(T::KitSpoiled);
                if state.equipment.contains(TAG_FIRST_AID) {
                    r.equipment_removed.push(TAG_FIRST_AID.to_string());
                }
            }
        },
    }
    r
}

/// One step toward clearer skies, for long efforts that pay off.
const fn improved_weather(weather: Weather) -> Option<Weather> {
    match weather {
        Weather::Storm => Some(Weather::Rain),
        Weather::Rain | Weather::Snow | Weather::Fog => Some(Weather::Cloudy),
        Weather::Cloudy => Some(Weather::Clear),
        Weather::Clear => None,
    }
}

/// Resolve one decision against the current state.
///
/// Draws exactly one uniform value from the supplied RNG; everything
/// else is deterministic from (state, decision, draw).
#[must_use]
pub fn resolve<R: UnitRng>(decision: &Decision, state: &GameState, rng: &mut R) -> DecisionOutcome {
    let roll = rng.next_unit();
    let tier = roll_tier(decision, state, roll);
    log::debug!(
        "resolve {} turn {} roll {roll:.3} -> {}",
        decision.id,
        state.turn,
        tier
    );

    let mut resolution = tier_resolution(decision, tier, state);
    resolution.delta.energy -= scaled_energy_cost(decision, state);
    resolution.delta.hydration += metabolic_drain(decision, state);
    resolution.delta.body_temperature += exposure_drift(decision, state);
    resolution.delta.cumulative_risk += f32::from(decision.risk_level) * risk_factor(tier);

    // Any new wound left untreated festers two turns from now.
    if resolution.delta.injury_severity > 0.0 && decision.category != DecisionCategory::Medical {
        resolution.delayed.push(DelayedEffect {
            trigger_turn: state.turn + UNTREATED_INJURY_DELAY_TURNS,
            delta: MetricsDelta {
                energy: UNTREATED_INJURY_ENERGY_DRAIN,
                morale: UNTREATED_INJURY_MORALE_DRAIN,
                ..MetricsDelta::zero()
            },
            token: ConsequenceToken::InjuryFestering,
        });
    }

    let mut weather_change = None;
    if tier == SuccessTier::Excellent
        && decision.time_hours >= 3.0
        && let Some(improved) = improved_weather(state.weather)
    {
        weather_change = Some(improved);
        resolution.tokens.push(ConsequenceToken::WeatherBreaking);
    }

    let quality = crate::rules::classify_decision(decision, state, tier);

    DecisionOutcome {
        decision_id: decision.id.clone(),
        text_key: decision.text_key.clone(),
        category: decision.category,
        risk_level: decision.risk_level,
        turn: state.turn,
        tier,
        quality,
        tokens: resolution.tokens,
        metrics_change: resolution.delta,
        equipment_added: resolution.equipment_added,
        equipment_removed: resolution.equipment_removed,
        weather_change,
        delayed_effects: resolution.delayed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DecisionCatalog;
    use crate::rng::{SequenceRng, TurnRng};
    use crate::state::Scenario;

    fn decision(id: &str) -> Decision {
        DecisionCatalog::default_catalog().get(id).unwrap().clone()
    }

    fn state() -> GameState {
        GameState::new(Scenario::forest_autumn(), Vec::new())
    }

    #[test]
    fn resolution_draws_exactly_once() {
        let mut rng = TurnRng::from_user_seed(11);
        let state = state();
        let _ = resolve(&decision("rest"), &state, &mut rng);
        assert_eq!(rng.draws(), 1);
        let _ = resolve(&decision("navigate"), &state, &mut rng);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn roll_maps_to_tier_ladder() {
        let state = state();
        let navigate = decision("navigate");
        assert_eq!(
            roll_tier(&navigate, &state, 0.05),
            SuccessTier::CriticalFailure
        );
        assert_eq!(roll_tier(&navigate, &state, 0.25), SuccessTier::Failure);
        assert_eq!(roll_tier(&navigate, &state, 0.60), SuccessTier::Success);
        assert_eq!(roll_tier(&navigate, &state, 0.90), SuccessTier::Excellent);
    }

    #[test]
    fn condition_multiplier_penalizes_depletion() {
        let mut depleted = state();
        depleted.metrics.energy = 10.0;
        depleted.metrics.hydration = 20.0;
        depleted.metrics.injury_severity = 80.0;
        assert!((condition_multiplier(&depleted) - 1.8).abs() < f32::EPSILON);

        let mut rested = state();
        rested.metrics.energy = 90.0;
        rested.metrics.hydration = 75.0;
        rested.metrics.injury_severity = 0.0;
        assert!((condition_multiplier(&rested) - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn energy_cost_scales_with_environment() {
        let calm = state();
        let mut stormy = state();
        stormy.weather = Weather::Storm;
        let navigate = decision("navigate");
        assert!(scaled_energy_cost(&navigate, &stormy) > scaled_energy_cost(&navigate, &calm));
    }

    #[test]
    fn forage_poison_schedules_delayed_drain() {
        let state = state();
        let mut rng = SequenceRng::new(vec![0.01]);
        let outcome = resolve(&decision("forage"), &state, &mut rng);
        assert_eq!(outcome.tier, SuccessTier::CriticalFailure);
        assert!(outcome.tokens.contains(&ConsequenceToken::AtePoisonousPlants));
        let poison = outcome
            .delayed_effects
            .iter()
            .find(|e| e.token == ConsequenceToken::FoodPoisoning)
            .expect("poison scheduled");
        assert_eq!(poison.trigger_turn, state.turn + FOOD_POISON_DELAY_TURNS);
    }

    #[test]
    fn forage_poison_risk_is_environment_specific() {
        let forest = state();
        let mut desert_state = GameState::new(Scenario::desert_summer(), Vec::new());
        desert_state.weather = Weather::Clear;
        let forage = decision("forage");
        // A roll between the two poison risks fails critically only in the desert.
        let roll = 0.10;
        assert_ne!(
            roll_tier(&forage, &forest, roll),
            SuccessTier::CriticalFailure
        );
        assert_eq!(
            roll_tier(&forage, &desert_state, roll),
            SuccessTier::CriticalFailure
        );
    }

    #[test]
    fn rest_suppresses_cold_exposure() {
        let mut cold = GameState::new(Scenario::mountain_winter(), Vec::new());
        cold.weather = Weather::Snow;
        let mut rng = SequenceRng::new(vec![0.5]);
        let outcome = resolve(&decision("rest"), &cold, &mut rng);
        // Rest yields no exposure loss; any temperature change is non-negative.
        assert!(outcome.metrics_change.body_temperature >= 0.0);

        let mut rng = SequenceRng::new(vec![0.5]);
        let exposed = resolve(&decision("navigate"), &cold, &mut rng);
        assert!(exposed.metrics_change.body_temperature < 0.0);
    }

    #[test]
    fn untreated_wound_festers_two_turns_later() {
        let state = state();
        let mut rng = SequenceRng::new(vec![0.01]);
        let outcome = resolve(&decision("navigate"), &state, &mut rng);
        assert_eq!(outcome.tier, SuccessTier::CriticalFailure);
        let fester = outcome
            .delayed_effects
            .iter()
            .find(|e| e.token == ConsequenceToken::InjuryFestering)
            .expect("festering scheduled");
        assert_eq!(fester.trigger_turn, state.turn + UNTREATED_INJURY_DELAY_TURNS);
    }

    #[test]
    fn excellent_long_effort_breaks_the_weather() {
        let mut stormy = state();
        stormy.weather = Weather::Storm;
        let mut rng = SequenceRng::new(vec![0.95]);
        let outcome = resolve(&decision("build-shelter"), &stormy, &mut rng);
        assert_eq!(outcome.tier, SuccessTier::Excellent);
        assert_eq!(outcome.weather_change, Some(Weather::Rain));
    }

    #[test]
    fn ignition_kit_lowers_fire_failure() {
        let bare = state();
        let mut equipped = state();
        equipped.equipment.insert(TAG_IGNITION_KIT.to_string());
        let fire = decision("start-fire");
        let roll = 0.20;
        assert_eq!(roll_tier(&fire, &bare, roll), SuccessTier::Failure);
        assert_eq!(roll_tier(&fire, &equipped, roll), SuccessTier::Success);
    }

    #[test]
    fn risk_accrues_more_on_failure_than_success() {
        let state = state();
        let navigate = decision("navigate");
        let mut rng = SequenceRng::new(vec![0.60]);
        let ok = resolve(&navigate, &state, &mut rng);
        let mut rng = SequenceRng::new(vec![0.25]);
        let bad = resolve(&navigate, &state, &mut rng);
        assert!(bad.metrics_change.cumulative_risk > ok.metrics_change.cumulative_risk);
    }
}
