//! Player metric vector, delta application, and derived-field math.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    SIGNAL_BASE, SIGNAL_FIRE_COEFF, SIGNAL_MORALE_COEFF, SURVIVAL_BASE, SURVIVAL_ENERGY_COEFF,
    SURVIVAL_HYDRATION_COEFF, SURVIVAL_INJURY_COEFF, SURVIVAL_MORALE_COEFF, SURVIVAL_RISK_COEFF,
    SURVIVAL_SEVERE_WEATHER_PENALTY, SURVIVAL_TEMP_COEFF, SURVIVAL_TERRAIN_COEFF,
    SURVIVAL_WET_WEATHER_PENALTY,
};
use crate::environment::{TimeOfDay, Weather};
use crate::numbers::finite_sum;

/// Identifier for one tracked metric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Energy,
    Hydration,
    BodyTemperature,
    InjurySeverity,
    Morale,
    Shelter,
    FireQuality,
    SignalEffectiveness,
    SurvivalProbability,
    CumulativeRisk,
}

impl MetricId {
    /// Every tracked metric, in fixed declaration order.
    pub const ALL: [Self; 10] = [
        Self::Energy,
        Self::Hydration,
        Self::BodyTemperature,
        Self::InjurySeverity,
        Self::Morale,
        Self::Shelter,
        Self::FireQuality,
        Self::SignalEffectiveness,
        Self::SurvivalProbability,
        Self::CumulativeRisk,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Hydration => "hydration",
            Self::BodyTemperature => "body_temperature",
            Self::InjurySeverity => "injury_severity",
            Self::Morale => "morale",
            Self::Shelter => "shelter",
            Self::FireQuality => "fire_quality",
            Self::SignalEffectiveness => "signal_effectiveness",
            Self::SurvivalProbability => "survival_probability",
            Self::CumulativeRisk => "cumulative_risk",
        }
    }

    /// Higher readings are worse for these metrics; everything else
    /// degrades downward.
    #[must_use]
    pub const fn ascending_is_worse(self) -> bool {
        matches!(self, Self::InjurySeverity | Self::CumulativeRisk)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fixed, exhaustively enumerated per-metric delta. A zero field is a
/// no-op; there is no "absent" state to mishandle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricsDelta {
    #[serde(default)]
    pub energy: f32,
    #[serde(default)]
    pub hydration: f32,
    #[serde(default)]
    pub body_temperature: f32,
    #[serde(default)]
    pub injury_severity: f32,
    #[serde(default)]
    pub morale: f32,
    #[serde(default)]
    pub shelter: f32,
    #[serde(default)]
    pub fire_quality: f32,
    #[serde(default)]
    pub cumulative_risk: f32,
}

impl MetricsDelta {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            energy: 0.0,
            hydration: 0.0,
            body_temperature: 0.0,
            injury_severity: 0.0,
            morale: 0.0,
            shelter: 0.0,
            fire_quality: 0.0,
            cumulative_risk: 0.0,
        }
    }

    /// Component-wise sum of two deltas.
    #[must_use]
    pub fn combined(&self, other: &Self) -> Self {
        Self {
            energy: self.energy + other.energy,
            hydration: self.hydration + other.hydration,
            body_temperature: self.body_temperature + other.body_temperature,
            injury_severity: self.injury_severity + other.injury_severity,
            morale: self.morale + other.morale,
            shelter: self.shelter + other.shelter,
            fire_quality: self.fire_quality + other.fire_quality,
            cumulative_risk: self.cumulative_risk + other.cumulative_risk,
        }
    }

    /// Delta component addressed to a directly-adjustable metric.
    /// Derived metrics have no delta channel and always read 0.
    #[must_use]
    pub const fn get(&self, metric: MetricId) -> f32 {
        match metric {
            MetricId::Energy => self.energy,
            MetricId::Hydration => self.hydration,
            MetricId::BodyTemperature => self.body_temperature,
            MetricId::InjurySeverity => self.injury_severity,
            MetricId::Morale => self.morale,
            MetricId::Shelter => self.shelter,
            MetricId::FireQuality => self.fire_quality,
            MetricId::CumulativeRisk => self.cumulative_risk,
            MetricId::SignalEffectiveness | MetricId::SurvivalProbability => 0.0,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        MetricId::ALL.iter().all(|m| self.get(*m).abs() < f32::EPSILON)
    }
}

/// Context needed to recompute the derived fields after a delta lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedInputs {
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub terrain_difficulty: u8,
}

/// The complete metric vector. Direct fields are adjusted by deltas;
/// `signal_effectiveness` and `survival_probability` are recomputed from
/// the rest on every update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerMetrics {
    pub energy: f32,
    pub hydration: f32,
    pub body_temperature: f32,
    pub injury_severity: f32,
    pub morale: f32,
    pub shelter: f32,
    pub fire_quality: f32,
    pub signal_effectiveness: f32,
    pub survival_probability: f32,
    pub cumulative_risk: f32,
}

impl Default for PlayerMetrics {
    fn default() -> Self {
        Self {
            energy: 85.0,
            hydration: 80.0,
            body_temperature: 36.8,
            injury_severity: 0.0,
            morale: 60.0,
            shelter: 0.0,
            fire_quality: 0.0,
            signal_effectiveness: 0.0,
            survival_probability: 0.0,
            cumulative_risk: 0.0,
        }
    }
}

impl PlayerMetrics {
    #[must_use]
    pub const fn value(&self, metric: MetricId) -> f32 {
        match metric {
            MetricId::Energy => self.energy,
            MetricId::Hydration => self.hydration,
            MetricId::BodyTemperature => self.body_temperature,
            MetricId::InjurySeverity => self.injury_severity,
            MetricId::Morale => self.morale,
            MetricId::Shelter => self.shelter,
            MetricId::FireQuality => self.fire_quality,
            MetricId::SignalEffectiveness => self.signal_effectiveness,
            MetricId::SurvivalProbability => self.survival_probability,
            MetricId::CumulativeRisk => self.cumulative_risk,
        }
    }

    /// Clamp every direct field to its valid domain.
    pub fn clamp(&mut self) {
        self.energy = self.energy.clamp(0.0, 100.0);
        self.hydration = self.hydration.clamp(0.0, 100.0);
        self.body_temperature = self.body_temperature.clamp(32.0, 42.0);
        self.injury_severity = self.injury_severity.clamp(0.0, 100.0);
        self.morale = self.morale.clamp(0.0, 100.0);
        self.shelter = self.shelter.clamp(0.0, 100.0);
        self.fire_quality = self.fire_quality.clamp(0.0, 100.0);
        self.cumulative_risk = self.cumulative_risk.clamp(0.0, 100.0);
    }

    /// Apply a delta and return the updated vector.
    ///
    /// Each field is summed first and clamped to its domain only after
    /// summation; intermediate terms are never clamped. Derived fields
    /// are then recomputed from the clamped result.
    #[must_use]
    pub fn apply_delta(&self, delta: &MetricsDelta, inputs: &DerivedInputs) -> Self {
        let mut next = Self {
            energy: finite_sum(self.energy, delta.energy),
            hydration: finite_sum(self.hydration, delta.hydration),
            body_temperature: finite_sum(self.body_temperature, delta.body_temperature),
            injury_severity: finite_sum(self.injury_severity, delta.injury_severity),
            morale: finite_sum(self.morale, delta.morale),
            shelter: finite_sum(self.shelter, delta.shelter),
            fire_quality: finite_sum(self.fire_quality, delta.fire_quality),
            cumulative_risk: finite_sum(self.cumulative_risk, delta.cumulative_risk),
            ..*self
        };
        next.clamp();
        next.recompute_derived(inputs);
        next
    }

    /// Recompute `signal_effectiveness` and `survival_probability` in place.
    pub fn recompute_derived(&mut self, inputs: &DerivedInputs) {
        self.signal_effectiveness = signal_effectiveness(self, inputs);
        self.survival_probability = survival_probability(self, inputs);
    }
}

fn signal_weather_adjustment(weather: Weather) -> f32 {
    match weather {
        Weather::Clear => 20.0,
        Weather::Cloudy => 5.0,
        Weather::Rain => -10.0,
        Weather::Snow => -15.0,
        Weather::Fog => -20.0,
        Weather::Storm => -25.0,
    }
}

fn signal_time_adjustment(time: TimeOfDay) -> f32 {
    match time {
        TimeOfDay::Day => 10.0,
        TimeOfDay::Dawn => 0.0,
        TimeOfDay::Dusk => -5.0,
        TimeOfDay::Night => -15.0,
    }
}

fn signal_effectiveness(metrics: &PlayerMetrics, inputs: &DerivedInputs) -> f32 {
    let value = SIGNAL_BASE
        + signal_weather_adjustment(inputs.weather)
        + signal_time_adjustment(inputs.time_of_day)
        + SIGNAL_FIRE_COEFF * metrics.fire_quality
        + SIGNAL_MORALE_COEFF * metrics.morale;
    value.clamp(0.0, 100.0)
}

fn survival_probability(metrics: &PlayerMetrics, inputs: &DerivedInputs) -> f32 {
    let weather_penalty = if inputs.weather.is_severe() {
        SURVIVAL_SEVERE_WEATHER_PENALTY
    } else if inputs.weather.is_wet() || inputs.weather == Weather::Fog {
        SURVIVAL_WET_WEATHER_PENALTY
    } else {
        0.0
    };
    let value = SURVIVAL_BASE
        + SURVIVAL_ENERGY_COEFF * (metrics.energy - 50.0)
        + SURVIVAL_HYDRATION_COEFF * (metrics.hydration - 50.0)
        + SURVIVAL_MORALE_COEFF * (metrics.morale - 50.0)
        - SURVIVAL_TEMP_COEFF * (metrics.body_temperature - 37.0).abs()
        - SURVIVAL_INJURY_COEFF * metrics.injury_severity
        - SURVIVAL_RISK_COEFF * metrics.cumulative_risk
        - weather_penalty
        - SURVIVAL_TERRAIN_COEFF * f32::from(inputs.terrain_difficulty);
    value.clamp(1.0, 99.0)
}
