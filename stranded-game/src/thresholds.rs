//! Severity bands and the per-turn threshold crossing tracker.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::{MetricId, PlayerMetrics};

/// Named severity bands, ordered least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Warning,
    Danger,
    Critical,
    Fatal,
}

impl Band {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Critical => "critical",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lookup-only link back to the decision that triggered a crossing.
/// Carries copies of the identifying fields, not an ownership edge into
/// the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRef {
    pub turn: u32,
    pub id: String,
    pub text_key: String,
}

/// Record of one metric crossing into a more severe band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCrossing {
    pub metric: MetricId,
    pub band: Band,
    pub previous: f32,
    pub new_value: f32,
    pub turn: u32,
    pub caused_by: DecisionRef,
}

// Band tables, most severe first. Descending metrics enter a band at or
// below the listed value; ascending metrics at or above it.
const ENERGY_BANDS: [(Band, f32); 4] = [
    (Band::Fatal, 3.0),
    (Band::Critical, 10.0),
    (Band::Danger, 25.0),
    (Band::Warning, 40.0),
];
const HYDRATION_BANDS: [(Band, f32); 4] = [
    (Band::Fatal, 5.0),
    (Band::Critical, 12.0),
    (Band::Danger, 25.0),
    (Band::Warning, 40.0),
];
const MORALE_BANDS: [(Band, f32); 3] = [
    (Band::Critical, 8.0),
    (Band::Danger, 20.0),
    (Band::Warning, 35.0),
];
const SURVIVAL_BANDS: [(Band, f32); 4] = [
    (Band::Fatal, 5.0),
    (Band::Critical, 8.0),
    (Band::Danger, 15.0),
    (Band::Warning, 30.0),
];
const INJURY_BANDS: [(Band, f32); 4] = [
    (Band::Fatal, 90.0),
    (Band::Critical, 75.0),
    (Band::Danger, 55.0),
    (Band::Warning, 30.0),
];
const RISK_BANDS: [(Band, f32); 3] = [
    (Band::Critical, 80.0),
    (Band::Danger, 60.0),
    (Band::Warning, 40.0),
];
// The cold fatal band starts at the domain floor: the vector clamps to
// 32.0, so a pinned reading is the only way the 31.5 gate is reached.
const BODY_TEMP_COLD_BANDS: [(Band, f32); 4] = [
    (Band::Fatal, 32.0),
    (Band::Critical, 33.5),
    (Band::Danger, 35.0),
    (Band::Warning, 36.0),
];
const BODY_TEMP_HOT_BANDS: [(Band, f32); 4] = [
    (Band::Fatal, 41.5),
    (Band::Critical, 40.5),
    (Band::Danger, 39.5),
    (Band::Warning, 38.0),
];

fn descending_severity(bands: &[(Band, f32)], value: f32) -> Option<Band> {
    bands
        .iter()
        .find(|(_, threshold)| value <= *threshold)
        .map(|(band, _)| *band)
}

fn ascending_severity(bands: &[(Band, f32)], value: f32) -> Option<Band> {
    bands
        .iter()
        .find(|(_, threshold)| value >= *threshold)
        .map(|(band, _)| *band)
}

/// The most severe band `value` currently sits in, if any.
///
/// Body temperature checks both the cold and the hot side; shelter, fire,
/// and signal effectiveness carry no bands.
#[must_use]
pub fn severity_for(metric: MetricId, value: f32) -> Option<Band> {
    match metric {
        MetricId::Energy => descending_severity(&ENERGY_BANDS, value),
        MetricId::Hydration => descending_severity(&HYDRATION_BANDS, value),
        MetricId::Morale => descending_severity(&MORALE_BANDS, value),
        MetricId::SurvivalProbability => descending_severity(&SURVIVAL_BANDS, value),
        MetricId::InjurySeverity => ascending_severity(&INJURY_BANDS, value),
        MetricId::CumulativeRisk => ascending_severity(&RISK_BANDS, value),
        MetricId::BodyTemperature => descending_severity(&BODY_TEMP_COLD_BANDS, value)
            .or_else(|| ascending_severity(&BODY_TEMP_HOT_BANDS, value)),
        MetricId::Shelter | MetricId::FireQuality | MetricId::SignalEffectiveness => None,
    }
}

/// Detect whether one metric worsened into a more severe band this turn.
///
/// Dominance rule: a value plunging through several bands at once yields
/// a single crossing at the most severe band reached, never one per
/// intervening band. Recoveries are not recorded.
#[must_use]
pub fn detect_crossing(
    metric: MetricId,
    previous: f32,
    new_value: f32,
    turn: u32,
    caused_by: &DecisionRef,
) -> Option<ThresholdCrossing> {
    let before = severity_for(metric, previous);
    let after = severity_for(metric, new_value)?;
    if before >= Some(after) {
        return None;
    }
    Some(ThresholdCrossing {
        metric,
        band: after,
        previous,
        new_value,
        turn,
        caused_by: caused_by.clone(),
    })
}

/// Run the detector over every metric for one applied delta.
#[must_use]
pub fn detect_crossings(
    previous: &PlayerMetrics,
    next: &PlayerMetrics,
    turn: u32,
    caused_by: &DecisionRef,
) -> Vec<ThresholdCrossing> {
    MetricId::ALL
        .iter()
        .filter_map(|metric| {
            detect_crossing(
                *metric,
                previous.value(*metric),
                next.value(*metric),
                turn,
                caused_by,
            )
        })
        .collect()
}
