//! Environmental model: wind chill and the challenge multiplier.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    COLD_TEMP_C, ENV_COLD_PENALTY, ENV_DARKNESS_PENALTY, ENV_FREEZING_PENALTY,
    ENV_HIGH_WIND_PENALTY, ENV_MODERATE_WIND_PENALTY, ENV_RAIN_PENALTY,
    ENV_SEVERE_WEATHER_PENALTY, HIGH_WIND_KMH, MODERATE_WIND_KMH, WIND_CHILL_FLOOR_COLD,
    WIND_CHILL_FLOOR_COOL, WIND_CHILL_FLOOR_MILD, WIND_CHILL_FLOOR_WARM, WIND_CHILL_PER_LEVEL_C,
    WIND_CHILL_THRESHOLD_KMH,
};

/// Weather conditions that shape every resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Cloudy,
    Fog,
    Rain,
    Storm,
    Snow,
}

impl Weather {
    /// Storm-class weather that drives the heaviest penalties
    #[must_use]
    pub const fn is_severe(self) -> bool {
        matches!(self, Self::Storm | Self::Snow)
    }

    /// Weather that soaks gear and accelerates heat loss
    #[must_use]
    pub const fn is_wet(self) -> bool {
        matches!(self, Self::Rain | Self::Storm | Self::Snow)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Fog => "fog",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snow => "snow",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Weather {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clear" => Ok(Self::Clear),
            "cloudy" => Ok(Self::Cloudy),
            "fog" => Ok(Self::Fog),
            "rain" => Ok(Self::Rain),
            "storm" => Ok(Self::Storm),
            "snow" => Ok(Self::Snow),
            _ => Err(()),
        }
    }
}

/// Day phase; dusk and night penalize visibility-dependent work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Dawn,
    #[default]
    Day,
    Dusk,
    Night,
}

impl TimeOfDay {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Dawn => "dawn",
            Self::Day => "day",
            Self::Dusk => "dusk",
            Self::Night => "night",
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dusk | Self::Night)
    }

    /// Representative clock hour used to anchor elapsed-time math.
    #[must_use]
    pub const fn anchor_hour(self) -> u32 {
        match self {
            Self::Dawn => 6,
            Self::Day => 10,
            Self::Dusk => 18,
            Self::Night => 22,
        }
    }

    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            5..=6 => Self::Dawn,
            7..=17 => Self::Day,
            18..=19 => Self::Dusk,
            _ => Self::Night,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Biome the player is stranded in; drives forage tables and flavor keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    #[default]
    Forest,
    Mountain,
    Desert,
    Coastline,
    Tundra,
}

impl EnvironmentKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Forest => "forest",
            Self::Mountain => "mountain",
            Self::Desert => "desert",
            Self::Coastline => "coastline",
            Self::Tundra => "tundra",
        }
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Felt temperature after wind chill.
///
/// Below the wind threshold the air temperature passes through unchanged.
/// Above it, each full 10 km/h of excess wind subtracts a fixed penalty,
/// floored per temperature band so gusts cannot drive the value into
/// physically absurd territory.
#[must_use]
pub fn effective_temperature(temp_c: f32, wind_kmh: f32) -> f32 {
    let wind = wind_kmh.max(0.0);
    if wind <= WIND_CHILL_THRESHOLD_KMH {
        return temp_c;
    }
    let levels = ((wind - WIND_CHILL_THRESHOLD_KMH) / 10.0).floor() + 1.0;
    let chilled = temp_c - levels * WIND_CHILL_PER_LEVEL_C;
    let floor = if temp_c >= 20.0 {
        WIND_CHILL_FLOOR_WARM
    } else if temp_c >= 10.0 {
        WIND_CHILL_FLOOR_MILD
    } else if temp_c >= 0.0 {
        WIND_CHILL_FLOOR_COOL
    } else {
        WIND_CHILL_FLOOR_COLD
    };
    chilled.max(floor.min(temp_c))
}

/// Challenge multiplier applied to every decision's energy cost.
///
/// Starts at 1.0 and accumulates fixed increments per adverse condition.
/// Pure; identical inputs always produce the identical multiplier.
#[must_use]
pub fn environmental_multiplier(
    weather: Weather,
    temp_c: f32,
    wind_kmh: f32,
    time: TimeOfDay,
) -> f32 {
    let mut multiplier = 1.0;
    if weather.is_severe() {
        multiplier += ENV_SEVERE_WEATHER_PENALTY;
    } else if weather == Weather::Rain {
        multiplier += ENV_RAIN_PENALTY;
    }
    if temp_c < 0.0 {
        multiplier += ENV_FREEZING_PENALTY;
    } else if temp_c < COLD_TEMP_C {
        multiplier += ENV_COLD_PENALTY;
    }
    if wind_kmh > HIGH_WIND_KMH {
        multiplier += ENV_HIGH_WIND_PENALTY;
    } else if wind_kmh > MODERATE_WIND_KMH {
        multiplier += ENV_MODERATE_WIND_PENALTY;
    }
    if time.is_dark() {
        multiplier += ENV_DARKNESS_PENALTY;
    }
    multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calm_wind_leaves_temperature_unchanged() {
        assert!((effective_temperature(5.0, 8.0) - 5.0).abs() < f32::EPSILON);
        assert!((effective_temperature(-3.0, 0.0) - -3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn wind_chill_scales_with_wind_level() {
        let light = effective_temperature(5.0, 12.0);
        let heavy = effective_temperature(5.0, 35.0);
        assert!(light > heavy);
        assert!((light - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn wind_chill_respects_band_floor() {
        // Hurricane-force wind over freezing air still bottoms out at the band floor.
        let felt = effective_temperature(-5.0, 120.0);
        assert!((felt - WIND_CHILL_FLOOR_COLD).abs() < f32::EPSILON);
        // A warm day can never be chilled below its own band floor.
        assert!(effective_temperature(25.0, 200.0) >= WIND_CHILL_FLOOR_WARM);
    }

    #[test]
    fn floor_never_raises_temperature() {
        // Air already below the band floor passes through un-warmed.
        let felt = effective_temperature(-30.0, 50.0);
        assert!(felt <= -30.0);
    }

    #[test]
    fn multiplier_accumulates_adversity() {
        let calm = environmental_multiplier(Weather::Clear, 15.0, 5.0, TimeOfDay::Day);
        assert!((calm - 1.0).abs() < f32::EPSILON);

        let brutal = environmental_multiplier(Weather::Storm, -5.0, 40.0, TimeOfDay::Night);
        assert!((brutal - (1.0 + 0.4 + 0.3 + 0.2 + 0.15)).abs() < 1e-6);
    }

    #[test]
    fn rain_and_cold_are_milder_than_storm_and_freezing() {
        let rain = environmental_multiplier(Weather::Rain, 5.0, 20.0, TimeOfDay::Dusk);
        assert!((rain - (1.0 + 0.2 + 0.2 + 0.1 + 0.15)).abs() < 1e-6);
    }

    #[test]
    fn time_of_day_wraps_from_anchor() {
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Dusk);
        assert_eq!(TimeOfDay::from_hour(26), TimeOfDay::Night);
    }

    #[test]
    fn weather_round_trips_keys() {
        for weather in [
            Weather::Clear,
            Weather::Cloudy,
            Weather::Fog,
            Weather::Rain,
            Weather::Storm,
            Weather::Snow,
        ] {
            assert_eq!(weather.key().parse::<Weather>(), Ok(weather));
        }
    }
}
