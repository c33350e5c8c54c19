//! Centralized balance and tuning constants for Stranded game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Wind chill tuning --------------------------------------------------------
pub(crate) const WIND_CHILL_THRESHOLD_KMH: f32 = 10.0;
pub(crate) const WIND_CHILL_PER_LEVEL_C: f32 = 2.0;
pub(crate) const WIND_CHILL_FLOOR_WARM: f32 = 10.0;
pub(crate) const WIND_CHILL_FLOOR_MILD: f32 = 0.0;
pub(crate) const WIND_CHILL_FLOOR_COOL: f32 = -8.0;
pub(crate) const WIND_CHILL_FLOOR_COLD: f32 = -20.0;

// Environmental multiplier tuning ------------------------------------------
pub(crate) const ENV_SEVERE_WEATHER_PENALTY: f32 = 0.4;
pub(crate) const ENV_RAIN_PENALTY: f32 = 0.2;
pub(crate) const ENV_FREEZING_PENALTY: f32 = 0.3;
pub(crate) const ENV_COLD_PENALTY: f32 = 0.2;
pub(crate) const ENV_HIGH_WIND_PENALTY: f32 = 0.2;
pub(crate) const ENV_MODERATE_WIND_PENALTY: f32 = 0.1;
pub(crate) const ENV_DARKNESS_PENALTY: f32 = 0.15;
pub(crate) const COLD_TEMP_C: f32 = 10.0;
pub(crate) const HIGH_WIND_KMH: f32 = 30.0;
pub(crate) const MODERATE_WIND_KMH: f32 = 15.0;

// Derived metric tuning ----------------------------------------------------
pub(crate) const SIGNAL_BASE: f32 = 30.0;
pub(crate) const SIGNAL_FIRE_COEFF: f32 = 0.25;
pub(crate) const SIGNAL_MORALE_COEFF: f32 = 0.2;
pub(crate) const SURVIVAL_BASE: f32 = 50.0;
pub(crate) const SURVIVAL_ENERGY_COEFF: f32 = 0.3;
pub(crate) const SURVIVAL_HYDRATION_COEFF: f32 = 0.25;
pub(crate) const SURVIVAL_MORALE_COEFF: f32 = 0.15;
pub(crate) const SURVIVAL_TEMP_COEFF: f32 = 8.0;
pub(crate) const SURVIVAL_INJURY_COEFF: f32 = 0.6;
pub(crate) const SURVIVAL_RISK_COEFF: f32 = 0.3;
pub(crate) const SURVIVAL_SEVERE_WEATHER_PENALTY: f32 = 8.0;
pub(crate) const SURVIVAL_WET_WEATHER_PENALTY: f32 = 4.0;
pub(crate) const SURVIVAL_TERRAIN_COEFF: f32 = 0.8;

// Condition multiplier tuning ----------------------------------------------
pub(crate) const CONDITION_FLOOR: f32 = 0.6;
pub(crate) const CONDITION_CEILING: f32 = 1.8;
pub(crate) const CONDITION_LOW_ENERGY_PENALTY: f32 = 0.3;
pub(crate) const CONDITION_MID_ENERGY_PENALTY: f32 = 0.15;
pub(crate) const CONDITION_LOW_HYDRATION_PENALTY: f32 = 0.2;
pub(crate) const CONDITION_INJURY_PENALTY: f32 = 0.25;
pub(crate) const CONDITION_SEVERE_INJURY_PENALTY: f32 = 0.4;
pub(crate) const CONDITION_RESTED_DISCOUNT: f32 = 0.25;
pub(crate) const LOW_ENERGY_COST_GATE: f32 = 20.0;
pub(crate) const MID_ENERGY_COST_GATE: f32 = 40.0;
pub(crate) const LOW_HYDRATION_COST_GATE: f32 = 30.0;
pub(crate) const INJURY_COST_GATE: f32 = 50.0;
pub(crate) const SEVERE_INJURY_COST_GATE: f32 = 75.0;
pub(crate) const RESTED_ENERGY_GATE: f32 = 80.0;
pub(crate) const RESTED_HYDRATION_GATE: f32 = 60.0;
pub(crate) const RESTED_INJURY_GATE: f32 = 10.0;

// Success tier tuning ------------------------------------------------------
pub(crate) const EXCELLENT_THRESHOLD_DEFAULT: f64 = 0.85;
pub(crate) const RISK_COST_CRITICAL: f32 = 1.2;
pub(crate) const RISK_COST_FAILURE: f32 = 0.8;
pub(crate) const RISK_COST_SUCCESS: f32 = 0.4;
pub(crate) const RISK_COST_EXCELLENT: f32 = 0.2;

// Exposure drift tuning ----------------------------------------------------
pub(crate) const EXPOSURE_FREEZING_PER_HOUR: f32 = -0.20;
pub(crate) const EXPOSURE_COLD_PER_HOUR: f32 = -0.12;
pub(crate) const EXPOSURE_COOL_PER_HOUR: f32 = -0.05;
pub(crate) const EXPOSURE_HOT_PER_HOUR: f32 = 0.10;
pub(crate) const EXPOSURE_HOT_TEMP_C: f32 = 32.0;
pub(crate) const EXPOSURE_WETNESS_FACTOR: f32 = 1.5;
pub(crate) const EXPOSURE_SHELTER_DAMPING: f32 = 150.0;
pub(crate) const EXPOSURE_FIRE_RELIEF_PER_HOUR: f32 = 0.04;
pub(crate) const FIRE_RELIEF_QUALITY_GATE: f32 = 25.0;

// Availability gating ------------------------------------------------------
pub(crate) const FORAGE_MIN_ENERGY: f32 = 20.0;
pub(crate) const NAVIGATE_MIN_ENERGY: f32 = 25.0;
pub(crate) const TEND_FIRE_MIN_QUALITY: f32 = 5.0;
pub(crate) const CRITICAL_ENERGY_GATE: f32 = 20.0;
pub(crate) const CRITICAL_HYDRATION_GATE: f32 = 15.0;
pub(crate) const CRITICAL_BODY_TEMP_GATE: f32 = 35.0;

// Delayed effect tuning ----------------------------------------------------
pub(crate) const UNTREATED_INJURY_DELAY_TURNS: u32 = 2;
pub(crate) const UNTREATED_INJURY_ENERGY_DRAIN: f32 = -6.0;
pub(crate) const UNTREATED_INJURY_MORALE_DRAIN: f32 = -3.0;
pub(crate) const FOOD_POISON_DELAY_TURNS: u32 = 1;
pub(crate) const FOOD_POISON_ENERGY_DRAIN: f32 = -12.0;
pub(crate) const FOOD_POISON_HYDRATION_DRAIN: f32 = -10.0;
pub(crate) const BAD_WATER_DELAY_TURNS: u32 = 1;
pub(crate) const BAD_WATER_HYDRATION_DRAIN: f32 = -15.0;
pub(crate) const BAD_WATER_ENERGY_DRAIN: f32 = -8.0;

// Fatal thresholds ---------------------------------------------------------
pub(crate) const FATAL_BODY_TEMP_LOW: f32 = 31.5;
// The metric domain floors at 32.0, inside the fatal band: a reading
// pinned at the floor means the unclamped sum fell through it.
pub(crate) const BODY_TEMP_FLOOR: f32 = 32.0;
pub(crate) const FATAL_BODY_TEMP_HIGH: f32 = 41.5;
pub(crate) const FATAL_ENERGY: f32 = 3.0;
pub(crate) const FATAL_HYDRATION: f32 = 5.0;
pub(crate) const COMBINED_FATAL_ENERGY: f32 = 5.0;
pub(crate) const COMBINED_FATAL_HYDRATION: f32 = 10.0;
pub(crate) const FATAL_INJURY: f32 = 90.0;

// Rescue gates -------------------------------------------------------------
pub(crate) const NAV_ESCAPE_MIN_SUCCESSES: u32 = 3;
pub(crate) const NAV_ESCAPE_MIN_TURN: u32 = 10;
pub(crate) const NAV_ESCAPE_MIN_ENERGY: f32 = 20.0;
pub(crate) const SIGNAL_RESCUE_PRIMARY_SIGNALS: u32 = 2;
pub(crate) const SIGNAL_RESCUE_PRIMARY_EFFECT: f32 = 70.0;
pub(crate) const SIGNAL_RESCUE_PRIMARY_TURN: u32 = 8;
pub(crate) const SIGNAL_RESCUE_LUCKY_SIGNALS: u32 = 1;
pub(crate) const SIGNAL_RESCUE_LUCKY_EFFECT: f32 = 85.0;
pub(crate) const SIGNAL_RESCUE_LUCKY_SURVIVAL: f32 = 60.0;
pub(crate) const SIGNAL_RESCUE_LUCKY_TURN: u32 = 12;
pub(crate) const ENDURANCE_EARLY_TURN: u32 = 15;
pub(crate) const ENDURANCE_EARLY_SURVIVAL: f32 = 55.0;
pub(crate) const ENDURANCE_CLEAN_MAX_INJURY: f32 = 50.0;
pub(crate) const ENDURANCE_CLEAN_MIN_HYDRATION: f32 = 25.0;
pub(crate) const ENDURANCE_LATE_TURN: u32 = 20;
pub(crate) const ENDURANCE_LATE_SURVIVED: f32 = 45.0;
pub(crate) const ENDURANCE_LATE_BARELY: f32 = 20.0;
pub(crate) const COLLAPSE_SURVIVAL_FLOOR: f32 = 5.0;
pub(crate) const COLLAPSE_MIN_TURN: u32 = 5;

// Quality classification ---------------------------------------------------
pub(crate) const QUALITY_EXCELLENT_SCORE: f32 = 75.0;
pub(crate) const QUALITY_GOOD_SCORE: f32 = 50.0;
pub(crate) const QUALITY_CRITICAL_SCORE: f32 = 35.0;
pub(crate) const PRINCIPLE_DISCOVERY_SCORE: f32 = 85.0;

// Assessment aggregation ---------------------------------------------------
pub(crate) const SHELTER_STRENGTH_COUNT: u32 = 3;
pub(crate) const SIGNAL_STRENGTH_COUNT: u32 = 2;
pub(crate) const HIGH_RISK_WEAKNESS_COUNT: u32 = 3;
pub(crate) const HIGH_RISK_LEVEL: u8 = 7;
pub(crate) const LOW_ENERGY_TURNS_FOR_REST_LESSON: u32 = 3;
pub(crate) const LOW_ENERGY_ASSESSMENT_GATE: f32 = 30.0;

// Causality tuning ---------------------------------------------------------
pub(crate) const CASCADE_HIGH_MAGNITUDE: f32 = 15.0;
pub(crate) const CASCADE_MEDIUM_MAGNITUDE: f32 = 8.0;
