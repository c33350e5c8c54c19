//! Stranded Game Engine
//!
//! Platform-agnostic core logic for the Stranded survival simulation.
//! This crate turns a player-chosen decision into updated metrics,
//! structured consequence data, threshold-crossing records, and an
//! end-of-game determination. Rendering, prose, and persistence formats
//! live with the platform, not here.

pub mod catalog;
pub mod causality;
pub mod constants;
pub mod endings;
pub mod environment;
pub mod metrics;
pub mod numbers;
pub mod resolver;
pub mod rng;
pub mod rules;
pub mod state;
pub mod thresholds;
pub mod turn;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use catalog::{Decision, DecisionCatalog, DecisionCategory, available_decisions};
pub use causality::{CascadeStep, CausalityChain, RootCause, StepSeverity, build_causality_chain};
pub use endings::evaluate_end_condition;
pub use environment::{
    EnvironmentKind, TimeOfDay, Weather, effective_temperature, environmental_multiplier,
};
pub use metrics::{DerivedInputs, MetricId, MetricsDelta, PlayerMetrics};
pub use resolver::{
    ConsequenceSet, ConsequenceToken, DecisionOutcome, DelayedEffect, SuccessTier,
    condition_multiplier, resolve, scaled_energy_cost,
};
pub use rng::{SequenceRng, TurnRng, UnitRng};
pub use rules::{
    DecisionQuality, RuleId, SurvivalAssessment, assess_history, classify_decision, overall_score,
};
pub use state::{
    EndReason, GameOutcome, GameState, GameStatus, OutcomeKind, Scenario,
};
pub use thresholds::{Band, DecisionRef, ThresholdCrossing, detect_crossings, severity_for};
pub use turn::{GameController, resolve_transition};

/// Engine error taxonomy.
///
/// Configuration errors indicate a programming bug and should never
/// surface in a live game; the other variants are recoverable.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Decision/catalog desync. Fatal: the catalog and resolver must
    /// always agree on the set of decision ids.
    #[error("unknown decision id '{id}': catalog and resolver are out of sync")]
    UnknownDecision { id: String },
    /// A decision was submitted after the game ended. Recoverable no-op;
    /// callers should disable input once a game ends.
    #[error("game already ended; no further decisions accepted")]
    GameEnded,
    /// Historical metric reconstruction failed. Non-fatal; auxiliary
    /// analysis degrades to best-effort defaults.
    #[error("history reconstruction failed: {detail}")]
    HistoryReconstruction { detail: String },
}

/// External reference material surfaced alongside a game, when available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReferenceDoc {
    pub title_key: String,
    #[serde(default)]
    pub sections: Vec<String>,
}

/// Trait for abstracting data loading operations.
/// Platform-specific implementations should provide this.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the decision catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<DecisionCatalog, Self::Error>;

    /// Load a named scenario, if the platform ships one under that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario data cannot be loaded or parsed.
    fn load_scenario(&self, name: &str) -> Result<Option<Scenario>, Self::Error>;
}

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// One-time optional load of reference material at game start. Absence
/// must never block gameplay, so the contract is `Option`, not `Result`.
pub trait ReferenceLoader {
    fn load_reference_material(&self) -> Option<ReferenceDoc>;
}

/// Async variant of [`ReferenceLoader`] for platforms that fetch the
/// material over a network boundary. Awaited once before play begins.
#[cfg(feature = "async")]
pub trait AsyncReferenceLoader {
    fn load_reference_material(
        &self,
    ) -> impl std::future::Future<Output = Option<ReferenceDoc>> + Send;
}

/// Main game engine for managing game instances
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Create a new game: a fresh state plus the controller that will
    /// drive it. The scenario falls back to the default when the caller
    /// passes none.
    ///
    /// # Errors
    ///
    /// Returns an error if the decision catalog cannot be loaded.
    pub fn create_game(
        &self,
        seed: u64,
        scenario: Option<Scenario>,
        extra_equipment: Vec<String>,
    ) -> Result<(GameController, GameState), L::Error> {
        let catalog = self.data_loader.load_catalog()?;
        let state = GameState::new(scenario.unwrap_or_default(), extra_equipment);
        Ok((GameController::with_catalog(catalog, seed), state))
    }

    /// Create a new game from a platform-named scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if catalog or scenario data cannot be loaded.
    pub fn create_named_game(
        &self,
        seed: u64,
        scenario_name: &str,
    ) -> Result<(GameController, GameState), L::Error> {
        let scenario = self.data_loader.load_scenario(scenario_name)?;
        self.create_game(seed, scenario, Vec::new())
    }

    /// Save a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded or rehydrated.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameState>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        if let Some(mut game_state) = self.storage.load_game(save_name).map_err(Into::into)? {
            // Rehydrate derived fields against the current math.
            let inputs = game_state.derived_inputs();
            game_state.metrics.recompute_derived(&inputs);
            Ok(Some(game_state))
        } else {
            Ok(None)
        }
    }

    /// Fetch reference material through the supplied loader. Failure or
    /// absence degrades to `None` and never aborts game creation.
    pub fn reference_material<R: ReferenceLoader>(loader: &R) -> Option<ReferenceDoc> {
        loader.load_reference_material()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<DecisionCatalog, Self::Error> {
            Ok(DecisionCatalog::default_catalog())
        }

        fn load_scenario(&self, name: &str) -> Result<Option<Scenario>, Self::Error> {
            Ok(match name {
                "mountain-winter" => Some(Scenario::mountain_winter()),
                _ => None,
            })
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, GameState>>>,
    }

    impl GameStorage for MemoryStorage {
        type Error = Infallible;

        fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(save_name.to_string(), game_state.clone());
            Ok(())
        }

        fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
            Ok(self.saves.borrow().get(save_name).cloned())
        }

        fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(save_name);
            Ok(())
        }
    }

    struct NoReference;

    impl ReferenceLoader for NoReference {
        fn load_reference_material(&self) -> Option<ReferenceDoc> {
            None
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_state() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        let (mut controller, state) = engine.create_game(0xABCD, None, Vec::new()).unwrap();
        let next = controller.make_decision(&state, "rest").unwrap();
        engine.save_game("slot-one", &next).unwrap();

        let loaded = engine.load_game("slot-one").unwrap().expect("save exists");
        assert_eq!(loaded.turn, 2);
        assert!(engine.load_game("missing-slot").unwrap().is_none());
    }

    #[test]
    fn named_scenario_falls_back_to_default() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        let (_, mountain) = engine.create_named_game(7, "mountain-winter").unwrap();
        assert_eq!(mountain.scenario.environment, EnvironmentKind::Mountain);
        let (_, fallback) = engine.create_named_game(7, "moon-base").unwrap();
        assert_eq!(fallback.scenario, Scenario::default());
    }

    #[cfg(feature = "async")]
    mod async_loading {
        use super::*;

        struct FieldGuide;

        impl AsyncReferenceLoader for FieldGuide {
            async fn load_reference_material(&self) -> Option<ReferenceDoc> {
                Some(ReferenceDoc {
                    title_key: "reference.field-guide".to_string(),
                    sections: vec!["reference.field-guide.fire".to_string()],
                })
            }
        }

        #[tokio::test]
        async fn reference_material_awaits_once_before_play() {
            let doc = FieldGuide
                .load_reference_material()
                .await
                .expect("guide available");
            assert_eq!(doc.title_key, "reference.field-guide");
        }
    }

    #[test]
    fn missing_reference_material_never_blocks_creation() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        assert!(GameEngine::<FixtureLoader, MemoryStorage>::reference_material(&NoReference).is_none());
        assert!(engine.create_game(1, None, Vec::new()).is_ok());
    }
}
