//! Scripted decision policies for headless campaign runs.
use clap::ValueEnum;
use stranded_game::{Decision, GameState};

/// How the harness picks among offered decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Shelter, warmth, and signaling first; never march on low energy.
    Cautious,
    /// Pushes navigation and foraging hard.
    Reckless,
    /// Cycles through whatever is offered, exercising the whole catalog.
    RoundRobin,
}

const CAUTIOUS_ORDER: [&str; 14] = [
    "drink-water",
    "eat-rations",
    "rest",
    "build-shelter",
    "start-fire",
    "treat-injury",
    "signal-mirror",
    "signal-fire",
    "improve-shelter",
    "tend-fire",
    "purify-water",
    "scout-area",
    "forage",
    "navigate",
];

const RECKLESS_ORDER: [&str; 14] = [
    "navigate",
    "scout-area",
    "forage",
    "signal-fire",
    "eat-rations",
    "drink-water",
    "start-fire",
    "rest",
    "treat-injury",
    "build-shelter",
    "improve-shelter",
    "tend-fire",
    "purify-water",
    "signal-mirror",
];

impl Policy {
    /// Pick one decision id from the offered list.
    ///
    /// The offer list is never empty for an active game, so this always
    /// returns an id from it.
    pub fn choose(self, offers: &[Decision], state: &GameState) -> String {
        debug_assert!(!offers.is_empty());
        let preference: &[&str] = match self {
            Self::Cautious => &CAUTIOUS_ORDER,
            Self::Reckless => &RECKLESS_ORDER,
            Self::RoundRobin => {
                let idx = (state.turn as usize).saturating_sub(1) % offers.len();
                return offers[idx].id.clone();
            }
        };
        preference
            .iter()
            .find_map(|id| offers.iter().find(|d| d.id == *id))
            .unwrap_or(&offers[0])
            .id
            .clone()
    }
}
