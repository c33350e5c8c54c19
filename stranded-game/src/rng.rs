//! Deterministic, draw-counted randomness for decision resolution.
//!
//! Resolution consumes exactly one uniform draw per decision, so replays
//! are reproducible from (seed, decision sequence) alone. The stream seed
//! is derived from the user seed with a domain-separated HMAC so unrelated
//! subsystems can never alias onto the same stream.
use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

const DECISION_STREAM_TAG: &[u8] = b"decision";

/// Source of uniform values in `[0, 1)` injected into the resolver.
pub trait UnitRng {
    /// Draw the next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Seedable, draw-counting RNG stream backing live games.
#[derive(Debug, Clone)]
pub struct TurnRng {
    rng: ChaCha20Rng,
    draws: u64,
}

impl TurnRng {
    /// Construct the decision stream from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, DECISION_STREAM_TAG)),
            draws: 0,
        }
    }

    /// Number of draws performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl UnitRng for TurnRng {
    fn next_unit(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        // 53 mantissa bits give a uniform double in [0, 1).
        let bits = self.rng.next_u64() >> 11;
        #[allow(clippy::cast_precision_loss)]
        let unit = bits as f64 / (1u64 << 53) as f64;
        unit
    }
}

/// Scripted stream for tests: replays a fixed sequence, then repeats the
/// final value.
#[derive(Debug, Clone, Default)]
pub struct SequenceRng {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRng {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl UnitRng for SequenceRng {
    fn next_unit(&mut self) -> f64 {
        let value = self
            .values
            .get(self.cursor)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.5);
        if self.cursor < self.values.len() {
            self.cursor += 1;
        }
        value.clamp(0.0, 0.999_999_9)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}
