use crate::{rng, SplitMix64, StableId};

/// Per-tick clock shared by every decision made during one `advance_tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    pub tick: u64,
    /// In-game hour, `0..24`.
    pub hour: u8,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, start_hour: u8, seed: u64) -> Self {
        Self {
            tick,
            hour: ((start_hour as u64 + tick) % 24) as u8,
            seed,
        }
    }

    pub fn rng_for_actor<A: StableId>(&self, actor: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed ^ rng::mix64(self.tick), actor.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
