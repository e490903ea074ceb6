use core::fmt::{self, Debug};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for anything that needs a deterministic seed or sort key.
///
/// Deterministic simulation requires:
/// - stable ordering (`Ord`)
/// - a stable numeric ID (`stable_id`) for seeding and logs
pub trait StableId: Copy + Ord + Eq + Debug {
    fn stable_id(self) -> u64;
}

impl StableId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl StableId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

/// Identity of a simulated actor. Rosters iterate in ascending id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorId(pub u32);

impl StableId for ActorId {
    fn stable_id(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
