use crate::{ActorId, Coord, DeterministicRng};

/// Read-only walkability queries needed by path search.
pub trait GridView {
    fn in_bounds(&self, at: Coord) -> bool;

    fn is_walkable(&self, at: Coord) -> bool;
}

/// Room-level queries the decision engine relies on.
pub trait StationView: GridView {
    fn room_name_of(&self, at: Coord) -> String;

    /// Rooms directly reachable from `room`.
    fn connections(&self, room: &str) -> Vec<String>;

    fn is_access_blocked(&self, room: &str) -> bool;

    /// Representative tile of a named room, used as a travel target.
    fn room_anchor(&self, room: &str) -> Option<Coord>;

    /// Dark or concealed tiles (unlit rooms, vents).
    fn is_low_visibility(&self, at: Coord) -> bool;

    /// Signed modifier applied to an observer's perception pool in `room`.
    fn visibility_modifier(&self, room: &str) -> i32 {
        let _ = room;
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakAttempt {
    pub success: bool,
    pub message: String,
}

/// World mutations requested by actors.
pub trait StationMut: StationView {
    fn attempt_break_block(
        &mut self,
        room: &str,
        actor: ActorId,
        rng: &mut dyn DeterministicRng,
    ) -> BreakAttempt;
}
