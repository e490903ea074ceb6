use std::collections::{BTreeMap, BTreeSet};

use npc_core::{ActorId, BreakAttempt, Coord, DeterministicRng, GridView, StationMut, StationView};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Barricades take this many hits to break and can be reinforced up to it.
pub const BARRICADE_MAX_STRENGTH: u8 = 3;

/// Largest width or height a station may have.
pub const MAX_STATION_SIDE: u32 = 1024;

/// Inclusive rectangle of tiles with a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoomRect {
    pub name: String,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RoomRect {
    pub fn new(name: impl Into<String>, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            name: name.into(),
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.x >= self.x1 && at.x <= self.x2 && at.y >= self.y1 && at.y <= self.y2
    }

    /// Top-left tile; the travel target for schedules and searches.
    pub fn anchor(&self) -> Coord {
        Coord::new(self.x1, self.y1)
    }
}

/// Plain-data description of a station, suitable for scenario files.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationLayout {
    pub width: i32,
    pub height: i32,
    pub rooms: Vec<RoomRect>,
    pub connections: Vec<(String, String)>,
    pub walls: Vec<Coord>,
    pub vents: Vec<Coord>,
    pub dark_rooms: Vec<String>,
    /// Room name and barricade strength.
    pub barricades: Vec<(String, u8)>,
    /// Probability that one break attempt lands a hit.
    pub break_chance: f32,
}

impl Default for StationLayout {
    fn default() -> Self {
        StationGrid::outpost().layout()
    }
}

#[derive(Debug, Clone)]
pub struct StationGrid {
    width: i32,
    height: i32,
    rooms: Vec<RoomRect>,
    connections: BTreeMap<String, BTreeSet<String>>,
    walls: Vec<bool>,
    vents: BTreeSet<Coord>,
    dark_rooms: BTreeSet<String>,
    barricades: BTreeMap<String, u8>,
    break_chance: f32,
}

impl StationGrid {
    /// Open grid with no rooms; every tile is corridor. Sides are clamped to
    /// `1..=MAX_STATION_SIDE`.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.clamp(1, MAX_STATION_SIDE);
        let height = height.clamp(1, MAX_STATION_SIDE);
        let tiles = (width as usize).saturating_mul(height as usize);
        Self {
            width: width as i32,
            height: height as i32,
            rooms: Vec::new(),
            connections: BTreeMap::new(),
            walls: vec![false; tiles],
            vents: BTreeSet::new(),
            dark_rooms: BTreeSet::new(),
            barricades: BTreeMap::new(),
            break_chance: 0.5,
        }
    }

    /// The 20x20 research outpost: ten rooms joined through the Rec Room hub.
    pub fn outpost() -> Self {
        let mut grid = Self::new(20, 20);
        for room in [
            RoomRect::new("Rec Room", 5, 5, 10, 10),
            RoomRect::new("Infirmary", 0, 0, 4, 4),
            RoomRect::new("Generator", 15, 15, 19, 19),
            RoomRect::new("Kennel", 0, 15, 4, 19),
            RoomRect::new("Radio Room", 11, 0, 14, 4),
            RoomRect::new("Storage", 15, 0, 19, 4),
            RoomRect::new("Lab", 11, 11, 14, 14),
            RoomRect::new("Sleeping Quarters", 0, 6, 4, 10),
            RoomRect::new("Mess Hall", 5, 0, 9, 4),
            RoomRect::new("Hangar", 5, 15, 10, 19),
        ] {
            grid.add_room(room);
        }
        for (a, b) in [
            ("Rec Room", "Mess Hall"),
            ("Rec Room", "Sleeping Quarters"),
            ("Rec Room", "Lab"),
            ("Rec Room", "Hangar"),
            ("Rec Room", "Radio Room"),
            ("Mess Hall", "Infirmary"),
            ("Mess Hall", "Radio Room"),
            ("Radio Room", "Storage"),
            ("Sleeping Quarters", "Infirmary"),
            ("Hangar", "Kennel"),
            ("Hangar", "Generator"),
            ("Lab", "Generator"),
        ] {
            grid.connect(a, b);
        }
        grid.add_vent(Coord::new(12, 7));
        grid.add_vent(Coord::new(3, 12));
        grid.add_vent(Coord::new(17, 9));
        grid
    }

    pub fn from_layout(layout: &StationLayout) -> Self {
        let side = |n: i32| u32::try_from(n).unwrap_or(0);
        let mut grid = Self::new(side(layout.width), side(layout.height));
        for room in &layout.rooms {
            grid.add_room(room.clone());
        }
        for (a, b) in &layout.connections {
            grid.connect(a, b);
        }
        for wall in &layout.walls {
            grid.set_wall(*wall, true);
        }
        for vent in &layout.vents {
            grid.add_vent(*vent);
        }
        for room in &layout.dark_rooms {
            grid.set_dark(room, true);
        }
        for (room, strength) in &layout.barricades {
            grid.barricades
                .insert(room.clone(), (*strength).clamp(1, BARRICADE_MAX_STRENGTH));
        }
        grid.break_chance = layout.break_chance.clamp(0.0, 1.0);
        grid
    }

    pub fn layout(&self) -> StationLayout {
        let mut connections = Vec::new();
        for (a, others) in &self.connections {
            for b in others {
                if a < b {
                    connections.push((a.clone(), b.clone()));
                }
            }
        }
        let walls = (0..self.walls.len())
            .filter(|idx| self.walls[*idx])
            .map(|idx| self.coord_from_idx(idx))
            .collect();
        StationLayout {
            width: self.width,
            height: self.height,
            rooms: self.rooms.clone(),
            connections,
            walls,
            vents: self.vents.iter().copied().collect(),
            dark_rooms: self.dark_rooms.iter().cloned().collect(),
            barricades: self
                .barricades
                .iter()
                .map(|(room, strength)| (room.clone(), *strength))
                .collect(),
            break_chance: self.break_chance,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rooms(&self) -> &[RoomRect] {
        &self.rooms
    }

    pub fn room(&self, name: &str) -> Option<&RoomRect> {
        self.rooms.iter().find(|room| room.name == name)
    }

    /// First declared room containing `at`.
    pub fn room_at(&self, at: Coord) -> Option<&RoomRect> {
        self.rooms.iter().find(|room| room.contains(at))
    }

    pub fn add_room(&mut self, room: RoomRect) {
        self.rooms.push(room);
    }

    pub fn connect(&mut self, a: &str, b: &str) {
        self.connections
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.connections
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    pub fn set_wall(&mut self, at: Coord, wall: bool) {
        if let Some(idx) = self.idx(at) {
            self.walls[idx] = wall;
        }
    }

    pub fn add_vent(&mut self, at: Coord) {
        if self.in_bounds(at) {
            self.vents.insert(at);
        }
    }

    pub fn is_vent(&self, at: Coord) -> bool {
        self.vents.contains(&at)
    }

    pub fn set_dark(&mut self, room: &str, dark: bool) {
        if dark {
            self.dark_rooms.insert(room.to_string());
        } else {
            self.dark_rooms.remove(room);
        }
    }

    pub fn is_dark(&self, room: &str) -> bool {
        self.dark_rooms.contains(room)
    }

    /// Builds or reinforces a barricade and darkens the room. Returns the new strength.
    pub fn barricade(&mut self, room: &str) -> u8 {
        self.set_dark(room, true);
        let strength = self.barricades.entry(room.to_string()).or_insert(0);
        *strength = (*strength + 1).min(BARRICADE_MAX_STRENGTH);
        *strength
    }

    pub fn clear_barricade(&mut self, room: &str) {
        self.barricades.remove(room);
    }

    pub fn barricade_strength(&self, room: &str) -> u8 {
        self.barricades.get(room).copied().unwrap_or(0)
    }

    pub fn set_break_chance(&mut self, chance: f32) {
        self.break_chance = chance.clamp(0.0, 1.0);
    }

    fn idx(&self, at: Coord) -> Option<usize> {
        if !self.in_bounds(at) {
            return None;
        }
        Some((at.y * self.width + at.x) as usize)
    }

    fn coord_from_idx(&self, idx: usize) -> Coord {
        let idx = idx as i32;
        Coord::new(idx % self.width, idx / self.width)
    }
}

impl GridView for StationGrid {
    fn in_bounds(&self, at: Coord) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height
    }

    /// Walls and barricaded rooms are closed to path search.
    fn is_walkable(&self, at: Coord) -> bool {
        let Some(idx) = self.idx(at) else {
            return false;
        };
        if self.walls[idx] {
            return false;
        }
        match self.room_at(at) {
            Some(room) => !self.barricades.contains_key(&room.name),
            None => true,
        }
    }
}

impl StationView for StationGrid {
    fn room_name_of(&self, at: Coord) -> String {
        match self.room_at(at) {
            Some(room) => room.name.clone(),
            None => format!("Corridor (Sector {},{})", at.x, at.y),
        }
    }

    fn connections(&self, room: &str) -> Vec<String> {
        self.connections
            .get(room)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn is_access_blocked(&self, room: &str) -> bool {
        self.barricades.contains_key(room)
    }

    fn room_anchor(&self, room: &str) -> Option<Coord> {
        self.room(room).map(RoomRect::anchor)
    }

    fn is_low_visibility(&self, at: Coord) -> bool {
        if self.vents.contains(&at) {
            return true;
        }
        self.room_at(at)
            .is_some_and(|room| self.dark_rooms.contains(&room.name))
    }

    fn visibility_modifier(&self, room: &str) -> i32 {
        if self.dark_rooms.contains(room) {
            -2
        } else {
            0
        }
    }
}

impl StationMut for StationGrid {
    fn attempt_break_block(
        &mut self,
        room: &str,
        _actor: ActorId,
        rng: &mut dyn DeterministicRng,
    ) -> BreakAttempt {
        let Some(strength) = self.barricades.get(room).copied() else {
            return BreakAttempt {
                success: true,
                message: "There is no barricade here.".to_string(),
            };
        };

        if !rng.chance(self.break_chance) {
            return BreakAttempt {
                success: false,
                message: format!("The barricade on the {room} holds firm."),
            };
        }

        let damage = 1 + rng.next_below(2) as u8;
        let remaining = strength.saturating_sub(damage);
        if remaining == 0 {
            self.barricades.remove(room);
            BreakAttempt {
                success: true,
                message: format!("The barricade on the {room} shatters!"),
            }
        } else {
            self.barricades.insert(room.to_string(), remaining);
            BreakAttempt {
                success: false,
                message: format!(
                    "The barricade on the {room} splinters ({remaining}/{BARRICADE_MAX_STRENGTH})."
                ),
            }
        }
    }
}
