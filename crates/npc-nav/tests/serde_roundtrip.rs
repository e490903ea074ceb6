#![cfg(feature = "serde")]

use npc_core::{Coord, StationView};
use npc_nav::{search, StationGrid, StationLayout};

#[test]
fn station_layout_roundtrips_via_serde() {
    let mut grid = StationGrid::outpost();
    grid.barricade("Lab");
    grid.set_wall(Coord::new(12, 6), true);

    let json = serde_json::to_string(&grid.layout()).expect("serialize layout");
    let layout: StationLayout = serde_json::from_str(&json).expect("deserialize layout");
    let rebuilt = StationGrid::from_layout(&layout);

    assert_eq!(rebuilt.layout(), grid.layout());
    assert!(rebuilt.is_access_blocked("Lab"));
    assert_eq!(
        search(&grid, Coord::new(0, 0), Coord::new(19, 19)),
        search(&rebuilt, Coord::new(0, 0), Coord::new(19, 19)),
    );
}
