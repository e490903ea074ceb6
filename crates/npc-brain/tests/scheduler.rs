use npc_brain::{
    Actor, AiConfig, AiEvent, AiScheduler, ContestPerception, Coordination, Decision,
    Investigation, ScheduleRule, SearchState, SuspicionState,
};
use npc_core::{ActorId, Coord};
use npc_nav::StationGrid;

fn quiet_config() -> AiConfig {
    let mut config = AiConfig::default();
    config.wander_chance = 0.0;
    config
}

#[test]
fn same_tick_unreachable_queries_share_one_cached_no_path() {
    let mut grid = StationGrid::outpost();
    grid.barricade("Lab");
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    let to_lab = vec![ScheduleRule::new(0, 24, "Lab")];
    for id in [1, 2] {
        scheduler.insert_actor(
            Actor::new(ActorId(id), format!("crew-{id}"), Coord::new(1, 1))
                .with_schedule(to_lab.clone()),
        );
    }

    let report = scheduler.advance_tick(&mut grid, None);

    assert_eq!(report.cache.misses, 1);
    assert_eq!(report.cache.hits, 1);
    let costs = &scheduler.config().budget.costs;
    assert_eq!(report.budget_spent, costs.fresh_path + costs.cached_path);

    let first = scheduler.actor(ActorId(1)).map(|a| a.pos);
    let second = scheduler.actor(ActorId(2)).map(|a| a.pos);
    assert_eq!(first, Some(Coord::new(2, 2)));
    assert_eq!(first, second);
}

#[test]
fn cache_is_fresh_every_tick() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    scheduler.insert_actor(
        Actor::new(ActorId(1), "Clark", Coord::new(0, 0))
            .with_schedule(vec![ScheduleRule::new(0, 24, "Generator")]),
    );

    scheduler.advance_tick(&mut grid, None);
    assert_eq!(scheduler.pathfinder().epoch(), Some(1));
    scheduler.advance_tick(&mut grid, None);
    assert_eq!(scheduler.pathfinder().epoch(), Some(2));
    assert_eq!(scheduler.pathfinder().cached_len(), 1);
    assert_eq!(scheduler.pathfinder().stats().hits, 0);
}

fn crowded(seed: u64) -> (AiScheduler, StationGrid) {
    let mut scheduler = AiScheduler::new(AiConfig::default(), seed);
    let names = ["Bennings", "Childs", "Clark", "Copper", "Fuchs", "Garry", "Nauls"];
    for (i, name) in names.iter().enumerate() {
        let at = Coord::new(5 + i as i32 % 4, 5 + i as i32 / 4);
        scheduler.insert_actor(Actor::new(ActorId(i as u32 + 1), *name, at));
    }
    scheduler.insert_actor(Actor::new(ActorId(20), "MacReady", Coord::new(8, 8)).as_player());
    (scheduler, StationGrid::outpost())
}

#[test]
fn identical_seeds_replay_identically() {
    let (mut a, mut grid_a) = crowded(99);
    let (mut b, mut grid_b) = crowded(99);
    let mut pa = ContestPerception::default();
    let mut pb = ContestPerception::default();

    for _ in 0..25 {
        let ra = a.advance_tick(&mut grid_a, Some(&mut pa));
        let rb = b.advance_tick(&mut grid_b, Some(&mut pb));
        assert_eq!(ra, rb);
    }
    assert_eq!(a.actors(), b.actors());
}

#[test]
fn actors_are_evaluated_in_ascending_id_order() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    for id in [7, 3, 5] {
        scheduler.insert_actor(Actor::new(ActorId(id), format!("n{id}"), Coord::new(7, 7)));
    }
    scheduler.insert_actor(Actor::new(ActorId(1), "player", Coord::new(0, 19)).as_player());

    let report = scheduler.advance_tick(&mut grid, None);
    let order: Vec<_> = report.decisions.iter().map(|(id, _)| id.0).collect();
    assert_eq!(order, vec![3, 5, 7]);
}

#[test]
fn hour_follows_the_start_hour() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    let first = scheduler.advance_tick(&mut grid, None);
    assert_eq!(first.hour, 20);
    for _ in 0..4 {
        scheduler.advance_tick(&mut grid, None);
    }
    let sixth = scheduler.advance_tick(&mut grid, None);
    assert_eq!(sixth.hour, 1);
}

#[test]
fn routine_walks_to_the_scheduled_room_and_stays() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    scheduler.insert_actor(
        Actor::new(ActorId(1), "Nauls", Coord::new(7, 7))
            .with_schedule(vec![ScheduleRule::new(18, 6, "Mess Hall")]),
    );

    // Ticks 1..=10 cover hours 20..=5.
    for _ in 0..10 {
        let report = scheduler.advance_tick(&mut grid, None);
        assert_eq!(report.decision_of(ActorId(1)), Some(Decision::Routine));
    }
    let pos = scheduler.actor(ActorId(1)).map(|a| a.pos).expect("actor");
    assert!(grid.room("Mess Hall").is_some_and(|r| r.contains(pos)));
}

#[test]
fn group_hunt_converges_on_the_target() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    scheduler.insert_actor(Actor::new(ActorId(1), "Garry", Coord::new(5, 5)));
    scheduler.insert_actor(Actor::new(ActorId(2), "Copper", Coord::new(10, 10)));
    scheduler.insert_actor(Actor::new(ActorId(3), "Blair", Coord::new(7, 7)));
    scheduler.set_hunt_target(Some(ActorId(3)));
    let listener = scheduler.channel().subscribe();

    let report = scheduler.advance_tick(&mut grid, None);
    assert_eq!(
        report.decision_of(ActorId(1)),
        Some(Decision::GroupHunt { target: ActorId(3) })
    );
    assert_eq!(scheduler.actor(ActorId(1)).map(|a| a.pos), Some(Coord::new(6, 6)));
    assert_eq!(scheduler.actor(ActorId(2)).map(|a| a.pos), Some(Coord::new(9, 9)));
    assert_ne!(
        report.decision_of(ActorId(3)),
        Some(Decision::GroupHunt { target: ActorId(3) })
    );

    let joined = listener
        .drain()
        .into_iter()
        .filter(|e| matches!(e, AiEvent::HuntJoined { .. }))
        .count();
    assert_eq!(joined, 2);

    assert!(scheduler.mark_dead(ActorId(3)));
    scheduler.advance_tick(&mut grid, None);
    assert_eq!(scheduler.hunt_target(), None);
    assert!(scheduler.actors().values().all(|a| !a.hunting));
}

#[test]
fn dead_actors_are_skipped() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    scheduler.insert_actor(Actor::new(ActorId(1), "Bennings", Coord::new(5, 5)));
    scheduler.insert_actor(Actor::new(ActorId(2), "Windows", Coord::new(6, 5)));
    scheduler.mark_dead(ActorId(1));

    let report = scheduler.advance_tick(&mut grid, None);
    assert_eq!(report.decisions.len(), 1);
    assert_eq!(report.budget_limit, 20 + 3);
}

#[test]
fn corrupt_persisted_state_is_sanitized() {
    let mut grid = StationGrid::new(10, 10);
    let mut scheduler = AiScheduler::new(quiet_config(), 2);
    let mut actor = Actor::new(ActorId(1), "Fuchs", Coord::new(2, 2)).revealed();
    actor.suspicion.level = 99;
    actor.suspicion.state = SuspicionState::Coordinating;
    actor.coordination = Some(Coordination {
        target: Coord::new(3, 3),
        flank: None,
        leader: ActorId(1),
        turns_remaining: 4,
    });
    actor.investigation = Some(Investigation {
        goal: Coord::new(50, 50),
        priority: 1,
        expires_at: 100,
        linger: 1,
        arrived: false,
    });
    actor.search = Some(SearchState {
        anchor: Coord::new(-4, 2),
        radius: 1,
        targets: vec![],
        visited_tiles: Default::default(),
        visited_rooms: Default::default(),
        turns_remaining: 3,
        current: None,
    });
    scheduler.insert_actor(actor);

    scheduler.advance_tick(&mut grid, None);
    let fuchs = scheduler.actor(ActorId(1)).expect("actor");
    assert!(fuchs.suspicion.level <= scheduler.config().suspicion.max);
    assert!(fuchs.coordination.is_none(), "revealed actors never coordinate");
    assert_ne!(fuchs.suspicion.state, SuspicionState::Coordinating);
    assert!(fuchs.investigation.is_none());
    assert!(fuchs.search.is_none());
}

#[test]
fn actor_state_round_trips_through_json() {
    let mut actor = Actor::new(ActorId(4), "Childs", Coord::new(3, 4))
        .with_role("Mechanic")
        .with_schedule(vec![ScheduleRule::new(22, 6, "Generator")]);
    actor.suspicion.level = 5;
    actor.suspicion.state = SuspicionState::Question;
    actor.suspicion.last_raised = Some(12);
    actor.last_known = Some(Coord::new(9, 9));
    actor.investigation = Some(Investigation {
        goal: Coord::new(9, 9),
        priority: 2,
        expires_at: 17,
        linger: 2,
        arrived: false,
    });
    actor.coordination = Some(Coordination {
        target: Coord::new(9, 9),
        flank: Some(Coord::new(11, 9)),
        leader: ActorId(1),
        turns_remaining: 3,
    });

    let json = serde_json::to_string(&actor).expect("serialize");
    let back: Actor = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, actor);

    let minimal: Actor = serde_json::from_str(r#"{"id":1,"name":"Bennings","pos":{"x":0,"y":0}}"#)
        .expect("defaults");
    assert!(minimal.alive);
    assert_eq!(minimal.noise, 5);
    assert!(minimal.investigation.is_none());
}

#[test]
fn tick_report_serializes() {
    let (mut scheduler, mut grid) = crowded(5);
    let report = scheduler.advance_tick(&mut grid, None);
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["tick"], 1);
    assert!(json["decisions"].is_array());
}
