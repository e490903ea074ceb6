use std::collections::BTreeSet;

use npc_brain::coordination::{self, CoordinationAction};
use npc_brain::{
    Actor, AiConfig, AiEvent, AiScheduler, Coordination, Decision, Outcome, Perception,
    PerceptionContext, PerceptionEvent, SuspicionState,
};
use npc_core::{ActorId, Coord, DeterministicRng};
use npc_nav::{Pathfinder, StationGrid};

#[test]
fn candidates_start_opposite_the_leader() {
    let candidates = coordination::flank_candidates(Coord::new(0, 5), Coord::new(5, 5), &[2, 3]);
    assert_eq!(
        candidates,
        vec![
            Coord::new(7, 5),
            Coord::new(8, 5),
            Coord::new(5, 7),
            Coord::new(5, 8),
            Coord::new(5, 3),
            Coord::new(5, 2),
        ]
    );
}

#[test]
fn co_located_leader_still_gets_lanes() {
    let candidates = coordination::flank_candidates(Coord::new(4, 4), Coord::new(4, 4), &[2]);
    assert_eq!(candidates.len(), 3);
    assert!(!candidates.contains(&Coord::new(4, 4)));
}

#[test]
fn allies_get_distinct_reachable_flanks() {
    let grid = StationGrid::new(20, 20);
    let mut pathfinder = Pathfinder::new();
    let allies = [
        (ActorId(2), Coord::new(1, 4)),
        (ActorId(3), Coord::new(1, 6)),
        (ActorId(4), Coord::new(2, 5)),
    ];

    let plan = coordination::plan_flanks(
        &grid,
        &mut pathfinder,
        1,
        Coord::new(0, 5),
        Coord::new(5, 5),
        &allies,
        &[2, 3],
    );

    assert_eq!(plan.len(), 3);
    let flanks: Vec<Coord> = plan.iter().filter_map(|a| a.flank).collect();
    assert_eq!(flanks.len(), 3);
    let distinct: BTreeSet<_> = flanks.iter().copied().collect();
    assert_eq!(distinct.len(), 3);
    assert!(!flanks.contains(&Coord::new(5, 5)));
    assert!(!flanks.contains(&Coord::new(0, 5)));
    assert_eq!(plan[0].flank, Some(Coord::new(7, 5)));
}

#[test]
fn unreachable_candidates_shift_to_a_neighbor_or_fall_back() {
    let mut grid = StationGrid::new(20, 20);
    grid.set_wall(Coord::new(7, 5), true);
    let mut pathfinder = Pathfinder::new();

    let plan = coordination::plan_flanks(
        &grid,
        &mut pathfinder,
        1,
        Coord::new(0, 5),
        Coord::new(5, 5),
        &[(ActorId(2), Coord::new(1, 1))],
        &[2],
    );
    // (7, 5) is walled; its first open cardinal neighbor is north.
    assert_eq!(plan[0].flank, Some(Coord::new(7, 4)));

    let crowd: Vec<_> = (0..5).map(|i| (ActorId(10 + i), Coord::new(1, 1))).collect();
    let plan = coordination::plan_flanks(
        &grid,
        &mut pathfinder,
        1,
        Coord::new(0, 5),
        Coord::new(5, 5),
        &crowd,
        &[2],
    );
    assert_eq!(plan.len(), 5);
    assert!(plan[3].flank.is_none(), "three lanes, one distance");
    assert!(plan[4].flank.is_none());
}

#[test]
fn step_goes_flank_first_then_target() {
    let grid = StationGrid::new(20, 20);
    let c = Coordination {
        target: Coord::new(5, 5),
        flank: Some(Coord::new(7, 5)),
        leader: ActorId(1),
        turns_remaining: 3,
    };

    let (next, action) = coordination::step(&c, Coord::new(9, 9), Some(Coord::new(5, 5)), &grid, 3);
    assert_eq!(action, CoordinationAction::MoveTo(Coord::new(7, 5)));
    let next = next.expect("active");
    assert_eq!(next.turns_remaining, 3, "the scheduler owns the countdown");

    let (next, action) =
        coordination::step(&next, Coord::new(7, 5), Some(Coord::new(5, 5)), &grid, 3);
    assert_eq!(action, CoordinationAction::MoveTo(Coord::new(5, 5)));
    assert_eq!(next.and_then(|n| n.flank), None);

    let (next, action) = coordination::step(&c, Coord::new(5, 5), Some(Coord::new(5, 5)), &grid, 3);
    assert_eq!(action, CoordinationAction::Engage);
    assert!(next.is_none());
}

#[test]
fn after_the_flank_participants_close_on_a_drifting_quarry() {
    let grid = StationGrid::new(20, 20);
    let c = Coordination {
        target: Coord::new(5, 5),
        flank: None,
        leader: ActorId(1),
        turns_remaining: 3,
    };

    let (next, action) =
        coordination::step(&c, Coord::new(5, 5), Some(Coord::new(6, 5)), &grid, 3);
    assert_eq!(action, CoordinationAction::MoveTo(Coord::new(6, 5)));
    let next = next.expect("active");
    assert_eq!(next.target, Coord::new(5, 5), "a short drift keeps the plan");

    let (next, action) =
        coordination::step(&next, Coord::new(6, 5), Some(Coord::new(6, 5)), &grid, 3);
    assert_eq!(action, CoordinationAction::Engage);
    assert!(next.is_none());
}

#[test]
fn a_quarry_that_moves_far_drags_the_flank_along() {
    let grid = StationGrid::new(20, 20);
    let c = Coordination {
        target: Coord::new(5, 5),
        flank: Some(Coord::new(7, 5)),
        leader: ActorId(1),
        turns_remaining: 3,
    };
    let (next, _) = coordination::step(&c, Coord::new(0, 0), Some(Coord::new(10, 5)), &grid, 3);
    let next = next.expect("active");
    assert_eq!(next.target, Coord::new(10, 5));
    assert_eq!(next.flank, Some(Coord::new(12, 5)));
}

#[test]
fn zero_turns_expire() {
    let grid = StationGrid::new(20, 20);
    let mut c = Coordination {
        target: Coord::new(5, 5),
        flank: None,
        leader: ActorId(1),
        turns_remaining: 1,
    };
    coordination::countdown([&mut c]);
    let (next, action) = coordination::step(&c, Coord::new(0, 0), None, &grid, 3);
    assert_eq!(action, CoordinationAction::Expired);
    assert!(next.is_none());
}

struct AlwaysSpots;

impl Perception for AlwaysSpots {
    fn evaluate_detection(
        &mut self,
        observer: &Actor,
        subject: &Actor,
        _context: &PerceptionContext,
        _rng: &mut dyn DeterministicRng,
    ) -> PerceptionEvent {
        PerceptionEvent::observed(observer.id, subject.id, Outcome::Detected, "").with_delta(3)
    }
}

fn ambush_scheduler() -> AiScheduler {
    let mut config = AiConfig::default();
    config.wander_chance = 0.0;
    let mut scheduler = AiScheduler::new(config, 21);
    scheduler.insert_actor(Actor::new(ActorId(1), "Palmer", Coord::new(6, 6)).infected());
    scheduler.insert_actor(Actor::new(ActorId(2), "Norris", Coord::new(9, 9)).infected());
    scheduler.insert_actor(Actor::new(ActorId(3), "Blair", Coord::new(5, 9)).infected());
    scheduler.insert_actor(Actor::new(ActorId(4), "MacReady", Coord::new(7, 7)).as_player());
    scheduler
}

#[test]
fn hidden_infected_detection_forms_an_ambush() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = ambush_scheduler();
    let listener = scheduler.channel().subscribe();

    let report = scheduler.advance_tick(&mut grid, Some(&mut AlwaysSpots));

    let formed = listener.drain().into_iter().find_map(|e| match e {
        AiEvent::CoordinationFormed {
            leader,
            allies,
            target,
            ..
        } => Some((leader, allies, target)),
        _ => None,
    });
    let (leader, allies, target) = formed.expect("ambush formed");
    assert_eq!(leader, ActorId(1));
    assert_eq!(allies, vec![ActorId(2), ActorId(3)]);
    assert_eq!(target, Coord::new(7, 7));

    let palmer = scheduler.actor(ActorId(1)).expect("leader");
    let leader_plan = palmer.coordination.as_ref().expect("leader participates");
    assert_eq!(leader_plan.flank, None);
    assert_eq!(palmer.suspicion.state, SuspicionState::Coordinating);

    assert_eq!(report.decision_of(ActorId(2)), Some(Decision::Ambush));
    assert_eq!(report.decision_of(ActorId(3)), Some(Decision::Ambush));
    assert!(!scheduler.alert_state().active, "infected observers never raise the alert");
}

#[test]
fn every_participant_expires_on_the_same_tick() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = ambush_scheduler();
    scheduler.advance_tick(&mut grid, Some(&mut AlwaysSpots));
    // Keep anyone from springing the ambush.
    scheduler.set_quarry(None);

    let participants = [ActorId(1), ActorId(2), ActorId(3)];
    for _ in 2..=5 {
        scheduler.advance_tick(&mut grid, None);
        for id in participants {
            assert!(scheduler.actor(id).and_then(|a| a.coordination.clone()).is_some());
        }
    }

    let listener = scheduler.channel().subscribe();
    scheduler.advance_tick(&mut grid, None);
    for id in participants {
        let actor = scheduler.actor(id).expect("participant");
        assert!(actor.coordination.is_none());
        assert_eq!(actor.suspicion.state, SuspicionState::Idle);
    }
    let ended = listener
        .drain()
        .into_iter()
        .filter(|e| matches!(e, AiEvent::CoordinationEnded { tick: 6, .. }))
        .count();
    assert_eq!(ended, 3);
}

#[test]
fn revealed_actors_are_left_out() {
    let mut grid = StationGrid::outpost();
    let mut scheduler = ambush_scheduler();
    if let Some(norris) = scheduler.actor_mut(ActorId(2)) {
        norris.revealed = true;
    }
    scheduler.advance_tick(&mut grid, Some(&mut AlwaysSpots));

    assert!(scheduler.actor(ActorId(2)).and_then(|a| a.coordination.clone()).is_none());
    assert!(scheduler.actor(ActorId(3)).and_then(|a| a.coordination.clone()).is_some());
}
