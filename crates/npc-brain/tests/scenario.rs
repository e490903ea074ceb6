use npc_brain::{AiConfig, ConfigError, Decision, Scenario, ScenarioError};
use npc_core::{ActorId, Coord, StationView};

const OUTPOST: &str = r#"
seed: 42
config:
  start_hour: 22
  wander_chance: 0.0
  alert:
    duration: 8
actors:
  - name: MacReady
    position: { x: 7, y: 7 }
    player: true
  - name: Childs
    role: Mechanic
    room: Generator
    schedule:
      - { start: 20, end: 6, room: Generator }
  - name: Palmer
    position: { x: 8, y: 8 }
    infected: true
traps:
  - at: { x: 12, y: 12 }
    name: flare
    owner: Palmer
hunt_target: Palmer
"#;

#[test]
fn loads_a_full_scenario() {
    let scenario = Scenario::from_yaml_str(OUTPOST).expect("valid scenario");
    assert_eq!(scenario.config().start_hour, 22);
    assert_eq!(scenario.config().alert.duration, 8);
    assert_eq!(scenario.config().suspicion.max, 10, "omitted sections keep defaults");

    let actors = scenario.actors();
    assert_eq!(actors.len(), 3);
    assert_eq!(actors[0].id, ActorId(1));
    assert!(actors[0].player);
    assert_eq!(actors[1].pos, scenario.grid().room_anchor("Generator").expect("room"));
    assert_eq!(actors[1].role, "Mechanic");
    assert!(actors[2].infected && !actors[2].revealed);
}

#[test]
fn built_scheduler_carries_every_template() {
    let scenario = Scenario::from_yaml_str(OUTPOST).expect("valid scenario");
    let (mut scheduler, mut grid) = scenario.build();

    assert_eq!(scheduler.quarry(), Some(ActorId(1)));
    assert_eq!(scheduler.hunt_target(), Some(ActorId(3)));
    let trap = scheduler.traps().get(Coord::new(12, 12)).expect("trap deployed");
    assert_eq!(trap.owner, Some(ActorId(3)));
    assert_eq!(trap.noise, 6);

    let report = scheduler.advance_tick(&mut grid, None);
    assert_eq!(report.hour, 23);
    assert_eq!(
        report.decision_of(ActorId(2)),
        Some(Decision::GroupHunt { target: ActorId(3) })
    );
}

#[test]
fn missing_position_is_reported_by_index() {
    let err = Scenario::from_yaml_str("actors:\n  - name: Nobody\n").expect_err("no position");
    assert!(matches!(err, ScenarioError::MissingField { index: 0, field: "position" }));

    let err = Scenario::from_yaml_str("actors:\n  - position: { x: 1, y: 1 }\n")
        .expect_err("no name");
    assert!(matches!(err, ScenarioError::MissingField { index: 0, field: "name" }));
}

#[test]
fn out_of_bounds_start_is_rejected() {
    let err = Scenario::from_yaml_str("actors:\n  - name: Lost\n    position: { x: 40, y: 2 }\n")
        .expect_err("outside the outpost");
    match err {
        ScenarioError::OutOfBounds { actor, at } => {
            assert_eq!(actor, "Lost");
            assert_eq!(at, Coord::new(40, 2));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn schedule_must_name_real_rooms_and_hours() {
    let unknown = "actors:\n  - name: Clark\n    room: Kennel\n    schedule:\n      \
                   - { start: 1, end: 3, room: Bridge }\n";
    assert!(matches!(
        Scenario::from_yaml_str(unknown),
        Err(ScenarioError::UnknownRoom { ref room, .. }) if room == "Bridge"
    ));

    let bad_hour = "actors:\n  - name: Clark\n    room: Kennel\n    schedule:\n      \
                    - { start: 1, end: 30, room: Kennel }\n";
    assert!(matches!(
        Scenario::from_yaml_str(bad_hour),
        Err(ScenarioError::InvalidHour { hour: 30, .. })
    ));
}

#[test]
fn unknown_hunt_target_is_rejected() {
    let err = Scenario::from_yaml_str("hunt_target: Ghost\n").expect_err("nobody named Ghost");
    assert!(matches!(err, ScenarioError::UnknownActor(ref name) if name == "Ghost"));
}

#[test]
fn invalid_config_surfaces_through_the_scenario() {
    let err = Scenario::from_yaml_str("config:\n  suspicion:\n    question_threshold: 8\n")
        .expect_err("question above follow");
    assert!(matches!(
        err,
        ScenarioError::Config(ConfigError::Invalid { field: "suspicion.question_threshold", .. })
    ));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = Scenario::from_yaml_str("actors: [").expect_err("broken yaml");
    assert!(matches!(err, ScenarioError::Parse(_)));
}

#[test]
fn config_defaults_and_validation() {
    let config = AiConfig::from_yaml_str("{}").expect("empty config uses defaults");
    assert_eq!(config, AiConfig::default());
    assert_eq!(config.budget.base, 20);
    assert_eq!(config.coordination.flank_distances, vec![2, 3]);

    let err = AiConfig::from_yaml_str("start_hour: 24\n").expect_err("not an hour");
    assert!(matches!(err, ConfigError::Invalid { field: "start_hour", .. }));

    let err = AiConfig::from_yaml_str("wander_chance: 1.5\n").expect_err("not a probability");
    assert!(matches!(err, ConfigError::Invalid { field: "wander_chance", .. }));

    let err = AiConfig::from_yaml_str("coordination:\n  flank_distances: []\n")
        .expect_err("no flank distances");
    assert!(err.to_string().contains("coordination.flank_distances"));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = AiConfig::load(std::path::Path::new("/nonexistent/npc.yaml")).expect_err("no file");
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn custom_station_layout_is_used() {
    let yaml = r#"
station:
  width: 6
  height: 4
  rooms:
    - { name: Bay, x1: 0, y1: 0, x2: 2, y2: 3 }
    - { name: Lock, x1: 3, y1: 0, x2: 5, y2: 3 }
  connections: [[Bay, Lock]]
actors:
  - name: Sanders
    room: Lock
"#;
    let scenario = Scenario::from_yaml_str(yaml).expect("custom station");
    assert_eq!(scenario.grid().width(), 6);
    assert_eq!(scenario.actors()[0].pos, Coord::new(3, 0));
    assert_eq!(scenario.grid().connections("Bay"), vec!["Lock".to_string()]);
}

#[test]
fn oversized_station_is_rejected() {
    let yaml = "station:\n  width: 60000\n  height: 60000\n";
    let err = Scenario::from_yaml_str(yaml).expect_err("too large");
    assert!(matches!(
        err,
        ScenarioError::StationSize { width: 60000, height: 60000, .. }
    ));

    let err = Scenario::from_yaml_str("station:\n  width: -3\n  height: 4\n")
        .expect_err("negative width");
    assert!(matches!(err, ScenarioError::StationSize { width: -3, .. }));
}

#[test]
fn unbounded_investigation_window_is_rejected() {
    let err = AiConfig::from_yaml_str("investigation:\n  turns: 18446744073709551615\n")
        .expect_err("window too long");
    assert!(matches!(err, ConfigError::Invalid { field: "investigation.turns", .. }));
}
