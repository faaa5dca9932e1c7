use airslash_core::{
    Command, Event, GamePhase, GridCell, HandSide, HitResult, SlashDirection, TargetId,
    TargetState, TargetSpec,
};
use airslash_world::{self as world, query, World};

fn spec() -> TargetSpec {
    TargetSpec {
        cell: GridCell::new(2, 1),
        hand: HandSide::Right,
        direction: SlashDirection::Down,
    }
}

fn start_session(world: &mut World) {
    let mut events = Vec::new();
    world::apply(world, Command::StartSession, &mut events);
    assert_eq!(query::phase(world), GamePhase::Playing);
}

fn spawn(world: &mut World, target_time: f32) -> TargetId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnTarget {
            spec: spec(),
            target_time,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::TargetSpawned { target, .. }] => *target,
        other => panic!("expected TargetSpawned, got {other:?}"),
    }
}

fn tick(world: &mut World, audio_time: f32, dt: f32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { audio_time, dt }, &mut events);
    events
}

fn good_hit() -> HitResult {
    HitResult {
        hit: true,
        score: 100,
        angle_accuracy: 1.0,
        speed_accuracy: 1.0,
        position_accuracy: 1.0,
        perfect: true,
    }
}

#[test]
fn targets_advance_along_the_approach_axis() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let _ = spawn(&mut world, 2.0);

    let before = query::target_view(&world).into_vec()[0].position.z;
    let _ = tick(&mut world, 0.5, 0.5);
    let after = query::target_view(&world).into_vec()[0].position.z;

    let speed = query::gameplay_config(&world).approach_speed;
    assert!((after - before - speed * 0.5).abs() < 1e-4);
}

#[test]
fn a_target_reaches_the_player_plane_at_its_nominal_time() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let _ = spawn(&mut world, 2.0);

    let _ = tick(&mut world, 2.0, 2.0);
    let position = query::target_view(&world).into_vec()[0].position;
    assert!(position.z.abs() < 1e-4);
}

#[test]
fn escaped_targets_are_missed_exactly_once() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let id = spawn(&mut world, 0.5);

    // Two seconds of travel puts the target far past the miss plane.
    let events = tick(&mut world, 3.0, 3.0);
    let misses: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::TargetMissed { .. }))
        .collect();
    assert_eq!(misses.len(), 1);
    assert_eq!(misses[0], &Event::TargetMissed { target: id });
    assert!(query::target_view(&world).into_vec().is_empty());
    assert_eq!(query::session_report(&world).misses, 1);

    // Further ticks cannot miss the same target again.
    let events = tick(&mut world, 3.1, 0.1);
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::TargetMissed { .. })));
    assert_eq!(query::session_report(&world).misses, 1);
}

#[test]
fn a_miss_breaks_the_streak() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);

    let id = spawn(&mut world, 0.2);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResolveTarget {
            target: id,
            result: good_hit(),
        },
        &mut events,
    );
    assert_eq!(query::streak(&world).current, 1);

    let _ = spawn(&mut world, 0.4);
    let _ = tick(&mut world, 3.0, 3.0);
    assert_eq!(query::streak(&world).current, 0);
    assert_eq!(query::streak(&world).max, 1);
}

#[test]
fn hits_accumulate_score_and_remove_the_target() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let id = spawn(&mut world, 1.0);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResolveTarget {
            target: id,
            result: good_hit(),
        },
        &mut events,
    );

    assert!(matches!(events.as_slice(), [Event::TargetHit { .. }]));
    assert!(query::target_view(&world).into_vec().is_empty());

    let report = query::session_report(&world);
    assert_eq!(report.score, 100);
    assert_eq!(report.total_hits, 1);
    assert_eq!(report.perfect_hits, 1);
    assert!((report.accuracy - 1.0).abs() < 1e-6);
}

#[test]
fn resolution_is_one_way() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let id = spawn(&mut world, 1.0);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResolveTarget {
            target: id,
            result: good_hit(),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::ResolveTarget {
            target: id,
            result: good_hit(),
        },
        &mut events,
    );

    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::TargetHit { .. }))
            .count(),
        1
    );
    assert_eq!(query::session_report(&world).score, 100);
}

#[test]
fn rejected_results_leave_the_target_pending() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let id = spawn(&mut world, 1.0);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResolveTarget {
            target: id,
            result: HitResult::rejected(),
        },
        &mut events,
    );

    assert!(events.is_empty());
    let targets = query::target_view(&world).into_vec();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].state, TargetState::Pending);
}

#[test]
fn ending_a_session_publishes_the_report() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let id = spawn(&mut world, 1.0);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResolveTarget {
            target: id,
            result: good_hit(),
        },
        &mut events,
    );
    events.clear();
    world::apply(&mut world, Command::EndSession, &mut events);

    match events.as_slice() {
        [Event::PhaseChanged {
            phase: GamePhase::GameOver,
        }, Event::SessionCompleted { report }] => {
            assert_eq!(report.score, 100);
            assert_eq!(report.targets_spawned, 1);
        }
        other => panic!("expected game over events, got {other:?}"),
    }
}

#[test]
fn reset_clears_every_trace_of_the_previous_session() {
    let mut world = World::new();
    start_session(&mut world);
    let _ = tick(&mut world, 0.0, 0.0);
    let stale = spawn(&mut world, 1.0);
    let _ = spawn(&mut world, 1.5);

    let mut events = Vec::new();
    world::apply(&mut world, Command::EndSession, &mut events);
    events.clear();
    world::apply(&mut world, Command::ResetSession, &mut events);
    assert_eq!(
        events,
        vec![Event::PhaseChanged {
            phase: GamePhase::Menu,
        }]
    );

    assert!(query::target_view(&world).into_vec().is_empty());
    let report = query::session_report(&world);
    assert_eq!(report.targets_spawned, 0);
    assert_eq!(report.score, 0);

    // A stale resolve from the previous session can no longer register.
    start_session(&mut world);
    events.clear();
    world::apply(
        &mut world,
        Command::ResolveTarget {
            target: stale,
            result: good_hit(),
        },
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(query::session_report(&world).score, 0);
}
