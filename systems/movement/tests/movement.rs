use std::time::Duration;

use glam::Vec3;
use maze_escape_core::{
    CellCoord, CellKind, Command, Event, MoveIntents, PlayerTuning, SessionPhase,
    DEFAULT_WALK_SPEED,
};
use maze_escape_system_movement::Movement;
use maze_escape_world::{self as world, query, Maze, World};

const FRAME: Duration = Duration::from_millis(16);
const FORWARD: MoveIntents = MoveIntents::new(true, false, false, false);
const FORWARD_RIGHT: MoveIntents = MoveIntents::new(true, false, false, true);
const MAX_FRAMES_PER_LEG: usize = 1_000;
const ARRIVAL_TOLERANCE: f32 = 1e-4;

const START_TO_FIRST_CHECKPOINT: [(u32, u32); 13] = [
    (5, 1),
    (5, 3),
    (9, 3),
    (9, 9),
    (7, 9),
    (7, 5),
    (3, 5),
    (3, 3),
    (1, 3),
    (1, 7),
    (5, 7),
    (5, 9),
    (1, 9),
];

const FIRST_CHECKPOINT_TO_EXIT: [(u32, u32); 15] = [
    (5, 9),
    (5, 7),
    (1, 7),
    (1, 3),
    (3, 3),
    (3, 5),
    (7, 5),
    (7, 9),
    (9, 9),
    (9, 3),
    (7, 3),
    (7, 1),
    (11, 1),
    (11, 11),
    (11, 12),
];

const START_TO_EXIT_SHORTCUT: [(u32, u32); 7] = [
    (5, 1),
    (5, 3),
    (7, 3),
    (7, 1),
    (11, 1),
    (11, 11),
    (11, 12),
];

const EXIT_TO_FIRST_CHECKPOINT: [(u32, u32); 15] = [
    (11, 11),
    (11, 1),
    (7, 1),
    (7, 3),
    (9, 3),
    (9, 9),
    (7, 9),
    (7, 5),
    (3, 5),
    (3, 3),
    (1, 3),
    (1, 7),
    (5, 7),
    (5, 9),
    (1, 9),
];

#[test]
fn classic_route_wins_on_the_frame_the_exit_is_entered() {
    let mut session = Session::classic();

    session.walk_route(&START_TO_FIRST_CHECKPOINT);
    assert_eq!(query::session(&session.world).checkpoints_reached, 1);
    session.walk_route(&FIRST_CHECKPOINT_TO_EXIT);

    let victories: Vec<_> = session
        .trace
        .iter()
        .enumerate()
        .filter(|(_, frame)| frame.won())
        .collect();
    assert_eq!(victories.len(), 1, "victory must fire exactly once");

    let (victory_index, victory_frame) = victories[0];
    assert_eq!(victory_frame.kind_after, CellKind::Exit);
    assert_ne!(victory_frame.kind_before, CellKind::Exit);
    assert_eq!(victory_frame.reached_after, 2);
    assert!(session.trace[..victory_index]
        .iter()
        .all(|frame| frame.kind_after != CellKind::Exit));
    assert_eq!(query::phase(&session.world), SessionPhase::Victorious);
}

#[test]
fn reaching_the_exit_early_does_not_win() {
    let mut session = Session::classic();

    session.walk_route(&START_TO_EXIT_SHORTCUT);

    assert_eq!(query::player_cell_kind(&session.world), CellKind::Exit);
    assert_eq!(query::phase(&session.world), SessionPhase::Running);
    assert!(!session.trace.iter().any(FrameRecord::won));
    let locked: Vec<_> = session
        .trace
        .iter()
        .flat_map(|frame| frame.events.iter())
        .filter(|event| matches!(event, Event::ExitLocked { .. }))
        .collect();
    assert_eq!(locked, vec![&Event::ExitLocked { remaining: 1 }]);

    for _ in 0..30 {
        session.idle_frame();
    }
    assert!(!session.trace.iter().any(FrameRecord::won));

    session.walk_route(&EXIT_TO_FIRST_CHECKPOINT);
    assert_eq!(query::session(&session.world).checkpoints_reached, 2);
    session.walk_route(&FIRST_CHECKPOINT_TO_EXIT);

    let victories: Vec<_> = session.trace.iter().filter(|frame| frame.won()).collect();
    assert_eq!(victories.len(), 1);
    assert_eq!(victories[0].kind_after, CellKind::Exit);
    assert_ne!(victories[0].kind_before, CellKind::Exit);
}

#[test]
fn standing_on_the_exit_after_victory_does_not_repeat_the_signal() {
    let mut session = Session::classic();
    session.walk_route(&START_TO_FIRST_CHECKPOINT);
    session.walk_route(&FIRST_CHECKPOINT_TO_EXIT);
    let elapsed = query::elapsed(&session.world);

    for _ in 0..60 {
        let _ = session.frame(FORWARD, Vec3::Z, FRAME);
    }

    assert_eq!(session.trace.iter().filter(|frame| frame.won()).count(), 1);
    assert_eq!(query::elapsed(&session.world), elapsed);
}

#[test]
fn walking_into_a_wall_never_enters_it() {
    let mut session = Session::classic();

    for _ in 0..200 {
        let _ = session.frame(FORWARD, Vec3::NEG_Z, FRAME);
    }

    assert!(session
        .trace
        .iter()
        .flat_map(|frame| frame.events.iter())
        .any(|event| matches!(event, Event::MovementBlocked { .. })));
    assert_eq!(
        query::player_cell(&session.world),
        Some(CellCoord::new(1, 1))
    );
    assert!(session
        .trace
        .iter()
        .all(|frame| frame.kind_after != CellKind::Wall));
}

#[test]
fn wandering_input_never_places_the_player_inside_a_wall() {
    let mut session = Session::classic();
    let mut seed = 0x9e37_79b9_u32;
    let mut yaw = 0.0_f32;

    for _ in 0..4_000 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let intents = MoveIntents::new(
            seed & 1 != 0,
            seed & 2 != 0,
            seed & 4 != 0,
            seed & 8 != 0,
        );
        yaw += ((seed >> 8) % 200) as f32 / 100.0 - 1.0;
        let look = Vec3::new(yaw.sin(), 0.0, -yaw.cos());
        let dt = Duration::from_millis(u64::from(seed >> 28) + 1);

        let _ = session.frame(intents, look, dt);

        assert_ne!(query::player_cell_kind(&session.world), CellKind::Wall);
    }
}

#[test]
fn pausing_freezes_position_and_clock() {
    let mut session = Session::classic();
    for _ in 0..5 {
        let _ = session.frame(FORWARD, Vec3::X, FRAME);
    }

    let _ = session.command(Command::SetPaused { paused: true });
    let position = query::player(&session.world).position;
    let elapsed = query::elapsed(&session.world);

    for _ in 0..20 {
        let events = session.frame(FORWARD, Vec3::X, FRAME);
        assert_eq!(events, vec![Event::FrameAdvanced { dt: FRAME }]);
    }
    assert_eq!(query::player(&session.world).position, position);
    assert_eq!(query::elapsed(&session.world), elapsed);

    let _ = session.command(Command::SetPaused { paused: false });
    let _ = session.frame(FORWARD, Vec3::X, FRAME);
    assert!(query::player(&session.world).position.x > position.x);
    assert!(query::elapsed(&session.world) > elapsed);
}

#[test]
fn no_intents_keep_the_session_idle() {
    let mut session = Session::classic();

    for _ in 0..10 {
        session.idle_frame();
    }

    assert_eq!(query::phase(&session.world), SessionPhase::Idle);
    assert_eq!(query::elapsed(&session.world), Duration::ZERO);
}

#[test]
fn restart_returns_to_a_fresh_idle_session() {
    let mut session = Session::classic();
    session.walk_route(&START_TO_FIRST_CHECKPOINT);

    let mut events = session.command(Command::ResetSession);
    events.extend(session.command(Command::RespawnPlayer));

    let start = query::maze(&session.world).world_position(CellCoord::new(1, 1));
    assert_eq!(
        events,
        vec![
            Event::SessionReset,
            Event::PlayerRespawned { position: start }
        ]
    );
    let snapshot = query::session(&session.world);
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert_eq!(snapshot.elapsed, Duration::ZERO);
    assert_eq!(snapshot.checkpoints_reached, 0);

    let events = session.frame(FORWARD, Vec3::X, FRAME);
    assert!(events.contains(&Event::RunStarted));
    assert!(query::player(&session.world).position.x > start.x);
}

struct FrameRecord {
    events: Vec<Event>,
    kind_before: CellKind,
    kind_after: CellKind,
    reached_after: u32,
}

impl FrameRecord {
    fn won(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, Event::VictoryAchieved { .. }))
    }
}

struct Session {
    world: World,
    movement: Movement,
    trace: Vec<FrameRecord>,
}

impl Session {
    fn classic() -> Self {
        let maze = Maze::classic().expect("classic layout is valid");
        Self {
            world: World::new(maze, PlayerTuning::default()),
            movement: Movement::default(),
            trace: Vec::new(),
        }
    }

    fn frame(&mut self, intents: MoveIntents, look: Vec3, dt: Duration) -> Vec<Event> {
        let kind_before = query::player_cell_kind(&self.world);
        let mut log = Vec::new();
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        while !events.is_empty() {
            let mut commands = Vec::new();
            self.movement.handle(&events, intents, look, &mut commands);
            log.append(&mut events);
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }

        self.trace.push(FrameRecord {
            events: log.clone(),
            kind_before,
            kind_after: query::player_cell_kind(&self.world),
            reached_after: query::session(&self.world).checkpoints_reached,
        });
        log
    }

    fn idle_frame(&mut self) {
        let look = query::player(&self.world).facing;
        let _ = self.frame(MoveIntents::NONE, look, FRAME);
    }

    fn command(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        let mut ignored = Vec::new();
        let look = query::player(&self.world).facing;
        self.movement
            .handle(&events, MoveIntents::NONE, look, &mut ignored);
        assert!(ignored.is_empty());
        events
    }

    fn walk_route(&mut self, waypoints: &[(u32, u32)]) {
        for &(column, row) in waypoints {
            self.walk_to(CellCoord::new(column, row));
        }
    }

    /// Walks in a straight line holding forward and right, with the look
    /// rotated 45 degrees so the combined intent points at the waypoint.
    fn walk_to(&mut self, cell: CellCoord) {
        let target = query::maze(&self.world).world_position(cell);
        let full_step = DEFAULT_WALK_SPEED * FRAME.as_secs_f32();

        for _ in 0..MAX_FRAMES_PER_LEG {
            let offset = target - query::player(&self.world).position;
            let distance = offset.length();
            if distance < ARRIVAL_TOLERANCE {
                return;
            }

            let direction = offset / distance;
            let look = Vec3::new(
                direction.x + direction.z,
                0.0,
                direction.z - direction.x,
            );
            let dt = if distance < full_step {
                Duration::from_secs_f32(distance / DEFAULT_WALK_SPEED)
            } else {
                FRAME
            };

            let events = self.frame(FORWARD_RIGHT, look, dt);
            assert!(
                !events
                    .iter()
                    .any(|event| matches!(event, Event::MovementBlocked { .. })),
                "scripted route toward {cell:?} touched a wall"
            );
            assert_ne!(query::player_cell_kind(&self.world), CellKind::Wall);
            if query::phase(&self.world) == SessionPhase::Victorious {
                return;
            }
        }

        panic!("player failed to reach {cell:?}");
    }
}
