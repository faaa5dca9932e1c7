#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Airslash engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and the presentation layer to react to deterministically.
//! Systems consume event streams, query immutable snapshots, and respond
//! exclusively with new command batches.

pub mod config;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Number of lane columns in the target grid.
pub const GRID_COLUMNS: u32 = 4;

/// Number of height rows in the target grid.
pub const GRID_ROWS: u32 = 3;

/// Hands tracked by the camera pipeline, doubling as target color assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandSide {
    /// The player's left hand and every target assigned to it.
    Left,
    /// The player's right hand and every target assigned to it.
    Right,
}

impl HandSide {
    /// Both hand sides in deterministic order.
    pub const BOTH: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    /// Inclusive grid column bounds belonging to this hand's half of the grid.
    #[must_use]
    pub const fn column_bounds(self) -> (u32, u32) {
        match self {
            HandSide::Left => (0, GRID_COLUMNS / 2 - 1),
            HandSide::Right => (GRID_COLUMNS / 2, GRID_COLUMNS - 1),
        }
    }

}

/// Slash direction a target demands, expressed in the camera-facing XY plane.
///
/// `Any` accepts motion in every direction and trivially satisfies angle
/// checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlashDirection {
    /// Upward slash.
    Up,
    /// Downward slash.
    Down,
    /// Leftward slash.
    Left,
    /// Rightward slash.
    Right,
    /// Diagonal slash toward the upper left.
    UpLeft,
    /// Diagonal slash toward the upper right.
    UpRight,
    /// Diagonal slash toward the lower left.
    DownLeft,
    /// Diagonal slash toward the lower right.
    DownRight,
    /// Direction-agnostic target satisfied by any sufficiently fast slash.
    Any,
}

const DIAGONAL_COMPONENT: f32 = std::f32::consts::FRAC_1_SQRT_2;

impl SlashDirection {
    /// Every direction variant, `Any` included, in deterministic order.
    pub const ALL: [SlashDirection; 9] = [
        SlashDirection::Up,
        SlashDirection::Down,
        SlashDirection::Left,
        SlashDirection::Right,
        SlashDirection::UpLeft,
        SlashDirection::UpRight,
        SlashDirection::DownLeft,
        SlashDirection::DownRight,
        SlashDirection::Any,
    ];

    /// Unit vector in the XY plane matching this direction.
    ///
    /// Returns `None` for [`SlashDirection::Any`], which has no preferred
    /// axis.
    #[must_use]
    pub const fn unit_xy(self) -> Option<Vec2> {
        match self {
            SlashDirection::Up => Some(Vec2::new(0.0, 1.0)),
            SlashDirection::Down => Some(Vec2::new(0.0, -1.0)),
            SlashDirection::Left => Some(Vec2::new(-1.0, 0.0)),
            SlashDirection::Right => Some(Vec2::new(1.0, 0.0)),
            SlashDirection::UpLeft => Some(Vec2::new(-DIAGONAL_COMPONENT, DIAGONAL_COMPONENT)),
            SlashDirection::UpRight => Some(Vec2::new(DIAGONAL_COMPONENT, DIAGONAL_COMPONENT)),
            SlashDirection::DownLeft => Some(Vec2::new(-DIAGONAL_COMPONENT, -DIAGONAL_COMPONENT)),
            SlashDirection::DownRight => Some(Vec2::new(DIAGONAL_COMPONENT, -DIAGONAL_COMPONENT)),
            SlashDirection::Any => None,
        }
    }

    /// Reflects the direction across the vertical axis.
    ///
    /// Used when a double block mirrors one hand's direction onto the other.
    /// Purely vertical directions and `Any` map to themselves.
    #[must_use]
    pub const fn mirrored(self) -> SlashDirection {
        match self {
            SlashDirection::Up => SlashDirection::Up,
            SlashDirection::Down => SlashDirection::Down,
            SlashDirection::Left => SlashDirection::Right,
            SlashDirection::Right => SlashDirection::Left,
            SlashDirection::UpLeft => SlashDirection::UpRight,
            SlashDirection::UpRight => SlashDirection::UpLeft,
            SlashDirection::DownLeft => SlashDirection::DownRight,
            SlashDirection::DownRight => SlashDirection::DownLeft,
            SlashDirection::Any => SlashDirection::Any,
        }
    }

    /// Reflects the direction across the horizontal axis.
    ///
    /// Used by flow-aware generation to upweight the alternating counterpart
    /// of the previous slash.
    #[must_use]
    pub const fn flipped(self) -> SlashDirection {
        match self {
            SlashDirection::Up => SlashDirection::Down,
            SlashDirection::Down => SlashDirection::Up,
            SlashDirection::Left => SlashDirection::Left,
            SlashDirection::Right => SlashDirection::Right,
            SlashDirection::UpLeft => SlashDirection::DownLeft,
            SlashDirection::UpRight => SlashDirection::DownRight,
            SlashDirection::DownLeft => SlashDirection::UpLeft,
            SlashDirection::DownRight => SlashDirection::UpRight,
            SlashDirection::Any => SlashDirection::Any,
        }
    }
}

/// Location of a single target cell expressed as column and row coordinates.
///
/// Columns run left to right, rows bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: u32,
    row: u32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Reports whether the cell lies inside the configured grid bounds.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.column < GRID_COLUMNS && self.row < GRID_ROWS
    }
}

/// Unique identifier assigned to a live target by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u32);

impl TargetId {
    /// Creates a new target identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Lifecycle phases of one play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Idle between sessions; the only phase a session may start from.
    Menu,
    /// A session is running and targets may spawn and resolve.
    Playing,
    /// The song finished; awaiting reset back to the menu.
    GameOver,
}

/// Player-selected difficulty controlling spawn density.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Sparse charts with a generous gap between consecutive spawns.
    Easy,
    /// Moderate charts with a smaller minimum gap.
    Normal,
    /// Every detected beat becomes a spawn.
    Hard,
}

impl Difficulty {
    /// Minimum time in seconds enforced between consecutive spawn events.
    #[must_use]
    pub const fn min_spawn_gap(self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 0.3,
            Difficulty::Hard => 0.0,
        }
    }
}

/// Category assigned to a rhythmic event by the beat analyzers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatCategory {
    /// A deduplicated beat detected by whole-buffer analysis.
    Beat,
    /// A bass-band kick detected by the online analyzer.
    Kick,
    /// A mid-band snare detected by the online analyzer.
    Snare,
    /// A high-band hi-hat detected by the online analyzer.
    HiHat,
}

/// One intensity-tagged rhythmic event inside a [`BeatMap`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatEvent {
    /// Timestamp of the event in seconds from the start of the song.
    pub time: f32,
    /// Kind of rhythmic feature the analyzer attributed to the event.
    pub category: BeatCategory,
    /// Relative loudness of the event, clamped to `[0, 1]`.
    pub intensity: f32,
}

/// Timestamped description of a song's rhythmic structure.
///
/// Created once per song by whole-buffer analysis or uniform synthesis and
/// immutable afterwards. Beat and onset timestamps are strictly increasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatMap {
    bpm: f32,
    beats: Vec<f32>,
    onsets: Vec<f32>,
    events: Vec<BeatEvent>,
}

impl BeatMap {
    /// Creates a beat map from analysis output.
    ///
    /// Callers guarantee that `beats` and `onsets` are strictly increasing
    /// and that `events` follows the same ordering as `beats`.
    #[must_use]
    pub fn new(bpm: f32, beats: Vec<f32>, onsets: Vec<f32>, events: Vec<BeatEvent>) -> Self {
        debug_assert!(beats.windows(2).all(|pair| pair[0] < pair[1]));
        debug_assert!(onsets.windows(2).all(|pair| pair[0] < pair[1]));
        Self {
            bpm,
            beats,
            onsets,
            events,
        }
    }

    /// Synthesizes an evenly spaced beat map at a fixed tempo.
    ///
    /// Every beat is tagged as a full-intensity [`BeatCategory::Beat`] event
    /// so generated charts treat the song as uniformly loud.
    #[must_use]
    pub fn uniform(bpm: f32, duration: f32) -> Self {
        let interval = 60.0 / bpm.max(1.0);
        let mut beats = Vec::new();
        let mut events = Vec::new();
        let mut time = 0.0f32;
        while time < duration {
            beats.push(time);
            events.push(BeatEvent {
                time,
                category: BeatCategory::Beat,
                intensity: 1.0,
            });
            time += interval;
        }
        Self {
            bpm: bpm.max(1.0),
            onsets: beats.clone(),
            beats,
            events,
        }
    }

    /// Estimated global tempo in beats per minute.
    #[must_use]
    pub const fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Deduplicated beat timestamps in seconds, strictly increasing.
    #[must_use]
    pub fn beats(&self) -> &[f32] {
        &self.beats
    }

    /// Raw onset timestamps in seconds, a superset granularity of the beats.
    #[must_use]
    pub fn onsets(&self) -> &[f32] {
        &self.onsets
    }

    /// Intensity-tagged events following the beat ordering.
    #[must_use]
    pub fn events(&self) -> &[BeatEvent] {
        &self.events
    }
}

/// Requirements a single spawned target places on the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Grid cell the target occupies.
    pub cell: GridCell,
    /// Hand that must strike the target.
    pub hand: HandSide,
    /// Slash direction the strike must approximately match.
    pub direction: SlashDirection,
}

/// One chart entry: a timestamp plus one target per assigned hand.
///
/// At least one side is always present; a double block carries both.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Moment in seconds the targets should reach the player plane.
    pub time: f32,
    /// Target assigned to the left hand, if any.
    pub left: Option<TargetSpec>,
    /// Target assigned to the right hand, if any.
    pub right: Option<TargetSpec>,
}

impl SpawnEvent {
    /// Iterates the one or two target specs carried by the event.
    pub fn targets(&self) -> impl Iterator<Item = &TargetSpec> {
        self.left.iter().chain(self.right.iter())
    }
}

/// A generated sequence of spawn events plus the inputs that produced it.
///
/// Charts record their seed and difficulty so a session can be replayed
/// exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    seed: u64,
    difficulty: Difficulty,
    events: Vec<SpawnEvent>,
}

impl Chart {
    /// Creates a chart from generated spawn events.
    #[must_use]
    pub fn new(seed: u64, difficulty: Difficulty, events: Vec<SpawnEvent>) -> Self {
        Self {
            seed,
            difficulty,
            events,
        }
    }

    /// Creates a chart with no spawn events.
    ///
    /// A session driven by an empty chart never spawns targets, which is the
    /// required behavior when no beat map was ever produced.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            seed: 0,
            difficulty: Difficulty::Easy,
            events: Vec::new(),
        }
    }

    /// Seed the chart was generated from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Difficulty the chart was generated for.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Ordered spawn events composing the chart.
    #[must_use]
    pub fn events(&self) -> &[SpawnEvent] {
        &self.events
    }
}

/// Graded outcome of evaluating one slash against one target.
///
/// Produced fresh per collision evaluation and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// Whether the slash registered as a valid hit.
    pub hit: bool,
    /// Combo-multiplied score awarded for the hit.
    pub score: u32,
    /// Angular accuracy of the slash in `[0, 1]`.
    pub angle_accuracy: f32,
    /// Swing-speed accuracy of the slash in `[0, 1]`.
    pub speed_accuracy: f32,
    /// Positional accuracy of the strike point in `[0, 1]`.
    pub position_accuracy: f32,
    /// Whether angular and positional accuracy both cleared the perfect bar.
    pub perfect: bool,
}

impl HitResult {
    /// The silent rejection result: no hit, zero score, zero accuracies.
    #[must_use]
    pub const fn rejected() -> Self {
        Self {
            hit: false,
            score: 0,
            angle_accuracy: 0.0,
            speed_accuracy: 0.0,
            position_accuracy: 0.0,
            perfect: false,
        }
    }
}

/// Resolution state of a live target.
///
/// Exactly one `Pending` to `Hit` or `Missed` transition is permitted;
/// resolution attempts on an already-resolved target are no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetState {
    /// The target is approaching and still eligible for a strike.
    Pending,
    /// The target was struck by a valid slash.
    Hit,
    /// The target crossed the miss plane without being struck.
    Missed,
}

/// Immutable representation of a single live target used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    /// Unique identifier assigned to the target.
    pub id: TargetId,
    /// Requirements the target places on the player.
    pub spec: TargetSpec,
    /// Current world-space position along the approach axis.
    pub position: Vec3,
    /// Resolution state of the target.
    pub state: TargetState,
}

/// Read-only snapshot describing all live targets in the session.
#[derive(Clone, Debug, Default)]
pub struct TargetView {
    snapshots: Vec<TargetSnapshot>,
}

impl TargetView {
    /// Creates a new target view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TargetSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured target snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TargetSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TargetSnapshot> {
        self.snapshots
    }
}

/// Running combo and accuracy counters for one play session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreakState {
    /// Consecutive hits since the last miss.
    pub current: u32,
    /// Highest value `current` reached this session.
    pub max: u32,
    /// Total valid hits this session.
    pub total_hits: u32,
    /// Hits flagged as perfect this session.
    pub perfect_hits: u32,
}

impl StreakState {
    /// Records a successful hit, extending the streak.
    pub fn record_hit(&mut self, perfect: bool) {
        self.current += 1;
        self.max = self.max.max(self.current);
        self.total_hits += 1;
        if perfect {
            self.perfect_hits += 1;
        }
    }

    /// Records a miss, breaking the streak.
    pub fn record_miss(&mut self) {
        self.current = 0;
    }
}

/// Summary of a finished session for the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Total combo-multiplied score accumulated.
    pub score: u32,
    /// Longest hit streak reached.
    pub max_streak: u32,
    /// Number of targets struck successfully.
    pub total_hits: u32,
    /// Number of hits graded perfect.
    pub perfect_hits: u32,
    /// Number of targets that escaped past the miss plane.
    pub misses: u32,
    /// Number of targets spawned over the session.
    pub targets_spawned: u32,
    /// Fraction of resolved targets that were hits, in `[0, 1]`.
    pub accuracy: f32,
}

/// One raw tracking sample delivered by the external landmark detector.
///
/// Absent values mean "not currently tracked", never zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandSample {
    /// Raw left wrist position, if the left hand is tracked this frame.
    pub left_position: Option<Vec3>,
    /// Raw left wrist-to-knuckle direction, if available this frame.
    pub left_direction: Option<Vec3>,
    /// Raw right wrist position, if the right hand is tracked this frame.
    pub right_position: Option<Vec3>,
    /// Raw right wrist-to-knuckle direction, if available this frame.
    pub right_direction: Option<Vec3>,
}

impl HandSample {
    /// Raw position for the requested hand.
    #[must_use]
    pub const fn position(&self, side: HandSide) -> Option<Vec3> {
        match side {
            HandSide::Left => self.left_position,
            HandSide::Right => self.right_position,
        }
    }

    /// Raw direction for the requested hand.
    #[must_use]
    pub const fn direction(&self, side: HandSide) -> Option<Vec3> {
        match side {
            HandSide::Left => self.left_direction,
            HandSide::Right => self.right_direction,
        }
    }
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock to the provided audio playback position.
    Tick {
        /// Playback position of the external audio clock in seconds.
        audio_time: f32,
        /// Wall-clock time elapsed since the previous tick in seconds.
        dt: f32,
    },
    /// Requests the transition from menu into a running session.
    StartSession,
    /// Requests the transition from a running session into game over.
    ///
    /// Scheduled by the audio layer when playback ends and consumed on the
    /// next tick rather than applied from the callback.
    EndSession,
    /// Requests that the session return to the menu, clearing all state.
    ResetSession,
    /// Requests that a chart entry materialize as a live target.
    SpawnTarget {
        /// Requirements the target places on the player.
        spec: TargetSpec,
        /// Moment the target should reach the player plane, in seconds.
        target_time: f32,
    },
    /// Requests that a pending target resolve with the provided grade.
    ResolveTarget {
        /// Identifier of the target being resolved.
        target: TargetId,
        /// Graded outcome produced by the hit scorer.
        result: HitResult,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Playback position after the tick in seconds.
        audio_time: f32,
        /// Elapsed time covered by the tick in seconds.
        dt: f32,
    },
    /// Announces that the session entered a new phase.
    PhaseChanged {
        /// Phase that became active after processing commands.
        phase: GamePhase,
    },
    /// Confirms that a target was materialized into the session.
    TargetSpawned {
        /// Identifier assigned to the new target.
        target: TargetId,
        /// Requirements the target places on the player.
        spec: TargetSpec,
        /// World-space position the target materialized at.
        position: Vec3,
    },
    /// Confirms that a pending target was struck by a valid slash.
    TargetHit {
        /// Identifier of the struck target.
        target: TargetId,
        /// Graded outcome of the strike.
        result: HitResult,
    },
    /// Reports that a pending target crossed the miss plane unresolved.
    TargetMissed {
        /// Identifier of the missed target.
        target: TargetId,
    },
    /// Publishes the final report when a session ends.
    SessionCompleted {
        /// Aggregated score and accuracy summary.
        report: SessionReport,
    },
    /// Reports that a session start was refused outside the menu phase.
    SessionStartRejected {
        /// Phase the session was in when the start was attempted.
        phase: GamePhase,
    },
    /// Reports that a session reset was refused mid-play.
    SessionResetRejected {
        /// Phase the session was in when the reset was attempted.
        phase: GamePhase,
    },
}
