#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic flow-aware chart generation from a beat map.
//!
//! The generator carries "last direction, column, and row" state per hand
//! across successive beats so consecutive targets feel physically coherent:
//! columns random-walk inside each hand's half of the grid, rows gravitate
//! toward the middle, and direction pools are biased by row height and by
//! the alternating counterpart of the previous slash. All randomness comes
//! from a ChaCha stream seeded via a hashed (seed, difficulty) pair, so the
//! same inputs always reproduce the same chart.

use airslash_core::{
    BeatMap, Chart, Difficulty, GridCell, HandSide, SlashDirection, SpawnEvent, TargetSpec,
    GRID_ROWS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const RNG_STREAM_CHART: &str = "chart";

/// Intensity above which a beat becomes eligible for a double block.
const DOUBLE_BLOCK_INTENSITY: f32 = 0.7;

/// Base probability of a double block, scaled by the beat's intensity.
const DOUBLE_BLOCK_CHANCE: f64 = 0.4;

/// Probability that a double block mirrors one direction onto both hands.
const MIRROR_CHANCE: f64 = 0.6;

/// Probability that a hand's column stays put for the next target.
const COLUMN_STAY_CHANCE: f64 = 0.7;

/// Probability that a hand's row is pulled toward the middle.
const ROW_PULL_CHANCE: f64 = 0.5;

/// Probability that a hand's row stays put when not pulled.
const ROW_STAY_CHANCE: f64 = 0.25;

/// Weight boost for directions matching the current row's ergonomic bias.
const ROW_BIAS_WEIGHT: f32 = 3.0;

/// Weight multiplier for the alternating counterpart of the last slash.
const FLOW_BOOST: f32 = 2.0;

/// Weight multiplier suppressing an immediate same-direction repeat.
const REPEAT_PENALTY: f32 = 0.5;

const MIDDLE_ROW: u32 = GRID_ROWS / 2;

/// Deterministic chart generator.
///
/// Explicitly constructed with a global seed; every [`generate`] call is a
/// pure function of that seed plus its inputs, so sessions can be replayed
/// without carrying hidden state between songs.
///
/// [`generate`]: PatternGenerator::generate
#[derive(Clone, Copy, Debug)]
pub struct PatternGenerator {
    global_seed: u64,
}

impl PatternGenerator {
    /// Creates a generator rooted at the provided global seed.
    #[must_use]
    pub const fn new(global_seed: u64) -> Self {
        Self { global_seed }
    }

    /// Generates a chart for the beat map at the requested difficulty.
    ///
    /// Beats closer together than the difficulty's minimum gap are greedily
    /// dropped; every surviving beat yields exactly one spawn event with one
    /// or two targets.
    #[must_use]
    pub fn generate(&self, map: &BeatMap, difficulty: Difficulty) -> Chart {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_chart_seed(self.global_seed, difficulty));
        let mut left = HandFlow::new(HandSide::Left);
        let mut right = HandFlow::new(HandSide::Right);

        let min_gap = difficulty.min_spawn_gap();
        let mut last_accepted = f32::NEG_INFINITY;
        let mut events = Vec::new();
        let mut intensity_cursor = 0usize;

        for &beat in map.beats() {
            let intensity = beat_intensity(map, beat, &mut intensity_cursor);
            if beat - last_accepted < min_gap {
                continue;
            }
            last_accepted = beat;

            let double = intensity > DOUBLE_BLOCK_INTENSITY
                && rng.gen_bool(DOUBLE_BLOCK_CHANCE * f64::from(intensity));

            let event = if double {
                spawn_double(beat, &mut left, &mut right, &mut rng)
            } else if rng.gen_bool(0.5) {
                spawn_single(beat, &mut left, &mut rng)
            } else {
                spawn_single(beat, &mut right, &mut rng)
            };
            events.push(event);
        }

        Chart::new(self.global_seed, difficulty, events)
    }
}

/// Flow state carried across successive beats for one hand.
#[derive(Clone, Copy, Debug)]
struct HandFlow {
    side: HandSide,
    last_direction: Option<SlashDirection>,
    column: u32,
    row: u32,
}

impl HandFlow {
    fn new(side: HandSide) -> Self {
        // Start on the inner column at middle height, the natural guard pose.
        let (min_column, max_column) = side.column_bounds();
        let column = match side {
            HandSide::Left => max_column,
            HandSide::Right => min_column,
        };
        Self {
            side,
            last_direction: None,
            column,
            row: MIDDLE_ROW,
        }
    }

    fn advance(&mut self, rng: &mut ChaCha8Rng) -> GridCell {
        self.column = self.next_column(rng);
        self.row = next_row(self.row, rng);
        GridCell::new(self.column, self.row)
    }

    fn next_column(&self, rng: &mut ChaCha8Rng) -> u32 {
        let (min_column, max_column) = self.side.column_bounds();
        if rng.gen_bool(COLUMN_STAY_CHANCE) {
            return self.column;
        }
        let nudged = if rng.gen_bool(0.5) {
            self.column.saturating_sub(1)
        } else {
            self.column + 1
        };
        nudged.clamp(min_column, max_column)
    }
}

/// Row random walk: pulled toward the middle half the time, otherwise
/// staying put or jumping anywhere, preventing both monotony and extremes.
fn next_row(row: u32, rng: &mut ChaCha8Rng) -> u32 {
    if rng.gen_bool(ROW_PULL_CHANCE) {
        return match row.cmp(&MIDDLE_ROW) {
            std::cmp::Ordering::Less => row + 1,
            std::cmp::Ordering::Equal => row,
            std::cmp::Ordering::Greater => row - 1,
        };
    }
    if rng.gen_bool(ROW_STAY_CHANCE / (1.0 - ROW_PULL_CHANCE)) {
        return row;
    }
    rng.gen_range(0..GRID_ROWS)
}

fn spawn_single(beat: f32, flow: &mut HandFlow, rng: &mut ChaCha8Rng) -> SpawnEvent {
    let spec = next_target(flow, rng);
    match flow.side {
        HandSide::Left => SpawnEvent {
            time: beat,
            left: Some(spec),
            right: None,
        },
        HandSide::Right => SpawnEvent {
            time: beat,
            left: None,
            right: Some(spec),
        },
    }
}

fn spawn_double(
    beat: f32,
    left: &mut HandFlow,
    right: &mut HandFlow,
    rng: &mut ChaCha8Rng,
) -> SpawnEvent {
    let left_spec = next_target(left, rng);
    let right_spec = if rng.gen_bool(MIRROR_CHANCE) {
        let cell = right.advance(rng);
        let direction = left_spec.direction.mirrored();
        right.last_direction = Some(direction);
        TargetSpec {
            cell,
            hand: HandSide::Right,
            direction,
        }
    } else {
        next_target(right, rng)
    };

    SpawnEvent {
        time: beat,
        left: Some(left_spec),
        right: Some(right_spec),
    }
}

fn next_target(flow: &mut HandFlow, rng: &mut ChaCha8Rng) -> TargetSpec {
    let cell = flow.advance(rng);
    let direction = choose_direction(cell.row(), flow.last_direction, rng);
    flow.last_direction = Some(direction);
    TargetSpec {
        cell,
        hand: flow.side,
        direction,
    }
}

/// Weighted direction selection biased by row ergonomics and slash flow.
///
/// The bottom row favors downward slashes and the top row upward ones; the
/// middle row stays balanced. The previous direction is suppressed while
/// its vertical counterpart is boosted, approximating an alternating feel.
fn choose_direction(
    row: u32,
    last: Option<SlashDirection>,
    rng: &mut ChaCha8Rng,
) -> SlashDirection {
    let favored: &[SlashDirection] = if row == 0 {
        &[
            SlashDirection::Down,
            SlashDirection::DownLeft,
            SlashDirection::DownRight,
        ]
    } else if row == GRID_ROWS - 1 {
        &[
            SlashDirection::Up,
            SlashDirection::UpLeft,
            SlashDirection::UpRight,
        ]
    } else {
        &[]
    };

    let mut pool: Vec<(SlashDirection, f32)> = SlashDirection::ALL
        .iter()
        .copied()
        .filter(|direction| *direction != SlashDirection::Any)
        .map(|direction| {
            let mut weight = 1.0;
            if favored.contains(&direction) {
                weight *= ROW_BIAS_WEIGHT;
            }
            (direction, weight)
        })
        .collect();

    if let Some(previous) = last {
        for (direction, weight) in &mut pool {
            if *direction == previous {
                *weight *= REPEAT_PENALTY;
            } else if *direction == previous.flipped() {
                *weight *= FLOW_BOOST;
            }
        }
    }

    weighted_choice(&pool, rng)
}

fn weighted_choice(pool: &[(SlashDirection, f32)], rng: &mut ChaCha8Rng) -> SlashDirection {
    let total: f32 = pool.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen::<f32>() * total;
    for &(direction, weight) in pool {
        roll -= weight;
        if roll <= 0.0 {
            return direction;
        }
    }
    // Floating-point residue can leave a sliver of roll unconsumed.
    pool[pool.len() - 1].0
}

/// Intensity of the event matching this beat, advancing a shared cursor.
///
/// Beats without a tagged event fall back to zero intensity, which keeps
/// them ineligible for double blocks.
fn beat_intensity(map: &BeatMap, beat: f32, cursor: &mut usize) -> f32 {
    let events = map.events();
    while *cursor < events.len() && events[*cursor].time < beat - 1e-4 {
        *cursor += 1;
    }
    match events.get(*cursor) {
        Some(event) if (event.time - beat).abs() <= 1e-4 => event.intensity.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn derive_chart_seed(global_seed: u64, difficulty: Difficulty) -> u64 {
    let tag: u8 = match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Normal => 1,
        Difficulty::Hard => 2,
    };
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update([tag]);
    hasher.update(RNG_STREAM_CHART.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}
