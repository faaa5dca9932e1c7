#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the Airslash gameplay pipeline.
//!
//! Synthesizes a click track, analyzes it into a beat map, generates a
//! chart, and simulates a full session at 60 frames per second with a
//! scripted player whose hands sweep through each approaching target. The
//! resulting session report is printed; this stands in for the excluded
//! rendering, audio, and camera layers.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use airslash_beat_analysis::{analyze_buffer, AnalysisConfig, OnsetConfig, OnsetDetector};
use airslash_core::config::{ScoringConfig, SmoothingConfig};
use airslash_core::{
    Chart, Command, Difficulty, Event, HandSample, HandSide, SessionReport, TargetState,
    TargetView,
};
use airslash_system_collision::Collision;
use airslash_system_kinematics::KinematicSmoother;
use airslash_system_pattern_gen::PatternGenerator;
use airslash_system_spawning::Spawning;
use airslash_world::{self as world, query, World};

const SAMPLE_RATE: u32 = 44_100;
const FRAME_DT: f32 = 1.0 / 60.0;

/// Chart difficulty selectable from the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    /// Sparse chart with a 0.5 s minimum spawn gap.
    Easy,
    /// Moderate chart with a 0.3 s minimum spawn gap.
    Normal,
    /// One spawn per detected beat.
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Command-line arguments for the headless session driver.
#[derive(Debug, Parser)]
#[command(name = "airslash", about = "Headless Airslash session driver")]
struct Args {
    /// Tempo of the synthesized click track in beats per minute.
    #[arg(long, default_value_t = 120.0)]
    bpm: f32,

    /// Length of the synthesized song in seconds.
    #[arg(long, default_value_t = 30.0)]
    duration: f32,

    /// Chart difficulty.
    #[arg(long, value_enum, default_value = "normal")]
    difficulty: DifficultyArg,

    /// Seed shared by chart generation and the scripted player's jitter.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Also exercise the online analyzer over synthetic spectra.
    #[arg(long)]
    online: bool,
}

/// Entry point for the Airslash command-line driver.
fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let samples = synthesize_click_track(args.bpm, args.duration);
    let map = analyze_buffer(&samples, SAMPLE_RATE, &AnalysisConfig::default());
    info!(
        bpm = map.bpm(),
        beats = map.beats().len(),
        "click track analyzed"
    );

    let generator = PatternGenerator::new(args.seed);
    let chart = generator.generate(&map, args.difficulty.into());
    info!(
        events = chart.events().len(),
        difficulty = ?chart.difficulty(),
        "chart generated"
    );

    let report = run_session(chart, args.seed)?;
    println!(
        "score {}  hits {}/{}  perfect {}  max streak {}  accuracy {:.1}%",
        report.score,
        report.total_hits,
        report.targets_spawned,
        report.perfect_hits,
        report.max_streak,
        report.accuracy * 100.0,
    );

    if args.online {
        demo_online(args.bpm, args.duration)?;
    }

    Ok(())
}

/// Builds a mono buffer with a 10 ms full-scale click on every beat.
fn synthesize_click_track(bpm: f32, duration: f32) -> Vec<f32> {
    let total = (duration * SAMPLE_RATE as f32) as usize;
    let click_len = SAMPLE_RATE as usize / 100;
    let interval = 60.0 / bpm.max(1.0);

    let mut samples = vec![0.0f32; total];
    let mut click_start = 0.0f32;
    while click_start < duration {
        let start = (click_start * SAMPLE_RATE as f32) as usize;
        for sample in samples.iter_mut().skip(start).take(click_len) {
            *sample = 1.0;
        }
        click_start += interval;
    }
    samples
}

/// Simulates one full session over the chart with a scripted player.
fn run_session(chart: Chart, seed: u64) -> Result<SessionReport> {
    let song_end = chart
        .events()
        .last()
        .map_or(0.0, |event| event.time);

    let mut world = World::new();
    let mut spawning = Spawning::new(chart);
    let mut collision = Collision::new();
    let mut smoother = KinematicSmoother::new(SmoothingConfig::default())?;
    let scoring = ScoringConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);

    let stop_time = song_end + query::gameplay_config(&world).travel_time() + 2.0;
    let mut audio_time = 0.0f32;

    loop {
        audio_time += FRAME_DT;

        // Kinematics first: collision later this frame reads fresh state.
        let sample = scripted_sample(&query::target_view(&world), &mut rng);
        smoother.update(&sample, FRAME_DT);

        events.clear();
        world::apply(
            &mut world,
            Command::Tick {
                audio_time,
                dt: FRAME_DT,
            },
            &mut events,
        );

        // Spawn materialization precedes the collision pass so a target is
        // evaluated no later than one frame after its nominal spawn time.
        let mut commands = Vec::new();
        spawning.handle(
            &events,
            query::phase(&world),
            query::gameplay_config(&world),
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        let streak = query::streak(&world);
        collision.handle(
            query::phase(&world),
            &smoother,
            &query::target_view(&world),
            &streak,
            query::gameplay_config(&world),
            &scoring,
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        if audio_time >= stop_time {
            events.clear();
            world::apply(&mut world, Command::EndSession, &mut events);
            for event in &events {
                if let Event::SessionCompleted { report } = event {
                    return Ok(*report);
                }
            }
            anyhow::bail!("session ended without a report");
        }
    }
}

/// Scripted player: each hand sweeps through its nearest approaching target
/// along the required direction, with a little tracking jitter on top.
fn scripted_sample(targets: &TargetView, rng: &mut ChaCha8Rng) -> HandSample {
    let mut sample = HandSample::default();
    for side in HandSide::BOTH {
        let nearest = targets
            .iter()
            .filter(|target| {
                target.spec.hand == side
                    && target.state == TargetState::Pending
                    && target.position.z > -4.0
            })
            .max_by(|a, b| a.position.z.total_cmp(&b.position.z));

        let position = match nearest {
            Some(target) => {
                let planar = target.spec.direction.unit_xy().unwrap_or(Vec2::Y);
                let sweep = Vec3::new(planar.x, planar.y, 0.0) * (target.position.z * 0.5);
                target.position + sweep
            }
            None => SmoothingConfig::default().rest_position,
        };
        let jitter = Vec3::new(
            rng.gen_range(-0.01..0.01),
            rng.gen_range(-0.01..0.01),
            rng.gen_range(-0.01..0.01),
        );

        match side {
            HandSide::Left => {
                sample.left_position = Some(position + jitter);
                sample.left_direction = Some(Vec3::Z);
            }
            HandSide::Right => {
                sample.right_position = Some(position + jitter);
                sample.right_direction = Some(Vec3::Z);
            }
        }
    }
    sample
}

/// Feeds synthetic spectra to the online detector and reports what it heard.
fn demo_online(bpm: f32, duration: f32) -> Result<()> {
    const BINS: usize = 64;
    let mut detector = OnsetDetector::new(OnsetConfig::default())?;
    let interval = 60.0 / bpm.max(1.0);

    let mut kicks = 0u32;
    let mut next_beat = interval;
    let frames = (duration / FRAME_DT) as usize;
    for frame in 0..frames {
        let time = frame as f32 * FRAME_DT;
        let mut spectrum = vec![0.1f32; BINS];
        if time >= next_beat {
            next_beat += interval;
            for bin in spectrum.iter_mut().take(BINS / 16) {
                *bin = 1.0;
            }
        }
        if detector.analyze(&spectrum, time).kick {
            kicks += 1;
        }
    }

    info!(kicks, bpm_estimate = detector.bpm(), "online analysis demo");
    Ok(())
}
