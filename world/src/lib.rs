#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Airslash.
//!
//! The world owns every mutable gameplay record: live targets, the combo
//! streak, score counters, and the session phase. It is mutated exclusively
//! through [`apply`], which executes one [`Command`] and broadcasts the
//! resulting [`Event`] values. Systems never touch the world directly; they
//! read immutable snapshots through [`query`] and respond with new command
//! batches on the next tick.

pub mod query;

use airslash_core::config::{ConfigError, GameplayConfig, GridLayout};
use airslash_core::{
    Command, Event, GamePhase, HitResult, SessionReport, StreakState, TargetId, TargetSnapshot,
    TargetSpec, TargetState,
};
use glam::Vec3;

/// One live target owned by the world.
#[derive(Clone, Copy, Debug)]
struct Target {
    id: TargetId,
    spec: TargetSpec,
    position: Vec3,
    state: TargetState,
}

/// Represents the authoritative Airslash session state.
#[derive(Debug)]
pub struct World {
    pub(crate) phase: GamePhase,
    pub(crate) audio_time: f32,
    pub(crate) targets: Vec<Target>,
    pub(crate) streak: StreakState,
    pub(crate) score: u32,
    pub(crate) misses: u32,
    pub(crate) targets_spawned: u32,
    pub(crate) next_target_id: u32,
    pub(crate) gameplay: GameplayConfig,
    pub(crate) layout: GridLayout,
}

impl World {
    /// Creates a new session world with the reference configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GameplayConfig::default(), GridLayout::default())
            .expect("reference configuration is valid")
    }

    /// Creates a new session world with caller-provided configuration.
    ///
    /// Malformed configuration is the core's only fatal condition and is
    /// rejected here, at construction, never mid-session.
    pub fn with_config(gameplay: GameplayConfig, layout: GridLayout) -> Result<Self, ConfigError> {
        gameplay.validate()?;
        layout.validate()?;
        Ok(Self {
            phase: GamePhase::Menu,
            audio_time: 0.0,
            targets: Vec::new(),
            streak: StreakState::default(),
            score: 0,
            misses: 0,
            targets_spawned: 0,
            next_target_id: 0,
            gameplay,
            layout,
        })
    }

    fn clear_session_state(&mut self) {
        self.audio_time = 0.0;
        self.targets.clear();
        self.streak = StreakState::default();
        self.score = 0;
        self.misses = 0;
        self.targets_spawned = 0;
        self.next_target_id = 0;
    }

    fn report(&self) -> SessionReport {
        let resolved = self.streak.total_hits + self.misses;
        let accuracy = if resolved == 0 {
            0.0
        } else {
            self.streak.total_hits as f32 / resolved as f32
        };
        SessionReport {
            score: self.score,
            max_streak: self.streak.max,
            total_hits: self.streak.total_hits,
            perfect_hits: self.streak.perfect_hits,
            misses: self.misses,
            targets_spawned: self.targets_spawned,
            accuracy,
        }
    }

    fn handle_tick(&mut self, audio_time: f32, dt: f32, out_events: &mut Vec<Event>) {
        self.audio_time = audio_time;
        out_events.push(Event::TimeAdvanced { audio_time, dt });

        if self.phase != GamePhase::Playing {
            return;
        }

        let advance = self.gameplay.approach_speed * dt.max(0.0);
        let miss_z = self.gameplay.miss_z;
        let mut missed = Vec::new();

        self.targets.retain_mut(|target| {
            target.position.z += advance;
            if target.position.z > miss_z {
                missed.push(target.id);
                false
            } else {
                true
            }
        });

        for target in missed {
            self.streak.record_miss();
            self.misses += 1;
            out_events.push(Event::TargetMissed { target });
        }
    }

    fn handle_spawn(&mut self, spec: TargetSpec, target_time: f32, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::Playing {
            return;
        }

        let id = TargetId::new(self.next_target_id);
        self.next_target_id += 1;

        // Position the target so it crosses the player plane exactly at its
        // nominal time, even when the spawn command lands a frame late.
        let mut position = self.layout.world_position(spec.cell);
        position.z = (self.audio_time - target_time) * self.gameplay.approach_speed;

        self.targets.push(Target {
            id,
            spec,
            position,
            state: TargetState::Pending,
        });
        self.targets_spawned += 1;
        out_events.push(Event::TargetSpawned {
            target: id,
            spec,
            position,
        });
    }

    fn handle_resolve(&mut self, target: TargetId, result: HitResult, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::Playing || !result.hit {
            return;
        }

        // A resolved target is removed immediately, so a second resolution
        // attempt finds nothing and is a no-op by construction.
        let Some(index) = self.targets.iter().position(|live| live.id == target) else {
            return;
        };
        if self.targets[index].state != TargetState::Pending {
            return;
        }

        let _ = self.targets.swap_remove(index);
        self.streak.record_hit(result.perfect);
        self.score = self.score.saturating_add(result.score);
        out_events.push(Event::TargetHit { target, result });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes a command against the world and broadcasts resulting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { audio_time, dt } => world.handle_tick(audio_time, dt, out_events),
        Command::StartSession => {
            if world.phase == GamePhase::Menu {
                world.clear_session_state();
                world.phase = GamePhase::Playing;
                out_events.push(Event::PhaseChanged {
                    phase: GamePhase::Playing,
                });
            } else {
                out_events.push(Event::SessionStartRejected { phase: world.phase });
            }
        }
        Command::EndSession => {
            if world.phase == GamePhase::Playing {
                world.phase = GamePhase::GameOver;
                out_events.push(Event::PhaseChanged {
                    phase: GamePhase::GameOver,
                });
                out_events.push(Event::SessionCompleted {
                    report: world.report(),
                });
            }
        }
        Command::ResetSession => {
            // The guard keeps stale targets from a previous session out of
            // scoring: reset is atomic and only legal outside active play.
            if world.phase == GamePhase::Playing {
                out_events.push(Event::SessionResetRejected { phase: world.phase });
            } else {
                world.clear_session_state();
                world.phase = GamePhase::Menu;
                out_events.push(Event::PhaseChanged {
                    phase: GamePhase::Menu,
                });
            }
        }
        Command::SpawnTarget { spec, target_time } => {
            world.handle_spawn(spec, target_time, out_events)
        }
        Command::ResolveTarget { target, result } => {
            world.handle_resolve(target, result, out_events)
        }
    }
}

pub(crate) fn snapshot_targets(world: &World) -> Vec<TargetSnapshot> {
    world
        .targets
        .iter()
        .map(|target| TargetSnapshot {
            id: target.id,
            spec: target.spec,
            position: target.position,
            state: target.state,
        })
        .collect()
}
