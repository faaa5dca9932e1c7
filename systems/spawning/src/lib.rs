#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn scheduler that ties the chart to the audio clock.
//!
//! Targets must reach the player plane exactly on their chart timestamp, so
//! each entry materializes one travel-time ahead of it: the system walks the
//! chart with a cursor and emits [`Command::SpawnTarget`] for every entry
//! whose time has entered the lookahead horizon of the latest tick.

use airslash_core::config::GameplayConfig;
use airslash_core::{Chart, Command, Event, GamePhase};

/// Pure system that emits spawn commands for chart entries as they fall due.
#[derive(Clone, Debug)]
pub struct Spawning {
    chart: Chart,
    cursor: usize,
}

impl Spawning {
    /// Creates a scheduler over the provided chart.
    #[must_use]
    pub fn new(chart: Chart) -> Self {
        Self { chart, cursor: 0 }
    }

    /// Replaces the chart and rewinds the cursor for a new song.
    pub fn set_chart(&mut self, chart: Chart) {
        self.chart = chart;
        self.cursor = 0;
    }

    /// Chart currently being scheduled.
    #[must_use]
    pub const fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Consumes world events and emits spawn commands for due entries.
    ///
    /// Spawn timing derives from the audio clock carried by
    /// [`Event::TimeAdvanced`]: an entry is due once
    /// `audio_time + spawn_distance / approach_speed` reaches its timestamp.
    /// Phase transitions rewind the cursor so a restarted session replays
    /// the chart from the top.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: GamePhase,
        config: &GameplayConfig,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::PhaseChanged { .. } = event {
                self.cursor = 0;
            }
        }

        if phase != GamePhase::Playing {
            return;
        }

        let lookahead = config.travel_time();
        for event in events {
            let Event::TimeAdvanced { audio_time, .. } = event else {
                continue;
            };

            let horizon = audio_time + lookahead;
            while let Some(entry) = self.chart.events().get(self.cursor) {
                if entry.time > horizon {
                    break;
                }
                for spec in entry.targets() {
                    out.push(Command::SpawnTarget {
                        spec: *spec,
                        target_time: entry.time,
                    });
                }
                self.cursor += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Spawning;
    use airslash_core::config::GameplayConfig;
    use airslash_core::{
        Chart, Command, Difficulty, Event, GamePhase, GridCell, HandSide, SlashDirection,
        SpawnEvent, TargetSpec,
    };

    fn spec(hand: HandSide) -> TargetSpec {
        TargetSpec {
            cell: GridCell::new(if hand == HandSide::Left { 1 } else { 2 }, 1),
            hand,
            direction: SlashDirection::Down,
        }
    }

    fn chart(times: &[f32]) -> Chart {
        let events = times
            .iter()
            .map(|&time| SpawnEvent {
                time,
                left: Some(spec(HandSide::Left)),
                right: None,
            })
            .collect();
        Chart::new(1, Difficulty::Hard, events)
    }

    fn tick(audio_time: f32) -> Event {
        Event::TimeAdvanced {
            audio_time,
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn entries_spawn_one_travel_time_early() {
        let config = GameplayConfig::default();
        let mut spawning = Spawning::new(chart(&[2.0, 5.0]));
        let mut out = Vec::new();

        spawning.handle(&[tick(0.0)], GamePhase::Playing, &config, &mut out);

        // travel_time is 2.0 s, so only the first entry is due at t = 0.
        assert_eq!(out.len(), 1);
        assert!(matches!(
            out[0],
            Command::SpawnTarget { target_time, .. } if target_time == 2.0
        ));
    }

    #[test]
    fn entries_are_emitted_exactly_once() {
        let config = GameplayConfig::default();
        let mut spawning = Spawning::new(chart(&[1.0]));
        let mut out = Vec::new();

        spawning.handle(&[tick(0.0)], GamePhase::Playing, &config, &mut out);
        spawning.handle(&[tick(0.02)], GamePhase::Playing, &config, &mut out);

        assert_eq!(out.len(), 1);
    }

    #[test]
    fn double_blocks_emit_two_spawn_commands() {
        let config = GameplayConfig::default();
        let event = SpawnEvent {
            time: 0.5,
            left: Some(spec(HandSide::Left)),
            right: Some(spec(HandSide::Right)),
        };
        let mut spawning = Spawning::new(Chart::new(1, Difficulty::Hard, vec![event]));
        let mut out = Vec::new();

        spawning.handle(&[tick(0.0)], GamePhase::Playing, &config, &mut out);

        assert_eq!(out.len(), 2);
    }

    #[test]
    fn menu_phase_is_silent() {
        let config = GameplayConfig::default();
        let mut spawning = Spawning::new(chart(&[0.5]));
        let mut out = Vec::new();

        spawning.handle(&[tick(0.0)], GamePhase::Menu, &config, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn phase_change_rewinds_the_cursor() {
        let config = GameplayConfig::default();
        let mut spawning = Spawning::new(chart(&[1.0]));
        let mut out = Vec::new();

        spawning.handle(&[tick(0.0)], GamePhase::Playing, &config, &mut out);
        assert_eq!(out.len(), 1);

        let restart = [
            Event::PhaseChanged {
                phase: GamePhase::Playing,
            },
            tick(0.0),
        ];
        spawning.handle(&restart, GamePhase::Playing, &config, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn empty_chart_never_spawns() {
        let config = GameplayConfig::default();
        let mut spawning = Spawning::new(Chart::empty());
        let mut out = Vec::new();

        for frame in 0..600 {
            spawning.handle(
                &[tick(frame as f32 / 60.0)],
                GamePhase::Playing,
                &config,
                &mut out,
            );
        }

        assert!(out.is_empty());
    }
}
