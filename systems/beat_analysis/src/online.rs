//! Streaming beat detection over per-frame frequency-domain snapshots.

use std::collections::VecDeque;

use airslash_core::config::ConfigError;
use airslash_core::{BeatCategory, BeatEvent, BeatMap};
use tracing::debug;

use crate::tempo;

/// Band magnitudes below this floor are treated as silence.
const BAND_EPSILON: f32 = 1e-6;

/// Number of recent kick timestamps retained for tempo estimation.
const KICK_MEMORY: usize = 32;

/// Tuning for the online per-frame analyzer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnsetConfig {
    /// Multiple of the rolling bass average a kick must exceed.
    pub kick_sensitivity: f32,
    /// Multiple of the previous frame's bass energy a kick must exceed.
    pub kick_rise_ratio: f32,
    /// Frame-to-frame mid-band ratio that fires a snare.
    pub snare_ratio: f32,
    /// Frame-to-frame high-band ratio that fires a hi-hat.
    pub hihat_ratio: f32,
    /// Span of the rolling bass-energy history in seconds.
    pub history_secs: f32,
    /// Fraction of FFT bins, from the bottom, forming the bass band.
    pub bass_fraction: f32,
    /// Fraction of FFT bins up to which the mid band extends.
    pub mid_fraction: f32,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            kick_sensitivity: 1.4,
            kick_rise_ratio: 1.1,
            snare_ratio: 1.5,
            hihat_ratio: 1.4,
            history_secs: 1.0,
            bass_fraction: 1.0 / 16.0,
            mid_fraction: 0.25,
        }
    }
}

impl OnsetConfig {
    /// Validates the configuration, rejecting degenerate band splits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("kick_sensitivity", self.kick_sensitivity),
            ("kick_rise_ratio", self.kick_rise_ratio),
            ("snare_ratio", self.snare_ratio),
            ("hihat_ratio", self.hihat_ratio),
            ("history_secs", self.history_secs),
            ("bass_fraction", self.bass_fraction),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.bass_fraction >= self.mid_fraction || self.mid_fraction > 1.0 {
            return Err(ConfigError::InvertedWindow {
                field: "band_split",
                near: self.bass_fraction,
                far: self.mid_fraction,
            });
        }
        Ok(())
    }
}

/// Onsets detected in one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOnsets {
    /// A bass-band kick fired this frame.
    pub kick: bool,
    /// A mid-band snare fired this frame.
    pub snare: bool,
    /// A high-band hi-hat fired this frame.
    pub hihat: bool,
    /// Rolling tempo estimate from recent kicks, fallback until warm.
    pub bpm: f32,
}

/// Streaming analyzer fed one FFT magnitude snapshot per rendered frame.
///
/// Maintains a rolling history of bass energies for an adaptive kick
/// threshold; snares and hi-hats use simpler frame-to-frame ratio gates on
/// the mid and high bands. Every detection is accumulated as an
/// intensity-tagged [`BeatEvent`] so a live session can still drive
/// difficulty-aware pattern generation.
#[derive(Clone, Debug)]
pub struct OnsetDetector {
    config: OnsetConfig,
    bass_history: VecDeque<(f32, f32)>,
    bass_sum: f32,
    previous_bass: f32,
    previous_mid: f32,
    previous_high: f32,
    kick_times: VecDeque<f32>,
    events: Vec<BeatEvent>,
}

impl OnsetDetector {
    /// Creates a detector with validated configuration.
    pub fn new(config: OnsetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            bass_history: VecDeque::new(),
            bass_sum: 0.0,
            previous_bass: 0.0,
            previous_mid: 0.0,
            previous_high: 0.0,
            kick_times: VecDeque::with_capacity(KICK_MEMORY),
            events: Vec::new(),
        })
    }

    /// Consumes one frame's FFT magnitude snapshot.
    ///
    /// `time` is the audio playback position of the frame in seconds and
    /// must be non-decreasing across calls. An empty spectrum reports no
    /// onsets and never divides by zero.
    pub fn analyze(&mut self, spectrum: &[f32], time: f32) -> FrameOnsets {
        let (bass, mid, high) = self.band_means(spectrum);

        let average = if self.bass_history.is_empty() {
            0.0
        } else {
            self.bass_sum / self.bass_history.len() as f32
        };

        let kick = !self.bass_history.is_empty()
            && bass > average * self.config.kick_sensitivity
            && bass > self.previous_bass * self.config.kick_rise_ratio;
        let snare = self.previous_mid > BAND_EPSILON && mid > self.previous_mid * self.config.snare_ratio;
        let hihat =
            self.previous_high > BAND_EPSILON && high > self.previous_high * self.config.hihat_ratio;

        if kick {
            if self.kick_times.len() == KICK_MEMORY {
                let _ = self.kick_times.pop_front();
            }
            self.kick_times.push_back(time);
            self.push_event(time, BeatCategory::Kick, band_intensity(bass, average));
        }
        if snare {
            self.push_event(
                time,
                BeatCategory::Snare,
                ratio_intensity(mid, self.previous_mid, self.config.snare_ratio),
            );
        }
        if hihat {
            self.push_event(
                time,
                BeatCategory::HiHat,
                ratio_intensity(high, self.previous_high, self.config.hihat_ratio),
            );
        }

        self.bass_sum += bass;
        self.bass_history.push_back((time, bass));
        while let Some(&(oldest, energy)) = self.bass_history.front() {
            if time - oldest <= self.config.history_secs {
                break;
            }
            self.bass_sum -= energy;
            let _ = self.bass_history.pop_front();
        }

        self.previous_bass = bass;
        self.previous_mid = mid;
        self.previous_high = high;

        FrameOnsets {
            kick,
            snare,
            hihat,
            bpm: self.bpm(),
        }
    }

    /// Rolling tempo estimate from recent kick timestamps.
    ///
    /// Reports the fallback tempo until enough plausible intervals exist.
    #[must_use]
    pub fn bpm(&self) -> f32 {
        let kicks: Vec<f32> = self.kick_times.iter().copied().collect();
        tempo::bpm_from_beats(&kicks)
    }

    /// Every intensity-tagged event detected so far, in arrival order.
    #[must_use]
    pub fn events(&self) -> &[BeatEvent] {
        &self.events
    }

    /// Finalizes the session's detections into an immutable [`BeatMap`].
    ///
    /// Kicks become the beats; every detection contributes to the onset
    /// list at its first occurrence.
    #[must_use]
    pub fn into_beat_map(self) -> BeatMap {
        let beats: Vec<f32> = self.kick_times.iter().copied().collect();
        let mut onsets: Vec<f32> = self.events.iter().map(|event| event.time).collect();
        onsets.sort_by(f32::total_cmp);
        onsets.dedup();
        let bpm = tempo::bpm_from_beats(&beats);
        debug!(
            beats = beats.len(),
            onsets = onsets.len(),
            bpm,
            "online analysis finalized"
        );
        BeatMap::new(bpm, beats, onsets, self.events)
    }

    /// Clears all rolling state for a new song.
    pub fn reset(&mut self) {
        self.bass_history.clear();
        self.bass_sum = 0.0;
        self.previous_bass = 0.0;
        self.previous_mid = 0.0;
        self.previous_high = 0.0;
        self.kick_times.clear();
        self.events.clear();
    }

    fn push_event(&mut self, time: f32, category: BeatCategory, intensity: f32) {
        self.events.push(BeatEvent {
            time,
            category,
            intensity,
        });
    }

    /// Mean magnitudes of the bass, mid, and high bins.
    fn band_means(&self, spectrum: &[f32]) -> (f32, f32, f32) {
        if spectrum.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let len = spectrum.len();
        let bass_end = ((len as f32 * self.config.bass_fraction) as usize).clamp(1, len);
        let mid_end = ((len as f32 * self.config.mid_fraction) as usize).clamp(bass_end, len);
        (
            mean(&spectrum[..bass_end]),
            mean(&spectrum[bass_end..mid_end]),
            mean(&spectrum[mid_end..]),
        )
    }
}

fn mean(bins: &[f32]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().sum::<f32>() / bins.len() as f32
}

/// Kick loudness relative to twice the rolling average, in `[0, 1]`.
fn band_intensity(energy: f32, average: f32) -> f32 {
    if average <= BAND_EPSILON {
        return 1.0;
    }
    (energy / (average * 2.0)).clamp(0.0, 1.0)
}

/// How far past its ratio gate a band jumped, in `[0, 1]`.
fn ratio_intensity(energy: f32, previous: f32, gate: f32) -> f32 {
    if previous <= BAND_EPSILON {
        return 1.0;
    }
    ((energy / previous) / (gate * 2.0)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::{OnsetConfig, OnsetDetector};
    use airslash_core::BeatCategory;
    use crate::FALLBACK_BPM;

    const FRAME_DT: f32 = 1.0 / 60.0;
    const BINS: usize = 64;

    fn detector() -> OnsetDetector {
        OnsetDetector::new(OnsetConfig::default()).expect("valid config")
    }

    fn quiet_frame() -> Vec<f32> {
        vec![0.1; BINS]
    }

    fn kick_frame() -> Vec<f32> {
        let mut spectrum = vec![0.1; BINS];
        for bin in spectrum.iter_mut().take(BINS / 16) {
            *bin = 1.0;
        }
        spectrum
    }

    #[test]
    fn empty_spectrum_reports_nothing() {
        let mut detector = detector();
        let onsets = detector.analyze(&[], 0.0);
        assert!(!onsets.kick && !onsets.snare && !onsets.hihat);
        assert_eq!(onsets.bpm, FALLBACK_BPM);
        assert!(onsets.bpm.is_finite());
    }

    #[test]
    fn bass_spikes_over_a_quiet_floor_fire_kicks() {
        let mut detector = detector();
        let mut kicks = Vec::new();
        for frame in 0..240 {
            let time = frame as f32 * FRAME_DT;
            let spike = frame > 0 && frame % 30 == 0;
            let spectrum = if spike { kick_frame() } else { quiet_frame() };
            let onsets = detector.analyze(&spectrum, time);
            if onsets.kick {
                kicks.push(time);
            }
        }
        assert_eq!(kicks.len(), 7);
        assert_eq!(detector.bpm(), 120.0);
    }

    #[test]
    fn sustained_bass_does_not_retrigger() {
        let mut detector = detector();
        let _ = detector.analyze(&quiet_frame(), 0.0);
        let first = detector.analyze(&kick_frame(), FRAME_DT);
        let second = detector.analyze(&kick_frame(), 2.0 * FRAME_DT);
        assert!(first.kick);
        assert!(!second.kick);
    }

    #[test]
    fn mid_band_jump_fires_a_snare() {
        let mut detector = detector();
        let _ = detector.analyze(&quiet_frame(), 0.0);

        let mut spectrum = quiet_frame();
        for bin in spectrum.iter_mut().take(BINS / 4).skip(BINS / 16) {
            *bin = 0.8;
        }
        let onsets = detector.analyze(&spectrum, FRAME_DT);
        assert!(onsets.snare);
        assert!(!onsets.kick);
    }

    #[test]
    fn high_band_jump_fires_a_hihat() {
        let mut detector = detector();
        let _ = detector.analyze(&quiet_frame(), 0.0);

        let mut spectrum = quiet_frame();
        for bin in spectrum.iter_mut().skip(BINS / 4) {
            *bin = 0.5;
        }
        let onsets = detector.analyze(&spectrum, FRAME_DT);
        assert!(onsets.hihat);
    }

    #[test]
    fn events_carry_clamped_intensities() {
        let mut detector = detector();
        for frame in 0..120 {
            let time = frame as f32 * FRAME_DT;
            let spectrum = if frame > 0 && frame % 30 == 0 {
                kick_frame()
            } else {
                quiet_frame()
            };
            let _ = detector.analyze(&spectrum, time);
        }
        assert!(!detector.events().is_empty());
        for event in detector.events() {
            assert!((0.0..=1.0).contains(&event.intensity));
            assert_eq!(event.category, BeatCategory::Kick);
        }
    }

    #[test]
    fn finalized_beat_map_orders_onsets() {
        let mut detector = detector();
        for frame in 0..240 {
            let time = frame as f32 * FRAME_DT;
            let spectrum = if frame > 0 && frame % 30 == 0 {
                kick_frame()
            } else {
                quiet_frame()
            };
            let _ = detector.analyze(&spectrum, time);
        }
        let map = detector.into_beat_map();
        assert_eq!(map.bpm(), 120.0);
        assert!(map.beats().windows(2).all(|pair| pair[0] < pair[1]));
        assert!(map.onsets().windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn inverted_band_split_fails_construction() {
        let config = OnsetConfig {
            bass_fraction: 0.5,
            mid_fraction: 0.25,
            ..OnsetConfig::default()
        };
        assert!(OnsetDetector::new(config).is_err());
    }

    #[test]
    fn reset_clears_rolling_state() {
        let mut detector = detector();
        let _ = detector.analyze(&quiet_frame(), 0.0);
        let _ = detector.analyze(&kick_frame(), FRAME_DT);
        detector.reset();
        assert!(detector.events().is_empty());
        assert_eq!(detector.bpm(), FALLBACK_BPM);
    }
}
