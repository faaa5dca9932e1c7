//! Whole-buffer beat analysis over a decoded mono signal.

use std::collections::VecDeque;

use airslash_core::config::ConfigError;
use airslash_core::{BeatCategory, BeatEvent, BeatMap};
use tracing::debug;

use crate::tempo;
use crate::FALLBACK_BPM;

/// Tuning for offline whole-buffer analysis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalysisConfig {
    /// Length of the sliding RMS window in seconds.
    pub window_secs: f32,
    /// Span of the trailing energy history backing the adaptive threshold.
    pub history_secs: f32,
    /// Multiple of the trailing average an onset must exceed.
    pub threshold_ratio: f32,
    /// Multiple of the immediately preceding window an onset must exceed.
    pub rise_ratio: f32,
    /// Minimum gap between deduplicated beats in seconds.
    pub min_beat_gap: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_secs: 0.023,
            history_secs: 1.0,
            threshold_ratio: 1.5,
            rise_ratio: 1.3,
            min_beat_gap: 0.1,
        }
    }
}

impl AnalysisConfig {
    /// Validates the configuration, rejecting degenerate window geometry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("window_secs", self.window_secs),
            ("history_secs", self.history_secs),
            ("threshold_ratio", self.threshold_ratio),
            ("rise_ratio", self.rise_ratio),
            ("min_beat_gap", self.min_beat_gap),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}

/// Analyzes a whole decoded mono buffer into an immutable [`BeatMap`].
///
/// A sliding RMS window with 50% hop walks the signal; each window's energy
/// is compared against an adaptive threshold formed from roughly one second
/// of trailing energies plus a rise gate on the immediately preceding
/// window. Flagged windows become onsets, onsets separated by at least the
/// configured gap become beats, and the beats feed the interval-filtered
/// tempo estimator.
///
/// An empty or silent buffer yields an empty beat list and the fallback
/// tempo; the function never panics and never produces NaN.
#[must_use]
pub fn analyze_buffer(samples: &[f32], sample_rate: u32, config: &AnalysisConfig) -> BeatMap {
    if samples.is_empty() || sample_rate == 0 {
        debug!(
            samples = samples.len(),
            sample_rate, "nothing to analyze, falling back to default tempo"
        );
        return BeatMap::new(FALLBACK_BPM, Vec::new(), Vec::new(), Vec::new());
    }

    let window_len = ((sample_rate as f32 * config.window_secs) as usize).max(1);
    let hop = (window_len / 2).max(1);
    let hop_secs = hop as f32 / sample_rate as f32;
    let history_windows = ((config.history_secs / hop_secs) as usize).max(1);

    let mut history: VecDeque<f32> = VecDeque::with_capacity(history_windows);
    let mut history_sum = 0.0f32;
    let mut previous_energy = 0.0f32;

    let mut onsets = Vec::new();
    let mut beats = Vec::new();
    let mut events = Vec::new();
    let mut last_beat = f32::NEG_INFINITY;

    let mut start = 0usize;
    while start + window_len <= samples.len() {
        let energy = rms(&samples[start..start + window_len]);
        let time = (start + window_len / 2) as f32 / sample_rate as f32;

        let average = if history.is_empty() {
            0.0
        } else {
            history_sum / history.len() as f32
        };

        if energy > average * config.threshold_ratio && energy > previous_energy * config.rise_ratio
        {
            onsets.push(time);
            if time - last_beat >= config.min_beat_gap {
                beats.push(time);
                events.push(BeatEvent {
                    time,
                    category: BeatCategory::Beat,
                    intensity: relative_intensity(energy, average),
                });
                last_beat = time;
            }
        }

        history_sum += energy;
        history.push_back(energy);
        if history.len() > history_windows {
            if let Some(evicted) = history.pop_front() {
                history_sum -= evicted;
            }
        }
        previous_energy = energy;
        start += hop;
    }

    let bpm = tempo::bpm_from_beats(&beats);
    debug!(
        beats = beats.len(),
        onsets = onsets.len(),
        bpm,
        "offline analysis complete"
    );
    BeatMap::new(bpm, beats, onsets, events)
}

/// Root-mean-square energy of one window.
fn rms(window: &[f32]) -> f32 {
    let sum: f32 = window.iter().map(|sample| sample * sample).sum();
    (sum / window.len() as f32).sqrt()
}

/// Loudness of an onset relative to twice the adaptive average, in `[0, 1]`.
///
/// A near-silent trailing average means the onset towers over the floor, so
/// it is reported at full intensity.
fn relative_intensity(energy: f32, average: f32) -> f32 {
    if average <= f32::EPSILON {
        return 1.0;
    }
    (energy / (average * 2.0)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::{analyze_buffer, AnalysisConfig};
    use crate::FALLBACK_BPM;

    const SAMPLE_RATE: u32 = 8_000;

    /// Builds a buffer of `duration` seconds with 10 ms full-scale clicks at
    /// the provided interval over a silent floor.
    fn click_track(duration: f32, interval: f32) -> Vec<f32> {
        let total = (duration * SAMPLE_RATE as f32) as usize;
        let click_len = SAMPLE_RATE as usize / 100;
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

    #[test]
    fn silent_buffer_falls_back_without_beats() {
        let samples = vec![0.0f32; SAMPLE_RATE as usize * 2];
        let map = analyze_buffer(&samples, SAMPLE_RATE, &AnalysisConfig::default());
        assert!(map.beats().is_empty());
        assert_eq!(map.bpm(), FALLBACK_BPM);
        assert!(map.bpm().is_finite());
    }

    #[test]
    fn empty_buffer_falls_back() {
        let map = analyze_buffer(&[], SAMPLE_RATE, &AnalysisConfig::default());
        assert!(map.beats().is_empty());
        assert_eq!(map.bpm(), FALLBACK_BPM);
    }

    #[test]
    fn click_track_recovers_its_tempo() {
        // A 25 ms window puts the 12.5 ms hop exactly on the click spacing,
        // so detected beats land on the true click times.
        let config = AnalysisConfig {
            window_secs: 0.025,
            ..AnalysisConfig::default()
        };
        let samples = click_track(4.0, 0.5);
        let map = analyze_buffer(&samples, SAMPLE_RATE, &config);
        assert_eq!(map.bpm(), 120.0);
        assert_eq!(map.beats().len(), 8);
    }

    #[test]
    fn beats_and_onsets_are_strictly_increasing() {
        let samples = click_track(3.0, 0.4);
        let map = analyze_buffer(&samples, SAMPLE_RATE, &AnalysisConfig::default());
        assert!(map.beats().windows(2).all(|pair| pair[0] < pair[1]));
        assert!(map.onsets().windows(2).all(|pair| pair[0] < pair[1]));
        assert!(map.onsets().len() >= map.beats().len());
    }

    #[test]
    fn loud_onsets_over_a_quiet_floor_are_full_intensity() {
        let samples = click_track(2.0, 0.5);
        let map = analyze_buffer(&samples, SAMPLE_RATE, &AnalysisConfig::default());
        assert!(!map.events().is_empty());
        for event in map.events() {
            assert!(event.intensity > 0.9);
            assert!(event.intensity <= 1.0);
        }
    }

    #[test]
    fn buffer_shorter_than_one_window_is_empty() {
        let samples = vec![0.5f32; 8];
        let map = analyze_buffer(&samples, SAMPLE_RATE, &AnalysisConfig::default());
        assert!(map.beats().is_empty());
        assert_eq!(map.bpm(), FALLBACK_BPM);
    }

    #[test]
    fn malformed_config_is_rejected() {
        let config = AnalysisConfig {
            window_secs: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
