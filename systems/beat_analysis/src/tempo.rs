//! Interval-filtered tempo estimation shared by both analysis modes.

use crate::FALLBACK_BPM;

/// Shortest beat interval considered plausible (240 BPM).
pub(crate) const MIN_BEAT_INTERVAL: f32 = 0.25;

/// Longest beat interval considered plausible (40 BPM).
pub(crate) const MAX_BEAT_INTERVAL: f32 = 1.5;

/// Derives a global tempo from beat timestamps.
///
/// Consecutive intervals outside the plausible range are discarded; the
/// median of the survivors becomes the tempo. With no survivors the fixed
/// fallback applies. The result is always a positive rounded value, never
/// NaN and never a division by zero.
pub(crate) fn bpm_from_beats(beats: &[f32]) -> f32 {
    let mut intervals: Vec<f32> = beats
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|interval| (MIN_BEAT_INTERVAL..=MAX_BEAT_INTERVAL).contains(interval))
        .collect();

    if intervals.is_empty() {
        return FALLBACK_BPM;
    }

    intervals.sort_by(f32::total_cmp);
    let median = intervals[intervals.len() / 2];
    (60.0 / median).round()
}

#[cfg(test)]
mod tests {
    use super::bpm_from_beats;
    use crate::FALLBACK_BPM;

    #[test]
    fn steady_half_second_intervals_are_120_bpm() {
        let beats = [0.0, 0.5, 1.0, 1.5, 2.0];
        assert_eq!(bpm_from_beats(&beats), 120.0);
    }

    #[test]
    fn implausible_intervals_are_filtered() {
        // One 0.05 s stutter and one 4 s dropout around a 0.5 s pulse.
        let beats = [0.0, 0.05, 0.55, 1.05, 5.05, 5.55];
        assert_eq!(bpm_from_beats(&beats), 120.0);
    }

    #[test]
    fn too_few_beats_fall_back() {
        assert_eq!(bpm_from_beats(&[]), FALLBACK_BPM);
        assert_eq!(bpm_from_beats(&[1.0]), FALLBACK_BPM);
        assert_eq!(bpm_from_beats(&[0.0, 0.01]), FALLBACK_BPM);
    }

    #[test]
    fn output_is_rounded() {
        // 0.41 s intervals give 146.34 BPM before rounding.
        let beats = [0.0, 0.41, 0.82, 1.23];
        let bpm = bpm_from_beats(&beats);
        assert_eq!(bpm, bpm.round());
        assert_eq!(bpm, 146.0);
    }
}
