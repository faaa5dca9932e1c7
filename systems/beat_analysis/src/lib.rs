#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Beat and onset detection from an audio signal.
//!
//! Two modes share one conceptual algorithm, energy-based onset detection
//! against an adaptive threshold, and differ only in data source:
//!
//! * [`analyze_buffer`] slides an RMS window over a whole decoded mono
//!   buffer and produces an immutable [`airslash_core::BeatMap`].
//! * [`OnsetDetector`] consumes one frequency-domain snapshot per rendered
//!   frame and classifies kicks, snares, and hi-hats from band energies.
//!
//! Both feed the same interval-filtered tempo estimator, which always
//! reports a positive rounded BPM and falls back to 120 when too few
//! plausible intervals survive.

mod tempo;

pub mod offline;
pub mod online;

pub use offline::{analyze_buffer, AnalysisConfig};
pub use online::{FrameOnsets, OnsetConfig, OnsetDetector};

/// Tempo reported when analysis finds too few plausible beat intervals.
pub const FALLBACK_BPM: f32 = 120.0;
