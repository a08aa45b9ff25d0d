//! Continuously refreshed view of where playback is.
//!
//! Two producers feed one `TransportState`: widget notifications (play, pause,
//! end) and a fixed-interval poll, because the widget never pushes position or
//! out-of-band volume changes. A single flag, "scrub gesture active", keeps the
//! poll from writing the position while the user drags.

use std::time::Duration;

use super::volume::Volume;

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One poll's worth of readings taken straight from the widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetSample {
    pub position: f64,
    pub duration: f64,
    pub volume: Volume,
    pub muted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportState {
    pub position: f64,
    pub duration: f64,
    pub volume: Volume,
    pub muted: bool,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
            volume: Volume::MAX,
            muted: false,
        }
    }
}

impl TransportState {
    /// Merges a poll sample. Duration, volume and mute always apply; the
    /// position is left alone while `scrubbing`.
    pub fn apply_sample(&mut self, sample: WidgetSample, scrubbing: bool) {
        if !scrubbing {
            self.position = sanitize_seconds(sample.position);
        }
        self.duration = sanitize_seconds(sample.duration);
        self.volume = sample.volume;
        self.muted = sample.muted;
    }

    /// Clamps `seconds` to the known timeline.
    pub fn clamp_to_timeline(&self, seconds: f64) -> f64 {
        sanitize_seconds(seconds).min(self.duration)
    }
}

/// Non-finite or negative readings are treated as zero.
pub(crate) fn sanitize_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(position: f64, duration: f64, volume: u8, muted: bool) -> WidgetSample {
        WidgetSample {
            position,
            duration,
            volume: Volume::new(volume),
            muted,
        }
    }

    #[test]
    fn sample_updates_everything_when_idle() {
        let mut state = TransportState::default();
        state.apply_sample(sample(12.5, 300.0, 40, true), false);
        assert_eq!(state.position, 12.5);
        assert_eq!(state.duration, 300.0);
        assert_eq!(state.volume.level(), 40);
        assert!(state.muted);
    }

    #[test]
    fn scrubbing_freezes_position_only() {
        let mut state = TransportState {
            position: 80.0,
            ..TransportState::default()
        };
        state.apply_sample(sample(5.0, 240.0, 10, true), true);
        assert_eq!(state.position, 80.0);
        assert_eq!(state.duration, 240.0);
        assert_eq!(state.volume.level(), 10);
        assert!(state.muted);
    }

    #[test]
    fn garbage_readings_become_zero() {
        let mut state = TransportState::default();
        state.apply_sample(sample(f64::NAN, -1.0, 100, false), false);
        assert_eq!(state.position, 0.0);
        assert_eq!(state.duration, 0.0);
    }

    #[test]
    fn clamp_to_timeline() {
        let state = TransportState {
            duration: 100.0,
            ..TransportState::default()
        };
        assert_eq!(state.clamp_to_timeline(-5.0), 0.0);
        assert_eq!(state.clamp_to_timeline(150.0), 100.0);
        assert_eq!(state.clamp_to_timeline(42.0), 42.0);
    }
}
