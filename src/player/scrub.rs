//! Seek gestures (press, drag, release) as short-lived interaction sessions.
//!
//! The duration is captured once at gesture start and reused at commit so the
//! seek target cannot drift if the poll reports a different duration mid-drag.

use super::transport::sanitize_seconds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubGesture {
    pub captured_duration: f64,
    pub preview_fraction: f64,
    pub resume_on_commit: bool,
    pub origin_position: f64,
}

impl ScrubGesture {
    pub fn preview_position(&self) -> f64 {
        self.preview_fraction * self.captured_duration
    }
}

/// What the session must do once a gesture ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubOutcome {
    /// Seek once to `target`, then resume if `resume` is set.
    Seek { target: f64, resume: bool },
    /// Put the displayed position back to `position` without seeking.
    Revert { position: f64, resume: bool },
}

#[derive(Debug, Clone, Default)]
pub struct ScrubController {
    gesture: Option<ScrubGesture>,
}

impl ScrubController {
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<&ScrubGesture> {
        self.gesture.as_ref()
    }

    /// Opens a gesture at `position`. Returns the initial preview fraction.
    /// Starting while a gesture is already open replaces it.
    pub fn start(&mut self, position: f64, duration: f64, was_playing: bool) -> f64 {
        let captured_duration = sanitize_seconds(duration);
        let origin_position = sanitize_seconds(position);
        let preview_fraction = if captured_duration > 0.0 {
            (origin_position / captured_duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.gesture = Some(ScrubGesture {
            captured_duration,
            preview_fraction,
            resume_on_commit: was_playing,
            origin_position,
        });
        preview_fraction
    }

    /// Moves the preview. Returns the position to display, or `None` when no
    /// gesture is open. Never touches the widget.
    pub fn preview(&mut self, fraction: f64) -> Option<f64> {
        let gesture = self.gesture.as_mut()?;
        gesture.preview_fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(gesture.preview_position())
    }

    /// Closes the gesture and returns the single seek to issue.
    pub fn commit(&mut self) -> Option<ScrubOutcome> {
        let gesture = self.gesture.take()?;
        let target = gesture
            .preview_position()
            .clamp(0.0, gesture.captured_duration);
        Some(ScrubOutcome::Seek {
            target,
            resume: gesture.resume_on_commit,
        })
    }

    /// Abandons the gesture: the position goes back to where it started and no
    /// seek is issued.
    pub fn cancel(&mut self) -> Option<ScrubOutcome> {
        let gesture = self.gesture.take()?;
        Some(ScrubOutcome::Revert {
            position: gesture.origin_position,
            resume: gesture.resume_on_commit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_computes_fraction_from_position() {
        let mut scrub = ScrubController::default();
        assert_eq!(scrub.start(40.0, 200.0, true), 0.2);
        assert!(scrub.is_active());
    }

    #[test]
    fn preview_then_commit_uses_captured_duration() {
        let mut scrub = ScrubController::default();
        scrub.start(40.0, 200.0, false);
        assert_eq!(scrub.preview(0.75), Some(150.0));
        assert_eq!(
            scrub.commit(),
            Some(ScrubOutcome::Seek {
                target: 150.0,
                resume: false
            })
        );
        assert!(!scrub.is_active());
        assert_eq!(scrub.commit(), None);
    }

    #[test]
    fn preview_is_clamped() {
        let mut scrub = ScrubController::default();
        scrub.start(0.0, 60.0, false);
        assert_eq!(scrub.preview(1.7), Some(60.0));
        assert_eq!(scrub.preview(-0.2), Some(0.0));
        assert_eq!(scrub.preview(f64::NAN), Some(0.0));
    }

    #[test]
    fn zero_duration_seeks_to_start() {
        let mut scrub = ScrubController::default();
        assert_eq!(scrub.start(12.0, 0.0, true), 0.0);
        scrub.preview(0.5);
        assert_eq!(
            scrub.commit(),
            Some(ScrubOutcome::Seek {
                target: 0.0,
                resume: true
            })
        );
    }

    #[test]
    fn cancel_reverts_without_seeking() {
        let mut scrub = ScrubController::default();
        scrub.start(33.0, 100.0, true);
        scrub.preview(0.9);
        assert_eq!(
            scrub.cancel(),
            Some(ScrubOutcome::Revert {
                position: 33.0,
                resume: true
            })
        );
        assert!(!scrub.is_active());
    }

    #[test]
    fn preview_without_gesture_is_ignored() {
        let mut scrub = ScrubController::default();
        assert_eq!(scrub.preview(0.5), None);
        assert_eq!(scrub.cancel(), None);
    }
}
