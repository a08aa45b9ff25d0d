use serde::Serialize;

use super::session::{Phase, PlaybackSession};
use super::volume::Volume;
use super::widget::Widget;
use crate::display::format_clock;

pub const SLIDER_STEPS: u16 = 1000;

/// Everything the custom chrome needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportView {
    pub content_id: Option<String>,
    pub phase: &'static str,
    pub ready: bool,
    pub playing: bool,
    pub muted: bool,
    pub volume: u8,
    pub position: f64,
    pub duration: f64,
    pub slider_permille: u16,
    pub elapsed_label: String,
    pub duration_label: String,
    pub scrubbing: bool,
    pub fullscreen: bool,
}

impl TransportView {
    /// What an adapter with nothing bound shows.
    pub fn unbound(fullscreen: bool) -> Self {
        Self {
            content_id: None,
            phase: phase_name(Phase::Unbound),
            ready: false,
            playing: false,
            muted: false,
            volume: 0,
            position: 0.0,
            duration: 0.0,
            slider_permille: 0,
            elapsed_label: format_clock(0.0),
            duration_label: format_clock(0.0),
            scrubbing: false,
            fullscreen,
        }
    }

    /// First frame for `content_id`, drawn before the widget reports ready.
    pub fn loading(content_id: impl Into<String>) -> Self {
        Self {
            content_id: Some(content_id.into()),
            phase: phase_name(Phase::Building),
            volume: Volume::MAX.level(),
            ..Self::unbound(false)
        }
    }

    pub fn of<W: Widget>(session: &PlaybackSession<W>, fullscreen: bool) -> Self {
        let transport = session.transport();
        let gesture = session.scrub().gesture();
        let slider_permille = match gesture {
            Some(gesture) => to_permille(gesture.preview_fraction),
            None if transport.duration > 0.0 => {
                to_permille(transport.position / transport.duration)
            }
            None => 0,
        };
        Self {
            content_id: Some(session.content_id().to_string()),
            phase: phase_name(session.phase()),
            ready: session.phase().is_ready(),
            playing: session.phase() == Phase::Playing,
            muted: transport.muted,
            volume: transport.volume.level(),
            position: transport.position,
            duration: transport.duration,
            slider_permille,
            elapsed_label: format_clock(transport.position),
            duration_label: format_clock(transport.duration),
            scrubbing: gesture.is_some(),
            fullscreen,
        }
    }
}

fn to_permille(fraction: f64) -> u16 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction * f64::from(SLIDER_STEPS))
        .round()
        .clamp(0.0, f64::from(SLIDER_STEPS)) as u16
}

/// Slider steps back to a timeline fraction.
pub fn permille_to_fraction(permille: u16) -> f64 {
    f64::from(permille.min(SLIDER_STEPS)) / f64::from(SLIDER_STEPS)
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Unbound => "unbound",
        Phase::Building => "building",
        Phase::Ready => "ready",
        Phase::Playing => "playing",
        Phase::Paused => "paused",
    }
}
