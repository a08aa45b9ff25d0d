//! The embeddable playback widget as seen from the control surface.
//!
//! Everything behind these traits (decoding, streaming, the widget's own UI)
//! belongs to the host. The control surface only issues commands and listens
//! for `WidgetEvent`s.

use std::sync::OnceLock;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Player state as reported by the widget. Buffering, cued and unstarted all
/// collapse into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    Ended,
    Other,
}

impl PlayerState {
    /// Maps the embed player's numeric state codes.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ended,
            1 => Self::Playing,
            2 => Self::Paused,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("playback capability has not been loaded")]
    NotLoaded,
    #[error("widget construction failed: {0}")]
    Construction(String),
    #[error("widget command `{command}` failed: {reason}")]
    Command {
        command: &'static str,
        reason: String,
    },
    #[error("content owner does not allow embedded playback")]
    EmbeddingDisabled,
    #[error("content not found or private")]
    ContentNotFound,
    #[error("invalid parameter passed to the widget")]
    InvalidParameter,
    #[error("playback error {0}")]
    Playback(i32),
}

impl WidgetError {
    /// Maps the embed player's numeric `onError` codes.
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::InvalidParameter,
            100 => Self::ContentNotFound,
            101 | 150 => Self::EmbeddingDisabled,
            other => Self::Playback(other),
        }
    }

    pub fn command(command: &'static str, reason: impl Into<String>) -> Self {
        Self::Command {
            command,
            reason: reason.into(),
        }
    }
}

/// Asynchronous notifications pushed by a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Ready,
    StateChanged(PlayerState),
    Error(WidgetError),
}

/// Construction options. The host's custom chrome owns all input, so the
/// widget's own controls and keyboard handling are switched off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub host: String,
    pub autoplay: bool,
    pub related_content: bool,
    pub native_controls: bool,
    pub keyboard: bool,
    pub inline_playback: bool,
    pub fullscreen_allowed: bool,
    pub annotations: bool,
    pub js_api: bool,
}

impl WidgetConfig {
    pub const PRIVACY_HOST: &'static str = "https://www.youtube-nocookie.com";

    pub fn embedded() -> Self {
        Self {
            host: Self::PRIVACY_HOST.to_string(),
            autoplay: false,
            related_content: false,
            native_controls: false,
            keyboard: false,
            inline_playback: true,
            fullscreen_allowed: true,
            annotations: false,
            js_api: true,
        }
    }

    /// Query parameters in the form the embed endpoint expects.
    pub fn player_vars(&self, origin: &str) -> Vec<(&'static str, String)> {
        let flag = |on: bool| if on { "1" } else { "0" }.to_string();
        vec![
            ("autoplay", flag(self.autoplay)),
            ("rel", flag(self.related_content)),
            ("controls", flag(self.native_controls)),
            ("disablekb", flag(!self.keyboard)),
            ("playsinline", flag(self.inline_playback)),
            ("fs", flag(self.fullscreen_allowed)),
            ("iv_load_policy", if self.annotations { "1" } else { "3" }.to_string()),
            ("enablejsapi", flag(self.js_api)),
            ("modestbranding", "1".to_string()),
            ("origin", origin.to_string()),
        ]
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Where the widget gets attached in the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint(pub String);

impl MountPoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Imperative command surface of one widget instance.
pub trait Widget: Send + 'static {
    fn cue_content(&mut self, content_id: &str) -> Result<(), WidgetError>;
    fn play(&mut self) -> Result<(), WidgetError>;
    fn pause(&mut self) -> Result<(), WidgetError>;
    fn mute(&mut self) -> Result<(), WidgetError>;
    fn unmute(&mut self) -> Result<(), WidgetError>;
    fn is_muted(&self) -> Result<bool, WidgetError>;
    fn volume(&self) -> Result<f64, WidgetError>;
    fn set_volume(&mut self, volume: u8) -> Result<(), WidgetError>;
    fn current_time(&self) -> Result<f64, WidgetError>;
    fn duration(&self) -> Result<f64, WidgetError>;
    fn player_state(&self) -> Result<PlayerState, WidgetError>;
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), WidgetError>;
    fn destroy(&mut self) -> Result<(), WidgetError>;
}

/// Builds widgets. One host is shared by every adapter in the process.
pub trait WidgetHost: Send + Sync + 'static {
    type Widget: Widget;

    /// Loads the playback capability if needed. Must be idempotent and safe to
    /// call from concurrent binds; see [`CapabilityGate`].
    fn ensure_loaded(&self) -> Result<(), WidgetError>;

    fn construct(
        &self,
        mount: &MountPoint,
        content_id: &str,
        config: &WidgetConfig,
    ) -> Result<(Self::Widget, UnboundedReceiver<WidgetEvent>), WidgetError>;
}

/// One-shot guard around loading the playback capability. The loader runs at
/// most once even when several binds race; every caller sees its result.
#[derive(Debug, Default)]
pub struct CapabilityGate {
    outcome: OnceLock<Result<(), WidgetError>>,
}

impl CapabilityGate {
    pub const fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
        }
    }

    pub fn ensure<F>(&self, load: F) -> Result<(), WidgetError>
    where
        F: FnOnce() -> Result<(), WidgetError>,
    {
        self.outcome.get_or_init(load).clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(())))
    }
}
