//! Custom-chrome control surface for an embedded playback widget.
//!
//! The widget itself is opaque: the host supplies it through [`WidgetHost`].
//! This module owns everything layered on top of it:
//!
//! * [`PlaybackAdapter`] binds one widget per content id to a mount point and
//!   turns play/pause, mute, volume, seek and fullscreen into widget commands.
//! * [`TransportState`] is refreshed from two producers, widget notifications
//!   and a 250 ms poll, because the widget never pushes position or volume.
//! * [`ScrubController`] owns the displayed position while the user drags the
//!   timeline, so the poll cannot yank it back mid-gesture.
//!
//! Widget failures never propagate to callers. They are logged, kept as
//! [`PlaybackAdapter::last_error`], and otherwise leave the chrome as it was.

mod adapter;
mod scrub;
mod session;
mod transport;
mod view;
mod volume;
mod widget;

#[cfg(test)]
mod fake;

pub use adapter::{FullscreenRequest, PlaybackAdapter};
pub use scrub::{ScrubController, ScrubGesture, ScrubOutcome};
pub use session::{Phase, PlaybackSession};
pub use transport::{POLL_INTERVAL, TransportState, WidgetSample};
pub use view::{SLIDER_STEPS, TransportView, permille_to_fraction};
pub use volume::{Volume, VolumeMemory};
pub use widget::{
    CapabilityGate, MountPoint, PlayerState, Widget, WidgetConfig, WidgetError, WidgetEvent,
    WidgetHost,
};
