//! Owns the widget bound to one mount point and the task that keeps its
//! transport state fresh.
//!
//! Each bind produces exactly one session and one driver task. The driver
//! merges the widget's notification channel with the poll timer, so both
//! producers write into the same session under one lock. Rebinding or
//! disposing aborts the driver and destroys the widget before anything new is
//! built.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::session::{Phase, PlaybackSession};
use super::transport::POLL_INTERVAL;
use super::view::TransportView;
use super::widget::{MountPoint, Widget, WidgetConfig, WidgetError, WidgetEvent, WidgetHost};

type SharedSession<W> = Arc<Mutex<PlaybackSession<W>>>;

/// What the host page should do with its fullscreen element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenRequest {
    Enter,
    Exit,
}

pub struct PlaybackAdapter<H: WidgetHost> {
    host: Arc<H>,
    mount: MountPoint,
    config: WidgetConfig,
    session: Option<SharedSession<H::Widget>>,
    driver: Option<JoinHandle<()>>,
    bind_error: Option<WidgetError>,
    fullscreen: bool,
}

impl<H: WidgetHost> PlaybackAdapter<H> {
    pub fn new(host: Arc<H>, mount: MountPoint) -> Self {
        Self::with_config(host, mount, WidgetConfig::embedded())
    }

    pub fn with_config(host: Arc<H>, mount: MountPoint, config: WidgetConfig) -> Self {
        Self {
            host,
            mount,
            config,
            session: None,
            driver: None,
            bind_error: None,
            fullscreen: false,
        }
    }

    /// Tears down whatever is bound and builds a fresh widget for
    /// `content_id`. The content is cued paused once the widget reports ready.
    ///
    /// Spawns the driver onto the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, once the widget has been
    /// built.
    pub fn bind(&mut self, content_id: impl Into<String>) {
        let content_id = content_id.into();
        self.dispose();
        self.bind_error = None;

        if let Err(err) = self.host.ensure_loaded() {
            debug!(mount = %self.mount.0, error = %err, "playback capability unavailable");
            self.bind_error = Some(err);
            return;
        }

        let (widget, events) = match self.host.construct(&self.mount, &content_id, &self.config) {
            Ok(built) => built,
            Err(err) => {
                debug!(mount = %self.mount.0, content_id = %content_id, error = %err, "widget construction failed");
                self.bind_error = Some(err);
                return;
            }
        };

        info!(mount = %self.mount.0, content_id = %content_id, "bound playback widget");
        let session = Arc::new(Mutex::new(PlaybackSession::new(content_id, widget)));
        self.driver = Some(tokio::spawn(drive(session.clone(), events)));
        self.session = Some(session);
    }

    /// Stops the driver and releases the widget. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        if let Some(session) = self.session.take() {
            let mut session = session.lock();
            let result = session.dispose();
            session.absorb("dispose", result);
            debug!(mount = %self.mount.0, content_id = session.content_id(), "released playback widget");
        }
    }

    fn with_session(
        &self,
        operation: &'static str,
        command: impl FnOnce(&mut PlaybackSession<H::Widget>) -> Result<(), WidgetError>,
    ) {
        if let Some(session) = &self.session {
            let mut session = session.lock();
            let result = command(&mut *session);
            session.absorb(operation, result);
        }
    }

    pub fn toggle_play(&self) {
        self.with_session("toggle_play", PlaybackSession::toggle_play);
    }

    pub fn toggle_mute(&self) {
        self.with_session("toggle_mute", PlaybackSession::toggle_mute);
    }

    pub fn set_volume(&self, level: u8) {
        self.with_session("set_volume", |session| session.set_volume(level));
    }

    pub fn seek(&self, target_seconds: f64) {
        self.with_session("seek", |session| session.seek(target_seconds));
    }

    pub fn scrub_start(&self) {
        self.with_session("scrub_start", PlaybackSession::scrub_start);
    }

    /// Display-only; may be called on every pointer move.
    pub fn scrub_preview(&self, fraction: f64) {
        self.with_session("scrub_preview", |session| {
            session.scrub_preview(fraction);
            Ok(())
        });
    }

    pub fn scrub_commit(&self) {
        self.with_session("scrub_commit", PlaybackSession::scrub_commit);
    }

    /// Abandons the gesture (e.g. the pointer was cancelled) without seeking.
    pub fn scrub_cancel(&self) {
        self.with_session("scrub_cancel", PlaybackSession::scrub_cancel);
    }

    /// Asks the host to flip fullscreen. The flag itself only changes when the
    /// host confirms through [`Self::fullscreen_changed`].
    pub fn toggle_fullscreen(&self) -> FullscreenRequest {
        if self.fullscreen {
            FullscreenRequest::Exit
        } else {
            FullscreenRequest::Enter
        }
    }

    pub fn fullscreen_changed(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn view(&self) -> TransportView {
        match &self.session {
            Some(session) => TransportView::of(&*session.lock(), self.fullscreen),
            None => TransportView::unbound(self.fullscreen),
        }
    }

    pub fn phase(&self) -> Phase {
        self.session
            .as_ref()
            .map_or(Phase::Unbound, |session| session.lock().phase())
    }

    pub fn content_id(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.lock().content_id().to_string())
    }

    /// Most recent swallowed widget error, from binding or from the session.
    pub fn last_error(&self) -> Option<WidgetError> {
        self.session
            .as_ref()
            .and_then(|session| session.lock().last_error().cloned())
            .or_else(|| self.bind_error.clone())
    }

    pub fn is_driving(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| !driver.is_finished())
    }
}

impl<H: WidgetHost> Drop for PlaybackAdapter<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Feeds one session from both producers until it is disposed. The poll timer
/// only starts once the widget has reported ready.
async fn drive<W: Widget>(session: SharedSession<W>, mut events: UnboundedReceiver<WidgetEvent>) {
    let mut ticker = time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut polling = false;
    let mut listening = true;

    loop {
        tokio::select! {
            event = events.recv(), if listening => {
                let Some(event) = event else {
                    listening = false;
                    if polling {
                        continue;
                    }
                    break;
                };
                let mut guard = session.lock();
                if guard.phase() == Phase::Unbound {
                    break;
                }
                let result = guard.handle_event(event);
                guard.absorb("notification", result);
                if !polling && guard.phase().is_ready() {
                    polling = true;
                    ticker.reset();
                }
            }
            _ = ticker.tick(), if polling => {
                let mut guard = session.lock();
                if guard.phase() == Phase::Unbound {
                    break;
                }
                let result = guard.poll();
                guard.absorb("poll", result);
            }
        }
    }
    debug!("playback driver stopped");
}
