//! One widget bound to one content id, and the state machine around it.

use tracing::debug;

use super::scrub::{ScrubController, ScrubOutcome};
use super::transport::{TransportState, WidgetSample};
use super::volume::{Volume, VolumeMemory};
use super::widget::{PlayerState, Widget, WidgetError, WidgetEvent};

/// Lifecycle of a playback session.
///
/// `Ended` never shows up here: an end notification rewinds to zero and
/// resolves straight to `Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unbound,
    Building,
    Ready,
    Playing,
    Paused,
}

impl Phase {
    /// True once the widget has reported ready and until disposal.
    pub fn is_ready(self) -> bool {
        matches!(self, Phase::Ready | Phase::Playing | Phase::Paused)
    }
}

pub struct PlaybackSession<W: Widget> {
    content_id: String,
    widget: W,
    phase: Phase,
    transport: TransportState,
    memory: VolumeMemory,
    scrub: ScrubController,
    last_error: Option<WidgetError>,
}

impl<W: Widget> PlaybackSession<W> {
    /// Wraps a freshly constructed widget. The session stays `Building` until
    /// the widget's ready notification arrives.
    pub fn new(content_id: impl Into<String>, widget: W) -> Self {
        Self {
            content_id: content_id.into(),
            widget,
            phase: Phase::Building,
            transport: TransportState::default(),
            memory: VolumeMemory::default(),
            scrub: ScrubController::default(),
            last_error: None,
        }
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn volume_memory(&self) -> &VolumeMemory {
        &self.memory
    }

    pub fn scrub(&self) -> &ScrubController {
        &self.scrub
    }

    pub fn last_error(&self) -> Option<&WidgetError> {
        self.last_error.as_ref()
    }

    /// Logs and remembers a failed widget interaction. Nothing is surfaced to
    /// the viewer; the chrome just keeps showing whatever state it had.
    pub fn absorb(&mut self, operation: &'static str, result: Result<(), WidgetError>) {
        if let Err(err) = result {
            debug!(content_id = %self.content_id, operation, error = %err, "widget error swallowed");
            self.last_error = Some(err);
        }
    }

    pub fn handle_event(&mut self, event: WidgetEvent) -> Result<(), WidgetError> {
        if self.phase == Phase::Unbound {
            return Ok(());
        }
        match event {
            WidgetEvent::Ready => self.on_ready(),
            WidgetEvent::StateChanged(state) => self.on_state_changed(state),
            WidgetEvent::Error(err) => {
                // Typically the owner disabled embedding; there is no recovery.
                debug!(content_id = %self.content_id, error = %err, "widget reported an error");
                self.last_error = Some(err);
                Ok(())
            }
        }
    }

    fn on_ready(&mut self) -> Result<(), WidgetError> {
        if self.phase.is_ready() {
            return Ok(());
        }
        self.phase = Phase::Ready;
        self.widget.cue_content(&self.content_id)?;
        let sample = self.sample()?;
        self.transport.apply_sample(sample, false);
        self.memory.observe(sample.volume);
        Ok(())
    }

    fn on_state_changed(&mut self, state: PlayerState) -> Result<(), WidgetError> {
        if !self.phase.is_ready() {
            return Ok(());
        }
        match state {
            PlayerState::Playing => self.phase = Phase::Playing,
            PlayerState::Ended => {
                // Rewind and hold so the widget cannot roll into something else.
                self.phase = Phase::Paused;
                self.transport.position = 0.0;
                self.widget.seek_to(0.0, true)?;
                self.widget.pause()?;
            }
            PlayerState::Paused | PlayerState::Other => self.phase = Phase::Paused,
        }
        Ok(())
    }

    fn sample(&self) -> Result<WidgetSample, WidgetError> {
        Ok(WidgetSample {
            position: self.widget.current_time()?,
            duration: self.widget.duration()?,
            volume: Volume::from_reported(self.widget.volume()?),
            muted: self.widget.is_muted()?,
        })
    }

    /// One poll tick. Position is skipped while a scrub gesture is open.
    pub fn poll(&mut self) -> Result<(), WidgetError> {
        if !self.phase.is_ready() {
            return Ok(());
        }
        let sample = self.sample()?;
        self.transport.apply_sample(sample, self.scrub.is_active());
        self.memory.observe(sample.volume);
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<(), WidgetError> {
        if !self.phase.is_ready() {
            return Ok(());
        }
        if self.widget.player_state()? == PlayerState::Playing {
            self.widget.pause()
        } else {
            self.widget.play()
        }
    }

    pub fn toggle_mute(&mut self) -> Result<(), WidgetError> {
        if !self.phase.is_ready() {
            return Ok(());
        }
        if self.widget.is_muted()? {
            let restore = self.memory.restore_level();
            self.widget.unmute()?;
            self.widget.set_volume(restore.level())?;
            self.transport.volume = restore;
            self.transport.muted = false;
        } else {
            let current = self
                .widget
                .volume()
                .map(Volume::from_reported)
                .unwrap_or(self.transport.volume);
            self.memory.observe(current);
            self.widget.mute()?;
            self.transport.muted = true;
        }
        Ok(())
    }

    /// Zero forces mute; anything audible forces unmute and is remembered.
    pub fn set_volume(&mut self, level: u8) -> Result<(), WidgetError> {
        if !self.phase.is_ready() {
            return Ok(());
        }
        let volume = Volume::new(level);
        self.widget.set_volume(volume.level())?;
        self.transport.volume = volume;
        if volume.is_silent() {
            if !self.widget.is_muted()? {
                self.widget.mute()?;
            }
            self.transport.muted = true;
        } else {
            if self.widget.is_muted()? {
                self.widget.unmute()?;
            }
            self.transport.muted = false;
            self.memory.observe(volume);
        }
        Ok(())
    }

    pub fn seek(&mut self, target: f64) -> Result<(), WidgetError> {
        if !self.phase.is_ready() {
            return Ok(());
        }
        let target = self.transport.clamp_to_timeline(target);
        self.widget.seek_to(target, true)?;
        self.transport.position = target;
        Ok(())
    }

    /// Opens a scrub gesture: remembers whether to resume, pauses, and
    /// snapshots the duration.
    pub fn scrub_start(&mut self) -> Result<(), WidgetError> {
        if !self.phase.is_ready() {
            return Ok(());
        }
        let was_playing = matches!(self.widget.player_state(), Ok(PlayerState::Playing));
        let duration = if self.transport.duration > 0.0 {
            self.transport.duration
        } else {
            self.widget.duration().unwrap_or(0.0)
        };
        self.scrub.start(self.transport.position, duration, was_playing);
        if was_playing {
            self.widget.pause()?;
        }
        Ok(())
    }

    /// Display-only; never reaches the widget.
    pub fn scrub_preview(&mut self, fraction: f64) {
        if let Some(position) = self.scrub.preview(fraction) {
            self.transport.position = position;
        }
    }

    pub fn scrub_commit(&mut self) -> Result<(), WidgetError> {
        self.finish_scrub(ScrubController::commit)
    }

    pub fn scrub_cancel(&mut self) -> Result<(), WidgetError> {
        self.finish_scrub(ScrubController::cancel)
    }

    fn finish_scrub(
        &mut self,
        end: fn(&mut ScrubController) -> Option<ScrubOutcome>,
    ) -> Result<(), WidgetError> {
        let Some(outcome) = end(&mut self.scrub) else {
            return Ok(());
        };
        let (seeked, resume) = match outcome {
            ScrubOutcome::Seek { target, resume } => {
                self.transport.position = target;
                (self.widget.seek_to(target, true), resume)
            }
            ScrubOutcome::Revert { position, resume } => {
                self.transport.position = position;
                (Ok(()), resume)
            }
        };
        // A failed seek must not leave a gesture that paused playback paused.
        let resumed = if resume && self.phase.is_ready() {
            self.widget.play()
        } else {
            Ok(())
        };
        seeked.and(resumed)
    }

    /// Releases the widget. Later calls, events and polls are no-ops.
    pub fn dispose(&mut self) -> Result<(), WidgetError> {
        if self.phase == Phase::Unbound {
            return Ok(());
        }
        self.phase = Phase::Unbound;
        self.scrub = ScrubController::default();
        self.widget.destroy()
    }
}
