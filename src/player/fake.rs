//! In-memory widget and host used by the player tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::widget::{
    CapabilityGate, MountPoint, PlayerState, Widget, WidgetConfig, WidgetError, WidgetEvent,
    WidgetHost,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Cue(String),
    Play,
    Pause,
    Mute,
    Unmute,
    SetVolume(u8),
    SeekTo(f64),
    Destroy,
}

#[derive(Debug, Clone)]
pub struct FakeState {
    pub state: PlayerState,
    pub muted: bool,
    pub volume: f64,
    pub current_time: f64,
    pub duration: f64,
    pub destroyed: bool,
    pub failing: bool,
    pub refuse_seek: bool,
    pub calls: Vec<Call>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            state: PlayerState::Other,
            muted: false,
            volume: 100.0,
            current_time: 0.0,
            duration: 200.0,
            destroyed: false,
            failing: false,
            refuse_seek: false,
            calls: Vec::new(),
        }
    }
}

pub type SharedFake = Arc<Mutex<FakeState>>;

pub struct FakeWidget {
    pub shared: SharedFake,
}

impl FakeWidget {
    pub fn new(state: FakeState) -> (Self, SharedFake) {
        let shared = Arc::new(Mutex::new(state));
        (
            Self {
                shared: shared.clone(),
            },
            shared,
        )
    }

    fn command(
        &mut self,
        name: &'static str,
        call: Call,
        apply: impl FnOnce(&mut FakeState),
    ) -> Result<(), WidgetError> {
        let mut state = self.shared.lock();
        if state.failing {
            return Err(WidgetError::command(name, "widget refused"));
        }
        state.calls.push(call);
        apply(&mut state);
        Ok(())
    }

    fn read<T>(&self, name: &'static str, get: impl FnOnce(&FakeState) -> T) -> Result<T, WidgetError> {
        let state = self.shared.lock();
        if state.failing {
            return Err(WidgetError::command(name, "widget refused"));
        }
        Ok(get(&state))
    }
}

impl Widget for FakeWidget {
    fn cue_content(&mut self, content_id: &str) -> Result<(), WidgetError> {
        self.command("cue_content", Call::Cue(content_id.to_string()), |s| {
            s.current_time = 0.0;
            s.state = PlayerState::Other;
        })
    }

    fn play(&mut self) -> Result<(), WidgetError> {
        self.command("play", Call::Play, |s| s.state = PlayerState::Playing)
    }

    fn pause(&mut self) -> Result<(), WidgetError> {
        self.command("pause", Call::Pause, |s| s.state = PlayerState::Paused)
    }

    fn mute(&mut self) -> Result<(), WidgetError> {
        self.command("mute", Call::Mute, |s| s.muted = true)
    }

    fn unmute(&mut self) -> Result<(), WidgetError> {
        self.command("unmute", Call::Unmute, |s| s.muted = false)
    }

    fn is_muted(&self) -> Result<bool, WidgetError> {
        self.read("is_muted", |s| s.muted)
    }

    fn volume(&self) -> Result<f64, WidgetError> {
        self.read("volume", |s| s.volume)
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), WidgetError> {
        self.command("set_volume", Call::SetVolume(volume), |s| {
            s.volume = f64::from(volume)
        })
    }

    fn current_time(&self) -> Result<f64, WidgetError> {
        self.read("current_time", |s| s.current_time)
    }

    fn duration(&self) -> Result<f64, WidgetError> {
        self.read("duration", |s| s.duration)
    }

    fn player_state(&self) -> Result<PlayerState, WidgetError> {
        self.read("player_state", |s| s.state)
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) -> Result<(), WidgetError> {
        if self.shared.lock().refuse_seek {
            return Err(WidgetError::command("seek_to", "seek refused"));
        }
        self.command("seek_to", Call::SeekTo(seconds), |s| s.current_time = seconds)
    }

    fn destroy(&mut self) -> Result<(), WidgetError> {
        let mut state = self.shared.lock();
        state.calls.push(Call::Destroy);
        state.destroyed = true;
        Ok(())
    }
}

pub struct Built {
    pub content_id: String,
    pub shared: SharedFake,
    pub events: UnboundedSender<WidgetEvent>,
}

/// Hands out `FakeWidget`s and keeps a handle on each one so tests can drive
/// notifications and inspect what was left alive.
#[derive(Default)]
pub struct FakeHost {
    pub template: FakeState,
    pub refuse_construct: bool,
    gate: CapabilityGate,
    loads: AtomicUsize,
    built: Mutex<Vec<Built>>,
}

impl FakeHost {
    pub fn with_template(template: FakeState) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse_construct: true,
            ..Self::default()
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn live_widgets(&self) -> usize {
        self.built
            .lock()
            .iter()
            .filter(|built| !built.shared.lock().destroyed)
            .count()
    }

    /// Notification channels whose receiving driver is still running.
    pub fn open_channels(&self) -> usize {
        self.built
            .lock()
            .iter()
            .filter(|built| !built.events.is_closed())
            .count()
    }

    pub fn latest(&self) -> (SharedFake, UnboundedSender<WidgetEvent>) {
        let built = self.built.lock();
        let last = built.last().expect("no widget built yet");
        (last.shared.clone(), last.events.clone())
    }

    pub fn content_ids(&self) -> Vec<String> {
        self.built
            .lock()
            .iter()
            .map(|built| built.content_id.clone())
            .collect()
    }
}

impl WidgetHost for FakeHost {
    type Widget = FakeWidget;

    fn ensure_loaded(&self) -> Result<(), WidgetError> {
        self.gate.ensure(|| {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn construct(
        &self,
        _mount: &MountPoint,
        content_id: &str,
        _config: &WidgetConfig,
    ) -> Result<(FakeWidget, UnboundedReceiver<WidgetEvent>), WidgetError> {
        if self.refuse_construct {
            return Err(WidgetError::Construction("mount point missing".into()));
        }
        let (widget, shared) = FakeWidget::new(self.template.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        self.built.lock().push(Built {
            content_id: content_id.to_string(),
            shared,
            events: tx,
        });
        Ok((widget, rx))
    }
}
