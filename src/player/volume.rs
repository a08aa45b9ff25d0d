/// Volume level on the widget's 0..=100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Volume(u8);

impl Volume {
    pub const MAX: Volume = Volume(100);
    pub const SILENT: Volume = Volume(0);
    /// Used when unmuting and nothing audible was ever observed.
    pub const FALLBACK: Volume = Volume(50);

    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX.0))
    }

    /// Widgets report volume as a float; round and clamp it.
    pub fn from_reported(level: f64) -> Self {
        if !level.is_finite() {
            return Self::SILENT;
        }
        Self(level.round().clamp(0.0, 100.0) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_silent(self) -> bool {
        self.0 == 0
    }
}

/// Remembers the last audible volume so unmuting can bring it back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeMemory {
    last_non_zero: Option<Volume>,
}

impl VolumeMemory {
    /// Records `volume` if it is audible; silence never overwrites the memory.
    pub fn observe(&mut self, volume: Volume) {
        if !volume.is_silent() {
            self.last_non_zero = Some(volume);
        }
    }

    pub fn last_non_zero(&self) -> Option<Volume> {
        self.last_non_zero
    }

    pub fn restore_level(&self) -> Volume {
        self.last_non_zero.unwrap_or(Volume::FALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_scale() {
        assert_eq!(Volume::new(180).level(), 100);
        assert_eq!(Volume::from_reported(-4.0), Volume::SILENT);
        assert_eq!(Volume::from_reported(33.6).level(), 34);
        assert_eq!(Volume::from_reported(f64::NAN), Volume::SILENT);
    }

    #[test]
    fn memory_ignores_silence() {
        let mut memory = VolumeMemory::default();
        assert_eq!(memory.restore_level(), Volume::FALLBACK);
        memory.observe(Volume::new(30));
        memory.observe(Volume::SILENT);
        assert_eq!(memory.restore_level().level(), 30);
        memory.observe(Volume::new(80));
        assert_eq!(memory.last_non_zero(), Some(Volume::new(80)));
    }
}
