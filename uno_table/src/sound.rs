use std::io::Write;
use std::path::PathBuf;
use tracing::{trace, warn};
use uno_env::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Click,
    Draw,
    Play,
    Error,
}

/// Terminal stand-in for the table's sound effects. Only errors ring the bell.
#[derive(Debug, Clone)]
pub struct SoundController {
    enabled: bool,
    store: Option<PathBuf>,
}

impl SoundController {
    /// Reads the saved preference; toggles are written back to the same file.
    pub fn from_preferences() -> Self {
        let path = Preferences::path();
        let prefs = Preferences::load_from(&path);
        Self {
            enabled: prefs.sound_enabled,
            store: Some(path),
        }
    }

    /// Not persisted anywhere.
    pub fn in_memory(enabled: bool) -> Self {
        Self {
            enabled,
            store: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if let Some(path) = &self.store {
            if let Err(e) = (Preferences {
                sound_enabled: enabled,
            })
            .save_to(path)
            {
                warn!("Could not save sound preference to {:?}: {}", path, e);
            }
        }
    }

    pub fn play(&self, cue: SoundCue) {
        if !self.enabled {
            return;
        }
        trace!("cue {:?}", cue);
        if cue == SoundCue::Error {
            let mut err = std::io::stderr();
            let _ = err.write_all(b"\x07");
            let _ = err.flush();
        }
    }
}
