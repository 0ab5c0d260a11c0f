//! Per-item recitation playback records
//!
//! Playback itself is handed off to the system audio handler; this module
//! only owns the explicit per-item state records the screens render from.
//! Each dua gets its own record in the registry, keyed by the same stable
//! key the favorites set uses.

use std::collections::HashMap;
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

/// Errors from starting a recitation
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The item has no recitation audio
    #[error("no recitation audio for this dua")]
    NoAudio,

    /// The system handler could not be launched
    #[error("failed to launch system player: {0}")]
    LaunchFailed(#[from] std::io::Error),
}

/// Playback status of a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
}

/// State record for one item's recitation
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// When the recitation was handed to the system player
    pub started_at: Option<Instant>,
}

/// Hands a recitation URL to an audio-capable handler
pub trait AudioLauncher {
    fn launch(&self, url: &str) -> std::io::Result<()>;
}

/// Opens the recitation URL with the platform's default handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAudioLauncher;

impl AudioLauncher for SystemAudioLauncher {
    fn launch(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }
}

/// Registry of per-item playback records
///
/// At most one item is marked playing at a time; starting a new recitation
/// clears the previous marker. The registry tracks what was handed off; it
/// cannot reach into the external player, so "stopping" only clears the
/// marker.
#[derive(Debug, Default)]
pub struct PlaybackRegistry {
    states: HashMap<String, PlaybackState>,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record for an item, defaulting to idle
    pub fn state(&self, key: &str) -> PlaybackState {
        self.states.get(key).copied().unwrap_or_default()
    }

    pub fn is_playing(&self, key: &str) -> bool {
        self.state(key).status == PlaybackStatus::Playing
    }

    /// Starts or clears the recitation for an item
    ///
    /// Returns the item's new status on success.
    pub fn toggle<L: AudioLauncher>(
        &mut self,
        key: &str,
        audio_url: Option<&str>,
        launcher: &L,
    ) -> Result<PlaybackStatus, PlaybackError> {
        if self.is_playing(key) {
            self.states.insert(key.to_string(), PlaybackState::default());
            return Ok(PlaybackStatus::Idle);
        }

        let url = audio_url.ok_or(PlaybackError::NoAudio)?;
        launcher.launch(url)?;
        debug!(key, url, "recitation handed to system player");

        self.clear_all();
        self.states.insert(
            key.to_string(),
            PlaybackState {
                status: PlaybackStatus::Playing,
                started_at: Some(Instant::now()),
            },
        );
        Ok(PlaybackStatus::Playing)
    }

    /// Clears every playing marker
    pub fn clear_all(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Launcher that records URLs instead of opening them
    #[derive(Default)]
    struct RecordingLauncher {
        launched: RefCell<Vec<String>>,
        fail: bool,
    }

    impl AudioLauncher for RecordingLauncher {
        fn launch(&self, url: &str) -> std::io::Result<()> {
            if self.fail {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no handler registered",
                ));
            }
            self.launched.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_toggle_starts_playback() {
        let mut registry = PlaybackRegistry::new();
        let launcher = RecordingLauncher::default();

        let status = registry
            .toggle("dua_1", Some("https://cdn.test/1.mp3"), &launcher)
            .expect("Toggle should succeed");

        assert_eq!(status, PlaybackStatus::Playing);
        assert!(registry.is_playing("dua_1"));
        assert!(registry.state("dua_1").started_at.is_some());
        assert_eq!(launcher.launched.borrow().as_slice(), ["https://cdn.test/1.mp3"]);
    }

    #[test]
    fn test_toggle_twice_clears_marker_without_relaunching() {
        let mut registry = PlaybackRegistry::new();
        let launcher = RecordingLauncher::default();

        registry
            .toggle("dua_1", Some("https://cdn.test/1.mp3"), &launcher)
            .unwrap();
        let status = registry
            .toggle("dua_1", Some("https://cdn.test/1.mp3"), &launcher)
            .unwrap();

        assert_eq!(status, PlaybackStatus::Idle);
        assert!(!registry.is_playing("dua_1"));
        assert_eq!(launcher.launched.borrow().len(), 1);
    }

    #[test]
    fn test_starting_second_item_clears_first() {
        let mut registry = PlaybackRegistry::new();
        let launcher = RecordingLauncher::default();

        registry
            .toggle("dua_1", Some("https://cdn.test/1.mp3"), &launcher)
            .unwrap();
        registry
            .toggle("dua_2", Some("https://cdn.test/2.mp3"), &launcher)
            .unwrap();

        assert!(!registry.is_playing("dua_1"));
        assert!(registry.is_playing("dua_2"));
    }

    #[test]
    fn test_toggle_without_audio_is_error() {
        let mut registry = PlaybackRegistry::new();
        let launcher = RecordingLauncher::default();

        let result = registry.toggle("dua_1", None, &launcher);

        assert!(matches!(result, Err(PlaybackError::NoAudio)));
        assert!(!registry.is_playing("dua_1"));
    }

    #[test]
    fn test_failed_launch_leaves_item_idle() {
        let mut registry = PlaybackRegistry::new();
        let launcher = RecordingLauncher {
            fail: true,
            ..Default::default()
        };

        let result = registry.toggle("dua_1", Some("https://cdn.test/1.mp3"), &launcher);

        assert!(matches!(result, Err(PlaybackError::LaunchFailed(_))));
        assert!(!registry.is_playing("dua_1"));
    }

    #[test]
    fn test_unknown_key_defaults_to_idle() {
        let registry = PlaybackRegistry::new();

        assert_eq!(registry.state("dua_404").status, PlaybackStatus::Idle);
        assert!(!registry.is_playing("dua_404"));
    }
}
