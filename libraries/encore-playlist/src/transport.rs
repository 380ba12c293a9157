//! Playback transport for the public surface
//!
//! Tracks which entry of a projection is current, whether it is playing,
//! and where the playhead is. The transport never touches audio; it hands
//! [`PlaybackCue`]s to the playback sink.

use crate::projection::PlaylistProjection;
use serde::{Deserialize, Serialize};

/// Seconds moved by [`Transport::rewind`] and [`Transport::forward`]
pub const SEEK_STEP_SECONDS: f64 = 10.0;

/// What the playback sink needs to start a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackCue {
    /// Track name
    pub name: String,

    /// Resource URL, resolved through the registry
    pub url: String,

    /// Duration in seconds, if known
    pub duration_seconds: Option<f64>,
}

/// What happens when a track ends or "next" is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Advance through the list, stopping after the last track
    #[default]
    Sequence,

    /// Repeat the current track
    Loop,
}

impl PlayMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Sequence => Self::Loop,
            Self::Loop => Self::Sequence,
        }
    }
}

/// Playback position and mode over a projection
#[derive(Debug, Clone)]
pub struct Transport {
    current: Option<usize>,
    mode: PlayMode,
    playing: bool,
    position_seconds: f64,
    speed: f64,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    pub fn new() -> Self {
        Self {
            current: None,
            mode: PlayMode::Sequence,
            playing: false,
            position_seconds: 0.0,
            speed: 1.0,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position_seconds
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Forget the current track and stop; mode and speed are kept
    pub fn reset(&mut self) {
        self.current = None;
        self.playing = false;
        self.position_seconds = 0.0;
    }

    /// Cue for the current track
    pub fn current_cue(&self, playlist: &PlaylistProjection) -> Option<PlaybackCue> {
        self.current
            .and_then(|index| playlist.get(index))
            .map(|track| track.cue())
    }

    /// Make `index` current, from the start
    ///
    /// Out-of-range indices are ignored. The playing flag is kept, so
    /// selecting while playing starts the new track.
    pub fn select(&mut self, playlist: &PlaylistProjection, index: usize) -> Option<PlaybackCue> {
        let cue = playlist.get(index)?.cue();
        self.current = Some(index);
        self.position_seconds = 0.0;
        tracing::debug!("Selected track {}: {}", index, cue.name);
        Some(cue)
    }

    /// Advance according to the play mode
    ///
    /// In loop mode the current track restarts. In sequence mode the next
    /// track is selected; past the last track playback stops and `None` is
    /// returned.
    pub fn next(&mut self, playlist: &PlaylistProjection) -> Option<PlaybackCue> {
        if playlist.is_empty() {
            return None;
        }

        match self.mode {
            PlayMode::Loop => {
                self.position_seconds = 0.0;
                self.current_cue(playlist)
            }
            PlayMode::Sequence => {
                let next = self.current.map_or(0, |index| index + 1);
                if next < playlist.len() {
                    self.select(playlist, next)
                } else {
                    self.playing = false;
                    None
                }
            }
        }
    }

    /// Step back one track; nothing happens on the first track
    pub fn previous(&mut self, playlist: &PlaylistProjection) -> Option<PlaybackCue> {
        let previous = self.current?.checked_sub(1)?;
        self.select(playlist, previous)
    }

    /// The sink reports that the current track finished
    pub fn on_track_end(&mut self, playlist: &PlaylistProjection) -> Option<PlaybackCue> {
        self.next(playlist)
    }

    /// Flip between playing and paused; returns the new flag
    ///
    /// An empty playlist cannot start playing.
    pub fn toggle_play(&mut self, playlist: &PlaylistProjection) -> bool {
        if playlist.is_empty() {
            return self.playing;
        }

        if self.current.is_none() {
            self.select(playlist, 0);
        }
        self.playing = !self.playing;
        self.playing
    }

    /// Switch between sequence and loop; returns the new mode
    pub fn toggle_mode(&mut self) -> PlayMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Move the playhead back, not before the start
    pub fn rewind(&mut self) -> f64 {
        self.position_seconds = (self.position_seconds - SEEK_STEP_SECONDS).max(0.0);
        self.position_seconds
    }

    /// Move the playhead forward, not past the current track's end
    ///
    /// With an unknown duration there is no upper bound.
    pub fn forward(&mut self, playlist: &PlaylistProjection) -> f64 {
        let target = self.position_seconds + SEEK_STEP_SECONDS;
        self.position_seconds = match self.current_duration(playlist) {
            Some(duration) => target.min(duration),
            None => target,
        };
        self.position_seconds
    }

    /// Jump to `percent` (0 to 100) of the current track
    ///
    /// Returns the new position, or `None` when the duration is unknown.
    pub fn seek_percent(&mut self, playlist: &PlaylistProjection, percent: f64) -> Option<f64> {
        if !percent.is_finite() {
            return None;
        }
        let duration = self.current_duration(playlist)?;
        self.position_seconds = percent.clamp(0.0, 100.0) / 100.0 * duration;
        Some(self.position_seconds)
    }

    /// Record the playhead reported by the sink
    pub fn set_position(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.position_seconds = seconds.max(0.0);
        }
    }

    /// Set the playback rate; non-positive or non-finite rates are rejected
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if !speed.is_finite() || speed <= 0.0 {
            return false;
        }
        self.speed = speed;
        true
    }

    /// Progress through the current track, 0 to 100
    pub fn progress_percent(&self, playlist: &PlaylistProjection) -> f64 {
        match self.current_duration(playlist) {
            Some(duration) => (self.position_seconds / duration * 100.0).clamp(0.0, 100.0),
            None => 0.0,
        }
    }

    fn current_duration(&self, playlist: &PlaylistProjection) -> Option<f64> {
        self.current
            .and_then(|index| playlist.get(index))
            .and_then(|track| track.duration_seconds)
            .filter(|duration| duration.is_finite() && *duration > 0.0)
    }
}
