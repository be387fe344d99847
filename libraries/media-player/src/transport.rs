//! Transport controller
//!
//! Wraps play/pause/seek/loop on the media element and turns the element's
//! notifications into transport events for the synchronizer.

use crate::error::Result;
use crate::host::MediaElement;
use crate::types::TransportSnapshot;
use tracing::debug;

/// Notifications emitted by the media element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Periodic position update
    TimeUpdate { current_time: f64 },

    /// Metadata loaded, duration now known (once per source)
    LoadedMetadata { duration: f64 },

    /// Playback reached the end of a non-looping source
    Ended,
}

/// Transport events consumed by the synchronizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Refresh the time display
    Position(f64),

    /// Initialize the seek range and duration display
    DurationKnown(f64),

    /// Playback stopped at the end of the media
    Finished,
}

/// Play/pause/seek/loop state of the media element
pub struct Transport {
    media: Box<dyn MediaElement>,
    duration: Option<f64>,
    source: Option<String>,
}

impl Transport {
    pub fn new(media: Box<dyn MediaElement>) -> Self {
        let duration = media.duration().filter(|d| d.is_finite() && *d >= 0.0);
        Self {
            media,
            duration,
            source: None,
        }
    }

    /// Start playback; no-op when already playing
    ///
    /// Returns whether the state changed.
    pub fn play(&mut self) -> Result<bool> {
        if !self.media.is_paused() {
            return Ok(false);
        }
        self.media.play()?;
        debug!("Transport: playing at {:.2}s", self.media.current_time());
        Ok(true)
    }

    /// Pause playback; no-op when already paused
    ///
    /// Returns whether the state changed.
    pub fn pause(&mut self) -> Result<bool> {
        if self.media.is_paused() {
            return Ok(false);
        }
        self.media.pause()?;
        debug!("Transport: paused at {:.2}s", self.media.current_time());
        Ok(true)
    }

    pub fn is_playing(&self) -> bool {
        !self.media.is_paused()
    }

    pub fn current_time(&self) -> f64 {
        self.media.current_time()
    }

    /// Duration, `None` until the metadata is loaded
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Move to an already validated position
    pub fn seek(&mut self, seconds: f64) {
        self.media.set_current_time(seconds);
    }

    /// Move by `delta` seconds, clamped to `[0, duration]`
    ///
    /// Returns the new position.
    pub fn shift(&mut self, delta: f64) -> f64 {
        let mut target = (self.media.current_time() + delta).max(0.0);
        if let Some(duration) = self.duration {
            target = target.min(duration);
        }
        self.media.set_current_time(target);
        target
    }

    pub fn is_looping(&self) -> bool {
        self.media.is_looping()
    }

    /// Flip the loop flag, returning the new value
    pub fn toggle_loop(&mut self) -> bool {
        let looping = !self.media.is_looping();
        self.media.set_looping(looping);
        looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.media.set_looping(looping);
    }

    pub fn volume(&self) -> f64 {
        self.media.volume()
    }

    /// Push an already validated playback volume
    pub fn set_volume(&mut self, volume: f64) {
        self.media.set_volume(volume);
    }

    /// Load a new source; duration becomes unknown until its metadata arrives
    pub fn load(&mut self, src: &str) -> Result<()> {
        self.media.load(src)?;
        self.duration = None;
        self.source = Some(src.to_string());
        debug!("Transport: loading {}", src);
        Ok(())
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Translate a media notification
    ///
    /// Invalid durations (NaN, infinite for live streams, negative) leave the
    /// duration unknown and produce no event.
    pub fn on_media_event(&mut self, event: MediaEvent) -> Option<TransportEvent> {
        match event {
            MediaEvent::TimeUpdate { current_time } => Some(TransportEvent::Position(current_time)),
            MediaEvent::LoadedMetadata { duration } => {
                if !duration.is_finite() || duration < 0.0 {
                    debug!("Transport: ignoring unusable duration {}", duration);
                    return None;
                }
                self.duration = Some(duration);
                Some(TransportEvent::DurationKnown(duration))
            }
            MediaEvent::Ended => Some(TransportEvent::Finished),
        }
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            current_time: self.current_time(),
            duration: self.duration,
            playing: self.is_playing(),
            looping: self.is_looping(),
        }
    }
}
