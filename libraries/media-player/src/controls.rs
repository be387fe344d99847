//! Display controls bound to the player

use crate::host::{AudioHost, Control, DrawingSurface, FrameScheduler, MediaElement};

/// Statically typed set of display controls, bound once at construction
pub struct Controls {
    /// Seek slider; its range follows the media duration
    pub progress: Box<dyn Control>,

    /// Elapsed time text
    pub current_time: Box<dyn Control>,

    /// Duration text
    pub duration: Box<dyn Control>,

    pub volume: Box<dyn Control>,
    pub gain: Box<dyn Control>,
    pub balance: Box<dyn Control>,

    /// VU meter fed by the bar visualization's mean level
    pub level_meter: Box<dyn Control>,

    /// Play/pause button caption
    pub play_button: Box<dyn Control>,

    /// Loop button caption
    pub loop_button: Box<dyn Control>,
}

/// Everything the player consumes from its host
pub struct HostBindings {
    pub media: Box<dyn MediaElement>,
    pub audio: Box<dyn AudioHost>,
    pub surface: Box<dyn DrawingSurface>,
    pub scheduler: Box<dyn FrameScheduler>,
    pub controls: Controls,
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` past the hour
///
/// Fractions are truncated; negative or non-finite input shows `00:00`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(59.9), "00:59");
        assert_eq!(format_timestamp(120.0), "02:00");
        assert_eq!(format_timestamp(754.2), "12:34");
    }

    #[test]
    fn shows_hours_only_when_needed() {
        assert_eq!(format_timestamp(3600.0), "01:00:00");
        assert_eq!(format_timestamp(3723.0), "01:02:03");
        assert_eq!(format_timestamp(36000.0), "10:00:00");
    }

    #[test]
    fn unusable_input_shows_zero() {
        assert_eq!(format_timestamp(-5.0), "00:00");
        assert_eq!(format_timestamp(f64::NAN), "00:00");
        assert_eq!(format_timestamp(f64::INFINITY), "00:00");
    }
}
