//! Parameter validation
//!
//! Pure functions that coerce a raw control/attribute value to a number and
//! check it against the parameter's closed range. Every value pushed into the
//! transport or the signal graph goes through one of these first.

use crate::error::{Parameter, PlayerError, Result};
use crate::types::{RawValue, VisualizationMode};
use std::ops::RangeInclusive;

/// Playback volume range
pub const VOLUME_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Gain node multiplier range
pub const GAIN_RANGE: RangeInclusive<f64> = 0.0..=3.0;

/// Stereo balance range
pub const BALANCE_RANGE: RangeInclusive<f64> = -1.0..=1.0;

fn number(param: Parameter, raw: &RawValue) -> Result<f64> {
    raw.as_number()
        .ok_or_else(|| PlayerError::invalid(param, raw, "not a finite number"))
}

fn in_range(param: Parameter, raw: &RawValue, range: &RangeInclusive<f64>) -> Result<f64> {
    let value = number(param, raw)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(PlayerError::invalid(
            param,
            raw,
            format!("outside [{}, {}]", range.start(), range.end()),
        ))
    }
}

/// Validate a volume (0.0 - 1.0)
pub fn validate_volume(raw: &RawValue) -> Result<f64> {
    in_range(Parameter::Volume, raw, &VOLUME_RANGE)
}

/// Validate a gain multiplier (0.0 - 3.0)
pub fn validate_gain(raw: &RawValue) -> Result<f64> {
    in_range(Parameter::Gain, raw, &GAIN_RANGE)
}

/// Validate a stereo balance (-1.0 - 1.0)
pub fn validate_balance(raw: &RawValue) -> Result<f64> {
    in_range(Parameter::Balance, raw, &BALANCE_RANGE)
}

/// Validate a seek target against the media duration
///
/// While the duration is unknown only the lower bound applies.
pub fn validate_seek(raw: &RawValue, duration: Option<f64>) -> Result<f64> {
    let value = number(Parameter::CurrentTime, raw)?;
    if value < 0.0 {
        return Err(PlayerError::invalid(
            Parameter::CurrentTime,
            raw,
            "negative position",
        ));
    }
    match duration {
        Some(duration) if value > duration => Err(PlayerError::invalid(
            Parameter::CurrentTime,
            raw,
            format!("exceeds duration {duration}"),
        )),
        _ => Ok(value),
    }
}

/// Validate a visualization mode name (`bar` or `wave`, case-insensitive)
pub fn validate_visualization_mode(raw: &str) -> Result<VisualizationMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "bar" => Ok(VisualizationMode::Bar),
        "wave" => Ok(VisualizationMode::Wave),
        _ => Err(PlayerError::invalid(
            Parameter::VisualizationMode,
            raw,
            "expected \"bar\" or \"wave\"",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_bounds_are_inclusive() {
        assert_eq!(validate_volume(&0.0.into()).unwrap(), 0.0);
        assert_eq!(validate_volume(&1.0.into()).unwrap(), 1.0);
        assert!(validate_volume(&1.01.into()).is_err());
        assert!(validate_volume(&(-0.01).into()).is_err());
    }

    #[test]
    fn gain_rejects_just_outside_range() {
        assert_eq!(validate_gain(&"2.5".into()).unwrap(), 2.5);
        assert!(validate_gain(&(-0.1).into()).is_err());
        assert!(validate_gain(&3.1.into()).is_err());
    }

    #[test]
    fn balance_accepts_full_pan() {
        assert_eq!(validate_balance(&"-1".into()).unwrap(), -1.0);
        assert_eq!(validate_balance(&1.0.into()).unwrap(), 1.0);
        assert!(validate_balance(&1.5.into()).is_err());
        assert!(validate_balance(&"-2".into()).is_err());
    }

    #[test]
    fn non_numeric_input_fails_closed() {
        let err = validate_volume(&"loud".into()).unwrap_err();
        assert!(matches!(
            err,
            PlayerError::InvalidParameter {
                param: Parameter::Volume,
                ..
            }
        ));
        assert!(validate_gain(&f64::NAN.into()).is_err());
    }

    #[test]
    fn seek_checks_duration_when_known() {
        assert_eq!(validate_seek(&120.0.into(), Some(120.0)).unwrap(), 120.0);
        assert!(validate_seek(&121.0.into(), Some(120.0)).is_err());
        assert!(validate_seek(&(-1.0).into(), Some(120.0)).is_err());
    }

    #[test]
    fn seek_with_unknown_duration_checks_lower_bound_only() {
        assert_eq!(validate_seek(&5000.0.into(), None).unwrap(), 5000.0);
        assert!(validate_seek(&(-0.5).into(), None).is_err());
    }

    #[test]
    fn visualization_mode_names() {
        assert_eq!(
            validate_visualization_mode("wave").unwrap(),
            VisualizationMode::Wave
        );
        assert_eq!(
            validate_visualization_mode(" BAR ").unwrap(),
            VisualizationMode::Bar
        );
        assert!(validate_visualization_mode("spectrogram").is_err());
        assert!(validate_visualization_mode("").is_err());
    }
}
