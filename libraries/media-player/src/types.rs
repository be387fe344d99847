//! Core types shared by the player components

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw value as received from a control or an attribute
///
/// Controls report numbers, attributes report strings. Both are coerced to a
/// number by the validator.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Coerce to a finite number
    ///
    /// Text is trimmed before parsing. NaN and infinities yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Value pushed to a display control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisplayValue {
    Number(f64),
    Text(String),
}

impl DisplayValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DisplayValue::Number(v) => Some(*v),
            DisplayValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DisplayValue::Number(_) => None,
            DisplayValue::Text(s) => Some(s),
        }
    }
}

impl From<DisplayValue> for RawValue {
    fn from(value: DisplayValue) -> Self {
        match value {
            DisplayValue::Number(v) => RawValue::Number(v),
            DisplayValue::Text(s) => RawValue::Text(s),
        }
    }
}

/// Visualization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    /// Per-frequency-bin magnitude bars plus level meter
    #[default]
    Bar,

    /// Connected line across the bins
    Wave,
}

impl VisualizationMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            VisualizationMode::Bar => VisualizationMode::Wave,
            VisualizationMode::Wave => VisualizationMode::Bar,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VisualizationMode::Bar => "bar",
            VisualizationMode::Wave => "wave",
        }
    }
}

impl fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio parameters mirrored 1:1 into the media element and graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioParams {
    /// Playback volume (0.0 - 1.0)
    pub volume: f64,

    /// Gain node multiplier (0.0 - 3.0)
    pub gain: f64,

    /// Stereo balance (-1.0 = left, 1.0 = right)
    pub balance: f64,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            gain: 1.0,
            balance: 0.0,
        }
    }
}

/// Player lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Constructed, graph not built yet
    Created,

    /// Graph built, accepting commands
    Attached,

    /// Graph construction failed; non-functional
    Failed,

    /// Torn down; graph released
    Detached,
}

/// Transport portion of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportSnapshot {
    pub current_time: f64,
    pub duration: Option<f64>,
    pub playing: bool,
    pub looping: bool,
}

/// Serializable view of the whole player state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub lifecycle: Lifecycle,
    pub source: Option<String>,
    pub transport: TransportSnapshot,
    pub audio: AudioParams,
    pub visualization: VisualizationMode,

    /// Whether a visualization frame is pending
    pub animating: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_values_are_trimmed_and_parsed() {
        assert_eq!(RawValue::from(" 0.25 ").as_number(), Some(0.25));
        assert_eq!(RawValue::from("-1").as_number(), Some(-1.0));
        assert_eq!(RawValue::from("loud").as_number(), None);
        assert_eq!(RawValue::from("").as_number(), None);
    }

    #[test]
    fn non_finite_values_are_not_numbers() {
        assert_eq!(RawValue::from(f64::NAN).as_number(), None);
        assert_eq!(RawValue::from(f64::INFINITY).as_number(), None);
        assert_eq!(RawValue::from("inf").as_number(), None);
        assert_eq!(RawValue::from("NaN").as_number(), None);
    }

    #[test]
    fn visualization_mode_toggles() {
        assert_eq!(VisualizationMode::Bar.toggled(), VisualizationMode::Wave);
        assert_eq!(VisualizationMode::Wave.toggled(), VisualizationMode::Bar);
        assert_eq!(VisualizationMode::default(), VisualizationMode::Bar);
    }

    #[test]
    fn default_audio_params() {
        let params = AudioParams::default();
        assert_eq!(params.volume, 1.0);
        assert_eq!(params.gain, 1.0);
        assert_eq!(params.balance, 0.0);
    }
}
