//! Player configuration

use crate::error::{PlayerError, Result};
use crate::types::{RawValue, VisualizationMode};
use crate::validate;
use serde::{Deserialize, Serialize};

/// Configuration for a player instance
///
/// Every field has a default so partial TOML/JSON documents deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Media URI loaded on attach
    #[serde(default)]
    pub src: Option<String>,

    #[serde(default)]
    pub audio: AudioSettings,

    #[serde(default)]
    pub transport: TransportSettings,

    #[serde(default)]
    pub visualizer: VisualizerSettings,

    #[serde(default)]
    pub labels: LabelSettings,
}

/// Initial audio parameters, validated on attach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "default_volume")]
    pub volume: f64,

    #[serde(default = "default_gain")]
    pub gain: f64,

    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Seconds moved by the skip forward/backward buttons
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,

    /// Start playing as soon as the player is attached
    #[serde(default)]
    pub autoplay: bool,

    /// Initial loop flag
    #[serde(default)]
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerSettings {
    #[serde(default)]
    pub mode: VisualizationMode,

    /// Analyser FFT size; the loop reads `fft_size / 2` bins
    #[serde(default = "default_fft_size")]
    pub fft_size: u32,

    /// Bar width in surface units
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,

    #[serde(default = "default_color")]
    pub bar_color: String,

    #[serde(default = "default_color")]
    pub wave_color: String,
}

/// Button captions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSettings {
    #[serde(default = "default_play_label")]
    pub play: String,

    #[serde(default = "default_pause_label")]
    pub pause: String,

    #[serde(default = "default_loop_off_label")]
    pub loop_off: String,

    #[serde(default = "default_loop_on_label")]
    pub loop_on: String,
}

impl PlayerConfig {
    /// Check initial values before they reach the graph
    pub fn validate(&self) -> Result<()> {
        validate::validate_volume(&RawValue::Number(self.audio.volume))?;
        validate::validate_gain(&RawValue::Number(self.audio.gain))?;
        validate::validate_balance(&RawValue::Number(self.audio.balance))?;

        let fft_size = self.visualizer.fft_size;
        if !fft_size.is_power_of_two() || !(32..=32768).contains(&fft_size) {
            return Err(PlayerError::Config(format!(
                "FFT size must be a power of two in 32..=32768, got {fft_size}"
            )));
        }

        if !(self.visualizer.bar_width.is_finite() && self.visualizer.bar_width > 0.0) {
            return Err(PlayerError::Config(format!(
                "Bar width must be positive, got {}",
                self.visualizer.bar_width
            )));
        }

        Ok(())
    }
}

// Default values
fn default_volume() -> f64 {
    1.0
}

fn default_gain() -> f64 {
    1.0
}

fn default_skip_seconds() -> f64 {
    10.0
}

fn default_fft_size() -> u32 {
    2048
}

fn default_bar_width() -> f64 {
    2.0
}

fn default_color() -> String {
    "#ffffff".to_string()
}

fn default_play_label() -> String {
    "Play".to_string()
}

fn default_pause_label() -> String {
    "Pause".to_string()
}

fn default_loop_off_label() -> String {
    "Loop".to_string()
}

fn default_loop_on_label() -> String {
    "Loop(on)".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            src: None,
            audio: AudioSettings::default(),
            transport: TransportSettings::default(),
            visualizer: VisualizerSettings::default(),
            labels: LabelSettings::default(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            gain: default_gain(),
            balance: 0.0,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            skip_seconds: default_skip_seconds(),
            autoplay: false,
            looping: false,
        }
    }
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            mode: VisualizationMode::Bar,
            fft_size: default_fft_size(),
            bar_width: default_bar_width(),
            bar_color: default_color(),
            wave_color: default_color(),
        }
    }
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            play: default_play_label(),
            pause: default_pause_label(),
            loop_off: default_loop_off_label(),
            loop_on: default_loop_on_label(),
        }
    }
}
