//! Commands and their two trigger channels
//!
//! UI control events and attribute changes are both translated into a
//! [`PlayerCommand`] and dispatched through the same validated entry points.

use crate::types::RawValue;

/// Attributes observed on the host element
pub const OBSERVED_ATTRIBUTES: [&str; 6] = [
    "src",
    "volume",
    "current-time",
    "gain",
    "balance",
    "equalize-type",
];

/// A logical player command
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// `None` re-pushes the current volume
    SetVolume(Option<RawValue>),

    /// `None` re-pushes the current gain
    SetGain(Option<RawValue>),

    SetBalance(RawValue),

    /// Seek; `resume` restarts paused playback (scrub control behaviour)
    Seek { position: RawValue, resume: bool },

    /// Move by signed seconds
    ShiftTime(f64),

    TogglePlay,
    ToggleLoop,

    /// `None` toggles between the two modes
    SetVisualizationMode(Option<String>),

    /// Back to the start
    Rollback,

    /// Load a new media URI
    SetSource(String),
}

/// Events emitted by the display controls
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Progress slider dragged
    ProgressInput(RawValue),
    VolumeInput(RawValue),
    GainInput(RawValue),
    BalanceInput(RawValue),
    PlayClicked,
    LoopClicked,
    RollbackClicked,
    SkipForwardClicked,
    SkipBackwardClicked,

    /// Visualization surface clicked
    VisualizationClicked,
}

impl UiEvent {
    /// Translate to a command; skip buttons move by `skip_seconds`
    pub fn into_command(self, skip_seconds: f64) -> PlayerCommand {
        match self {
            UiEvent::ProgressInput(position) => PlayerCommand::Seek {
                position,
                resume: true,
            },
            UiEvent::VolumeInput(v) => PlayerCommand::SetVolume(Some(v)),
            UiEvent::GainInput(v) => PlayerCommand::SetGain(Some(v)),
            UiEvent::BalanceInput(v) => PlayerCommand::SetBalance(v),
            UiEvent::PlayClicked => PlayerCommand::TogglePlay,
            UiEvent::LoopClicked => PlayerCommand::ToggleLoop,
            UiEvent::RollbackClicked => PlayerCommand::Rollback,
            UiEvent::SkipForwardClicked => PlayerCommand::ShiftTime(skip_seconds),
            UiEvent::SkipBackwardClicked => PlayerCommand::ShiftTime(-skip_seconds),
            UiEvent::VisualizationClicked => PlayerCommand::SetVisualizationMode(None),
        }
    }
}

/// Translate an attribute change into a command
///
/// Returns `None` for attributes the player does not observe and for removed
/// attributes that have no "current value" meaning (everything except
/// `volume` and `gain`).
pub fn attribute_command(name: &str, value: Option<&str>) -> Option<PlayerCommand> {
    let raw = value.map(RawValue::from);
    match (name, raw) {
        ("volume", raw) => Some(PlayerCommand::SetVolume(raw)),
        ("gain", raw) => Some(PlayerCommand::SetGain(raw)),
        ("balance", Some(raw)) => Some(PlayerCommand::SetBalance(raw)),
        ("current-time", Some(position)) => Some(PlayerCommand::Seek {
            position,
            resume: false,
        }),
        ("equalize-type", Some(_)) => Some(PlayerCommand::SetVisualizationMode(
            value.map(str::to_string),
        )),
        ("src", Some(_)) => value.map(|src| PlayerCommand::SetSource(src.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_input_resumes_but_attribute_seek_does_not() {
        assert_eq!(
            UiEvent::ProgressInput(RawValue::Number(12.0)).into_command(10.0),
            PlayerCommand::Seek {
                position: RawValue::Number(12.0),
                resume: true
            }
        );
        assert_eq!(
            attribute_command("current-time", Some("12")),
            Some(PlayerCommand::Seek {
                position: RawValue::from("12"),
                resume: false
            })
        );
    }

    #[test]
    fn skip_buttons_use_configured_step() {
        assert_eq!(
            UiEvent::SkipForwardClicked.into_command(10.0),
            PlayerCommand::ShiftTime(10.0)
        );
        assert_eq!(
            UiEvent::SkipBackwardClicked.into_command(5.0),
            PlayerCommand::ShiftTime(-5.0)
        );
    }

    #[test]
    fn removed_volume_and_gain_repush_current_value() {
        assert_eq!(
            attribute_command("volume", None),
            Some(PlayerCommand::SetVolume(None))
        );
        assert_eq!(
            attribute_command("gain", None),
            Some(PlayerCommand::SetGain(None))
        );
        assert_eq!(attribute_command("balance", None), None);
        assert_eq!(attribute_command("equalize-type", None), None);
    }

    #[test]
    fn unobserved_attributes_are_ignored() {
        assert_eq!(attribute_command("class", Some("dark")), None);
        assert_eq!(attribute_command("Volume", Some("0.5")), None);
    }

    #[test]
    fn every_observed_attribute_maps_to_a_command() {
        for name in OBSERVED_ATTRIBUTES {
            assert!(
                attribute_command(name, Some("1")).is_some(),
                "{name} not mapped"
            );
        }
    }
}
