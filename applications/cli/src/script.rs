//! Session script parser
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! attr volume 0.5        # attribute change (no value: attribute removed)
//! attr src song.ogg
//! ui play                # play | loop | rollback | forward | backward | visualization
//! ui gain 2.5            # progress | volume | gain | balance take a value
//! metadata 180           # media metadata loaded with this duration
//! advance 12.5           # playback clock moves (may reach the end)
//! frames 3               # fire the pending animation frame 3 times
//! ```

use media_player::{RawValue, UiEvent};
use thiserror::Error;

/// One scripted step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Attribute { name: String, value: Option<String> },
    Ui(UiEvent),
    Metadata(f64),
    Advance(f64),
    Frames(usize),
}

#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// Parse a script into `(line number, step)` pairs
pub fn parse_script(source: &str) -> Result<Vec<(usize, Step)>, ScriptError> {
    let mut steps = Vec::new();
    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw_line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let step = parse_step(content).map_err(|message| ScriptError { line, message })?;
        steps.push((line, step));
    }
    Ok(steps)
}

fn parse_step(content: &str) -> Result<Step, String> {
    let (keyword, rest) = match content.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (content, ""),
    };

    match keyword {
        "attr" => {
            let (name, value) = match rest.split_once(char::is_whitespace) {
                Some((name, value)) => (name, Some(value.trim().to_string())),
                None => (rest, None),
            };
            if name.is_empty() {
                return Err("attr needs an attribute name".to_string());
            }
            Ok(Step::Attribute {
                name: name.to_string(),
                value,
            })
        }
        "ui" => parse_ui(rest).map(Step::Ui),
        "metadata" => parse_number(rest).map(Step::Metadata),
        "advance" => parse_number(rest).map(Step::Advance),
        "frames" => rest
            .parse::<usize>()
            .map(Step::Frames)
            .map_err(|_| format!("frames needs a count, got {rest:?}")),
        other => Err(format!("unknown step {other:?}")),
    }
}

fn parse_ui(rest: &str) -> Result<UiEvent, String> {
    let (event, value) = match rest.split_once(char::is_whitespace) {
        Some((event, value)) => (event, Some(value.trim())),
        None => (rest, None),
    };

    // Numeric-looking values behave like a control; anything else reaches the
    // validator as text
    let raw = || -> Result<RawValue, String> {
        let value = value.ok_or_else(|| format!("ui {event} needs a value"))?;
        Ok(value
            .parse::<f64>()
            .map(RawValue::Number)
            .unwrap_or_else(|_| RawValue::from(value)))
    };

    match event {
        "play" => Ok(UiEvent::PlayClicked),
        "loop" => Ok(UiEvent::LoopClicked),
        "rollback" => Ok(UiEvent::RollbackClicked),
        "forward" => Ok(UiEvent::SkipForwardClicked),
        "backward" => Ok(UiEvent::SkipBackwardClicked),
        "visualization" => Ok(UiEvent::VisualizationClicked),
        "progress" => raw().map(UiEvent::ProgressInput),
        "volume" => raw().map(UiEvent::VolumeInput),
        "gain" => raw().map(UiEvent::GainInput),
        "balance" => raw().map(UiEvent::BalanceInput),
        other => Err(format!("unknown ui event {other:?}")),
    }
}

fn parse_number(rest: &str) -> Result<f64, String> {
    rest.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("expected a number, got {rest:?}"))
}
