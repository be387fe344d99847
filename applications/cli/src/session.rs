//! Scripted session runner

use crate::script::Step;
use media_player::sim::SimEnvironment;
use media_player::{MediaPlayer, PlayerConfig, PlayerSnapshot, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A step the player refused
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub line: usize,
    pub error: String,
}

/// What the control displays show at the end of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub current_time: Option<String>,
    pub duration: Option<String>,
    pub play_button: Option<String>,
    pub loop_button: Option<String>,
    pub level_meter: Option<f64>,
}

/// Outcome of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub snapshot: PlayerSnapshot,
    pub display: DisplayState,
    pub frames_drawn: usize,
    pub rejected: Vec<Rejection>,
}

/// Attach a player to a fresh simulation host and run every step
///
/// Rejected commands are recorded and the session continues; only a failed
/// attach aborts it.
pub fn run_session(config: PlayerConfig, steps: &[(usize, Step)]) -> Result<SessionReport> {
    let env = SimEnvironment::new();
    let mut player = MediaPlayer::new(env.bindings(), config);
    let mut rejected = Vec::new();

    // Attributes before attach behave like markup attributes
    let first_other = steps
        .iter()
        .position(|(_, step)| !matches!(step, Step::Attribute { .. }))
        .unwrap_or(steps.len());
    let (initial, rest) = steps.split_at(first_other);

    for (line, step) in initial {
        apply(&env, &mut player, step).unwrap_or_else(|e| reject(&mut rejected, *line, e));
    }
    player.attach()?;
    info!("Player attached, running {} steps", rest.len());

    for (line, step) in rest {
        debug!("Line {}: {:?}", line, step);
        apply(&env, &mut player, step).unwrap_or_else(|e| reject(&mut rejected, *line, e));
    }

    let controls = &env.controls;
    Ok(SessionReport {
        snapshot: player.snapshot(),
        display: DisplayState {
            current_time: controls.current_time.text(),
            duration: controls.duration.text().filter(|d| !d.is_empty()),
            play_button: controls.play_button.text(),
            loop_button: controls.loop_button.text(),
            level_meter: controls.level_meter.number(),
        },
        frames_drawn: env.surface.frames_drawn(),
        rejected,
    })
}

fn apply(env: &SimEnvironment, player: &mut MediaPlayer, step: &Step) -> Result<()> {
    match step {
        Step::Attribute { name, value } => player.attribute_changed(name, value.as_deref()),
        Step::Ui(event) => player.handle_ui_event(event.clone()),
        Step::Metadata(duration) => {
            env.load_metadata(player, *duration);
            Ok(())
        }
        Step::Advance(seconds) => {
            env.advance(player, *seconds);
            Ok(())
        }
        Step::Frames(count) => {
            for _ in 0..*count {
                if env.run_frames(player) == 0 {
                    debug!("No frame pending");
                    break;
                }
            }
            Ok(())
        }
    }
}

fn reject(rejected: &mut Vec<Rejection>, line: usize, error: media_player::PlayerError) {
    warn!("Line {} rejected: {}", line, error);
    rejected.push(Rejection {
        line,
        error: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use media_player::Lifecycle;

    fn run(script: &str) -> SessionReport {
        let steps = parse_script(script).unwrap();
        run_session(PlayerConfig::default(), &steps).unwrap()
    }

    #[test]
    fn leading_attributes_apply_on_attach() {
        let report = run("attr src a.ogg\nattr volume 0.3\nui play");

        assert_eq!(report.snapshot.lifecycle, Lifecycle::Attached);
        assert_eq!(report.snapshot.source.as_deref(), Some("a.ogg"));
        assert_eq!(report.snapshot.audio.volume, 0.3);
        assert!(report.snapshot.transport.playing);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn rejected_steps_are_recorded() {
        let report = run("ui play\nui gain 3.5\nattr balance -1.5\nui gain 2");

        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].line, 2);
        assert_eq!(report.rejected[1].line, 3);
        assert_eq!(report.snapshot.audio.gain, 2.0);
    }

    #[test]
    fn frames_stop_when_playback_ends() {
        let report = run("metadata 4\nui play\nframes 2\nadvance 5\nframes 3");

        assert_eq!(report.frames_drawn, 2);
        assert!(!report.snapshot.animating);
        assert_eq!(report.display.play_button.as_deref(), Some("Play"));
        assert_eq!(report.display.current_time.as_deref(), Some("00:04"));
        assert_eq!(report.display.duration.as_deref(), Some("00:04"));
    }
}
