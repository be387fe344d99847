//! Media player - control-state synchronization
//!
//! Owns the player state and is the single place where it changes. UI events
//! and attribute changes become [`PlayerCommand`]s and go through the same
//! validated entry points; each entry point validates first, then mutates the
//! transport or graph, then redraws exactly the controls it affects.

use crate::{
    commands::{attribute_command, PlayerCommand, UiEvent},
    config::PlayerConfig,
    controls::{format_timestamp, Controls, HostBindings},
    error::{Parameter, PlayerError, Result},
    graph::SignalGraph,
    host::{AudioHost, DrawingSurface, FrameHandle, FrameScheduler},
    transport::{MediaEvent, Transport, TransportEvent},
    types::{AudioParams, DisplayValue, Lifecycle, PlayerSnapshot, RawValue, VisualizationMode},
    validate,
    visualizer::Visualizer,
};
use tracing::{debug, error, trace, warn};

/// Embeddable audio player core
///
/// Lifecycle: [`new`](Self::new) → [`attach`](Self::attach) →
/// commands/events/frames → [`detach`](Self::detach). Commands issued before
/// attach fail with [`PlayerError::NotAttached`], except attribute changes,
/// which are queued and applied on attach. After a failed attach or a detach
/// every command fails with [`PlayerError::Unavailable`].
pub struct MediaPlayer {
    config: PlayerConfig,
    lifecycle: Lifecycle,

    transport: Transport,
    audio: Box<dyn AudioHost>,
    graph: Option<SignalGraph>,
    params: AudioParams,

    visualizer: Visualizer,
    surface: Box<dyn DrawingSurface>,
    scheduler: Box<dyn FrameScheduler>,

    controls: Controls,

    /// Latest valid command per attribute received before attach
    pending_attributes: Vec<(String, PlayerCommand)>,
}

impl MediaPlayer {
    /// Create a player bound to its host; nothing is built until attach
    pub fn new(bindings: HostBindings, config: PlayerConfig) -> Self {
        let HostBindings {
            media,
            audio,
            surface,
            scheduler,
            controls,
        } = bindings;

        Self {
            visualizer: Visualizer::new(config.visualizer.clone()),
            config,
            lifecycle: Lifecycle::Created,
            transport: Transport::new(media),
            audio,
            graph: None,
            params: AudioParams::default(),
            surface,
            scheduler,
            controls,
            pending_attributes: Vec::new(),
        }
    }

    // ===== Lifecycle =====

    /// Build the signal graph and initialize every control
    ///
    /// A graph construction failure is fatal: the player becomes
    /// [`Lifecycle::Failed`] and the error is returned to the host.
    pub fn attach(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Attached => return Ok(()),
            Lifecycle::Failed | Lifecycle::Detached => return Err(PlayerError::Unavailable),
        }

        let graph = match self.build_graph() {
            Ok(graph) => graph,
            Err(e) => {
                error!("Player attach failed, instance disabled: {}", e);
                self.lifecycle = Lifecycle::Failed;
                return Err(e);
            }
        };

        self.visualizer
            .allocate(self.audio.frequency_bin_count(graph.analyser()));
        self.graph = Some(graph);
        self.lifecycle = Lifecycle::Attached;

        self.transport.set_volume(self.params.volume);
        self.transport.set_looping(self.config.transport.looping);
        self.controls
            .volume
            .set_value(DisplayValue::Number(self.params.volume));
        self.controls
            .gain
            .set_value(DisplayValue::Number(self.params.gain));
        self.controls
            .balance
            .set_value(DisplayValue::Number(self.params.balance));
        self.controls
            .duration
            .set_value(DisplayValue::Text(String::new()));
        self.show_position(self.transport.current_time());
        if let Some(duration) = self.transport.duration() {
            self.show_duration(duration);
        }

        if let Some(src) = self.config.src.clone() {
            if let Err(e) = self.set_source(&src) {
                warn!("Failed to load configured source {}: {}", src, e);
            }
        }

        for (_, command) in std::mem::take(&mut self.pending_attributes) {
            if let Err(e) = self.dispatch(command) {
                warn!("Skipping initial attribute: {}", e);
            }
        }

        if self.config.transport.autoplay {
            if let Err(e) = self.play() {
                warn!("Autoplay refused: {}", e);
            }
        }

        if self.transport.is_playing() {
            self.visualizer.start(self.scheduler.as_mut());
        }
        self.sync_play_label();
        self.sync_loop_label();

        debug!("Player attached");
        Ok(())
    }

    /// Cancel the visualization loop, stop playback and release the graph
    pub fn detach(&mut self) {
        if self.lifecycle == Lifecycle::Detached {
            return;
        }

        self.visualizer.stop(self.scheduler.as_mut());
        if let Err(e) = self.transport.pause() {
            warn!("Failed to pause on detach: {}", e);
        }
        if let Some(graph) = self.graph.take() {
            graph.release(self.audio.as_mut());
        }
        self.pending_attributes.clear();
        self.lifecycle = Lifecycle::Detached;
        debug!("Player detached");
    }

    fn build_graph(&mut self) -> Result<SignalGraph> {
        self.config.validate()?;

        let graph = SignalGraph::build(self.audio.as_mut(), self.config.visualizer.fft_size)?;
        self.params = AudioParams {
            volume: self.config.audio.volume,
            gain: self.config.audio.gain,
            balance: self.config.audio.balance,
        };
        let pushed = graph
            .set_gain(self.audio.as_mut(), self.params.gain)
            .and_then(|()| graph.set_balance(self.audio.as_mut(), self.params.balance));
        if let Err(e) = pushed {
            graph.release(self.audio.as_mut());
            return Err(e);
        }
        Ok(graph)
    }

    fn attached_graph(&self) -> Result<SignalGraph> {
        match (self.lifecycle, self.graph) {
            (Lifecycle::Attached, Some(graph)) => Ok(graph),
            (Lifecycle::Created, _) => Err(PlayerError::NotAttached),
            _ => Err(PlayerError::Unavailable),
        }
    }

    // ===== Channels =====

    /// Apply a command; the single dispatch path for both channels
    pub fn dispatch(&mut self, command: PlayerCommand) -> Result<()> {
        trace!("Dispatching {:?}", command);
        match command {
            PlayerCommand::SetVolume(raw) => self.set_volume(raw),
            PlayerCommand::SetGain(raw) => self.set_gain(raw),
            PlayerCommand::SetBalance(raw) => self.set_balance(raw),
            PlayerCommand::Seek { position, resume } => {
                self.seek_to(position)?;
                if resume {
                    self.play()?;
                }
                Ok(())
            }
            PlayerCommand::ShiftTime(delta) => self.shift_time(delta),
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::ToggleLoop => self.toggle_loop(),
            PlayerCommand::SetVisualizationMode(mode) => {
                self.set_visualization_mode(mode.as_deref())
            }
            PlayerCommand::Rollback => self.rollback(),
            PlayerCommand::SetSource(src) => self.set_source(&src),
        }
    }

    /// UI channel: a control emitted an input or click event
    pub fn handle_ui_event(&mut self, event: UiEvent) -> Result<()> {
        let command = event.into_command(self.config.transport.skip_seconds);
        self.dispatch(command)
    }

    /// Attribute channel: the host element's attribute changed
    ///
    /// Unobserved attributes are ignored. Before attach, commands are queued
    /// and applied on attach in the order their attributes last changed.
    pub fn attribute_changed(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let Some(command) = attribute_command(name, value) else {
            trace!("Ignoring attribute {}", name);
            return Ok(());
        };

        if self.lifecycle == Lifecycle::Created {
            self.queue_attribute(name, command);
            return Ok(());
        }
        self.dispatch(command)
    }

    /// Keep one queued command per attribute
    ///
    /// Invalid values are skipped, so an earlier valid value survives them. A
    /// removal only re-pushes the current value and never displaces a queued one.
    fn queue_attribute(&mut self, name: &str, command: PlayerCommand) {
        if let Err(e) = precheck(&command) {
            warn!("Skipping initial attribute: {}", e);
            return;
        }
        let queued = self.pending_attributes.iter().position(|(n, _)| n == name);
        let removal = matches!(
            command,
            PlayerCommand::SetVolume(None) | PlayerCommand::SetGain(None)
        );
        match queued {
            Some(_) if removal => {}
            Some(index) => {
                self.pending_attributes.remove(index);
                self.pending_attributes.push((name.to_string(), command));
            }
            None => self.pending_attributes.push((name.to_string(), command)),
        }
    }

    /// Media element notification (time update, metadata, end)
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.lifecycle != Lifecycle::Attached {
            return;
        }

        match self.transport.on_media_event(event) {
            Some(TransportEvent::Position(seconds)) => self.show_position(seconds),
            Some(TransportEvent::DurationKnown(duration)) => {
                self.show_duration(duration);
                // Positions accepted while the duration was unknown
                if self.transport.current_time() > duration {
                    debug!("Position past new duration, clamping to {:.2}s", duration);
                    self.transport.seek(duration);
                    self.show_position(duration);
                }
            }
            Some(TransportEvent::Finished) => {
                if !self.transport.is_playing() {
                    self.visualizer.stop(self.scheduler.as_mut());
                }
                self.sync_play_label();
            }
            None => {}
        }
    }

    /// Scheduled visualization frame fired
    ///
    /// Never fails: a frame that cannot be sampled stops the loop.
    pub fn on_animation_frame(&mut self, handle: FrameHandle) {
        if !self.visualizer.claim(handle) {
            return;
        }
        let Ok(graph) = self.attached_graph() else {
            return;
        };
        if !self.transport.is_playing() {
            debug!("Transport paused, visualization loop idle");
            return;
        }

        match self
            .visualizer
            .render(self.audio.as_mut(), graph.analyser(), self.surface.as_mut())
        {
            Ok(Some(level)) => self.controls.level_meter.set_value(DisplayValue::Number(level)),
            Ok(None) => {}
            Err(e) => {
                warn!("Visualization frame failed, loop stopped: {}", e);
                return;
            }
        }

        self.visualizer.start(self.scheduler.as_mut());
    }

    // ===== Audio parameters =====

    /// Set playback volume (0.0 - 1.0); `None` re-pushes the current value
    pub fn set_volume(&mut self, raw: Option<RawValue>) -> Result<()> {
        self.attached_graph()?;
        let volume = match raw {
            Some(raw) => validate::validate_volume(&raw)?,
            None => self.params.volume,
        };

        self.transport.set_volume(volume);
        self.params.volume = volume;
        self.controls.volume.set_value(DisplayValue::Number(volume));
        Ok(())
    }

    /// Set the gain node multiplier (0.0 - 3.0); `None` re-pushes the current value
    pub fn set_gain(&mut self, raw: Option<RawValue>) -> Result<()> {
        let graph = self.attached_graph()?;
        let gain = match raw {
            Some(raw) => validate::validate_gain(&raw)?,
            None => self.params.gain,
        };

        graph.set_gain(self.audio.as_mut(), gain)?;
        self.params.gain = gain;
        self.controls.gain.set_value(DisplayValue::Number(gain));
        Ok(())
    }

    /// Set stereo balance (-1.0 left - 1.0 right)
    pub fn set_balance(&mut self, raw: RawValue) -> Result<()> {
        let graph = self.attached_graph()?;
        let balance = validate::validate_balance(&raw)?;

        graph.set_balance(self.audio.as_mut(), balance)?;
        self.params.balance = balance;
        self.controls.balance.set_value(DisplayValue::Number(balance));
        Ok(())
    }

    // ===== Transport =====

    /// Seek to a position within the media
    pub fn seek_to(&mut self, raw: RawValue) -> Result<()> {
        self.attached_graph()?;
        let position = validate::validate_seek(&raw, self.transport.duration())?;

        self.transport.seek(position);
        self.show_position(position);
        Ok(())
    }

    /// Move by `delta` seconds, clamped to the media bounds
    pub fn shift_time(&mut self, delta: f64) -> Result<()> {
        self.attached_graph()?;
        if !delta.is_finite() {
            return Err(PlayerError::invalid(
                Parameter::CurrentTime,
                delta,
                "offset is not a finite number",
            ));
        }

        let position = self.transport.shift(delta);
        self.show_position(position);
        Ok(())
    }

    /// Back to the start; always valid
    pub fn rollback(&mut self) -> Result<()> {
        self.attached_graph()?;
        self.transport.seek(0.0);
        self.show_position(0.0);
        Ok(())
    }

    /// Flip play/pause
    pub fn toggle_play(&mut self) -> Result<()> {
        self.attached_graph()?;
        if self.transport.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    fn play(&mut self) -> Result<()> {
        self.attached_graph()?;
        self.transport.play()?;
        self.visualizer.start(self.scheduler.as_mut());
        self.sync_play_label();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.transport.pause()?;
        self.visualizer.stop(self.scheduler.as_mut());
        self.sync_play_label();
        Ok(())
    }

    /// Flip the loop flag
    pub fn toggle_loop(&mut self) -> Result<()> {
        self.attached_graph()?;
        self.transport.toggle_loop();
        self.sync_loop_label();
        Ok(())
    }

    /// Load a new media source
    ///
    /// Loading stops playback; the duration is unknown until the new
    /// metadata arrives.
    pub fn set_source(&mut self, src: &str) -> Result<()> {
        self.attached_graph()?;
        let src = src.trim();
        if src.is_empty() {
            return Err(PlayerError::media("empty source URI"));
        }

        self.transport.load(src)?;
        if !self.transport.is_playing() {
            self.visualizer.stop(self.scheduler.as_mut());
        }
        self.controls
            .duration
            .set_value(DisplayValue::Text(String::new()));
        self.show_position(self.transport.current_time());
        self.sync_play_label();
        Ok(())
    }

    // ===== Visualization =====

    /// Set the visualization mode; `None` toggles Bar ↔ Wave
    pub fn set_visualization_mode(&mut self, raw: Option<&str>) -> Result<()> {
        self.attached_graph()?;
        let mode = match raw {
            Some(raw) => validate::validate_visualization_mode(raw)?,
            None => self.visualizer.mode().toggled(),
        };
        self.visualizer.set_mode(mode);
        Ok(())
    }

    // ===== Display =====

    fn show_position(&mut self, seconds: f64) {
        self.controls
            .current_time
            .set_value(DisplayValue::Text(format_timestamp(seconds)));
        self.controls.progress.set_value(DisplayValue::Number(seconds));
    }

    fn show_duration(&mut self, duration: f64) {
        self.controls.progress.set_range(0.0, duration);
        self.controls
            .duration
            .set_value(DisplayValue::Text(format_timestamp(duration)));
    }

    fn sync_play_label(&mut self) {
        let labels = &self.config.labels;
        let label = if self.transport.is_playing() {
            labels.pause.clone()
        } else {
            labels.play.clone()
        };
        self.controls.play_button.set_value(DisplayValue::Text(label));
    }

    fn sync_loop_label(&mut self) {
        let labels = &self.config.labels;
        let label = if self.transport.is_looping() {
            labels.loop_on.clone()
        } else {
            labels.loop_off.clone()
        };
        self.controls.loop_button.set_value(DisplayValue::Text(label));
    }

    // ===== State queries =====

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn params(&self) -> AudioParams {
        self.params
    }

    pub fn visualization_mode(&self) -> VisualizationMode {
        self.visualizer.mode()
    }

    /// Whether a visualization frame is pending
    pub fn is_animating(&self) -> bool {
        self.visualizer.is_running()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn current_time(&self) -> f64 {
        self.transport.current_time()
    }

    pub fn duration(&self) -> Option<f64> {
        self.transport.duration()
    }

    /// The graph, while attached
    pub fn signal_graph(&self) -> Option<&SignalGraph> {
        self.graph.as_ref()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            lifecycle: self.lifecycle,
            source: self.transport.source().map(str::to_string),
            transport: self.transport.snapshot(),
            audio: self.params,
            visualization: self.visualizer.mode(),
            animating: self.visualizer.is_running(),
        }
    }
}

/// Validation that does not depend on player state
fn precheck(command: &PlayerCommand) -> Result<()> {
    match command {
        PlayerCommand::SetVolume(Some(raw)) => validate::validate_volume(raw).map(drop),
        PlayerCommand::SetGain(Some(raw)) => validate::validate_gain(raw).map(drop),
        PlayerCommand::SetBalance(raw) => validate::validate_balance(raw).map(drop),
        PlayerCommand::Seek { position, .. } => validate::validate_seek(position, None).map(drop),
        PlayerCommand::SetVisualizationMode(Some(mode)) => {
            validate::validate_visualization_mode(mode).map(drop)
        }
        PlayerCommand::SetSource(src) if src.trim().is_empty() => {
            Err(PlayerError::media("empty source URI"))
        }
        _ => Ok(()),
    }
}

impl Drop for MediaPlayer {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Attached {
            self.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimEnvironment;

    fn attached() -> (MediaPlayer, SimEnvironment) {
        let env = SimEnvironment::new();
        let mut player = MediaPlayer::new(env.bindings(), PlayerConfig::default());
        player.attach().unwrap();
        (player, env)
    }

    #[test]
    fn commands_before_attach_are_rejected() {
        let env = SimEnvironment::new();
        let mut player = MediaPlayer::new(env.bindings(), PlayerConfig::default());

        assert!(matches!(
            player.set_volume(Some(0.5.into())),
            Err(PlayerError::NotAttached)
        ));
        assert!(matches!(player.toggle_play(), Err(PlayerError::NotAttached)));
    }

    #[test]
    fn attach_pushes_initial_state_to_controls() {
        let (player, env) = attached();

        assert_eq!(player.lifecycle(), Lifecycle::Attached);
        assert_eq!(env.controls.volume.number(), Some(1.0));
        assert_eq!(env.controls.gain.number(), Some(1.0));
        assert_eq!(env.controls.balance.number(), Some(0.0));
        assert_eq!(env.controls.play_button.text().as_deref(), Some("Play"));
        assert_eq!(env.controls.loop_button.text().as_deref(), Some("Loop"));
        assert_eq!(env.controls.current_time.text().as_deref(), Some("00:00"));
    }

    #[test]
    fn volume_without_value_repushes_current() {
        let (mut player, env) = attached();
        player.set_volume(Some(0.3.into())).unwrap();

        player.set_volume(None).unwrap();

        assert_eq!(player.params().volume, 0.3);
        assert_eq!(env.media.volume(), 0.3);
        assert_eq!(env.controls.volume.number(), Some(0.3));
    }

    #[test]
    fn rejected_gain_leaves_state_untouched() {
        let (mut player, env) = attached();
        player.set_gain(Some(2.0.into())).unwrap();
        let updates = env.controls.gain.update_count();

        assert!(player.set_gain(Some(3.1.into())).is_err());

        assert_eq!(player.params().gain, 2.0);
        assert_eq!(env.controls.gain.update_count(), updates);
    }

    #[test]
    fn toggle_play_updates_label_and_loop() {
        let (mut player, env) = attached();

        player.toggle_play().unwrap();
        assert!(player.is_playing());
        assert!(player.is_animating());
        assert_eq!(env.controls.play_button.text().as_deref(), Some("Pause"));

        player.toggle_play().unwrap();
        assert!(!player.is_playing());
        assert!(!player.is_animating());
        assert!(env.scheduler.pending().is_empty());
        assert_eq!(env.controls.play_button.text().as_deref(), Some("Play"));
    }

    #[test]
    fn toggle_loop_updates_label() {
        let (mut player, env) = attached();

        player.toggle_loop().unwrap();
        assert!(env.media.is_looping());
        assert_eq!(env.controls.loop_button.text().as_deref(), Some("Loop(on)"));

        player.toggle_loop().unwrap();
        assert_eq!(env.controls.loop_button.text().as_deref(), Some("Loop"));
    }

    #[test]
    fn non_finite_shift_is_rejected() {
        let (mut player, _env) = attached();
        assert!(player
            .shift_time(f64::NAN)
            .unwrap_err()
            .is_invalid_parameter());
    }

    #[test]
    fn detach_releases_graph_and_disables_player() {
        let (mut player, env) = attached();
        player.toggle_play().unwrap();

        player.detach();

        assert_eq!(player.lifecycle(), Lifecycle::Detached);
        assert!(env.scheduler.pending().is_empty());
        assert!(env.audio.is_closed());
        assert!(env.audio.connections().is_empty());
        assert!(!env.media.is_playing());
        assert!(matches!(player.toggle_play(), Err(PlayerError::Unavailable)));
        assert!(matches!(player.attach(), Err(PlayerError::Unavailable)));
    }

    #[test]
    fn dropping_an_attached_player_releases_the_graph() {
        let (player, env) = attached();
        drop(player);
        assert!(env.audio.is_closed());
    }
}
