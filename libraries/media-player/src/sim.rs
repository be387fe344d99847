//! In-memory simulation host
//!
//! Implements every host trait without a browser: a media element with a
//! manually advanced clock, an audio host that records its graph and serves a
//! synthetic spectrum, a surface that records draw calls, a manual frame
//! scheduler, and value-holding controls.
//!
//! Each type is a cheap clonable handle over shared state: hand one clone to
//! the player and keep another to drive and inspect it.

use crate::controls::{Controls, HostBindings};
use crate::error::{PlayerError, Result};
use crate::host::{
    AudioHost, Control, DrawingSurface, FrameHandle, FrameScheduler, MediaElement, NodeId,
    NodeParam,
};
use crate::player::MediaPlayer;
use crate::transport::MediaEvent;
use crate::types::DisplayValue;
use rustfft::{num_complex::Complex, FftPlanner};
use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

/// Analyser byte scaling range (Web Audio defaults)
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Default synthetic tone fed to analysers
const DEFAULT_TONE_HZ: f32 = 440.0;
const DEFAULT_TONE_AMPLITUDE: f32 = 0.5;
const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

// ===== Media =====

#[derive(Debug)]
struct MediaState {
    paused: bool,
    current_time: f64,
    duration: Option<f64>,
    volume: f64,
    looping: bool,
    source: Option<String>,
    play_calls: usize,
    refuse_play: bool,
}

/// Simulated media element
#[derive(Debug, Clone)]
pub struct SimMedia {
    state: Rc<RefCell<MediaState>>,
}

impl Default for SimMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl SimMedia {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MediaState {
                paused: true,
                current_time: 0.0,
                duration: None,
                volume: 1.0,
                looping: false,
                source: None,
                play_calls: 0,
                refuse_play: false,
            })),
        }
    }

    /// Simulate metadata becoming available
    pub fn set_duration(&self, duration: Option<f64>) {
        self.state.borrow_mut().duration = duration;
    }

    /// Make `play()` fail (autoplay policy)
    pub fn refuse_play(&self, refuse: bool) {
        self.state.borrow_mut().refuse_play = refuse;
    }

    /// Advance the clock while playing
    ///
    /// Returns the new position and whether the media ended. Looping media
    /// wraps around instead of ending.
    pub fn advance(&self, seconds: f64) -> (f64, bool) {
        let mut state = self.state.borrow_mut();
        if state.paused {
            return (state.current_time, false);
        }

        state.current_time += seconds;
        let mut ended = false;
        if let Some(duration) = state.duration {
            if state.current_time >= duration {
                if state.looping && duration > 0.0 {
                    state.current_time %= duration;
                } else {
                    state.current_time = duration;
                    state.paused = true;
                    ended = true;
                }
            }
        }
        (state.current_time, ended)
    }

    pub fn is_playing(&self) -> bool {
        !self.state.borrow().paused
    }

    pub fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    pub fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    pub fn is_looping(&self) -> bool {
        self.state.borrow().looping
    }

    pub fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.state.borrow().play_calls
    }
}

impl MediaElement for SimMedia {
    fn play(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.refuse_play {
            return Err(PlayerError::media("playback refused"));
        }
        state.play_calls += 1;
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.state.borrow_mut().paused = true;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.state.borrow_mut().current_time = seconds;
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.borrow_mut().volume = volume;
    }

    fn is_looping(&self) -> bool {
        self.state.borrow().looping
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }

    fn load(&mut self, src: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.source = Some(src.to_string());
        state.paused = true;
        state.current_time = 0.0;
        state.duration = None;
        Ok(())
    }
}

// ===== Audio host =====

/// Kind of a simulated node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    MediaSource,
    Gain,
    StereoPanner,
    Analyser,
    Destination,
}

#[derive(Debug)]
struct SimNode {
    kind: NodeKind,
    param: Option<f32>,
    bin_count: usize,
}

#[derive(Debug)]
struct AudioState {
    available: bool,
    nodes: Vec<SimNode>,
    connections: Vec<(NodeId, NodeId)>,
    destination: Option<NodeId>,
    closed: bool,
    spectrum: Vec<u8>,
    fixed_spectrum: bool,
    fail_reads: bool,
    refused: Option<NodeKind>,
    reads: usize,
}

/// Simulated audio processing host
#[derive(Debug, Clone)]
pub struct SimAudioHost {
    state: Rc<RefCell<AudioState>>,
}

impl Default for SimAudioHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimAudioHost {
    pub fn new() -> Self {
        Self::with_availability(true)
    }

    /// A host whose context cannot be created
    pub fn unavailable() -> Self {
        Self::with_availability(false)
    }

    fn with_availability(available: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(AudioState {
                available,
                nodes: Vec::new(),
                connections: Vec::new(),
                destination: None,
                closed: false,
                spectrum: Vec::new(),
                fixed_spectrum: false,
                fail_reads: false,
                refused: None,
                reads: 0,
            })),
        }
    }

    /// Serve fixed magnitudes instead of the synthetic tone
    pub fn set_frequency_data(&self, data: Vec<u8>) {
        let mut state = self.state.borrow_mut();
        state.spectrum = data;
        state.fixed_spectrum = true;
    }

    /// Make analyser reads fail
    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    /// Refuse to create nodes of this kind
    pub fn refuse_node(&self, kind: NodeKind) {
        self.state.borrow_mut().refused = Some(kind);
    }

    pub fn connections(&self) -> Vec<(NodeId, NodeId)> {
        self.state.borrow().connections.clone()
    }

    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.state
            .borrow()
            .nodes
            .get(node.0 as usize)
            .map(|n| n.kind)
    }

    /// Last value set on a node parameter
    pub fn param(&self, node: NodeId) -> Option<f64> {
        self.state
            .borrow()
            .nodes
            .get(node.0 as usize)
            .and_then(|n| n.param)
            .map(f64::from)
    }

    pub fn node_count(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Number of analyser reads served
    pub fn reads(&self) -> usize {
        self.state.borrow().reads
    }

    fn add_node(&mut self, kind: NodeKind, param: Option<f32>, bin_count: usize) -> Result<NodeId> {
        let mut state = self.state.borrow_mut();
        if !state.available {
            return Err(PlayerError::audio_host("audio context unavailable"));
        }
        if state.closed {
            return Err(PlayerError::audio_host("audio context closed"));
        }
        if state.refused == Some(kind) {
            return Err(PlayerError::audio_host(format!("{:?} node refused", kind)));
        }
        let id = NodeId(state.nodes.len() as u32);
        state.nodes.push(SimNode {
            kind,
            param,
            bin_count,
        });
        Ok(id)
    }
}

impl AudioHost for SimAudioHost {
    fn create_media_source(&mut self) -> Result<NodeId> {
        self.add_node(NodeKind::MediaSource, None, 0)
    }

    fn create_gain(&mut self) -> Result<NodeId> {
        self.add_node(NodeKind::Gain, Some(1.0), 0)
    }

    fn create_stereo_panner(&mut self) -> Result<NodeId> {
        self.add_node(NodeKind::StereoPanner, Some(0.0), 0)
    }

    fn create_analyser(&mut self, fft_size: u32) -> Result<NodeId> {
        let bin_count = fft_size as usize / 2;
        let id = self.add_node(NodeKind::Analyser, None, bin_count)?;

        let mut state = self.state.borrow_mut();
        if !state.fixed_spectrum {
            state.spectrum = tone_spectrum(
                fft_size as usize,
                DEFAULT_SAMPLE_RATE,
                DEFAULT_TONE_HZ,
                DEFAULT_TONE_AMPLITUDE,
            );
        }
        Ok(id)
    }

    fn destination(&mut self) -> Result<NodeId> {
        if let Some(id) = self.state.borrow().destination {
            return Ok(id);
        }
        let id = self.add_node(NodeKind::Destination, None, 0)?;
        self.state.borrow_mut().destination = Some(id);
        Ok(id)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let count = state.nodes.len() as u32;
        if from.0 >= count || to.0 >= count {
            return Err(PlayerError::audio_host(format!(
                "cannot connect unknown node {:?} -> {:?}",
                from, to
            )));
        }
        state.connections.push((from, to));
        Ok(())
    }

    fn set_param(&mut self, node: NodeId, param: NodeParam, value: f32) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let Some(target) = state.nodes.get_mut(node.0 as usize) else {
            return Err(PlayerError::audio_host(format!("unknown node {:?}", node)));
        };
        match (target.kind, param) {
            (NodeKind::Gain, NodeParam::Gain) | (NodeKind::StereoPanner, NodeParam::Pan) => {
                target.param = Some(value);
                Ok(())
            }
            (kind, param) => Err(PlayerError::audio_host(format!(
                "{:?} node has no {:?} parameter",
                kind, param
            ))),
        }
    }

    fn frequency_bin_count(&self, analyser: NodeId) -> usize {
        self.state
            .borrow()
            .nodes
            .get(analyser.0 as usize)
            .map_or(0, |n| n.bin_count)
    }

    fn read_frequency_data(&mut self, analyser: NodeId, out: &mut [u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_reads {
            return Err(PlayerError::audio_host("analyser read failed"));
        }
        match state.nodes.get(analyser.0 as usize) {
            Some(node) if node.kind == NodeKind::Analyser => {}
            _ => {
                return Err(PlayerError::audio_host(format!(
                    "{:?} is not an analyser",
                    analyser
                )))
            }
        }

        let n = out.len().min(state.spectrum.len());
        out[..n].copy_from_slice(&state.spectrum[..n]);
        out[n..].fill(0);
        state.reads += 1;
        Ok(())
    }

    fn disconnect(&mut self, node: NodeId) -> Result<()> {
        self.state
            .borrow_mut()
            .connections
            .retain(|(from, _)| *from != node);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.borrow_mut().closed = true;
        Ok(())
    }
}

/// Byte frequency magnitudes of a windowed sine, scaled like a Web Audio
/// analyser (`fft_size / 2` bins, -100 dB → 0, -30 dB → 255)
pub fn tone_spectrum(fft_size: usize, sample_rate: f32, frequency: f32, amplitude: f32) -> Vec<u8> {
    if fft_size == 0 {
        return Vec::new();
    }

    let n = fft_size as f32;
    let mut buffer: Vec<Complex<f32>> = (0..fft_size)
        .map(|i| {
            let sample = amplitude * (2.0 * PI * frequency * i as f32 / sample_rate).sin();
            // Blackman window
            let x = i as f32 / n;
            let window = 0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos();
            Complex::new(sample * window, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    buffer
        .iter()
        .take(fft_size / 2)
        .map(|c| {
            let magnitude = (c.norm() / n).max(1e-12);
            let db = 20.0 * magnitude.log10();
            let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
            scaled.clamp(0.0, 255.0) as u8
        })
        .collect()
}

// ===== Surface =====

/// Recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillStyle(String),
    FillRect(f64, f64, f64, f64),
    StrokeStyle(String),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
}

#[derive(Debug)]
struct SurfaceState {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

/// Surface recording every draw call
#[derive(Debug, Clone)]
pub struct SimSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl SimSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(SurfaceState {
                width,
                height,
                ops: Vec::new(),
            })),
        }
    }

    pub fn ops(&self) -> Vec<DrawOp> {
        self.state.borrow().ops.clone()
    }

    /// Drain the recorded operations
    pub fn take_ops(&self) -> Vec<DrawOp> {
        std::mem::take(&mut self.state.borrow_mut().ops)
    }

    /// Number of frames drawn (each frame starts with a clear)
    pub fn frames_drawn(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Clear))
    }

    pub fn fill_rect_count(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::FillRect(..)))
    }

    pub fn stroke_count(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Stroke))
    }

    fn count(&self, predicate: impl Fn(&DrawOp) -> bool) -> usize {
        self.state.borrow().ops.iter().filter(|op| predicate(op)).count()
    }

    fn record(&mut self, op: DrawOp) {
        self.state.borrow_mut().ops.push(op);
    }
}

impl DrawingSurface for SimSurface {
    fn width(&self) -> f64 {
        self.state.borrow().width
    }

    fn height(&self) -> f64 {
        self.state.borrow().height
    }

    fn clear(&mut self) {
        self.record(DrawOp::Clear);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.record(DrawOp::FillStyle(color.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(DrawOp::FillRect(x, y, width, height));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.record(DrawOp::StrokeStyle(color.to_string()));
    }

    fn begin_path(&mut self) {
        self.record(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.record(DrawOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.record(DrawOp::LineTo(x, y));
    }

    fn stroke(&mut self) {
        self.record(DrawOp::Stroke);
    }
}

// ===== Scheduler =====

#[derive(Debug, Default)]
struct SchedulerState {
    next_id: u64,
    pending: Vec<FrameHandle>,
    requested: usize,
    cancelled: usize,
    refuse: bool,
}

/// Frame scheduler fired by hand
#[derive(Debug, Clone, Default)]
pub struct SimScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl SimScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and neither fired nor cancelled
    pub fn pending(&self) -> Vec<FrameHandle> {
        self.state.borrow().pending.clone()
    }

    /// Remove the pending frames so the caller can fire them
    pub fn take_pending(&self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }

    pub fn refuse_requests(&self, refuse: bool) {
        self.state.borrow_mut().refuse = refuse;
    }

    pub fn requested(&self) -> usize {
        self.state.borrow().requested
    }

    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for SimScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        let mut state = self.state.borrow_mut();
        if state.refuse {
            return Err(PlayerError::Scheduler("frame requests refused".to_string()));
        }
        state.next_id += 1;
        let handle = FrameHandle(state.next_id);
        state.pending.push(handle);
        state.requested += 1;
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        let before = state.pending.len();
        state.pending.retain(|h| *h != handle);
        if state.pending.len() != before {
            state.cancelled += 1;
        }
    }
}

// ===== Controls =====

#[derive(Debug)]
struct ControlState {
    value: DisplayValue,
    range: (f64, f64),
    updates: usize,
}

/// Control holding its last value
#[derive(Debug, Clone)]
pub struct SimControl {
    state: Rc<RefCell<ControlState>>,
}

impl Default for SimControl {
    fn default() -> Self {
        Self::new(DisplayValue::Number(0.0))
    }
}

impl SimControl {
    pub fn new(value: DisplayValue) -> Self {
        Self {
            state: Rc::new(RefCell::new(ControlState {
                value,
                range: (0.0, 1.0),
                updates: 0,
            })),
        }
    }

    pub fn number(&self) -> Option<f64> {
        self.state.borrow().value.as_number()
    }

    pub fn text(&self) -> Option<String> {
        self.state.borrow().value.as_text().map(str::to_string)
    }

    pub fn range(&self) -> (f64, f64) {
        self.state.borrow().range
    }

    /// Number of `set_value` calls received
    pub fn update_count(&self) -> usize {
        self.state.borrow().updates
    }
}

impl Control for SimControl {
    fn value(&self) -> DisplayValue {
        self.state.borrow().value.clone()
    }

    fn set_value(&mut self, value: DisplayValue) {
        let mut state = self.state.borrow_mut();
        state.value = value;
        state.updates += 1;
    }

    fn set_range(&mut self, min: f64, max: f64) {
        self.state.borrow_mut().range = (min, max);
    }
}

/// One simulated control per player display
#[derive(Debug, Clone, Default)]
pub struct SimControls {
    pub progress: SimControl,
    pub current_time: SimControl,
    pub duration: SimControl,
    pub volume: SimControl,
    pub gain: SimControl,
    pub balance: SimControl,
    pub level_meter: SimControl,
    pub play_button: SimControl,
    pub loop_button: SimControl,
}

impl SimControls {
    pub fn bind(&self) -> Controls {
        Controls {
            progress: Box::new(self.progress.clone()),
            current_time: Box::new(self.current_time.clone()),
            duration: Box::new(self.duration.clone()),
            volume: Box::new(self.volume.clone()),
            gain: Box::new(self.gain.clone()),
            balance: Box::new(self.balance.clone()),
            level_meter: Box::new(self.level_meter.clone()),
            play_button: Box::new(self.play_button.clone()),
            loop_button: Box::new(self.loop_button.clone()),
        }
    }
}

// ===== Environment =====

/// Complete simulated host
#[derive(Debug, Clone)]
pub struct SimEnvironment {
    pub media: SimMedia,
    pub audio: SimAudioHost,
    pub surface: SimSurface,
    pub scheduler: SimScheduler,
    pub controls: SimControls,
}

impl Default for SimEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEnvironment {
    /// Default canvas size of the widget
    pub const SURFACE_WIDTH: f64 = 500.0;
    pub const SURFACE_HEIGHT: f64 = 150.0;

    pub fn new() -> Self {
        Self::with_audio(SimAudioHost::new())
    }

    pub fn with_audio(audio: SimAudioHost) -> Self {
        Self {
            media: SimMedia::new(),
            audio,
            surface: SimSurface::new(Self::SURFACE_WIDTH, Self::SURFACE_HEIGHT),
            scheduler: SimScheduler::new(),
            controls: SimControls::default(),
        }
    }

    /// Boxed handles for [`MediaPlayer::new`]
    pub fn bindings(&self) -> HostBindings {
        HostBindings {
            media: Box::new(self.media.clone()),
            audio: Box::new(self.audio.clone()),
            surface: Box::new(self.surface.clone()),
            scheduler: Box::new(self.scheduler.clone()),
            controls: self.controls.bind(),
        }
    }

    /// Fire every pending frame, returning how many fired
    pub fn run_frames(&self, player: &mut MediaPlayer) -> usize {
        let handles = self.scheduler.take_pending();
        for handle in &handles {
            player.on_animation_frame(*handle);
        }
        handles.len()
    }

    /// Report loaded metadata to the player
    pub fn load_metadata(&self, player: &mut MediaPlayer, duration: f64) {
        self.media.set_duration(Some(duration));
        player.handle_media_event(MediaEvent::LoadedMetadata { duration });
    }

    /// Advance playback and deliver the resulting notifications
    pub fn advance(&self, player: &mut MediaPlayer, seconds: f64) {
        let (current_time, ended) = self.media.advance(seconds);
        player.handle_media_event(MediaEvent::TimeUpdate { current_time });
        if ended {
            player.handle_media_event(MediaEvent::Ended);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_peaks_near_its_frequency_bin() {
        let spectrum = tone_spectrum(2048, 44100.0, 440.0, 0.5);
        assert_eq!(spectrum.len(), 1024);

        let peak = spectrum
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .map(|(i, _)| i)
            .unwrap();
        // 440 Hz / (44100 Hz / 2048) ≈ bin 20.4
        assert!((19..=21).contains(&peak), "peak at bin {peak}");
        assert!(spectrum[peak] > 200);
        assert!(spectrum[1000] < 10);
    }

    #[test]
    fn media_ends_unless_looping() {
        let mut media = SimMedia::new();
        media.set_duration(Some(10.0));
        media.play().unwrap();

        assert_eq!(media.advance(4.0), (4.0, false));
        assert_eq!(media.advance(10.0), (10.0, true));
        assert!(!media.is_playing());

        media.set_looping(true);
        media.set_current_time(8.0);
        media.play().unwrap();
        let (time, ended) = media.advance(4.0);
        assert!(!ended);
        assert!((time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn paused_media_does_not_advance() {
        let media = SimMedia::new();
        assert_eq!(media.advance(5.0), (0.0, false));
    }

    #[test]
    fn fixed_frequency_data_is_padded() {
        let mut host = SimAudioHost::new();
        host.set_frequency_data(vec![9, 8]);
        let analyser = host.create_analyser(32).unwrap();

        let mut out = [1u8; 4];
        host.read_frequency_data(analyser, &mut out).unwrap();

        assert_eq!(out, [9, 8, 0, 0]);
        assert_eq!(host.reads(), 1);
    }

    #[test]
    fn parameters_must_match_node_kind() {
        let mut host = SimAudioHost::new();
        let gain = host.create_gain().unwrap();
        assert!(host.set_param(gain, NodeParam::Pan, 0.5).is_err());
        assert!(host.set_param(gain, NodeParam::Gain, 0.5).is_ok());
    }

    #[test]
    fn cancelled_frames_leave_queue() {
        let mut scheduler = SimScheduler::new();
        let first = scheduler.request_frame().unwrap();
        let second = scheduler.request_frame().unwrap();

        scheduler.cancel_frame(first);
        scheduler.cancel_frame(first);

        assert_eq!(scheduler.pending(), vec![second]);
        assert_eq!(scheduler.cancelled(), 1);
        assert_eq!(scheduler.requested(), 2);
    }
}
