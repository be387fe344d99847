//! Visualization loop
//!
//! Two-state machine driven by the host's frame scheduler:
//!
//! - `Idle`: no frame scheduled (paused, ended, detached)
//! - `Running`: exactly one frame scheduled
//!
//! A fired frame is first claimed (back to `Idle`); the synchronizer then
//! renders and reschedules only if the transport is still playing. Pausing
//! cancels the pending frame synchronously, and a fired handle that is not the
//! pending one is stale and gets dropped.

use crate::config::VisualizerSettings;
use crate::error::Result;
use crate::host::{AudioHost, DrawingSurface, FrameHandle, FrameScheduler, NodeId};
use crate::types::VisualizationMode;
use tracing::{debug, trace, warn};

/// Largest byte magnitude reported by an analyser
const MAX_MAGNITUDE: f64 = 255.0;

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running(FrameHandle),
}

pub struct Visualizer {
    mode: VisualizationMode,
    state: LoopState,

    /// Frequency magnitudes, sized once from the analyser's bin count
    bins: Vec<u8>,

    settings: VisualizerSettings,
}

impl Visualizer {
    pub fn new(settings: VisualizerSettings) -> Self {
        Self {
            mode: settings.mode,
            state: LoopState::Idle,
            bins: Vec::new(),
            settings,
        }
    }

    /// Size the sampling buffer for the analyser (done once, at attach)
    pub fn allocate(&mut self, bin_count: usize) {
        self.bins = vec![0; bin_count];
    }

    pub fn mode(&self) -> VisualizationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: VisualizationMode) {
        if self.mode != mode {
            debug!("Visualization mode: {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running(_))
    }

    /// Magnitudes read by the last frame
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    /// Idle → Running; no-op while already running
    ///
    /// A scheduler that refuses the request leaves the loop idle.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.is_running() {
            return;
        }
        match scheduler.request_frame() {
            Ok(handle) => self.state = LoopState::Running(handle),
            Err(e) => warn!("Visualization frame request refused: {}", e),
        }
    }

    /// Running → Idle, cancelling the pending frame
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let LoopState::Running(handle) = self.state {
            scheduler.cancel_frame(handle);
            self.state = LoopState::Idle;
            debug!("Visualization loop idle");
        }
    }

    /// Claim a fired frame
    ///
    /// Returns `false` for a handle that is not the pending one.
    pub fn claim(&mut self, handle: FrameHandle) -> bool {
        match self.state {
            LoopState::Running(pending) if pending == handle => {
                self.state = LoopState::Idle;
                true
            }
            _ => {
                trace!("Dropping stale frame {:?}", handle);
                false
            }
        }
    }

    /// Sample the analyser and draw one frame
    ///
    /// Returns the mean level in bar mode, `None` in wave mode.
    pub fn render(
        &mut self,
        host: &mut dyn AudioHost,
        analyser: NodeId,
        surface: &mut dyn DrawingSurface,
    ) -> Result<Option<f64>> {
        host.read_frequency_data(analyser, &mut self.bins)?;

        match self.mode {
            VisualizationMode::Bar => Ok(Some(draw_bars(
                surface,
                &self.bins,
                self.settings.bar_width,
                &self.settings.bar_color,
            ))),
            VisualizationMode::Wave => {
                draw_wave(surface, &self.bins, &self.settings.wave_color);
                Ok(None)
            }
        }
    }
}

/// Mean magnitude over all bins (0 for no bins)
pub fn mean_level(bins: &[u8]) -> f64 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| u64::from(b)).sum();
    sum as f64 / bins.len() as f64
}

/// Draw one bar per bin from the bottom edge, at most half the surface tall
///
/// Bins that do not fit the surface width are not drawn but still count
/// towards the returned mean level.
pub fn draw_bars(surface: &mut dyn DrawingSurface, bins: &[u8], bar_width: f64, color: &str) -> f64 {
    let width = surface.width();
    let height = surface.height();

    surface.clear();
    surface.set_fill_style(color);

    let visible = ((width / bar_width).floor().max(0.0) as usize).min(bins.len());
    for (i, &magnitude) in bins.iter().take(visible).enumerate() {
        let bar_height = f64::from(magnitude) / MAX_MAGNITUDE * (height / 2.0);
        surface.fill_rect(i as f64 * bar_width, height - bar_height, bar_width, bar_height);
    }

    mean_level(bins)
}

/// Plot the bins as one connected line across the full width
pub fn draw_wave(surface: &mut dyn DrawingSurface, bins: &[u8], color: &str) {
    let width = surface.width();
    let height = surface.height();

    surface.clear();
    if bins.is_empty() {
        return;
    }

    let step = if bins.len() > 1 {
        width / (bins.len() - 1) as f64
    } else {
        0.0
    };
    let y = |magnitude: u8| height - f64::from(magnitude) / MAX_MAGNITUDE * height;

    surface.set_stroke_style(color);
    surface.begin_path();
    surface.move_to(0.0, y(bins[0]));
    for (i, &magnitude) in bins.iter().enumerate().skip(1) {
        surface.line_to(i as f64 * step, y(magnitude));
    }
    surface.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DrawOp, SimScheduler, SimSurface};

    #[test]
    fn mean_level_of_bins() {
        assert_eq!(mean_level(&[]), 0.0);
        assert_eq!(mean_level(&[0, 255]), 127.5);
        assert_eq!(mean_level(&[10, 20, 30]), 20.0);
    }

    #[test]
    fn bars_clear_first_and_scale_to_half_height() {
        let surface = SimSurface::new(8.0, 100.0);
        let mut handle = surface.clone();

        let level = draw_bars(&mut handle, &[255, 0, 51], 2.0, "#fff");

        let ops = surface.ops();
        assert_eq!(ops[0], DrawOp::Clear);
        assert_eq!(ops[1], DrawOp::FillStyle("#fff".to_string()));
        assert_eq!(ops[2], DrawOp::FillRect(0.0, 50.0, 2.0, 50.0));
        assert_eq!(ops[3], DrawOp::FillRect(2.0, 100.0, 2.0, 0.0));
        assert_eq!(ops[4], DrawOp::FillRect(4.0, 90.0, 2.0, 10.0));
        assert_eq!(level, 102.0);
    }

    #[test]
    fn bars_beyond_surface_width_are_skipped() {
        let surface = SimSurface::new(4.0, 100.0);
        let mut handle = surface.clone();

        let level = draw_bars(&mut handle, &[100, 100, 100, 100], 2.0, "#fff");

        assert_eq!(surface.fill_rect_count(), 2);
        assert_eq!(level, 100.0);
    }

    #[test]
    fn wave_spans_full_width() {
        let surface = SimSurface::new(100.0, 50.0);
        let mut handle = surface.clone();

        draw_wave(&mut handle, &[0, 255, 0], "#0f0");

        let ops = surface.ops();
        assert_eq!(ops[0], DrawOp::Clear);
        assert!(ops.contains(&DrawOp::MoveTo(0.0, 50.0)));
        assert!(ops.contains(&DrawOp::LineTo(50.0, 0.0)));
        assert!(ops.contains(&DrawOp::LineTo(100.0, 50.0)));
        assert_eq!(ops.last(), Some(&DrawOp::Stroke));
        assert_eq!(surface.fill_rect_count(), 0);
    }

    #[test]
    fn start_and_stop_follow_state_machine() {
        let scheduler = SimScheduler::new();
        let mut handle = scheduler.clone();
        let mut visualizer = Visualizer::new(VisualizerSettings::default());

        visualizer.start(&mut handle);
        visualizer.start(&mut handle);
        assert!(visualizer.is_running());
        assert_eq!(scheduler.pending().len(), 1);

        visualizer.stop(&mut handle);
        assert_eq!(visualizer.state(), LoopState::Idle);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn stale_frames_are_not_claimed() {
        let scheduler = SimScheduler::new();
        let mut handle = scheduler.clone();
        let mut visualizer = Visualizer::new(VisualizerSettings::default());

        visualizer.start(&mut handle);
        let first = scheduler.pending()[0];
        visualizer.stop(&mut handle);
        visualizer.start(&mut handle);

        assert!(!visualizer.claim(first));
        assert!(visualizer.is_running());

        let second = scheduler.pending()[0];
        assert!(visualizer.claim(second));
        assert_eq!(visualizer.state(), LoopState::Idle);
    }

    #[test]
    fn refused_request_leaves_loop_idle() {
        let scheduler = SimScheduler::new();
        scheduler.refuse_requests(true);
        let mut handle = scheduler.clone();
        let mut visualizer = Visualizer::new(VisualizerSettings::default());

        visualizer.start(&mut handle);

        assert_eq!(visualizer.state(), LoopState::Idle);
    }
}
