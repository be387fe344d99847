//! Host environment traits
//!
//! The player never talks to a browser, an audio API or a widget toolkit
//! directly. Everything it consumes is injected at construction through the
//! traits below (browser bindings live in `wasm`, in-memory ones in `sim`).

use crate::error::Result;
use crate::types::DisplayValue;

/// Media element driving playback (decode, buffering and output are the
/// host's business)
pub trait MediaElement {
    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Whether playback is paused
    fn is_paused(&self) -> bool;

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Move the playback position
    fn set_current_time(&mut self, seconds: f64);

    /// Media duration in seconds, `None` while unknown
    fn duration(&self) -> Option<f64>;

    /// Playback volume (0.0 - 1.0)
    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    /// Whether the media restarts when it reaches the end
    fn is_looping(&self) -> bool;

    fn set_looping(&mut self, looping: bool);

    /// Point the element at a new source URI and start loading it
    fn load(&mut self, src: &str) -> Result<()>;
}

/// Opaque handle to a node owned by an [`AudioHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Automatable node parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeParam {
    /// Gain node multiplier
    Gain,

    /// Stereo panner position
    Pan,
}

/// Audio processing host (a Web Audio context or equivalent)
///
/// The host is created already bound to the media element, so
/// [`create_media_source`](AudioHost::create_media_source) takes no
/// arguments. A host that cannot be initialized reports it from the first
/// node creation call.
pub trait AudioHost {
    /// Source node fed by the bound media element
    fn create_media_source(&mut self) -> Result<NodeId>;

    fn create_gain(&mut self) -> Result<NodeId>;

    fn create_stereo_panner(&mut self) -> Result<NodeId>;

    /// Analyser node exposing `fft_size / 2` frequency bins
    fn create_analyser(&mut self, fft_size: u32) -> Result<NodeId>;

    /// Output sink
    fn destination(&mut self) -> Result<NodeId>;

    /// Connect `from`'s output to `to`'s input
    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()>;

    /// Set a node parameter
    fn set_param(&mut self, node: NodeId, param: NodeParam, value: f32) -> Result<()>;

    /// Number of frequency bins an analyser exposes
    fn frequency_bin_count(&self, analyser: NodeId) -> usize;

    /// Copy byte frequency magnitudes (0-255) into `out`
    ///
    /// Must not allocate; `out` is sized by the caller.
    fn read_frequency_data(&mut self, analyser: NodeId, out: &mut [u8]) -> Result<()>;

    /// Disconnect every outgoing connection of a node
    fn disconnect(&mut self, node: NodeId) -> Result<()>;

    /// Release the host's resources
    fn close(&mut self) -> Result<()>;
}

/// 2D drawing surface (a canvas)
pub trait DrawingSurface {
    fn width(&self) -> f64;

    fn height(&self) -> f64;

    /// Clear the whole surface
    fn clear(&mut self);

    fn set_fill_style(&mut self, color: &str);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_stroke_style(&mut self, color: &str);

    fn begin_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    fn stroke(&mut self);
}

/// Handle of a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Display-refresh scheduler (`requestAnimationFrame` or equivalent)
///
/// The host calls [`MediaPlayer::on_animation_frame`](crate::MediaPlayer::on_animation_frame)
/// with the handle when a requested frame fires.
pub trait FrameScheduler {
    /// Schedule one frame callback
    fn request_frame(&mut self) -> Result<FrameHandle>;

    /// Cancel a pending frame; unknown handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Display control (slider, knob, label, button)
///
/// Input/click subscription is the host's side: it forwards control events
/// to [`MediaPlayer::handle_ui_event`](crate::MediaPlayer::handle_ui_event).
pub trait Control {
    /// Current value
    fn value(&self) -> DisplayValue;

    /// Redraw with a new value
    fn set_value(&mut self, value: DisplayValue);

    /// Change the accepted range (sliders and knobs)
    fn set_range(&mut self, _min: f64, _max: f64) {}
}
