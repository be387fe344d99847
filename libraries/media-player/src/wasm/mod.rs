//! WASM bindings for media-player
//!
//! Binds the player core to a browser: an `<audio>` element, a Web Audio
//! context, a 2D canvas, `requestAnimationFrame` and the widget's controls,
//! all looked up in the widget's shadow root.

pub mod host;
pub mod player;

pub use host::{CanvasSurface, ElementControl, RafScheduler, WebAudioHost, WebMediaElement};
pub use player::WasmMediaPlayer;
