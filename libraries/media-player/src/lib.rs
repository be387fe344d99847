//! Media Player - embeddable audio player core
//!
//! Platform-agnostic core of an audio player widget.
//!
//! This crate provides:
//! - Input validation for volume, gain, balance, seek and visualization mode
//! - A fixed fan-out signal graph (gain, stereo balance, analyser)
//! - Control-state synchronization across two command channels
//!   (UI control events and host attribute changes)
//! - A frame-driven spectrum visualization loop (bars or wave)
//! - Transport handling (play/pause, seek, skip, loop, source loading)
//!
//! # Architecture
//!
//! The player never touches a browser or audio API directly. The media
//! element, audio host, drawing surface, frame scheduler and display controls
//! are injected as trait objects ([`host`]):
//! - [`sim`] implements them in memory (tests, the CLI)
//! - `wasm` (feature `wasm`) implements them over `web-sys`
//!
//! # Example
//!
//! ```rust
//! use media_player::{MediaPlayer, PlayerConfig, UiEvent, RawValue};
//! use media_player::sim::SimEnvironment;
//!
//! let env = SimEnvironment::new();
//! let mut player = MediaPlayer::new(env.bindings(), PlayerConfig::default());
//! player.attach()?;
//!
//! // Both channels reach the same validated entry point
//! player.handle_ui_event(UiEvent::VolumeInput(RawValue::Number(0.5)))?;
//! player.attribute_changed("gain", Some("2.0"))?;
//! assert!(player.attribute_changed("balance", Some("1.5")).is_err());
//!
//! player.handle_ui_event(UiEvent::PlayClicked)?;
//! assert!(player.is_animating());
//! # Ok::<(), media_player::PlayerError>(())
//! ```

pub mod commands;
pub mod config;
pub mod controls;
mod error;
pub mod graph;
pub mod host;
mod player;
pub mod sim;
pub mod transport;
pub mod types;
pub mod validate;
pub mod visualizer;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use commands::{attribute_command, PlayerCommand, UiEvent, OBSERVED_ATTRIBUTES};
pub use config::PlayerConfig;
pub use controls::{format_timestamp, Controls, HostBindings};
pub use error::{Parameter, PlayerError, Result};
pub use graph::SignalGraph;
pub use player::MediaPlayer;
pub use transport::MediaEvent;
pub use types::{
    AudioParams, DisplayValue, Lifecycle, PlayerSnapshot, RawValue, TransportSnapshot,
    VisualizationMode,
};
pub use visualizer::LoopState;
