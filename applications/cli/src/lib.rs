//! Media Player CLI - scripted sessions against the simulation host
//!
//! Runs a player session from a plain-text script (attribute changes, control
//! events, media notifications, animation frames) and reports the final state.

pub mod config;
pub mod script;
pub mod session;

pub use config::load_config;
pub use script::{parse_script, ScriptError, Step};
pub use session::{run_session, Rejection, SessionReport};
