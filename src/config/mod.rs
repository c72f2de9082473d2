//! Configuration module for voice-orb-assistant.
//!
//! Split into:
//! - `types`: Config struct, avatar variant enum, serde defaults
//! - `io`: Config loading and saving

mod io;
mod types;

pub use io::{load_config, save_config};
pub use types::{AvatarVariant, Config};
