//! Data models for the checker.
//!
//! - [`AppId`]: validated Steam application identifier
//! - [`GameRecord`]: immutable description of one installed game, produced by the resolver
//! - [`Settings`]: user preferences loaded from `LuaTools Settings.yaml` and the environment

pub mod config;
pub mod game;

pub use config::Settings;
pub use game::{AppId, AppIdError, GameRecord, UNKNOWN};
