//! Configuration module for splitpot
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SplitpotPaths;
pub use settings::Settings;
