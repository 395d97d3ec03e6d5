//! Presentation layer handling terminal UI and user input.
//!
//! This module renders each screen with ratatui (maps are drawn on a
//! canvas) and translates keyboard and mouse events into screen actions.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
