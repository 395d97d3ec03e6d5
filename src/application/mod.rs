//! Application layer managing screens, navigation and pending requests.
//!
//! This module sits between the domain layer and the presentation layer:
//! screens hold their own state, and every device or network call leaves
//! through the outbox as an effect.

pub mod effects;
pub mod screens;
pub mod state;
pub mod viewport;

pub use effects::*;
pub use screens::*;
pub use state::*;
pub use viewport::*;
