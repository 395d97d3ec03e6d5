//! Infrastructure layer providing external service integrations.
//!
//! This module contains the HTTP client for the orphanage API, the device
//! location and photo library providers, the clipboard, configuration,
//! logging setup and the worker that executes requests off the UI thread.

pub mod api;
pub mod clipboard;
pub mod config;
pub mod location;
pub mod logging;
pub mod photos;
pub mod services;

pub use api::*;
pub use clipboard::*;
pub use config::*;
pub use location::*;
pub use logging::*;
pub use photos::*;
pub use services::*;
