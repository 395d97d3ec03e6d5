//! Orphanages - Terminal Client Library
//!
//! A terminal client for an orphanage registry: browse registered
//! orphanages on a map, open their details, and register new ones through
//! a two-step wizard that uploads a multipart form to the remote API.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
