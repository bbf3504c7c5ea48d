//! Field hint
//!
//! Collapses verbose form-field descriptions into a small indicator that
//! reveals the text in a single shared tooltip. Runs over an owned
//! document model with a virtual clock, so every interaction is
//! deterministic.

pub mod attach;
pub mod classes;
pub mod config;
pub mod discovery;
pub mod dom;
pub mod dump;
pub mod engine;
pub mod error;
pub mod event;
pub mod flash_guard;
pub mod geometry;
pub mod markup;
pub mod timer;
pub mod tooltip;

pub use engine::{Engine, PassReport};
pub use error::{Error, Result};
