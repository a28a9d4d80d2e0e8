//! Core types and constants for the ghost tracking model

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
