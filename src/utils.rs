//! Utilities shared across the crate.

pub mod display;
pub mod histogram;
