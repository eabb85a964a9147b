//! `pcrqc` derives summary quality metrics for targeted PCR (amplicon)
//! sequencing experiments. This package is composed of both a library crate,
//! as well as a binary crate.
//!
//! The library crate takes the raw counts produced by an upstream aligner and
//! interval overlap pass, the per-base depth over the targets, and the GC
//! composition of the targets, and turns them into a fixed set of normalized
//! statistics. See the [`metrics`] module for where to begin.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod errors;
pub mod metrics;
pub mod utils;
