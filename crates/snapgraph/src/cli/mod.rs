//! CLI command implementations.

mod display;

pub mod children;
pub mod cleanup;
pub mod cycles;
pub mod ingest;
pub mod levels;
pub mod members;
pub mod remove;
pub mod stats;
pub mod where_used;
