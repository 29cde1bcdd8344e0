//! # Image Pair Joiner
//!
//! Reconciles two collections of scanned files by filename, routes
//! matched and unmatched files into destination buckets, and fuses
//! matched image pairs into side-by-side composites with an optional
//! similarity score per pair.
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and
//! presentation layers:
//! - `core` - reconciliation, execution strategies, fusion, scoring
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - error types with per-item vs batch-level separation
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{JoinerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// `verbose` lowers the default level from info to debug; RUST_LOG
/// still wins when set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
