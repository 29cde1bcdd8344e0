//! # Events Module
//!
//! Event-driven progress reporting for batch runs.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. Execution
//! strategies send one `ItemCompleted` per finished unit of work, so a
//! subscriber can drive a progress bar without touching the workers.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = events::channel();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Batch(BatchEvent::ItemCompleted { completed, .. }) = event {
//!             println!("{completed} done");
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{bounded, channel, null_sender, EventReceiver, EventSender};
pub use types::*;
