//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`AppState`]: Converter state kept by a front-end between batches
//! - [`ConversionRequest`]: One file to convert
//! - [`ConversionOptions`]: Quality and output directory for a batch
//! - [`ConversionResult`] / [`BatchReport`]: Per-file and aggregate results
//! - [`Progress`]: Progress events for batch operations

mod state;
mod types;
mod task;
mod progress;

pub use state::{AppState, BatchTicket};
pub use types::{BatchReport, ConversionOptions, ConversionResult, Outcome, DEFAULT_QUALITY};
pub use task::ConversionRequest;
pub use progress::{Progress, ProgressType};
