// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod worker;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{
    AppState, BatchReport, ConversionOptions, ConversionRequest, ConversionResult, Outcome,
    Progress, ProgressType,
};
pub use processing::{BatchConfig, BatchProcessor};
pub use utils::{ConversionError, ConverterError, ConverterResult, ValidationError};
pub use commands::*;

// This library file is the public API of the converter.
// The command-line entry point is in main.rs.
