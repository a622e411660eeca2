mod config;
mod processor;

pub use config::BatchConfig;
pub use processor::BatchProcessor;
