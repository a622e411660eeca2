pub mod batch;
pub mod codec;
pub mod converter;

pub use batch::{BatchConfig, BatchProcessor};
pub use converter::{convert, convert_file};
