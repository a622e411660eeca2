mod pool;
mod error;

pub use pool::WorkerPool;
pub use error::{WorkerError, WorkerResult};
