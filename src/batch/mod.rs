pub mod cancel;
pub mod collector;
pub mod pool;
pub mod queue;
pub mod runner;
pub mod types;

pub use cancel::CancelHandle;
pub use queue::TaskQueue;
pub use runner::BatchRunner;
pub use types::{BatchSummary, TaskOutcome, WorkerCount};
