pub mod job;
pub mod pool;

pub use job::Job;
pub use pool::{ProgressCallback, TaskQueue};
