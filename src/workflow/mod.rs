pub mod job_ctx;
pub mod page_job;

pub use job_ctx::JobCtx;
pub use page_job::{JobOutcome, JobState, PageJob};
