pub mod job;
pub mod queue;

pub use job::{CompletionReport, JobAssignment, JobDescriptor, JobOutcome};
pub use queue::{FreeUnitQueue, JobQueue};
