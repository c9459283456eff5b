//! Routing-and-dispatch job manager.
//!
//! Callers submit named work requests; a job table resolves each name to a
//! dispatch policy. Local jobs run synchronously on the coordinator;
//! delegated jobs are queued and handed to a fixed pool of persistent
//! execution units, with completion results routed back to the submitter on
//! a per-job channel.
//!
//! # Components
//!
//! - [`table::JobTable`]: startup-time routing configuration
//! - [`scheduler::JobQueue`] / [`scheduler::FreeUnitQueue`]: FIFO backlogs
//! - [`worker::ExecutionPool`]: fixed arena of long-lived execution units
//! - [`manager::JobManager`]: coordinator handle (dispatcher + result router)

pub mod config;
pub mod error;
pub mod manager;
pub mod scheduler;
pub mod shutdown;
pub mod table;
pub mod worker;

pub use config::ManagerConfig;
pub use error::{JobError, Result};
pub use manager::{JobManager, PoolSnapshot, Submission};
pub use scheduler::JobOutcome;
pub use table::{Dispatch, JobTable, RouteUpdate};
pub use worker::{EchoProgram, WorkerProgram};
