//! Execution units and the pool that owns them.
//!
//! Each unit is one long-lived tokio task loaded with a fixed
//! [`WorkerProgram`]. The coordinator talks to a unit only through messages:
//! a [`JobAssignment`](crate::scheduler::JobAssignment) in, a
//! [`CompletionReport`](crate::scheduler::CompletionReport) out.

pub mod pool;
pub mod program;
pub mod unit;

pub use pool::{ExecutionPool, ExecutionSlot, SlotSnapshot};
pub use program::{EchoProgram, WorkerProgram};
