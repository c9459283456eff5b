use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::scheduler::{CompletionReport, JobAssignment, JobOutcome};
use crate::worker::program::WorkerProgram;
use crate::worker::unit::spawn_unit;

/// One pool member: a handle to a persistent execution unit plus its
/// scheduling state.
///
/// `busy` and `pending_reply` are mutated only by the dispatcher (on
/// assignment) and the result router (on completion).
#[derive(Debug)]
pub struct ExecutionSlot {
    pub identity: usize,
    pub busy: bool,
    pub pending_reply: Option<oneshot::Sender<JobOutcome>>,
    assignments: mpsc::Sender<JobAssignment>,
    task: JoinHandle<()>,
}

impl ExecutionSlot {
    /// Hand an assignment to the unit. Fails only if the unit task has died
    /// or is somehow still draining a previous assignment.
    pub fn send_assignment(
        &self,
        assignment: JobAssignment,
    ) -> Result<(), mpsc::error::TrySendError<JobAssignment>> {
        self.assignments.try_send(assignment)
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            identity: self.identity,
            busy: self.busy,
        }
    }
}

/// Point-in-time view of one slot, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub identity: usize,
    pub busy: bool,
}

/// Fixed-size arena of execution slots, addressed by integer identity.
///
/// All units are created at startup and live for the life of the pool;
/// nothing outside the coordinator holds a reference to one.
#[derive(Debug)]
pub struct ExecutionPool {
    slots: Vec<ExecutionSlot>,
}

impl ExecutionPool {
    /// Spawn `size` execution units, each loaded with the shared program.
    /// Identities are assigned in creation order, starting at 0.
    pub fn spawn(
        size: usize,
        program: Arc<dyn WorkerProgram>,
        report_tx: mpsc::Sender<CompletionReport>,
        shutdown: CancellationToken,
    ) -> Self {
        let slots = (0..size)
            .map(|identity| {
                let (assignments, task) = spawn_unit(
                    identity,
                    Arc::clone(&program),
                    report_tx.clone(),
                    shutdown.clone(),
                );
                ExecutionSlot {
                    identity,
                    busy: false,
                    pending_reply: None,
                    assignments,
                    task,
                }
            })
            .collect();
        tracing::info!(pool_size = size, "Execution pool started");
        Self { slots }
    }

    pub fn slot(&self, identity: usize) -> Option<&ExecutionSlot> {
        self.slots.get(identity)
    }

    pub fn slot_mut(&mut self, identity: usize) -> Option<&mut ExecutionSlot> {
        self.slots.get_mut(identity)
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| s.busy).count()
    }

    pub fn snapshot(&self) -> Vec<SlotSnapshot> {
        self.slots.iter().map(ExecutionSlot::snapshot).collect()
    }

    /// Abort all unit tasks. Used on coordinator shutdown after the
    /// cancellation token has fired, so units are already draining.
    pub fn shutdown(&self) {
        for slot in &self.slots {
            slot.task.abort();
        }
    }
}
