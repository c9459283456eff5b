use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::scheduler::{CompletionReport, JobAssignment};
use crate::worker::program::WorkerProgram;

/// Buffer of a unit's assignment channel. The dispatcher only sends to a
/// unit it just popped from the free queue, so one slot suffices and a
/// failed `try_send` means the unit task is gone.
const ASSIGNMENT_BUFFER: usize = 1;

/// Spawn one long-lived execution unit task.
///
/// The unit receives [`JobAssignment`] messages, runs the shared program,
/// and reports every result back on `report_tx`. It exits when its
/// assignment channel closes or the shutdown token fires.
pub fn spawn_unit(
    identity: usize,
    program: Arc<dyn WorkerProgram>,
    report_tx: mpsc::Sender<CompletionReport>,
    shutdown: CancellationToken,
) -> (mpsc::Sender<JobAssignment>, JoinHandle<()>) {
    let (assignment_tx, mut assignment_rx) = mpsc::channel::<JobAssignment>(ASSIGNMENT_BUFFER);

    let task = tokio::spawn(async move {
        tracing::debug!(identity, "Execution unit started");
        loop {
            let assignment = tokio::select! {
                next = assignment_rx.recv() => match next {
                    Some(assignment) => assignment,
                    None => break,
                },
                _ = shutdown.cancelled() => break,
            };

            tracing::debug!(identity, job_id = assignment.id, job = %assignment.name, "Unit executing job");
            let report = match program.run(&assignment).await {
                Ok(data) => CompletionReport::succeeded(identity, assignment.id, data),
                Err(error) => {
                    tracing::warn!(identity, job_id = assignment.id, %error, "Unit job failed");
                    CompletionReport::failed(identity, assignment.id, error)
                }
            };

            if report_tx.send(report).await.is_err() {
                // Coordinator is gone; nothing left to report to.
                break;
            }
        }
        tracing::debug!(identity, "Execution unit stopped");
    });

    (assignment_tx, task)
}
