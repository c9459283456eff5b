use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ManagerConfig;
use crate::error::{JobError, Result};
use crate::scheduler::{CompletionReport, JobAssignment, JobDescriptor, JobOutcome, JobQueue};
use crate::scheduler::queue::FreeUnitQueue;
use crate::table::{DelegatedRoute, Dispatch, JobTable, LocalHandler, RouteUpdate};
use crate::worker::pool::{ExecutionPool, SlotSnapshot};
use crate::worker::program::WorkerProgram;

/// Requests handled by the coordinator, one at a time.
enum ManagerEvent {
    Submit {
        body: Value,
        reply: oneshot::Sender<Result<Submission>>,
    },
    RefreshRoutes {
        updates: Vec<RouteUpdate>,
        reply: oneshot::Sender<usize>,
    },
    Inspect {
        reply: oneshot::Sender<PoolSnapshot>,
    },
}

/// What a caller gets back from [`JobManager::submit`].
#[derive(Debug)]
pub enum Submission {
    /// The job was handled synchronously; this is its result.
    Local(Value),
    /// The job was queued for delegated execution. The outcome arrives on
    /// the per-job channel once a unit has run it.
    Delegated {
        id: u64,
        outcome: oneshot::Receiver<JobOutcome>,
    },
}

impl Submission {
    /// Job id for delegated submissions, `None` for local ones.
    pub fn job_id(&self) -> Option<u64> {
        match self {
            Submission::Local(_) => None,
            Submission::Delegated { id, .. } => Some(*id),
        }
    }
}

/// Point-in-time view of the scheduler state, for diagnostics and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub slots: Vec<SlotSnapshot>,
    pub queued_jobs: usize,
    pub free_units: usize,
}

impl PoolSnapshot {
    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| s.busy).count()
    }
}

/// Handle to a running job manager.
///
/// Cloneable; all clones talk to the same coordinator task. Every operation
/// is forwarded as an event and processed by the coordinator one at a time,
/// which is what keeps the queues and slot table safe without locks.
#[derive(Clone)]
pub struct JobManager {
    events: mpsc::Sender<ManagerEvent>,
    shutdown: CancellationToken,
}

impl JobManager {
    /// Spawn the coordinator task and its execution pool.
    ///
    /// Must be called from within a tokio runtime. All pool units are
    /// created up front and pushed onto the free-unit queue in creation
    /// order.
    pub fn spawn(
        config: ManagerConfig,
        table: JobTable,
        program: Arc<dyn WorkerProgram>,
    ) -> (Self, JoinHandle<()>) {
        let shutdown = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer);
        let (report_tx, report_rx) = mpsc::channel(config.event_buffer);

        let pool = ExecutionPool::spawn(config.pool_size, program, report_tx, shutdown.clone());
        let mut free_units = FreeUnitQueue::new();
        for identity in 0..pool.size() {
            free_units.enqueue(identity);
        }

        let coordinator = Coordinator {
            table,
            jobs: JobQueue::with_capacity(config.max_queued_jobs),
            free_units,
            pool,
        };

        let task = tokio::spawn(coordinator.run(events_rx, report_rx, shutdown.clone()));
        (
            Self {
                events: events_tx,
                shutdown,
            },
            task,
        )
    }

    /// Submit a request. The `message` field of the body selects the job
    /// table entry.
    ///
    /// Local jobs run synchronously on the coordinator and return their
    /// result here. Delegated jobs return immediately with a job id and an
    /// outcome channel; if no unit is free the job waits in the backlog.
    pub async fn submit(&self, body: Value) -> Result<Submission> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send(ManagerEvent::Submit {
                body,
                reply: reply_tx,
            })
            .await
            .map_err(|_| JobError::ManagerClosed)?;
        reply_rx.await.map_err(|_| JobError::ManagerClosed)?
    }

    /// Bulk-replace delegated job table entries with externally discovered
    /// route metadata. Returns the number of entries applied.
    pub async fn refresh_routes(&self, updates: Vec<RouteUpdate>) -> Result<usize> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send(ManagerEvent::RefreshRoutes {
                updates,
                reply: reply_tx,
            })
            .await
            .map_err(|_| JobError::ManagerClosed)?;
        reply_rx.await.map_err(|_| JobError::ManagerClosed)
    }

    /// Current scheduler state: per-slot busy flags, backlog depth, free
    /// units.
    pub async fn snapshot(&self) -> Result<PoolSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send(ManagerEvent::Inspect { reply: reply_tx })
            .await
            .map_err(|_| JobError::ManagerClosed)?;
        reply_rx.await.map_err(|_| JobError::ManagerClosed)
    }

    /// Look up one slot by identity.
    pub async fn slot(&self, identity: usize) -> Result<Option<SlotSnapshot>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.slots.into_iter().find(|s| s.identity == identity))
    }

    /// Stop the coordinator and all execution units.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Owns all scheduling state: job table, backlog, free-unit queue, pool.
///
/// Runs as a single task and processes one event (submission, completion,
/// refresh, inspection) to completion before the next, so nothing here
/// needs a lock.
struct Coordinator {
    table: JobTable,
    jobs: JobQueue,
    free_units: FreeUnitQueue,
    pool: ExecutionPool,
}

/// Owned resolution of a job name, so table borrows don't outlive dispatch.
enum Resolved {
    Local(LocalHandler),
    Delegated(DelegatedRoute),
}

impl Coordinator {
    async fn run(
        mut self,
        mut events: mpsc::Receiver<ManagerEvent>,
        mut reports: mpsc::Receiver<CompletionReport>,
        shutdown: CancellationToken,
    ) {
        tracing::info!(pool_size = self.pool.size(), "Job manager started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(report) = reports.recv() => self.handle_completion(report),
                _ = shutdown.cancelled() => break,
            }
        }
        self.pool.shutdown();
        tracing::info!("Job manager stopped");
    }

    fn handle_event(&mut self, event: ManagerEvent) {
        match event {
            ManagerEvent::Submit { body, reply } => {
                let _ = reply.send(self.handle_submit(body));
            }
            ManagerEvent::RefreshRoutes { updates, reply } => {
                let _ = reply.send(self.table.refresh_routes(updates));
            }
            ManagerEvent::Inspect { reply } => {
                let _ = reply.send(PoolSnapshot {
                    slots: self.pool.snapshot(),
                    queued_jobs: self.jobs.len(),
                    free_units: self.free_units.len(),
                });
            }
        }
    }

    fn handle_submit(&mut self, body: Value) -> Result<Submission> {
        let name = body
            .get("message")
            .and_then(Value::as_str)
            .ok_or(JobError::MissingMessage)?
            .to_string();

        let resolved = match self.table.resolve(&name) {
            Some(Dispatch::Local(handler)) => Resolved::Local(Arc::clone(handler)),
            Some(Dispatch::Delegated(route)) => Resolved::Delegated(route.clone()),
            None => {
                tracing::warn!(job = %name, "Unresolved job name");
                return Err(JobError::UnresolvedJob(name));
            }
        };

        match resolved {
            Resolved::Local(handler) => {
                // Local jobs bypass the queues entirely.
                tracing::debug!(job = %name, "Running local handler");
                handler(body)
                    .map(Submission::Local)
                    .map_err(|message| JobError::HandlerFailed { name, message })
            }
            Resolved::Delegated(route) => {
                if self.jobs.is_full() {
                    return Err(JobError::QueueFull(self.jobs.max_jobs()));
                }
                let id = self.jobs.next_id();
                let (outcome_tx, outcome_rx) = oneshot::channel();
                self.jobs.enqueue(JobDescriptor {
                    id,
                    name: name.clone(),
                    route,
                    request_body: body,
                    submitted_at: Utc::now(),
                    reply: outcome_tx,
                });
                tracing::info!(job_id = id, job = %name, "Job queued");
                self.try_dispatch();
                Ok(Submission::Delegated {
                    id,
                    outcome: outcome_rx,
                })
            }
        }
    }

    /// Pair the head of the backlog with the head of the free-unit queue
    /// until either runs dry. Never blocks.
    fn try_dispatch(&mut self) {
        while !self.free_units.is_empty() && !self.jobs.is_empty() {
            let (identity, job) = match (self.free_units.dequeue(), self.jobs.dequeue()) {
                (Some(identity), Some(job)) => (identity, job),
                _ => break,
            };
            self.assign(identity, job);
        }
        if !self.jobs.is_empty() {
            tracing::debug!(queued = self.jobs.len(), "No free execution unit, jobs waiting");
        }
    }

    fn assign(&mut self, identity: usize, job: JobDescriptor) {
        let JobDescriptor {
            id,
            name,
            route,
            request_body,
            reply,
            ..
        } = job;

        let Some(slot) = self.pool.slot_mut(identity) else {
            tracing::error!(identity, job_id = id, "Free-unit queue referenced unknown slot");
            let _ = reply.send(JobOutcome::Failed("execution slot missing".to_string()));
            return;
        };

        slot.pending_reply = Some(reply);
        slot.busy = true;

        let assignment = JobAssignment {
            id,
            name: name.clone(),
            url: route.url,
            method: route.method,
            request_body,
        };
        if slot.send_assignment(assignment).is_err() {
            // Unit task is gone. Fail the job explicitly instead of leaving
            // it assigned forever, and keep the dead slot out of the free
            // queue.
            tracing::error!(identity, job_id = id, "Execution unit unreachable, failing job");
            slot.busy = false;
            if let Some(reply) = slot.pending_reply.take() {
                let _ = reply.send(JobOutcome::Failed("execution unit unreachable".to_string()));
            }
            return;
        }
        tracing::info!(job_id = id, job = %name, identity, "Job dispatched");
    }

    /// Result router: deliver the outcome, free the unit, dispatch again.
    fn handle_completion(&mut self, report: CompletionReport) {
        let Some(slot) = self.pool.slot_mut(report.identity) else {
            tracing::warn!(identity = report.identity, "Completion report from unknown slot");
            return;
        };

        let outcome = if report.success {
            JobOutcome::Completed(report.data)
        } else {
            JobOutcome::Failed(
                report
                    .error
                    .unwrap_or_else(|| "execution failed".to_string()),
            )
        };

        if let Some(reply) = slot.pending_reply.take() {
            // The submitter may have dropped its receiver; delivery is then
            // a no-op.
            let _ = reply.send(outcome);
        } else {
            tracing::warn!(
                identity = report.identity,
                job_id = report.id,
                "Completion report with no pending job"
            );
        }

        slot.busy = false;
        self.free_units.enqueue(report.identity);
        tracing::info!(
            job_id = report.id,
            identity = report.identity,
            success = report.success,
            "Job completed"
        );
        self.try_dispatch();
    }
}
