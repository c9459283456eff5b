use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::table::DelegatedRoute;

/// A delegated job waiting in the backlog.
///
/// Created at enqueue time, consumed at dispatch. The outcome sender is moved
/// into the assigned slot so the result router can deliver the final result.
#[derive(Debug)]
pub struct JobDescriptor {
    pub id: u64,
    pub name: String,
    pub route: DelegatedRoute,
    pub request_body: Value,
    pub submitted_at: DateTime<Utc>,
    pub reply: oneshot::Sender<JobOutcome>,
}

/// Final result of a delegated job, delivered on its outcome channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(Value),
    Failed(String),
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }
}

/// Message sent to an execution unit when a job is assigned to it.
///
/// This and [`CompletionReport`] are the entire contract between the
/// coordinator and a unit; units never touch coordinator state directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAssignment {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub method: String,
    pub request_body: Value,
}

/// Message sent back by an execution unit when it finishes a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Identity of the slot that produced this report.
    pub identity: usize,
    pub id: u64,
    pub success: bool,
    pub data: Value,
    pub error: Option<String>,
}

impl CompletionReport {
    pub fn succeeded(identity: usize, id: u64, data: Value) -> Self {
        Self {
            identity,
            id,
            success: true,
            data,
            error: None,
        }
    }

    pub fn failed(identity: usize, id: u64, error: impl Into<String>) -> Self {
        Self {
            identity,
            id,
            success: false,
            data: Value::Null,
            error: Some(error.into()),
        }
    }
}
