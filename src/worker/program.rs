use async_trait::async_trait;
use serde_json::Value;

use crate::scheduler::JobAssignment;

/// The fixed entry program every execution unit is loaded with.
///
/// One program instance is shared by all units in a pool; `run` may be
/// invoked concurrently from different unit tasks.
#[async_trait]
pub trait WorkerProgram: Send + Sync {
    /// Execute one assignment to completion. `Ok` becomes a successful
    /// completion report, `Err` a failed one.
    async fn run(&self, assignment: &JobAssignment) -> Result<Value, String>;
}

/// Program that echoes the assignment back, optionally sleeping first.
///
/// Honors an optional `delay_ms` field in the request body, which makes it
/// useful for exercising dispatch ordering.
#[derive(Debug, Default)]
pub struct EchoProgram;

#[async_trait]
impl WorkerProgram for EchoProgram {
    async fn run(&self, assignment: &JobAssignment) -> Result<Value, String> {
        if let Some(delay_ms) = assignment
            .request_body
            .get("delay_ms")
            .and_then(Value::as_u64)
        {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
        }
        Ok(serde_json::json!({
            "job": assignment.name,
            "url": assignment.url,
            "method": assignment.method,
            "echo": assignment.request_body,
        }))
    }
}
