use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A synchronous handler for jobs resolved as local.
///
/// Invoked on the coordinator with the full request body; the return value is
/// handed straight back to the submitter.
pub type LocalHandler = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Route metadata for a job that is delegated to an execution unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedRoute {
    pub url: String,
    pub method: String,
}

impl DelegatedRoute {
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
        }
    }
}

/// Dispatch policy for one job name.
#[derive(Clone)]
pub enum Dispatch {
    /// Run the handler synchronously on the coordinator. No queueing, no
    /// execution-unit involvement.
    Local(LocalHandler),
    /// Enqueue a descriptor and hand the job to a free execution unit.
    Delegated(DelegatedRoute),
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Local(_) => f.write_str("Local(..)"),
            Dispatch::Delegated(route) => f.debug_tuple("Delegated").field(route).finish(),
        }
    }
}

/// A single entry in a bulk routes refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteUpdate {
    pub name: String,
    pub url: String,
    pub method: String,
}

/// Static lookup resolving a job name to its dispatch policy.
///
/// Built once at startup and owned by the coordinator. The only mutation
/// after startup is [`refresh_routes`](JobTable::refresh_routes), which the
/// coordinator serializes with everything else.
#[derive(Debug, Default)]
pub struct JobTable {
    entries: HashMap<String, Dispatch>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handled synchronously in-process.
    pub fn register_local(&mut self, name: impl Into<String>, handler: LocalHandler) {
        self.entries.insert(name.into(), Dispatch::Local(handler));
    }

    /// Register a job delegated to the execution pool.
    pub fn register_delegated(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
    ) {
        self.entries.insert(
            name.into(),
            Dispatch::Delegated(DelegatedRoute::new(url, method)),
        );
    }

    pub fn resolve(&self, name: &str) -> Option<&Dispatch> {
        self.entries.get(name)
    }

    /// Bulk-upsert delegated entries from externally discovered route
    /// metadata. Returns the number of entries applied.
    ///
    /// Updates that name an existing local entry are skipped: discovered
    /// routes may not displace a registered handler.
    pub fn refresh_routes(&mut self, updates: Vec<RouteUpdate>) -> usize {
        let mut applied = 0;
        for update in updates {
            if let Some(Dispatch::Local(_)) = self.entries.get(&update.name) {
                tracing::warn!(name = %update.name, "Route refresh skipped local entry");
                continue;
            }
            self.entries.insert(
                update.name,
                Dispatch::Delegated(DelegatedRoute::new(update.url, update.method)),
            );
            applied += 1;
        }
        tracing::info!(applied, "Job table routes refreshed");
        applied
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
