const DEFAULT_POOL_SIZE: usize = 3;
const DEFAULT_MAX_QUEUED_JOBS: usize = 10_000;
const DEFAULT_EVENT_BUFFER: usize = 256;

/// Configuration for a [`JobManager`](crate::manager::JobManager) instance.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Number of persistent execution units in the pool.
    pub pool_size: usize,
    /// Maximum number of delegated jobs waiting for a free unit.
    /// Submissions beyond this are rejected with `QueueFull`.
    pub max_queued_jobs: usize,
    /// Buffer size of the coordinator's event channel.
    pub event_buffer: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            max_queued_jobs: DEFAULT_MAX_QUEUED_JOBS,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ManagerConfig {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }

    pub fn with_max_queued_jobs(mut self, max: usize) -> Self {
        self.max_queued_jobs = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let cfg = ManagerConfig::default();
        assert_eq!(cfg.pool_size, 3);
        assert_eq!(cfg.max_queued_jobs, 10_000);
        assert_eq!(cfg.event_buffer, 256);
    }

    #[test]
    fn config_new_overrides_pool_size() {
        let cfg = ManagerConfig::new(8);
        assert_eq!(cfg.pool_size, 8);
        assert_eq!(cfg.max_queued_jobs, 10_000);
    }

    #[test]
    fn config_with_max_queued_jobs() {
        let cfg = ManagerConfig::new(1).with_max_queued_jobs(2);
        assert_eq!(cfg.pool_size, 1);
        assert_eq!(cfg.max_queued_jobs, 2);
    }
}
