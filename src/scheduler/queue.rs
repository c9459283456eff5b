use std::collections::VecDeque;

use crate::scheduler::job::JobDescriptor;

const DEFAULT_MAX_JOBS: usize = 10_000;

/// FIFO backlog of delegated jobs plus the monotonic id counter.
///
/// Insertion order is arrival order; ids are unique for the process lifetime
/// and never reset.
#[derive(Debug)]
pub struct JobQueue {
    jobs: VecDeque<JobDescriptor>,
    max_jobs: usize,
    next_id: u64,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_JOBS)
    }

    pub fn with_capacity(max_jobs: usize) -> Self {
        Self {
            jobs: VecDeque::new(),
            max_jobs,
            next_id: 0,
        }
    }

    /// Return the current id and advance the counter.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a descriptor to the tail. Returns false if the queue is at
    /// capacity (the descriptor is dropped and its outcome channel closes).
    pub fn enqueue(&mut self, job: JobDescriptor) -> bool {
        if self.jobs.len() >= self.max_jobs {
            return false;
        }
        self.jobs.push_back(job);
        true
    }

    /// Remove and return the head descriptor.
    pub fn dequeue(&mut self) -> Option<JobDescriptor> {
        self.jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.max_jobs
    }

    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }
}

/// FIFO backlog of idle execution slots, addressed by identity.
#[derive(Debug, Default)]
pub struct FreeUnitQueue {
    units: VecDeque<usize>,
}

impl FreeUnitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, identity: usize) {
        self.units.push_back(identity);
    }

    pub fn dequeue(&mut self) -> Option<usize> {
        self.units.pop_front()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
