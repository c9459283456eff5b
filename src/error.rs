use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("No job table entry for \"{0}\"")]
    UnresolvedJob(String),

    #[error("Request body has no \"message\" field")]
    MissingMessage,

    #[error("Local handler \"{name}\" failed: {message}")]
    HandlerFailed { name: String, message: String },

    #[error("Job queue is at capacity ({0} jobs)")]
    QueueFull(usize),

    #[error("Job manager is shut down")]
    ManagerClosed,
}

pub type Result<T> = std::result::Result<T, JobError>;
