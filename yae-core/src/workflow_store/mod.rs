//! Persisted workflow-run bookkeeping, used for crash recovery at startup.

pub mod backend;
pub mod repository;
pub mod run;

pub use backend::{InMemoryWorkflowRunBackend, WorkflowRunBackend};
pub use repository::WorkflowRunRepository;
pub use run::{RunStatus, WorkflowRun};
