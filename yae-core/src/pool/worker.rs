//! A worker slot handed out by [`super::WorkerPool`]. Carries no state of
//! its own beyond an id — it exists to be checked out and returned, bounding
//! how many background workflows run at once. Ownership/workflow
//! annotations live in the pool, keyed by this id, not on the `Worker` value.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Worker {
    pub id: usize,
}

/// Who a checked-out worker is running for, and which workflow — cleared by
/// [`super::WorkerPool::return_worker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerAnnotation {
    pub current_owner: String,
    pub workflow: String,
}
