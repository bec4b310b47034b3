//! Graph execution engine: nodes with a `prep`/`exec`/`post` lifecycle,
//! retry/timeout policy, per-item parallel fan-out, and a `Flow` walker that
//! tolerates cycles by cloning each node it visits per run.

pub mod action;
pub mod branch;
pub mod flow;
pub mod node;
pub mod parallel;
pub mod retry;

pub use action::{Action, DEFAULT_ACTION};
pub use branch::{branch, chain, Branch};
pub use flow::{Flow, FlowHooks, NoopHooks, MAX_ITERATIONS};
pub use node::{GraphNode, Node, NodeBehavior};
pub use parallel::{ParallelNode, ParallelNodeBehavior};
pub use retry::{Backoff, RetryConfig};
