//! The workflow façade: a typed [`AgentState`], a [`Workflow::define`]/
//! [`Workflow::create`] surface built on curried node/parallel/chain/branch
//! factories, and [`run_workflow`] with run persistence and crash recovery.

pub mod definition;
pub mod factory;
pub mod state;

pub use definition::{recover_stale_runs, run_workflow, Workflow, WorkflowOutcome};
pub use factory::{node_factory, NodeFactory, StateNode};
pub use state::{AgentState, RunMeta};
