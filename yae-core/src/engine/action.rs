//! The `Action` string that a node returns to select its next edge.

/// Edge key used when a node installs its single default successor via `to`.
pub const DEFAULT_ACTION: &str = "default";

/// A routing key returned by a node's `post` phase. `"default"` is the edge
/// installed by `Node::to`; any other value must be installed via `Node::when`.
pub type Action = String;
