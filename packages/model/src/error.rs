use crate::NodeId;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("Node {node} <{tag}> is void and cannot hold children")]
    StructuralInvariantViolation { node: NodeId, tag: String },

    #[error("Moving {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
}
