use crate::DomId;
use thiserror::Error;

pub type DomResult<T> = Result<T, DomError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("DOM node {0} does not exist")]
    NodeNotFound(DomId),

    #[error("DOM node {0} is not an element")]
    NotAnElement(DomId),

    #[error("Cannot append {child} to {parent}: child is an ancestor of parent")]
    HierarchyRequest { parent: DomId, child: DomId },

    #[error("Unexpected markup at {pos}")]
    Parse { pos: usize },
}
