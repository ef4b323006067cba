//! Built-in kinds

mod base;
mod divider;
mod social;

pub use base::{core, CORE_KIND};
pub use divider::divider;
pub use social::social;

/// Drop target shared by the column-only kinds
pub(crate) const COLUMN_ONLY: &str = "[data-type=mj-column]";
