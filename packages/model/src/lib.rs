//! # Mailframe Model
//!
//! The editable side of the pipeline: nodes with attributes and style, change
//! events, the style/attribute merge controller and canonical markup export.
//!
//! ```rust,ignore
//! use mailframe_model::{NodeInit, NodeTree, to_markup};
//!
//! let mut tree = NodeTree::new();
//! let rule = tree.create(NodeInit { tag: "mj-divider".into(), ..Default::default() });
//! tree.set_style_property(rule, "border-color", "#ff0000")?;
//! assert_eq!(to_markup(&tree, rule)?, r##"<mj-divider border-color="#ff0000"></mj-divider>"##);
//! ```

pub mod error;
pub mod events;
pub mod merge;
pub mod node;
pub mod serializer;
pub mod tree;

pub use error::{ModelError, ModelResult};
pub use events::{Delivery, EventKind, NodeEvent, SubscriptionId};
pub use merge::MergeController;
pub use node::{AttrMap, KindMeta, Node, NodeId, NodeInit, Predicate, TraitDescriptor, TraitOption};
pub use serializer::{escape_attribute, to_markup, unescape_attribute};
pub use tree::NodeTree;
