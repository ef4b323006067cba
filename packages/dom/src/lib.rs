//! # Mailframe DOM
//!
//! The live document views render into, plus the scratch parsing used to pull
//! fragments out of compiled HTML.
//!
//! ```rust,ignore
//! use mailframe_dom::Dom;
//!
//! let mut dom = Dom::new();
//! let root = dom.create_element("div");
//! dom.set_inner_html(root, "<table><tr><td>Hi</td></tr></table>")?;
//! let tr = dom.query_selector(root, "tr")?;
//! ```

pub mod document;
pub mod error;
pub mod style;
pub mod tokenizer;

pub use document::{is_void_element, Dom, DomData, DomId, DomNode, ElementData};
pub use error::{DomError, DomResult};
pub use style::InlineStyle;
