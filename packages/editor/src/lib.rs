//! # Mailframe Editor
//!
//! Live editing surface for email markup.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: NodeTree + merge controller + events │
//! └─────────────────────────────────────────────┘
//!                     ↓ queued events
//! ┌─────────────────────────────────────────────┐
//! │ editor: Canvas                              │
//! │  - Kinds and the type registry              │
//! │  - Markup import                            │
//! │  - One view per node, cold/warm re-render   │
//! │  - Interactivity mask                       │
//! └─────────────────────────────────────────────┘
//!                     ↓ one node at a time
//! ┌─────────────────────────────────────────────┐
//! │ bridge: markup → compiler → HTML fragment   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailframe_editor::{Canvas, Config};
//!
//! let mut canvas = Canvas::from_config(&Config::load(".")?);
//! let column = canvas.import("<mj-column><mj-divider></mj-divider></mj-column>")?;
//! canvas.mount(column)?;
//!
//! let divider = canvas.tree().children(column)?[0];
//! canvas.tree_mut().set_style_property(divider, "border-color", "#ff0000")?;
//! let report = canvas.flush();
//! assert!(report.is_ok());
//!
//! println!("{}", canvas.export(column)?);
//! ```

pub mod canvas;
pub mod config;
pub mod errors;
pub mod import;
pub mod kind;
pub mod kinds;
pub mod registry;
pub mod view;

pub use canvas::{Canvas, FlushReport, RenderFailure};
pub use config::{CompilerConfig, Config, DEFAULT_CONFIG_NAME};
pub use errors::{ImportError, RenderError};
pub use import::import_markup;
pub use kind::{attr_map, ContentPolicy, Kind, KindDefaults};
pub use registry::TypeRegistry;
pub use view::{ChildViews, RenderPath, View, ViewId};
