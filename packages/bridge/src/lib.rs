//! # Mailframe Bridge
//!
//! Uses the external markup compiler as an oracle for one node at a time:
//! wrap the node in a minimal skeleton, compile, cut the body out, stage it in
//! a scratch container and read back the kind-specific fragment.

pub mod bridge;
pub mod compiler;
pub mod error;
pub mod template;

pub use bridge::{extract_body, CompilationBridge, Scratch};
pub use compiler::{CommandCompiler, CompilerError, CompilerOutput, MarkupCompiler};
pub use error::{BridgeError, BridgeResult};
pub use template::{wrap, Anchor, CompiledTemplate, Extraction, KindTemplate, Skeleton};
