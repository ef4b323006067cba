//! Error types for the editor

use mailframe_bridge::{BridgeError, CompilerError};
use mailframe_dom::DomError;
use mailframe_model::{ModelError, NodeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Compiler failure: {0}")]
    Compiler(#[from] CompilerError),

    #[error("No `{selector}` element found for kind `{kind}`")]
    ExtractionMiss { kind: String, selector: String },

    #[error("Compiled output is malformed: {0}")]
    MalformedOutput(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Unknown kind `{0}`")]
    UnknownKind(String),

    #[error("Node {0} has no mounted view")]
    NotMounted(NodeId),
}

impl RenderError {
    pub fn is_extraction_miss(&self) -> bool {
        matches!(self, RenderError::ExtractionMiss { .. })
    }

    pub fn is_compiler_failure(&self) -> bool {
        matches!(self, RenderError::Compiler(_))
    }
}

impl From<BridgeError> for RenderError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::Compiler(e) => RenderError::Compiler(e),
            BridgeError::ExtractionMiss { kind, selector } => {
                RenderError::ExtractionMiss { kind, selector }
            }
            BridgeError::MalformedOutput(msg) => RenderError::MalformedOutput(msg),
            BridgeError::Dom(e) => RenderError::Dom(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Markup contains no element")]
    Empty,

    #[error("Markup could not be parsed: {0}")]
    Dom(#[from] DomError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
