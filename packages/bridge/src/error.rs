use crate::compiler::CompilerError;
use mailframe_dom::DomError;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Compiler failure: {0}")]
    Compiler(#[from] CompilerError),

    #[error("No `{selector}` element in compiled output for kind `{kind}`")]
    ExtractionMiss { kind: String, selector: String },

    #[error("Compiled output is malformed: {0}")]
    MalformedOutput(String),

    #[error("Scratch container error: {0}")]
    Dom(#[from] DomError),
}
