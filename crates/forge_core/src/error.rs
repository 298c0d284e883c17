use thiserror::Error;

use crate::blocks::BlockKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Block '{0}' appears more than once in the block order")]
    DuplicateBlock(BlockKind),

    #[error("Block order is missing: {}", .0.iter().map(|k| k.label()).collect::<Vec<_>>().join(", "))]
    IncompleteBlockOrder(Vec<BlockKind>),

    #[error("Unknown {kind}: '{value}'")]
    Unrecognized { kind: &'static str, value: String },
}

pub type CompileResult<T> = Result<T, CompileError>;
