//! Error kinds raised while encoding data and building assignments.

use thiserror::Error;

/// Hash-to-field or byte-packing failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("block count must be at least 1")]
    ZeroBlockCount,
    #[error("hash-to-field cannot produce {requested} elements (at most {max})")]
    TooManyBlocks { requested: usize, max: usize },
    #[error("buffer of {len} bytes is not a multiple of the {width}-byte element width")]
    UnalignedBuffer { len: usize, width: usize },
    #[error("chunk {index} is not a canonical field element")]
    NonCanonicalElement { index: usize },
}

/// Circuit shape mismatch: block count, path depth, leaf index range or parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("a preimage must span at least one block")]
    EmptyPreimage,
    #[error("tree depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: usize, max: usize },
    #[error("leaf index {index} does not fit in {depth} bits")]
    LeafIndexOutOfRange { index: u64, depth: usize },
    #[error("leaf {index} is outside a tree of {leaf_count} leaves")]
    LeafNotInTree { index: u64, leaf_count: u64 },
    #[error("cannot build a tree without leaves")]
    EmptyTree,
    #[error("assignment shape {actual} does not match compiled shape {expected}")]
    Mismatch { expected: String, actual: String },
    #[error("circuit was built with different hash or encoding parameters")]
    ParameterMismatch,
}

/// Incomplete or malformed assignment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("signal `{0}` has no assigned value")]
    MissingSignal(&'static str),
    #[error("path has {actual} siblings but the circuit depth is {expected}")]
    PathLengthMismatch { expected: usize, actual: usize },
    #[error("preimage has {actual} blocks but the circuit expects {expected}")]
    BlockCountMismatch { expected: usize, actual: usize },
    #[error("expected {expected} public inputs, got {actual}")]
    PublicInputArity { expected: usize, actual: usize },
}

/// Any failure of the witness pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WitnessError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
}
