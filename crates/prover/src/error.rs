//! Errors raised by the registry, the proof backend and key persistence.

use ark_relations::r1cs::SynthesisError;
use ark_serialize::SerializationError;
use knowledge_circuits::{AssignmentError, EncodingError, ShapeError, WitnessError};
use mimc::ParameterError;
use thiserror::Error;

/// Failure inside the proving system.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Setup failed: {0}")]
    Setup(SynthesisError),
    #[error("Proof generation failed: {0}")]
    Prove(SynthesisError),
    #[error("Verification failed: {0}")]
    Verify(SynthesisError),
    #[error("Constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("Assignment does not satisfy constraint {constraint}")]
    Unsatisfied { constraint: String },
    #[error("Constraint system did not produce matrices")]
    MissingMatrices,
}

/// Any failure surfaced by the prover crate.
#[derive(Error, Debug)]
pub enum ProverError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Witness(#[from] WitnessError),
    #[error("Invalid hash parameters: {0}")]
    Parameters(#[from] ParameterError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
    #[error("Invalid key metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("Stored keys were generated for {actual}, expected {expected}")]
    FingerprintMismatch { expected: String, actual: String },
}

impl From<ShapeError> for ProverError {
    fn from(err: ShapeError) -> Self {
        ProverError::Witness(err.into())
    }
}

impl From<AssignmentError> for ProverError {
    fn from(err: AssignmentError) -> Self {
        ProverError::Witness(err.into())
    }
}

impl From<EncodingError> for ProverError {
    fn from(err: EncodingError) -> Self {
        ProverError::Witness(err.into())
    }
}

impl From<SynthesisError> for ProverError {
    fn from(err: SynthesisError) -> Self {
        ProverError::Backend(err.into())
    }
}
