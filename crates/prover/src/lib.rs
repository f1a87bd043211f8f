//! Proof generation library for hash-preimage and Merkle-membership statements.
//!
//! The [`CircuitRegistry`] compiles a circuit once per shape, runs the
//! backend setup, and proves and verifies assignments built by
//! [`knowledge_circuits::WitnessBuilder`]. [`Groth16Backend`] is the only
//! backend; the registry talks to it through [`ProofBackend`].

pub mod backend;
pub mod error;
pub mod prove;
pub mod registry;
pub mod setup;
pub mod verify;

pub use backend::{Groth16Backend, ProofBackend};
pub use error::{BackendError, ProverError};
pub use prove::{prove_membership, prove_message, ProofResult};
pub use registry::{CircuitRegistry, CompiledCircuit, Groth16Registry};
pub use setup::{setup_all, CircuitArtifacts, CircuitKeys, KeyPair};
pub use verify::{verify_membership, verify_preimage};
