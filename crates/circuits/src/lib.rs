//! ZK circuits for hash-preimage knowledge and Merkle membership.
//!
//! This crate provides circuits for:
//! - `HashPreimageCircuit`: Prove knowledge of a message whose MiMC hash is public
//! - `MerkleMembershipCircuit`: Prove a leaf belongs to a tree with a public root
//!
//! along with the field encoder that turns byte messages into preimage blocks,
//! a native Merkle tree, and the `WitnessBuilder` that assembles assignments.

pub mod circuit;
pub mod encoder;
pub mod error;
pub mod merkle;
pub mod params;
pub mod preimage;
pub mod range_check;
pub mod witness;


pub use circuit::{Circuit, CircuitDescriptor, PublicInputs, Signal, SignalRole};
pub use error::{AssignmentError, EncodingError, ShapeError, WitnessError};
pub use merkle::{
    leaf_from_message, LeafVisibility, MembershipShape, MerkleMembershipCircuit, MerkleProof,
    MerkleTree, MAX_DEPTH,
};
pub use params::{FieldParameters, DEFAULT_DOMAIN_TAG};
pub use preimage::{HashPreimageCircuit, PreimageShape};
pub use witness::{BuiltWitness, WitnessBuilder, WitnessRequest};

use ark_bn254::Fr;

/// Common type aliases
pub type ConstraintF = Fr;
