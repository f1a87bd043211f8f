//! Binary Merkle trees over MiMC.
//!
//! This module provides:
//! - Native tree construction and proof generation
//! - In-circuit path verification gadgets
//! - The `MerkleMembershipCircuit`

mod gadgets;
mod membership;
mod proof;
mod tree;

pub use gadgets::{compute_root_from_path, verify_membership, MerkleProofVar};
pub use membership::{LeafVisibility, MembershipShape, MerkleMembershipCircuit};
pub use proof::MerkleProof;
pub use tree::{leaf_from_message, MerkleTree, MAX_DEPTH};
