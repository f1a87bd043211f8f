//! Assembles full circuit assignments from application data.
//!
//! The builder performs shape checks only. Whether an assignment actually
//! satisfies its circuit is decided by constraint evaluation, so a bad
//! Merkle path or mismatched hash surfaces when the proof is created.

use std::sync::Arc;

use ark_ff::PrimeField;
use mimc::hash_chain;
use tracing::debug;

use crate::circuit::{Circuit, PublicInputs};
use crate::encoder;
use crate::error::{AssignmentError, ShapeError, WitnessError};
use crate::merkle::{MembershipShape, MerkleMembershipCircuit, MerkleProof};
use crate::params::FieldParameters;
use crate::preimage::{HashPreimageCircuit, PreimageShape};
use crate::range_check::fits_in_bits;

/// One request for a full assignment.
#[derive(Clone, Debug)]
pub enum WitnessRequest<F: PrimeField> {
    /// Encode `message` under the domain tag and hash it.
    Preimage { shape: PreimageShape, message: Vec<u8> },
    /// Take an already-encoded preimage as raw element bytes.
    EncodedPreimage { shape: PreimageShape, bytes: Vec<u8> },
    /// Wrap a Merkle proof produced elsewhere.
    Membership {
        shape: MembershipShape,
        proof: MerkleProof<F>,
    },
}

/// Assignment produced for a [`WitnessRequest`].
#[derive(Clone, Debug)]
pub enum BuiltWitness<F: PrimeField> {
    Preimage(HashPreimageCircuit<F>, PublicInputs<F>),
    Membership(MerkleMembershipCircuit<F>, PublicInputs<F>),
}

impl<F: PrimeField> BuiltWitness<F> {
    pub fn public_inputs(&self) -> &PublicInputs<F> {
        match self {
            BuiltWitness::Preimage(_, inputs) | BuiltWitness::Membership(_, inputs) => inputs,
        }
    }
}

/// Builds circuit assignments under one set of field parameters.
#[derive(Clone, Debug)]
pub struct WitnessBuilder<F: PrimeField> {
    params: Arc<FieldParameters<F>>,
}

impl<F: PrimeField> WitnessBuilder<F> {
    pub fn new(params: Arc<FieldParameters<F>>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Arc<FieldParameters<F>> {
        &self.params
    }

    /// Encode `message` into `shape.block_count` blocks and assign it along
    /// with its hash.
    pub fn build_preimage(
        &self,
        shape: PreimageShape,
        message: &[u8],
    ) -> Result<(HashPreimageCircuit<F>, PublicInputs<F>), WitnessError> {
        let shape = PreimageShape::new(shape.block_count)?;
        let blocks = self.params.encode_message(message, shape.block_count)?;
        debug!(
            message_len = message.len(),
            block_count = shape.block_count,
            "encoded preimage"
        );
        self.assign_preimage(blocks)
    }

    /// Assign a preimage given as concatenated big-endian element bytes.
    pub fn build_preimage_from_encoded(
        &self,
        shape: PreimageShape,
        bytes: &[u8],
    ) -> Result<(HashPreimageCircuit<F>, PublicInputs<F>), WitnessError> {
        let shape = PreimageShape::new(shape.block_count)?;
        let blocks = encoder::from_bytes::<F>(bytes)?;
        if blocks.len() != shape.block_count {
            return Err(AssignmentError::BlockCountMismatch {
                expected: shape.block_count,
                actual: blocks.len(),
            }
            .into());
        }
        self.assign_preimage(blocks)
    }

    fn assign_preimage(
        &self,
        blocks: Vec<F>,
    ) -> Result<(HashPreimageCircuit<F>, PublicInputs<F>), WitnessError> {
        let hash = hash_chain(self.params.mimc(), &blocks);
        let circuit = HashPreimageCircuit::new(blocks, hash, self.params.clone())?;
        let inputs = circuit.public_inputs()?;
        Ok((circuit, inputs))
    }

    /// Assign a membership circuit from a proof, checking only its shape.
    pub fn build_membership(
        &self,
        shape: MembershipShape,
        proof: &MerkleProof<F>,
    ) -> Result<(MerkleMembershipCircuit<F>, PublicInputs<F>), WitnessError> {
        let shape = MembershipShape::new(shape.depth, shape.leaf_visibility)?;
        if proof.siblings.len() != shape.depth {
            return Err(AssignmentError::PathLengthMismatch {
                expected: shape.depth,
                actual: proof.siblings.len(),
            }
            .into());
        }
        if !fits_in_bits(proof.leaf_index, shape.depth) {
            return Err(ShapeError::LeafIndexOutOfRange {
                index: proof.leaf_index,
                depth: shape.depth,
            }
            .into());
        }

        debug!(
            depth = shape.depth,
            leaf_index = proof.leaf_index,
            "assigned membership witness"
        );
        let circuit = MerkleMembershipCircuit::new(
            shape,
            proof.leaf,
            proof.siblings.clone(),
            proof.leaf_index,
            proof.root,
            self.params.clone(),
        );
        let inputs = circuit.public_inputs()?;
        Ok((circuit, inputs))
    }

    pub fn build(&self, request: WitnessRequest<F>) -> Result<BuiltWitness<F>, WitnessError> {
        match request {
            WitnessRequest::Preimage { shape, message } => {
                let (circuit, inputs) = self.build_preimage(shape, &message)?;
                Ok(BuiltWitness::Preimage(circuit, inputs))
            }
            WitnessRequest::EncodedPreimage { shape, bytes } => {
                let (circuit, inputs) = self.build_preimage_from_encoded(shape, &bytes)?;
                Ok(BuiltWitness::Preimage(circuit, inputs))
            }
            WitnessRequest::Membership { shape, proof } => {
                let (circuit, inputs) = self.build_membership(shape, &proof)?;
                Ok(BuiltWitness::Membership(circuit, inputs))
            }
        }
    }
}
