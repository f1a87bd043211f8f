//! Proof generation for the two statements.

use ark_ff::PrimeField;
use ark_std::rand::{CryptoRng, RngCore};
use knowledge_circuits::{
    HashPreimageCircuit, MerkleMembershipCircuit, MerkleProof, PublicInputs, WitnessBuilder,
};
use tracing::debug;

use crate::backend::ProofBackend;
use crate::error::ProverError;
use crate::registry::CircuitRegistry;
use crate::setup::CircuitArtifacts;

/// A proof together with the public inputs it verifies against.
pub struct ProofResult<F: PrimeField, B: ProofBackend<F>> {
    pub proof: B::Proof,
    pub public_inputs: PublicInputs<F>,
}

impl<F: PrimeField, B: ProofBackend<F>> Clone for ProofResult<F, B> {
    fn clone(&self) -> Self {
        Self {
            proof: self.proof.clone(),
            public_inputs: self.public_inputs.clone(),
        }
    }
}

/// Prove knowledge of `message` under the compiled preimage shape.
///
/// Public inputs: `[hash]`.
pub fn prove_message<F, B, R>(
    registry: &CircuitRegistry<F, B>,
    artifacts: &CircuitArtifacts<F, HashPreimageCircuit<F>, B>,
    message: &[u8],
    rng: &mut R,
) -> Result<ProofResult<F, B>, ProverError>
where
    F: PrimeField,
    B: ProofBackend<F>,
    R: RngCore + CryptoRng,
{
    let builder = WitnessBuilder::new(registry.params().clone());
    let (circuit, public_inputs) = builder.build_preimage(*artifacts.compiled.shape(), message)?;
    debug!(message_len = message.len(), "proving preimage");

    let proof = registry.create_proof(
        circuit,
        &artifacts.compiled,
        &artifacts.keys.proving_key,
        rng,
    )?;

    Ok(ProofResult {
        proof,
        public_inputs,
    })
}

/// Prove that `merkle_proof.leaf` is in the tree with root `merkle_proof.root`.
///
/// Public inputs: `[root]`, or `[leaf, root]` for a public-leaf shape.
pub fn prove_membership<F, B, R>(
    registry: &CircuitRegistry<F, B>,
    artifacts: &CircuitArtifacts<F, MerkleMembershipCircuit<F>, B>,
    merkle_proof: &MerkleProof<F>,
    rng: &mut R,
) -> Result<ProofResult<F, B>, ProverError>
where
    F: PrimeField,
    B: ProofBackend<F>,
    R: RngCore + CryptoRng,
{
    let builder = WitnessBuilder::new(registry.params().clone());
    let (circuit, public_inputs) =
        builder.build_membership(*artifacts.compiled.shape(), merkle_proof)?;
    debug!(leaf_index = merkle_proof.leaf_index, "proving membership");

    let proof = registry.create_proof(
        circuit,
        &artifacts.compiled,
        &artifacts.keys.proving_key,
        rng,
    )?;

    Ok(ProofResult {
        proof,
        public_inputs,
    })
}
