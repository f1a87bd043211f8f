//! Verification helpers that assemble public inputs from their parts.

use ark_ff::PrimeField;
use knowledge_circuits::PublicInputs;

use crate::backend::ProofBackend;
use crate::error::ProverError;
use crate::registry::CircuitRegistry;

/// Verify a preimage proof against the claimed hash.
pub fn verify_preimage<F: PrimeField, B: ProofBackend<F>>(
    registry: &CircuitRegistry<F, B>,
    verifying_key: &B::VerifyingKey,
    proof: &B::Proof,
    hash: F,
) -> Result<bool, ProverError> {
    let public_inputs = PublicInputs::new(vec![hash]);
    registry.verify_proof(proof, &public_inputs, verifying_key)
}

/// Verify a membership proof against `root`.
///
/// Pass the leaf only for circuits compiled with a public leaf; a missing or
/// extra leaf is reported as a public input arity error.
pub fn verify_membership<F: PrimeField, B: ProofBackend<F>>(
    registry: &CircuitRegistry<F, B>,
    verifying_key: &B::VerifyingKey,
    proof: &B::Proof,
    root: F,
    leaf: Option<F>,
) -> Result<bool, ProverError> {
    let values: Vec<F> = leaf.into_iter().chain(Some(root)).collect();
    let public_inputs = PublicInputs::new(values);
    registry.verify_proof(proof, &public_inputs, verifying_key)
}
