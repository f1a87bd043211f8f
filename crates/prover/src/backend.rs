//! Proving system abstraction and its Groth16 implementation.

use std::marker::PhantomData;

use ark_ec::pairing::Pairing;
use ark_ff::PrimeField;
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::ConstraintSynthesizer;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};

use crate::error::BackendError;

/// A pairing-based SNARK with circuit-specific setup.
///
/// Backends are stateless; key material is passed to every call by reference.
pub trait ProofBackend<F: PrimeField> {
    type ProvingKey: Clone + CanonicalSerialize + CanonicalDeserialize + Send + Sync;
    type VerifyingKey: Clone + CanonicalSerialize + CanonicalDeserialize + Send + Sync;
    type Proof: Clone + CanonicalSerialize + CanonicalDeserialize + Send + Sync;

    fn setup<C, R>(
        circuit: C,
        rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), BackendError>
    where
        C: ConstraintSynthesizer<F>,
        R: RngCore + CryptoRng;

    fn prove<C, R>(
        proving_key: &Self::ProvingKey,
        circuit: C,
        rng: &mut R,
    ) -> Result<Self::Proof, BackendError>
    where
        C: ConstraintSynthesizer<F>,
        R: RngCore + CryptoRng;

    fn verify(
        verifying_key: &Self::VerifyingKey,
        public_inputs: &[F],
        proof: &Self::Proof,
    ) -> Result<bool, BackendError>;

    /// Number of public inputs the verifying key expects.
    fn num_public_inputs(verifying_key: &Self::VerifyingKey) -> usize;
}

/// Groth16 over the pairing `E`.
pub struct Groth16Backend<E: Pairing>(PhantomData<fn() -> E>);

impl<E: Pairing> Default for Groth16Backend<E> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<E: Pairing> ProofBackend<E::ScalarField> for Groth16Backend<E> {
    type ProvingKey = ProvingKey<E>;
    type VerifyingKey = VerifyingKey<E>;
    type Proof = Proof<E>;

    fn setup<C, R>(
        circuit: C,
        rng: &mut R,
    ) -> Result<(ProvingKey<E>, VerifyingKey<E>), BackendError>
    where
        C: ConstraintSynthesizer<E::ScalarField>,
        R: RngCore + CryptoRng,
    {
        Groth16::<E>::circuit_specific_setup(circuit, rng).map_err(BackendError::Setup)
    }

    fn prove<C, R>(
        proving_key: &ProvingKey<E>,
        circuit: C,
        rng: &mut R,
    ) -> Result<Proof<E>, BackendError>
    where
        C: ConstraintSynthesizer<E::ScalarField>,
        R: RngCore + CryptoRng,
    {
        Groth16::<E>::prove(proving_key, circuit, rng).map_err(BackendError::Prove)
    }

    fn verify(
        verifying_key: &VerifyingKey<E>,
        public_inputs: &[E::ScalarField],
        proof: &Proof<E>,
    ) -> Result<bool, BackendError> {
        Groth16::<E>::verify(verifying_key, public_inputs, proof).map_err(BackendError::Verify)
    }

    fn num_public_inputs(verifying_key: &VerifyingKey<E>) -> usize {
        verifying_key.gamma_abc_g1.len().saturating_sub(1)
    }
}
