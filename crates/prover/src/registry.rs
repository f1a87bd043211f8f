//! Compiles circuits once per shape and drives setup, proving and verification.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use ark_ec::pairing::Pairing;
use ark_ff::{BigInteger, PrimeField};
use ark_relations::r1cs::{ConstraintMatrices, ConstraintSystem, OptimizationGoal, SynthesisMode};
use ark_std::rand::{CryptoRng, RngCore};
use knowledge_circuits::{
    AssignmentError, Circuit, CircuitDescriptor, FieldParameters, PublicInputs, ShapeError,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::backend::{Groth16Backend, ProofBackend};
use crate::error::{BackendError, ProverError};
use crate::setup::KeyPair;

/// A blank circuit together with its finalized constraint matrices.
pub struct CompiledCircuit<F: PrimeField, C: Circuit<F>> {
    circuit: C,
    descriptor: CircuitDescriptor,
    matrices: ConstraintMatrices<F>,
    fingerprint: [u8; 32],
}

impl<F: PrimeField, C: Circuit<F>> CompiledCircuit<F, C> {
    pub fn circuit(&self) -> &C {
        &self.circuit
    }

    pub fn shape(&self) -> &C::Shape {
        self.circuit.shape()
    }

    pub fn descriptor(&self) -> &CircuitDescriptor {
        &self.descriptor
    }

    pub fn matrices(&self) -> &ConstraintMatrices<F> {
        &self.matrices
    }

    pub fn num_constraints(&self) -> usize {
        self.matrices.num_constraints
    }

    /// SHA-256 over the matrix dimensions and every non-zero entry.
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    /// File stem for persisted artifacts, unique per constraint system.
    pub fn artifact_name(&self) -> String {
        format!(
            "{}-{}",
            self.descriptor.name,
            hex::encode(&self.fingerprint[..8])
        )
    }
}

/// Entry point for compiling, setting up, proving and verifying circuits
/// with the backend `B`.
pub struct CircuitRegistry<F: PrimeField, B: ProofBackend<F>> {
    params: Arc<FieldParameters<F>>,
    _backend: PhantomData<fn() -> B>,
}

/// Registry proving with Groth16 over `E`.
pub type Groth16Registry<E> = CircuitRegistry<<E as Pairing>::ScalarField, Groth16Backend<E>>;

impl<F: PrimeField, B: ProofBackend<F>> Clone for CircuitRegistry<F, B> {
    fn clone(&self) -> Self {
        Self::new(self.params.clone())
    }
}

impl<F: PrimeField, B: ProofBackend<F>> CircuitRegistry<F, B> {
    pub fn new(params: Arc<FieldParameters<F>>) -> Self {
        Self {
            params,
            _backend: PhantomData,
        }
    }

    pub fn params(&self) -> &Arc<FieldParameters<F>> {
        &self.params
    }

    fn check_params(&self, params: &Arc<FieldParameters<F>>) -> Result<(), ShapeError> {
        if same_params(&self.params, params) {
            Ok(())
        } else {
            Err(ShapeError::ParameterMismatch)
        }
    }

    /// Synthesize the blank circuit for `shape` and extract its matrices.
    ///
    /// Compilation depends only on the shape and parameters, so compiling
    /// the same shape twice gives identical matrices and fingerprint.
    pub fn compile<C: Circuit<F>>(
        &self,
        shape: C::Shape,
    ) -> Result<CompiledCircuit<F, C>, ProverError> {
        let start = Instant::now();
        let circuit = C::blank(shape, self.params.clone())?;
        let descriptor = circuit.descriptor();

        let cs = ConstraintSystem::<F>::new_ref();
        cs.set_optimization_goal(OptimizationGoal::Constraints);
        cs.set_mode(SynthesisMode::Setup);
        circuit.clone().generate_constraints(cs.clone())?;
        cs.finalize();

        let matrices = cs.to_matrices().ok_or(BackendError::MissingMatrices)?;
        let fingerprint = fingerprint_matrices(&matrices);

        info!(
            circuit = %descriptor,
            constraints = matrices.num_constraints,
            elapsed = ?start.elapsed(),
            "compiled circuit"
        );

        Ok(CompiledCircuit {
            circuit,
            descriptor,
            matrices,
            fingerprint,
        })
    }

    /// Run the backend's circuit-specific setup.
    pub fn setup<C, R>(
        &self,
        compiled: &CompiledCircuit<F, C>,
        rng: &mut R,
    ) -> Result<KeyPair<F, B>, ProverError>
    where
        C: Circuit<F>,
        R: RngCore + CryptoRng,
    {
        self.check_params(compiled.circuit.params())?;
        let start = Instant::now();
        let (proving_key, verifying_key) = B::setup(compiled.circuit.clone(), rng)?;
        info!(
            circuit = compiled.descriptor.name,
            elapsed = ?start.elapsed(),
            "setup complete"
        );
        Ok(KeyPair::new(proving_key, verifying_key))
    }

    /// Prove a fully assigned circuit against a compiled shape.
    ///
    /// The assignment is evaluated against its constraints first, so an
    /// unsatisfied assignment fails here instead of producing an invalid proof.
    pub fn create_proof<C, R>(
        &self,
        assignment: C,
        compiled: &CompiledCircuit<F, C>,
        proving_key: &B::ProvingKey,
        rng: &mut R,
    ) -> Result<B::Proof, ProverError>
    where
        C: Circuit<F>,
        R: RngCore + CryptoRng,
    {
        if assignment.shape() != compiled.shape() {
            return Err(ShapeError::Mismatch {
                expected: format!("{:?}", compiled.shape()),
                actual: format!("{:?}", assignment.shape()),
            }
            .into());
        }
        if !same_params(assignment.params(), compiled.circuit.params()) {
            return Err(ShapeError::ParameterMismatch.into());
        }
        assignment.check_assignment()?;

        let cs = ConstraintSystem::<F>::new_ref();
        assignment.clone().generate_constraints(cs.clone())?;
        if let Some(constraint) = cs.which_is_unsatisfied()? {
            debug!(circuit = compiled.descriptor.name, %constraint, "unsatisfied assignment");
            return Err(BackendError::Unsatisfied { constraint }.into());
        }

        let start = Instant::now();
        let proof = B::prove(proving_key, assignment, rng)?;
        info!(
            circuit = compiled.descriptor.name,
            elapsed = ?start.elapsed(),
            "proof generated"
        );
        Ok(proof)
    }

    /// Check `proof` against the public inputs.
    ///
    /// Returns `Ok(false)` for a well-formed proof that does not verify.
    pub fn verify_proof(
        &self,
        proof: &B::Proof,
        public_inputs: &PublicInputs<F>,
        verifying_key: &B::VerifyingKey,
    ) -> Result<bool, ProverError> {
        let expected = B::num_public_inputs(verifying_key);
        if public_inputs.len() != expected {
            return Err(AssignmentError::PublicInputArity {
                expected,
                actual: public_inputs.len(),
            }
            .into());
        }

        let valid = B::verify(verifying_key, public_inputs.as_slice(), proof)?;
        debug!(valid, public_inputs = public_inputs.len(), "verified proof");
        Ok(valid)
    }
}

fn same_params<F: PrimeField>(a: &Arc<FieldParameters<F>>, b: &Arc<FieldParameters<F>>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

fn fingerprint_matrices<F: PrimeField>(matrices: &ConstraintMatrices<F>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for dimension in [
        matrices.num_instance_variables,
        matrices.num_witness_variables,
        matrices.num_constraints,
    ] {
        hasher.update((dimension as u64).to_le_bytes());
    }

    for matrix in [&matrices.a, &matrices.b, &matrices.c] {
        for row in matrix {
            hasher.update((row.len() as u64).to_le_bytes());
            for (coefficient, index) in row {
                hasher.update(coefficient.into_bigint().to_bytes_le());
                hasher.update((*index as u64).to_le_bytes());
            }
        }
    }

    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Bn254, Fr};
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use knowledge_circuits::{
        HashPreimageCircuit, MembershipShape, MerkleMembershipCircuit, PreimageShape,
        WitnessBuilder, WitnessError, DEFAULT_DOMAIN_TAG,
    };
    use mimc::MimcParameters;

    fn registry() -> Groth16Registry<Bn254> {
        CircuitRegistry::new(Arc::new(FieldParameters::standard().unwrap()))
    }

    #[test]
    fn test_compile_is_deterministic() {
        let registry = registry();
        let shape = PreimageShape::new(2).unwrap();

        let first = registry.compile::<HashPreimageCircuit<Fr>>(shape).unwrap();
        let second = registry.compile::<HashPreimageCircuit<Fr>>(shape).unwrap();

        assert_eq!(first.matrices().a, second.matrices().a);
        assert_eq!(first.matrices().b, second.matrices().b);
        assert_eq!(first.matrices().c, second.matrices().c);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.artifact_name(), second.artifact_name());
    }

    #[test]
    fn test_fingerprint_depends_on_shape() {
        let registry = registry();

        let one = registry
            .compile::<HashPreimageCircuit<Fr>>(PreimageShape::new(1).unwrap())
            .unwrap();
        let two = registry
            .compile::<HashPreimageCircuit<Fr>>(PreimageShape::new(2).unwrap())
            .unwrap();

        assert_ne!(one.fingerprint(), two.fingerprint());
        assert!(two.num_constraints() > one.num_constraints());
    }

    #[test]
    fn test_compile_rejects_invalid_shape() {
        let registry = registry();

        let err = registry
            .compile::<MerkleMembershipCircuit<Fr>>(MembershipShape {
                depth: 65,
                leaf_visibility: Default::default(),
            })
            .err()
            .unwrap();

        assert!(matches!(
            err,
            ProverError::Witness(WitnessError::Shape(ShapeError::DepthTooLarge { .. }))
        ));
    }

    #[test]
    fn test_create_proof_rejects_shape_mismatch() {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(7);

        let compiled = registry
            .compile::<HashPreimageCircuit<Fr>>(PreimageShape::new(1).unwrap())
            .unwrap();
        let keys = registry.setup(&compiled, &mut rng).unwrap();

        let (assignment, _) = WitnessBuilder::new(registry.params().clone())
            .build_preimage(PreimageShape::new(2).unwrap(), b"hello")
            .unwrap();

        let err = registry
            .create_proof(assignment, &compiled, &keys.proving_key, &mut rng)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ProverError::Witness(WitnessError::Shape(ShapeError::Mismatch { .. }))
        ));
    }

    #[test]
    fn test_create_proof_rejects_foreign_parameters() {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(7);

        let shape = PreimageShape::new(1).unwrap();
        let compiled = registry.compile::<HashPreimageCircuit<Fr>>(shape).unwrap();
        let keys = registry.setup(&compiled, &mut rng).unwrap();

        // Same shape and tag, different round constants
        let other = Arc::new(FieldParameters::new(
            MimcParameters::new(b"other").unwrap(),
            DEFAULT_DOMAIN_TAG,
        ));
        let (assignment, _) = WitnessBuilder::new(other)
            .build_preimage(shape, b"hello")
            .unwrap();
        let err = registry
            .create_proof(assignment, &compiled, &keys.proving_key, &mut rng)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ProverError::Witness(WitnessError::Shape(ShapeError::ParameterMismatch))
        ));

        // Equal parameters in a separate allocation are accepted
        let (assignment, public_inputs) =
            WitnessBuilder::new(Arc::new(FieldParameters::standard().unwrap()))
                .build_preimage(shape, b"hello")
                .unwrap();
        let proof = registry
            .create_proof(assignment, &compiled, &keys.proving_key, &mut rng)
            .unwrap();
        assert!(registry
            .verify_proof(&proof, &public_inputs, &keys.verifying_key)
            .unwrap());
    }

    #[test]
    fn test_setup_rejects_foreign_parameters() {
        let mut rng = StdRng::seed_from_u64(7);
        let shape = PreimageShape::new(1).unwrap();

        let tagged = Groth16Registry::<Bn254>::new(Arc::new(FieldParameters::new(
            MimcParameters::standard().unwrap(),
            b"other:".to_vec(),
        )));
        let compiled = tagged.compile::<HashPreimageCircuit<Fr>>(shape).unwrap();

        let err = registry().setup(&compiled, &mut rng).err().unwrap();
        assert!(matches!(
            err,
            ProverError::Witness(WitnessError::Shape(ShapeError::ParameterMismatch))
        ));
    }

    #[test]
    fn test_create_proof_rejects_unsatisfied() {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(7);

        let shape = PreimageShape::new(1).unwrap();
        let compiled = registry.compile::<HashPreimageCircuit<Fr>>(shape).unwrap();
        let keys = registry.setup(&compiled, &mut rng).unwrap();

        let (mut assignment, _) = WitnessBuilder::new(registry.params().clone())
            .build_preimage(shape, b"hello")
            .unwrap();
        assignment.hash = assignment.hash.map(|h| h + Fr::from(1u64));

        let err = registry
            .create_proof(assignment, &compiled, &keys.proving_key, &mut rng)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ProverError::Backend(BackendError::Unsatisfied { .. })
        ));
    }

    #[test]
    fn test_verify_proof_rejects_wrong_arity() {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(11);

        let shape = PreimageShape::new(1).unwrap();
        let compiled = registry.compile::<HashPreimageCircuit<Fr>>(shape).unwrap();
        let keys = registry.setup(&compiled, &mut rng).unwrap();
        let (assignment, public_inputs) = WitnessBuilder::new(registry.params().clone())
            .build_preimage(shape, b"hello")
            .unwrap();
        let proof = registry
            .create_proof(assignment, &compiled, &keys.proving_key, &mut rng)
            .unwrap();

        let mut too_many = public_inputs.clone().into_inner();
        too_many.push(Fr::from(1u64));
        let err = registry
            .verify_proof(&proof, &too_many.into(), &keys.verifying_key)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ProverError::Witness(WitnessError::Assignment(
                AssignmentError::PublicInputArity {
                    expected: 1,
                    actual: 2
                }
            ))
        ));

        assert!(registry
            .verify_proof(&proof, &public_inputs, &keys.verifying_key)
            .unwrap());
    }
}
