//! HashPreimageCircuit: Proves knowledge of blocks whose MiMC hash is public.

use std::sync::Arc;

use ark_ff::PrimeField;
use ark_r1cs_std::{alloc::AllocVar, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use mimc::hash_chain_var;

use crate::circuit::{Circuit, CircuitDescriptor, PublicInputs};
use crate::encoder::block_count_for;
use crate::error::{AssignmentError, ShapeError, WitnessError};
use crate::params::FieldParameters;

/// Compile-time shape of a preimage circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PreimageShape {
    pub block_count: usize,
}

impl PreimageShape {
    pub fn new(block_count: usize) -> Result<Self, ShapeError> {
        if block_count == 0 {
            return Err(ShapeError::EmptyPreimage);
        }
        Ok(Self { block_count })
    }

    /// Shape covering a message of `len` bytes.
    pub fn for_message<F: PrimeField>(len: usize) -> Self {
        Self {
            block_count: block_count_for::<F>(len),
        }
    }
}

/// Circuit that proves: "MiMC(preimage) == hash"
///
/// Public inputs:
/// - hash: The MiMC chain hash of the preimage blocks
///
/// Private witnesses:
/// - preimage: `block_count` field elements
#[derive(Clone, Debug)]
pub struct HashPreimageCircuit<F: PrimeField> {
    pub shape: PreimageShape,

    /// Private: The preimage blocks
    pub preimage: Option<Vec<F>>,

    /// Public: The expected hash
    pub hash: Option<F>,

    pub params: Arc<FieldParameters<F>>,
}

impl<F: PrimeField> HashPreimageCircuit<F> {
    /// Create a new circuit instance for proving.
    pub fn new(
        preimage: Vec<F>,
        hash: F,
        params: Arc<FieldParameters<F>>,
    ) -> Result<Self, ShapeError> {
        let shape = PreimageShape::new(preimage.len())?;
        Ok(Self {
            shape,
            preimage: Some(preimage),
            hash: Some(hash),
            params,
        })
    }

    /// Create an empty circuit for setup (constraint generation only).
    pub fn empty(shape: PreimageShape, params: Arc<FieldParameters<F>>) -> Self {
        Self {
            shape,
            preimage: None,
            hash: None,
            params,
        }
    }
}

impl<F: PrimeField> ConstraintSynthesizer<F> for HashPreimageCircuit<F> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        // 1. Allocate private witnesses
        let preimage = self.preimage.as_deref();
        let preimage_vars = (0..self.shape.block_count)
            .map(|i| {
                FpVar::new_witness(cs.clone(), || {
                    preimage
                        .and_then(|blocks| blocks.get(i).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // 2. Allocate public inputs
        let hash_var =
            FpVar::new_input(cs.clone(), || self.hash.ok_or(SynthesisError::AssignmentMissing))?;

        // 3. The hash is computed over the private preimage, never over the
        // public input itself
        let computed = hash_chain_var(self.params.mimc(), &preimage_vars)?;
        computed.enforce_equal(&hash_var)?;

        Ok(())
    }
}

impl<F: PrimeField> Circuit<F> for HashPreimageCircuit<F> {
    type Shape = PreimageShape;

    fn blank(shape: PreimageShape, params: Arc<FieldParameters<F>>) -> Result<Self, WitnessError> {
        let shape = PreimageShape::new(shape.block_count)?;
        Ok(Self::empty(shape, params))
    }

    fn shape(&self) -> &PreimageShape {
        &self.shape
    }

    fn params(&self) -> &Arc<FieldParameters<F>> {
        &self.params
    }

    fn to_blank(&self) -> Self {
        Self::empty(self.shape, self.params.clone())
    }

    fn descriptor(&self) -> CircuitDescriptor {
        CircuitDescriptor::new("hash-preimage")
            .private("preimage", self.shape.block_count)
            .public("hash", 1)
    }

    fn check_assignment(&self) -> Result<(), WitnessError> {
        let preimage = self
            .preimage
            .as_ref()
            .ok_or(AssignmentError::MissingSignal("preimage"))?;
        if preimage.len() != self.shape.block_count {
            return Err(AssignmentError::BlockCountMismatch {
                expected: self.shape.block_count,
                actual: preimage.len(),
            }
            .into());
        }
        self.hash.ok_or(AssignmentError::MissingSignal("hash"))?;
        Ok(())
    }

    fn public_inputs(&self) -> Result<PublicInputs<F>, AssignmentError> {
        let hash = self.hash.ok_or(AssignmentError::MissingSignal("hash"))?;
        Ok(PublicInputs::new(vec![hash]))
    }
}
