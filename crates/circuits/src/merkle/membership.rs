//! MerkleMembershipCircuit: Proves a leaf belongs to a tree with a public root.

use std::sync::Arc;

use ark_ff::PrimeField;
use ark_r1cs_std::{alloc::AllocVar, fields::fp::FpVar};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use super::gadgets::{verify_membership, MerkleProofVar};
use super::tree::MAX_DEPTH;
use crate::circuit::{Circuit, CircuitDescriptor, PublicInputs};
use crate::error::{AssignmentError, ShapeError, WitnessError};
use crate::params::FieldParameters;
use crate::range_check::{enforce_bit_length, fits_in_bits};

/// Whether the leaf is revealed to the verifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LeafVisibility {
    /// Only the root is public; the proof shows some hidden leaf is in the tree.
    #[default]
    Private,
    /// The leaf is a public input ahead of the root.
    Public,
}

/// Compile-time shape of a membership circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MembershipShape {
    pub depth: usize,
    pub leaf_visibility: LeafVisibility,
}

impl MembershipShape {
    pub fn new(depth: usize, leaf_visibility: LeafVisibility) -> Result<Self, ShapeError> {
        if depth > MAX_DEPTH {
            return Err(ShapeError::DepthTooLarge {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(Self {
            depth,
            leaf_visibility,
        })
    }

    /// Private-leaf shape of the given depth.
    pub fn private(depth: usize) -> Result<Self, ShapeError> {
        Self::new(depth, LeafVisibility::Private)
    }
}

/// Circuit that proves: "leaf sits at leaf_index in the tree with this root"
///
/// Public inputs:
/// - leaf: Only when the shape's visibility is `Public`
/// - root: The tree root
///
/// Private witnesses:
/// - leaf: When the shape's visibility is `Private`
/// - path: `depth` sibling hashes, leaf level first
/// - leaf_index: Position of the leaf, range checked to `depth` bits
#[derive(Clone, Debug)]
pub struct MerkleMembershipCircuit<F: PrimeField> {
    pub shape: MembershipShape,

    pub leaf: Option<F>,

    /// Private: Sibling hashes
    pub path: Option<Vec<F>>,

    /// Private: Leaf position, its bits select left/right at each level
    pub leaf_index: Option<u64>,

    /// Public: The tree root
    pub root: Option<F>,

    pub params: Arc<FieldParameters<F>>,
}

impl<F: PrimeField> MerkleMembershipCircuit<F> {
    /// Create a new circuit instance for proving.
    pub fn new(
        shape: MembershipShape,
        leaf: F,
        path: Vec<F>,
        leaf_index: u64,
        root: F,
        params: Arc<FieldParameters<F>>,
    ) -> Self {
        Self {
            shape,
            leaf: Some(leaf),
            path: Some(path),
            leaf_index: Some(leaf_index),
            root: Some(root),
            params,
        }
    }

    /// Create an empty circuit for setup (constraint generation only).
    pub fn empty(shape: MembershipShape, params: Arc<FieldParameters<F>>) -> Self {
        Self {
            shape,
            leaf: None,
            path: None,
            leaf_index: None,
            root: None,
            params,
        }
    }
}

impl<F: PrimeField> ConstraintSynthesizer<F> for MerkleMembershipCircuit<F> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        let depth = self.shape.depth;

        // 1. Leaf, public or private depending on the shape
        let leaf_value = || self.leaf.ok_or(SynthesisError::AssignmentMissing);
        let leaf_var = match self.shape.leaf_visibility {
            LeafVisibility::Public => FpVar::new_input(cs.clone(), leaf_value)?,
            LeafVisibility::Private => FpVar::new_witness(cs.clone(), leaf_value)?,
        };

        // 2. Private path and index
        let path = self.path.as_deref();
        let path_vars = (0..depth)
            .map(|i| {
                FpVar::new_witness(cs.clone(), || {
                    path.and_then(|siblings| siblings.get(i).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let index_var = FpVar::new_witness(cs.clone(), || {
            self.leaf_index
                .map(F::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        // 3. Public root
        let root_var =
            FpVar::new_input(cs.clone(), || self.root.ok_or(SynthesisError::AssignmentMissing))?;

        // 4. Index bits pick the hashing order; higher bits must be zero
        let index_bits = enforce_bit_length(&index_var, depth)?;
        let proof_var = MerkleProofVar::new(path_vars, index_bits)?;

        verify_membership(self.params.mimc(), &root_var, &leaf_var, &proof_var)?;

        Ok(())
    }
}

impl<F: PrimeField> Circuit<F> for MerkleMembershipCircuit<F> {
    type Shape = MembershipShape;

    fn blank(shape: MembershipShape, params: Arc<FieldParameters<F>>) -> Result<Self, WitnessError> {
        let shape = MembershipShape::new(shape.depth, shape.leaf_visibility)?;
        Ok(Self::empty(shape, params))
    }

    fn shape(&self) -> &MembershipShape {
        &self.shape
    }

    fn params(&self) -> &Arc<FieldParameters<F>> {
        &self.params
    }

    fn to_blank(&self) -> Self {
        Self::empty(self.shape, self.params.clone())
    }

    fn descriptor(&self) -> CircuitDescriptor {
        let descriptor = CircuitDescriptor::new("merkle-membership");
        let descriptor = match self.shape.leaf_visibility {
            LeafVisibility::Public => descriptor.public("leaf", 1),
            LeafVisibility::Private => descriptor.private("leaf", 1),
        };
        descriptor
            .private("path", self.shape.depth)
            .private("leaf_index", 1)
            .public("root", 1)
    }

    fn check_assignment(&self) -> Result<(), WitnessError> {
        self.leaf.ok_or(AssignmentError::MissingSignal("leaf"))?;
        let path = self
            .path
            .as_ref()
            .ok_or(AssignmentError::MissingSignal("path"))?;
        if path.len() != self.shape.depth {
            return Err(AssignmentError::PathLengthMismatch {
                expected: self.shape.depth,
                actual: path.len(),
            }
            .into());
        }
        let index = self
            .leaf_index
            .ok_or(AssignmentError::MissingSignal("leaf_index"))?;
        if !fits_in_bits(index, self.shape.depth) {
            return Err(ShapeError::LeafIndexOutOfRange {
                index,
                depth: self.shape.depth,
            }
            .into());
        }
        self.root.ok_or(AssignmentError::MissingSignal("root"))?;
        Ok(())
    }

    fn public_inputs(&self) -> Result<PublicInputs<F>, AssignmentError> {
        let root = self.root.ok_or(AssignmentError::MissingSignal("root"))?;
        let inputs = match self.shape.leaf_visibility {
            LeafVisibility::Public => {
                let leaf = self.leaf.ok_or(AssignmentError::MissingSignal("leaf"))?;
                vec![leaf, root]
            }
            LeafVisibility::Private => vec![root],
        };
        Ok(PublicInputs::new(inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::{MerkleProof, MerkleTree};
    use ark_bn254::Fr;
    use ark_relations::r1cs::{ConstraintSystem, SynthesisMode};

    fn params() -> Arc<FieldParameters<Fr>> {
        Arc::new(FieldParameters::standard().unwrap())
    }

    fn six_leaf_tree(params: &FieldParameters<Fr>) -> MerkleTree<Fr> {
        let leaves: Vec<Fr> = (1..=6u64).map(Fr::from).collect();
        MerkleTree::from_leaves(params.mimc(), &leaves).unwrap()
    }

    fn circuit_for(
        proof: &MerkleProof<Fr>,
        visibility: LeafVisibility,
        params: Arc<FieldParameters<Fr>>,
    ) -> MerkleMembershipCircuit<Fr> {
        let shape = MembershipShape::new(proof.depth(), visibility).unwrap();
        MerkleMembershipCircuit::new(
            shape,
            proof.leaf,
            proof.siblings.clone(),
            proof.leaf_index,
            proof.root,
            params,
        )
    }

    fn is_satisfied(circuit: MerkleMembershipCircuit<Fr>) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_membership_valid() {
        let params = params();
        let tree = six_leaf_tree(&params);

        for index in 0..6 {
            let proof = tree.prove(index).unwrap();
            let circuit = circuit_for(&proof, LeafVisibility::Private, params.clone());
            assert!(is_satisfied(circuit), "index {} unsatisfied", index);
        }
    }

    #[test]
    fn test_membership_wrong_index() {
        let params = params();
        let tree = six_leaf_tree(&params);
        let proof = tree.prove(0).unwrap();

        let mut circuit = circuit_for(&proof, LeafVisibility::Private, params);
        circuit.leaf_index = Some(3);

        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn test_membership_index_out_of_range() {
        let params = params();
        let tree = six_leaf_tree(&params);
        let proof = tree.prove(1).unwrap();

        // 1 + 8 has the same low three bits as 1
        let mut circuit = circuit_for(&proof, LeafVisibility::Private, params);
        circuit.leaf_index = Some(9);

        assert!(matches!(
            circuit.check_assignment(),
            Err(WitnessError::Shape(ShapeError::LeafIndexOutOfRange { index: 9, depth: 3 }))
        ));
        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn test_membership_wrong_root() {
        let params = params();
        let tree = six_leaf_tree(&params);
        let proof = tree.prove(4).unwrap();

        let mut circuit = circuit_for(&proof, LeafVisibility::Public, params);
        circuit.root = Some(proof.root + Fr::from(1u64));

        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn test_depth_zero() {
        let params = params();
        let leaf = Fr::from(77u64);
        let shape = MembershipShape::private(0).unwrap();

        let circuit =
            MerkleMembershipCircuit::new(shape, leaf, Vec::new(), 0, leaf, params.clone());
        assert!(circuit.check_assignment().is_ok());
        assert!(is_satisfied(circuit));

        let circuit = MerkleMembershipCircuit::new(
            shape,
            leaf,
            Vec::new(),
            0,
            leaf + Fr::from(1u64),
            params.clone(),
        );
        assert!(!is_satisfied(circuit));

        let circuit = MerkleMembershipCircuit::new(shape, leaf, Vec::new(), 1, leaf, params);
        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn test_depth_too_large() {
        assert_eq!(
            MembershipShape::private(65),
            Err(ShapeError::DepthTooLarge { depth: 65, max: 64 })
        );
        assert!(MembershipShape::private(64).is_ok());
    }

    #[test]
    fn test_public_inputs_follow_visibility() {
        let params = params();
        let tree = six_leaf_tree(&params);
        let proof = tree.prove(2).unwrap();

        let private = circuit_for(&proof, LeafVisibility::Private, params.clone());
        assert_eq!(private.public_inputs().unwrap().into_inner(), vec![proof.root]);

        let public = circuit_for(&proof, LeafVisibility::Public, params);
        assert_eq!(
            public.public_inputs().unwrap().into_inner(),
            vec![proof.leaf, proof.root]
        );
    }

    #[test]
    fn test_check_assignment_path_length() {
        let params = params();
        let shape = MembershipShape::private(3).unwrap();
        let circuit = MerkleMembershipCircuit::new(
            shape,
            Fr::from(1u64),
            vec![Fr::from(2u64)],
            0,
            Fr::from(3u64),
            params.clone(),
        );

        assert_eq!(
            circuit.check_assignment(),
            Err(WitnessError::from(AssignmentError::PathLengthMismatch {
                expected: 3,
                actual: 1
            }))
        );

        let blank = MerkleMembershipCircuit::<Fr>::empty(shape, params);
        assert_eq!(
            blank.check_assignment(),
            Err(WitnessError::from(AssignmentError::MissingSignal("leaf")))
        );
    }

    #[test]
    fn test_descriptor_matches_allocation() {
        let params = params();
        for visibility in [LeafVisibility::Private, LeafVisibility::Public] {
            let shape = MembershipShape::new(4, visibility).unwrap();
            let circuit = MerkleMembershipCircuit::<Fr>::empty(shape, params.clone());
            let descriptor = circuit.descriptor();

            let cs = ConstraintSystem::<Fr>::new_ref();
            cs.set_mode(SynthesisMode::Setup);
            circuit.generate_constraints(cs.clone()).unwrap();

            assert_eq!(cs.num_instance_variables() - 1, descriptor.num_public_inputs());
            assert_eq!(descriptor.find("path").map(|s| s.arity), Some(4));
        }
    }
}
