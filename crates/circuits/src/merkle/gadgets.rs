//! In-circuit Merkle path verification.

use ark_ff::PrimeField;
use ark_r1cs_std::{boolean::Boolean, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use mimc::{hash_two_var, MimcParameters};

use super::proof::MerkleProof;

/// Circuit variable representation of a Merkle path.
#[derive(Clone)]
pub struct MerkleProofVar<F: PrimeField> {
    /// Sibling hashes, leaf level first
    path: Vec<FpVar<F>>,
    /// Direction flags, `true` where the running node is the right child
    indices: Vec<Boolean<F>>,
}

impl<F: PrimeField> MerkleProofVar<F> {
    /// Pair already-allocated siblings with direction bits.
    ///
    /// Both slices must have the same length.
    pub fn new(path: Vec<FpVar<F>>, indices: Vec<Boolean<F>>) -> Result<Self, SynthesisError> {
        if path.len() != indices.len() {
            return Err(SynthesisError::Unsatisfiable);
        }
        Ok(Self { path, indices })
    }

    /// Allocate a native proof's siblings and direction bits as witnesses.
    pub fn new_witness(
        cs: ConstraintSystemRef<F>,
        proof: &MerkleProof<F>,
    ) -> Result<Self, SynthesisError> {
        let path = proof
            .siblings
            .iter()
            .map(|h| FpVar::new_witness(cs.clone(), || Ok(*h)))
            .collect::<Result<Vec<_>, _>>()?;

        let indices = proof
            .indices()
            .iter()
            .map(|&b| Boolean::new_witness(cs.clone(), || Ok(b)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { path, indices })
    }

    pub fn path(&self) -> &[FpVar<F>] {
        &self.path
    }

    pub fn indices(&self) -> &[Boolean<F>] {
        &self.indices
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Compute the root hash from a leaf and Merkle path in-circuit.
pub fn compute_root_from_path<F: PrimeField>(
    params: &MimcParameters<F>,
    leaf: &FpVar<F>,
    proof: &MerkleProofVar<F>,
) -> Result<FpVar<F>, SynthesisError> {
    let mut current = leaf.clone();

    for (sibling, is_right) in proof.path.iter().zip(proof.indices.iter()) {
        // If is_right: H(sibling, current), else H(current, sibling)
        let left = is_right.select(sibling, &current)?;
        let right = is_right.select(&current, sibling)?;

        current = hash_two_var(params, &left, &right)?;
    }

    Ok(current)
}

/// Enforce that `leaf` hashes up `proof` to `expected_root`.
pub fn verify_membership<F: PrimeField>(
    params: &MimcParameters<F>,
    expected_root: &FpVar<F>,
    leaf: &FpVar<F>,
    proof: &MerkleProofVar<F>,
) -> Result<(), SynthesisError> {
    let computed_root = compute_root_from_path(params, leaf, proof)?;
    computed_root.enforce_equal(expected_root)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::MerkleTree;
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem;

    fn params() -> MimcParameters<Fr> {
        MimcParameters::standard().unwrap()
    }

    fn tree(params: &MimcParameters<Fr>) -> MerkleTree<Fr> {
        let leaves: Vec<Fr> = (0..6u64).map(|i| Fr::from(1000 + i)).collect();
        MerkleTree::from_leaves(params, &leaves).unwrap()
    }

    #[test]
    fn test_verify_membership() {
        let params = params();
        let tree = tree(&params);
        let proof = tree.prove(5).unwrap();

        let cs = ConstraintSystem::<Fr>::new_ref();

        let root_var = FpVar::new_input(cs.clone(), || Ok(tree.root())).unwrap();
        let leaf_var = FpVar::new_witness(cs.clone(), || Ok(proof.leaf)).unwrap();
        let proof_var = MerkleProofVar::new_witness(cs.clone(), &proof).unwrap();

        verify_membership(&params, &root_var, &leaf_var, &proof_var).unwrap();

        assert!(cs.is_satisfied().unwrap());
        println!(
            "Merkle membership constraints (depth {}): {}",
            proof_var.depth(),
            cs.num_constraints()
        );
    }

    #[test]
    fn test_computed_root_matches_native() {
        let params = params();
        let tree = tree(&params);

        for index in 0..6 {
            let proof = tree.prove(index).unwrap();
            let cs = ConstraintSystem::<Fr>::new_ref();
            let leaf_var = FpVar::new_witness(cs.clone(), || Ok(proof.leaf)).unwrap();
            let proof_var = MerkleProofVar::new_witness(cs.clone(), &proof).unwrap();

            let root = compute_root_from_path(&params, &leaf_var, &proof_var).unwrap();

            assert_eq!(root.value().unwrap(), tree.root());
        }
    }

    #[test]
    fn test_verify_membership_wrong_leaf() {
        let params = params();
        let tree = tree(&params);
        let proof = tree.prove(2).unwrap();

        let cs = ConstraintSystem::<Fr>::new_ref();

        let root_var = FpVar::new_input(cs.clone(), || Ok(tree.root())).unwrap();
        // Wrong leaf!
        let leaf_var = FpVar::new_witness(cs.clone(), || Ok(Fr::from(7u64))).unwrap();
        let proof_var = MerkleProofVar::new_witness(cs.clone(), &proof).unwrap();

        verify_membership(&params, &root_var, &leaf_var, &proof_var).unwrap();

        // Should NOT be satisfied - wrong leaf
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_empty_path_is_identity() {
        let params = params();
        let cs = ConstraintSystem::<Fr>::new_ref();

        let leaf_var = FpVar::new_witness(cs.clone(), || Ok(Fr::from(9u64))).unwrap();
        let proof_var = MerkleProofVar::new(Vec::new(), Vec::new()).unwrap();

        let root = compute_root_from_path(&params, &leaf_var, &proof_var).unwrap();

        assert_eq!(root.value().unwrap(), Fr::from(9u64));
        assert_eq!(cs.num_constraints(), 0);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let sibling = FpVar::new_witness(cs, || Ok(Fr::from(1u64))).unwrap();

        assert!(MerkleProofVar::new(vec![sibling], Vec::new()).is_err());
    }
}
