//! Merkle proof structure.

use ark_ff::PrimeField;
use mimc::{hash_two, MimcParameters};

/// Inclusion proof for one leaf, as produced by [`super::MerkleTree::prove`].
///
/// `siblings[i]` is the sibling at level `i` (leaf level first). Bit `i` of
/// `leaf_index` tells whether the running node is the left (0) or right (1)
/// input at that level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof<F: PrimeField> {
    pub leaf: F,
    pub siblings: Vec<F>,
    pub leaf_index: u64,
    pub root: F,
    pub leaf_count: u64,
}

impl<F: PrimeField> MerkleProof<F> {
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Direction flags, `true` where the running node is the right child.
    pub fn indices(&self) -> Vec<bool> {
        (0..self.depth())
            .map(|level| level < 64 && (self.leaf_index >> level) & 1 == 1)
            .collect()
    }

    /// Root obtained by hashing the leaf up the path.
    pub fn compute_root(&self, params: &MimcParameters<F>) -> F {
        self.siblings
            .iter()
            .zip(self.indices())
            .fold(self.leaf, |current, (sibling, is_right)| {
                if is_right {
                    hash_two(params, *sibling, current)
                } else {
                    hash_two(params, current, *sibling)
                }
            })
    }

    /// Check the proof off-circuit.
    pub fn verify(&self, params: &MimcParameters<F>) -> bool {
        self.compute_root(params) == self.root
    }
}
