//! Native binary Merkle tree.

use ark_ff::PrimeField;
use mimc::{hash_chain, hash_two, MimcParameters};
use rayon::prelude::*;

use super::proof::MerkleProof;
use crate::encoder::block_count_for;
use crate::error::{EncodingError, ShapeError, WitnessError};
use crate::params::FieldParameters;

/// Deepest tree a leaf index (`u64`) can address.
pub const MAX_DEPTH: usize = 64;

/// Fixed-depth binary Merkle tree.
///
/// Leaves fill the bottom level left to right; the level is padded with
/// zero elements up to the next power of two. A single leaf gives a depth-0
/// tree whose root is the leaf itself.
#[derive(Clone, Debug)]
pub struct MerkleTree<F: PrimeField> {
    /// `levels[0]` holds the padded leaves, the last level holds the root.
    levels: Vec<Vec<F>>,
    leaf_count: usize,
}

impl<F: PrimeField> MerkleTree<F> {
    pub fn from_leaves(params: &MimcParameters<F>, leaves: &[F]) -> Result<Self, ShapeError> {
        if leaves.is_empty() {
            return Err(ShapeError::EmptyTree);
        }

        let width = leaves.len().next_power_of_two();
        let depth = width.trailing_zeros() as usize;

        let mut bottom = leaves.to_vec();
        bottom.resize(width, F::zero());

        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(bottom);
        for _ in 0..depth {
            let next: Vec<F> = levels[levels.len() - 1]
                .par_chunks(2)
                .map(|pair| hash_two(params, pair[0], pair[1]))
                .collect();
            levels.push(next);
        }

        Ok(Self {
            levels,
            leaf_count: leaves.len(),
        })
    }

    /// Build a tree whose leaves are the hashes of `messages`.
    pub fn from_messages<M: AsRef<[u8]>>(
        params: &FieldParameters<F>,
        messages: &[M],
    ) -> Result<Self, WitnessError> {
        let leaves = messages
            .iter()
            .map(|m| leaf_from_message(params, m.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_leaves(params.mimc(), &leaves)?)
    }

    pub fn root(&self) -> F {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Number of leaves supplied, excluding padding.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn leaf(&self, index: usize) -> Option<F> {
        if index < self.leaf_count {
            Some(self.levels[0][index])
        } else {
            None
        }
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn prove(&self, index: u64) -> Result<MerkleProof<F>, ShapeError> {
        let leaf_count = self.leaf_count as u64;
        if index >= leaf_count {
            return Err(ShapeError::LeafNotInTree { index, leaf_count });
        }

        let mut position = index as usize;
        let mut siblings = Vec::with_capacity(self.depth());
        for level in &self.levels[..self.depth()] {
            siblings.push(level[position ^ 1]);
            position >>= 1;
        }

        Ok(MerkleProof {
            leaf: self.levels[0][index as usize],
            siblings,
            leaf_index: index,
            root: self.root(),
            leaf_count,
        })
    }
}

/// Hash an arbitrary message to a leaf: encode it under the configured
/// domain tag, then chain-hash the blocks.
pub fn leaf_from_message<F: PrimeField>(
    params: &FieldParameters<F>,
    message: &[u8],
) -> Result<F, EncodingError> {
    let blocks = params.encode_message(message, block_count_for::<F>(message.len()))?;
    Ok(hash_chain(params.mimc(), &blocks))
}
