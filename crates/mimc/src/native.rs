//! Off-circuit MiMC evaluation.

use ark_ff::PrimeField;

use crate::params::MimcParameters;

#[inline]
fn pow5<F: PrimeField>(x: F) -> F {
    let x2 = x.square();
    x2.square() * x
}

/// MiMC block cipher: encrypt `message` under `key`.
///
/// Each round computes `x = (x + key + c_i)^5`; the key is added once more
/// after the last round.
pub fn encrypt<F: PrimeField>(params: &MimcParameters<F>, key: F, message: F) -> F {
    let mut x = message;
    for c in params.round_constants() {
        x = pow5(x + key + c);
    }
    x + key
}

/// Miyaguchi-Preneel compression: `E_state(input) + state + input`.
pub fn compress<F: PrimeField>(params: &MimcParameters<F>, state: F, input: F) -> F {
    encrypt(params, state, input) + state + input
}

/// Left fold of [`compress`] over `blocks`, starting from a zero state.
pub fn hash_chain<F: PrimeField>(params: &MimcParameters<F>, blocks: &[F]) -> F {
    let mut hasher = MimcHasher::new(params);
    hasher.absorb_all(blocks);
    hasher.finalize()
}

/// Two-to-one hash used for Merkle nodes.
pub fn hash_two<F: PrimeField>(params: &MimcParameters<F>, left: F, right: F) -> F {
    hash_chain(params, &[left, right])
}

/// Incremental sponge-style hasher.
///
/// Absorbing blocks one at a time yields the same digest as [`hash_chain`]
/// over the concatenated blocks.
#[derive(Clone, Debug)]
pub struct MimcHasher<'a, F: PrimeField> {
    params: &'a MimcParameters<F>,
    state: F,
    absorbed: usize,
}

impl<'a, F: PrimeField> MimcHasher<'a, F> {
    pub fn new(params: &'a MimcParameters<F>) -> Self {
        Self {
            params,
            state: F::zero(),
            absorbed: 0,
        }
    }

    pub fn absorb(&mut self, block: F) {
        self.state = compress(self.params, self.state, block);
        self.absorbed += 1;
    }

    pub fn absorb_all(&mut self, blocks: &[F]) {
        for block in blocks {
            self.absorb(*block);
        }
    }

    /// Number of blocks absorbed so far.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }

    pub fn finalize(self) -> F {
        self.state
    }
}
