//! In-circuit MiMC evaluation.
//!
//! Every round costs three constraints (square, square, multiply), so one
//! compression costs `3 * rounds` constraints; key and feed-forward
//! additions are linear and free.

use ark_ff::PrimeField;
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::SynthesisError;

use crate::params::MimcParameters;

/// MiMC block cipher in-circuit. Mirrors [`crate::native::encrypt`].
pub fn encrypt_var<F: PrimeField>(
    params: &MimcParameters<F>,
    key: &FpVar<F>,
    message: &FpVar<F>,
) -> Result<FpVar<F>, SynthesisError> {
    let mut x = message.clone();
    for c in params.round_constants() {
        let t = &x + key + *c;
        let t2 = t.square()?;
        let t4 = t2.square()?;
        x = t4 * &t;
    }
    Ok(x + key)
}

/// Miyaguchi-Preneel compression in-circuit.
pub fn compress_var<F: PrimeField>(
    params: &MimcParameters<F>,
    state: &FpVar<F>,
    input: &FpVar<F>,
) -> Result<FpVar<F>, SynthesisError> {
    let encrypted = encrypt_var(params, state, input)?;
    Ok(encrypted + state + input)
}

/// Left fold of [`compress_var`] over `blocks`, starting from a zero state.
pub fn hash_chain_var<F: PrimeField>(
    params: &MimcParameters<F>,
    blocks: &[FpVar<F>],
) -> Result<FpVar<F>, SynthesisError> {
    let mut state = FpVar::zero();
    for block in blocks {
        state = compress_var(params, &state, block)?;
    }
    Ok(state)
}

/// Two-to-one hash in-circuit.
pub fn hash_two_var<F: PrimeField>(
    params: &MimcParameters<F>,
    left: &FpVar<F>,
    right: &FpVar<F>,
) -> Result<FpVar<F>, SynthesisError> {
    hash_chain_var(params, &[left.clone(), right.clone()])
}
