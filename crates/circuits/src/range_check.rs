//! Bit-length checks for signals read as unsigned integers.
//!
//! A leaf index is a field element, but the membership circuit consumes only
//! its low `depth` bits. Without a range check, an index with higher bits set
//! would be silently truncated; these gadgets make such an index unsatisfiable.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::SynthesisError;

/// Decompose `value` into its low `num_bits` little-endian bits and enforce
/// that every higher bit is zero.
///
/// The decomposition is canonical, so a value `>= 2^num_bits` (including a
/// wrapped "negative" value) cannot satisfy the constraints.
pub fn enforce_bit_length<F: PrimeField>(
    value: &FpVar<F>,
    num_bits: usize,
) -> Result<Vec<Boolean<F>>, SynthesisError> {
    let mut bits = value.to_bits_le()?;

    for bit in bits.iter().skip(num_bits) {
        bit.enforce_equal(&Boolean::FALSE)?;
    }

    bits.truncate(num_bits);
    Ok(bits)
}

/// Whether `index` fits in `num_bits` bits.
pub fn fits_in_bits(index: u64, num_bits: usize) -> bool {
    num_bits >= 64 || index >> num_bits == 0
}
