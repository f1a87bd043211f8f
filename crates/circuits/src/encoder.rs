//! Field encoder: raw bytes to field elements and back.
//!
//! `encode` uses the RFC 9380 hash-to-field map (`expand_message_xmd` over
//! SHA-256) with the caller's domain tag. `decode` packs elements into their
//! canonical big-endian encoding, which is exactly what
//! [`encoded_bytes_var`] reconstructs from the same elements in-circuit.

use ark_ff::{
    field_hashers::{DefaultFieldHasher, HashToField},
    BigInteger, PrimeField,
};
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::SynthesisError;
use sha2::Sha256;

use crate::error::EncodingError;

/// Security parameter of the hash-to-field map, in bits.
const SECURITY_BITS: usize = 128;
/// `expand_message_xmd` emits at most 255 digests.
const MAX_EXPANDER_BLOCKS: usize = 255;
const SHA256_OUTPUT_BYTES: usize = 32;

/// Width in bytes of one encoded field element (32 for BN254).
pub fn element_byte_width<F: PrimeField>() -> usize {
    <F::BigInt as BigInteger>::NUM_LIMBS * 8
}

/// Largest block count a single `encode` call can produce for `F`.
pub fn max_block_count<F: PrimeField>() -> usize {
    let bytes_per_element = (F::MODULUS_BIT_SIZE as usize + SECURITY_BITS + 7) / 8;
    MAX_EXPANDER_BLOCKS * SHA256_OUTPUT_BYTES / bytes_per_element
}

/// Block count covering a message of `len` bytes: one block per element
/// width, and at least one.
pub fn block_count_for<F: PrimeField>(len: usize) -> usize {
    let width = element_byte_width::<F>();
    ((len + width - 1) / width).max(1)
}

/// Map `message` into exactly `block_count` field elements.
pub fn encode<F: PrimeField>(
    message: &[u8],
    domain_tag: &[u8],
    block_count: usize,
) -> Result<Vec<F>, EncodingError> {
    if block_count == 0 {
        return Err(EncodingError::ZeroBlockCount);
    }
    let max = max_block_count::<F>();
    if block_count > max {
        return Err(EncodingError::TooManyBlocks {
            requested: block_count,
            max,
        });
    }

    let hasher = <DefaultFieldHasher<Sha256> as HashToField<F>>::new(domain_tag);
    Ok(<DefaultFieldHasher<Sha256> as HashToField<F>>::hash_to_field(
        &hasher,
        message,
        block_count,
    ))
}

/// Concatenate the canonical big-endian bytes of each element.
pub fn decode<F: PrimeField>(elements: &[F]) -> Vec<u8> {
    let mut out = Vec::with_capacity(elements.len() * element_byte_width::<F>());
    for element in elements {
        out.extend(element.into_bigint().to_bytes_be());
    }
    out
}

/// Strict inverse of [`decode`].
///
/// Rejects buffers that are not a whole number of elements and chunks that
/// encode a value `>= p`.
pub fn from_bytes<F: PrimeField>(buffer: &[u8]) -> Result<Vec<F>, EncodingError> {
    let width = element_byte_width::<F>();
    if buffer.len() % width != 0 {
        return Err(EncodingError::UnalignedBuffer {
            len: buffer.len(),
            width,
        });
    }

    buffer
        .chunks(width)
        .enumerate()
        .map(|(index, chunk)| {
            let element = F::from_be_bytes_mod_order(chunk);
            if element.into_bigint().to_bytes_be() != chunk {
                return Err(EncodingError::NonCanonicalElement { index });
            }
            Ok(element)
        })
        .collect()
}

/// Rebuild the [`decode`] byte layout from allocated elements.
///
/// Uses the canonical bit decomposition, so a non-reduced witness cannot
/// produce an alternative byte string.
pub fn encoded_bytes_var<F: PrimeField>(
    elements: &[FpVar<F>],
) -> Result<Vec<UInt8<F>>, SynthesisError> {
    let width = element_byte_width::<F>();
    let mut out = Vec::with_capacity(elements.len() * width);

    for element in elements {
        let mut bits = element.to_bits_le()?;
        bits.resize(width * 8, Boolean::FALSE);

        let mut bytes: Vec<UInt8<F>> = bits.chunks(8).map(UInt8::from_bits_le).collect();
        bytes.reverse();
        out.extend(bytes);
    }

    Ok(out)
}
