//! Round constants and parameter validation.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Exponent of the S-box `x -> x^5`.
pub const SBOX_EXPONENT: u64 = 5;

/// Seed the standard round constants are derived from.
pub const DEFAULT_SEED: &[u8] = b"seed";

/// Errors raised while building hash parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("x^{exponent} is not a permutation of the field (exponent divides p - 1)")]
    NonPermutingSbox { exponent: u64 },
    #[error("round count must be non-zero")]
    ZeroRounds,
}

/// Fixed protocol parameters of the MiMC permutation.
///
/// Values are never tuned per call: circuits and witness builders hold one
/// instance (usually behind an `Arc`) and pass it to every evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MimcParameters<F: PrimeField> {
    seed: Vec<u8>,
    round_constants: Vec<F>,
}

impl<F: PrimeField> MimcParameters<F> {
    /// Parameters with the default round count for `F`.
    pub fn new(seed: &[u8]) -> Result<Self, ParameterError> {
        Self::with_rounds(seed, default_rounds::<F>())
    }

    /// Parameters derived from [`DEFAULT_SEED`].
    pub fn standard() -> Result<Self, ParameterError> {
        Self::new(DEFAULT_SEED)
    }

    /// Parameters with an explicit round count.
    pub fn with_rounds(seed: &[u8], rounds: usize) -> Result<Self, ParameterError> {
        if rounds == 0 {
            return Err(ParameterError::ZeroRounds);
        }
        if !sbox_is_permutation::<F>() {
            return Err(ParameterError::NonPermutingSbox {
                exponent: SBOX_EXPONENT,
            });
        }

        Ok(Self {
            seed: seed.to_vec(),
            round_constants: derive_round_constants(seed, rounds),
        })
    }

    pub fn rounds(&self) -> usize {
        self.round_constants.len()
    }

    pub fn round_constants(&self) -> &[F] {
        &self.round_constants
    }

    pub fn seed(&self) -> &[u8] {
        &self.seed
    }
}

/// Number of rounds giving full degree growth: `ceil(log_5(p))`.
///
/// 110 for the BN254 scalar field.
pub fn default_rounds<F: PrimeField>() -> usize {
    let bits = F::MODULUS_BIT_SIZE as f64;
    (bits / (SBOX_EXPONENT as f64).log2()).ceil() as usize
}

/// `x^e` permutes the field iff `gcd(e, p - 1) = 1`; the exponent is prime,
/// so this reduces to `e` not dividing `p - 1`.
fn sbox_is_permutation<F: PrimeField>() -> bool {
    let modulus = BigUint::from_bytes_le(&F::MODULUS.to_bytes_le());
    let p_minus_one = modulus - 1u32;
    !(p_minus_one % SBOX_EXPONENT).is_zero()
}

/// Constant `i` is `SHA256^(i + 2)(seed)` read big-endian and reduced mod p.
fn derive_round_constants<F: PrimeField>(seed: &[u8], rounds: usize) -> Vec<F> {
    let mut digest: [u8; 32] = Sha256::digest(seed).into();
    (0..rounds)
        .map(|_| {
            digest = Sha256::digest(digest).into();
            F::from_be_bytes_mod_order(&digest)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    #[test]
    fn test_bn254_round_count() {
        assert_eq!(default_rounds::<Fr>(), 110);
        let params = MimcParameters::<Fr>::standard().unwrap();
        assert_eq!(params.rounds(), 110);
        assert_eq!(params.seed(), DEFAULT_SEED);
    }

    #[test]
    fn test_constants_deterministic() {
        let a = MimcParameters::<Fr>::new(b"alpha").unwrap();
        let b = MimcParameters::<Fr>::new(b"alpha").unwrap();
        let c = MimcParameters::<Fr>::new(b"beta").unwrap();

        assert_eq!(a, b);
        assert_ne!(a.round_constants(), c.round_constants());
    }

    #[test]
    fn test_constants_distinct_per_round() {
        let params = MimcParameters::<Fr>::standard().unwrap();
        let constants = params.round_constants();
        for (i, c) in constants.iter().enumerate() {
            assert!(!constants[i + 1..].contains(c), "constant {} repeats", i);
        }
    }

    #[test]
    fn test_zero_rounds_rejected() {
        assert_eq!(
            MimcParameters::<Fr>::with_rounds(DEFAULT_SEED, 0),
            Err(ParameterError::ZeroRounds)
        );
    }

    #[test]
    fn test_bls12_381_parameters() {
        use ark_bls12_381::Fr as BlsFr;

        let params = MimcParameters::<BlsFr>::standard().unwrap();
        assert_eq!(params.rounds(), default_rounds::<BlsFr>());
    }
}
