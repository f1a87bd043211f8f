//! Field-wide parameters threaded through every component.

use ark_ff::PrimeField;
use mimc::{MimcParameters, ParameterError};

use crate::encoder;
use crate::error::EncodingError;

/// Domain separation tag used when none is configured.
pub const DEFAULT_DOMAIN_TAG: &[u8] = b"string:";

/// Hash parameters and hash-to-field domain for one prime field.
///
/// Circuits, the witness builder and tree construction all take this value
/// (usually as `Arc<FieldParameters<F>>`) instead of reading process-wide
/// defaults, so parameter sets for several fields can coexist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldParameters<F: PrimeField> {
    mimc: MimcParameters<F>,
    domain_tag: Vec<u8>,
}

impl<F: PrimeField> FieldParameters<F> {
    pub fn new(mimc: MimcParameters<F>, domain_tag: impl Into<Vec<u8>>) -> Self {
        Self {
            mimc,
            domain_tag: domain_tag.into(),
        }
    }

    /// Standard MiMC constants and [`DEFAULT_DOMAIN_TAG`].
    pub fn standard() -> Result<Self, ParameterError> {
        Ok(Self::new(MimcParameters::standard()?, DEFAULT_DOMAIN_TAG))
    }

    pub fn mimc(&self) -> &MimcParameters<F> {
        &self.mimc
    }

    pub fn domain_tag(&self) -> &[u8] {
        &self.domain_tag
    }

    /// Encode `message` under the configured domain tag.
    pub fn encode_message(
        &self,
        message: &[u8],
        block_count: usize,
    ) -> Result<Vec<F>, EncodingError> {
        encoder::encode(message, &self.domain_tag, block_count)
    }
}
