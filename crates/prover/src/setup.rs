//! Key generation and persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::{rngs::StdRng, CryptoRng, RngCore, SeedableRng};
use knowledge_circuits::{
    Circuit, HashPreimageCircuit, MembershipShape, MerkleMembershipCircuit, PreimageShape,
};
use serde_json::json;
use tracing::info;

use crate::backend::ProofBackend;
use crate::error::ProverError;
use crate::registry::{CircuitRegistry, CompiledCircuit};

/// Proving and verifying key for one compiled circuit.
pub struct KeyPair<F: PrimeField, B: ProofBackend<F>> {
    pub proving_key: B::ProvingKey,
    pub verifying_key: B::VerifyingKey,
    _field: PhantomData<fn() -> F>,
}

impl<F: PrimeField, B: ProofBackend<F>> Clone for KeyPair<F, B> {
    fn clone(&self) -> Self {
        Self::new(self.proving_key.clone(), self.verifying_key.clone())
    }
}

impl<F: PrimeField, B: ProofBackend<F>> KeyPair<F, B> {
    pub fn new(proving_key: B::ProvingKey, verifying_key: B::VerifyingKey) -> Self {
        Self {
            proving_key,
            verifying_key,
            _field: PhantomData,
        }
    }

    pub fn proving_key_bytes(&self) -> Result<Vec<u8>, ProverError> {
        let mut bytes = Vec::new();
        self.proving_key.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    pub fn verifying_key_bytes(&self) -> Result<Vec<u8>, ProverError> {
        let mut bytes = Vec::new();
        self.verifying_key.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// Write `<name>.pk`, `<name>.vk` and `<name>.json` into `dir`, where
    /// `<name>` is the compiled circuit's artifact name.
    pub fn save_to_directory<C: Circuit<F>>(
        &self,
        dir: &Path,
        compiled: &CompiledCircuit<F, C>,
    ) -> Result<(), ProverError> {
        fs::create_dir_all(dir)?;
        let name = compiled.artifact_name();

        let mut pk_file = BufWriter::new(File::create(dir.join(format!("{}.pk", name)))?);
        self.proving_key.serialize_compressed(&mut pk_file)?;
        pk_file.flush()?;

        let mut vk_file = BufWriter::new(File::create(dir.join(format!("{}.vk", name)))?);
        self.verifying_key.serialize_compressed(&mut vk_file)?;
        vk_file.flush()?;

        let metadata = json!({
            "circuit": compiled.descriptor().to_string(),
            "fingerprint": hex::encode(compiled.fingerprint()),
            "num_constraints": compiled.num_constraints(),
            "verifying_key": hex::encode(self.verifying_key_bytes()?),
        });
        fs::write(
            dir.join(format!("{}.json", name)),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        info!(artifact = %name, dir = ?dir, "saved circuit keys");
        Ok(())
    }

    /// Load keys written by [`Self::save_to_directory`] for `compiled`.
    ///
    /// Fails with [`ProverError::FingerprintMismatch`] if the stored keys
    /// were generated for a different constraint system.
    pub fn load_from_directory<C: Circuit<F>>(
        dir: &Path,
        compiled: &CompiledCircuit<F, C>,
    ) -> Result<Self, ProverError> {
        let name = compiled.artifact_name();

        let metadata: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.join(format!("{}.json", name)))?)?;
        let expected = hex::encode(compiled.fingerprint());
        let actual = metadata["fingerprint"].as_str().unwrap_or_default();
        if actual != expected {
            return Err(ProverError::FingerprintMismatch {
                expected,
                actual: actual.to_string(),
            });
        }

        let pk_file = BufReader::new(File::open(dir.join(format!("{}.pk", name)))?);
        let proving_key = B::ProvingKey::deserialize_compressed(pk_file)?;

        let vk_file = BufReader::new(File::open(dir.join(format!("{}.vk", name)))?);
        let verifying_key = B::VerifyingKey::deserialize_compressed(vk_file)?;

        info!(artifact = %name, dir = ?dir, "loaded circuit keys");
        Ok(Self::new(proving_key, verifying_key))
    }
}

/// A compiled circuit with its keys.
pub struct CircuitArtifacts<F: PrimeField, C: Circuit<F>, B: ProofBackend<F>> {
    pub compiled: CompiledCircuit<F, C>,
    pub keys: KeyPair<F, B>,
}

impl<F: PrimeField, C: Circuit<F>, B: ProofBackend<F>> CircuitArtifacts<F, C, B> {
    fn generate<R: RngCore + CryptoRng>(
        registry: &CircuitRegistry<F, B>,
        shape: C::Shape,
        rng: &mut R,
    ) -> Result<Self, ProverError> {
        let compiled = registry.compile::<C>(shape)?;
        let keys = registry.setup(&compiled, rng)?;
        Ok(Self { compiled, keys })
    }

    fn load(
        registry: &CircuitRegistry<F, B>,
        shape: C::Shape,
        dir: &Path,
    ) -> Result<Self, ProverError> {
        let compiled = registry.compile::<C>(shape)?;
        let keys = KeyPair::load_from_directory(dir, &compiled)?;
        Ok(Self { compiled, keys })
    }
}

/// Keys for both circuits.
pub struct CircuitKeys<F: PrimeField, B: ProofBackend<F>> {
    pub preimage: CircuitArtifacts<F, HashPreimageCircuit<F>, B>,
    pub membership: CircuitArtifacts<F, MerkleMembershipCircuit<F>, B>,
}

impl<F: PrimeField, B: ProofBackend<F>> CircuitKeys<F, B> {
    pub fn save_to_directory(&self, dir: &Path) -> Result<(), ProverError> {
        self.preimage
            .keys
            .save_to_directory(dir, &self.preimage.compiled)?;
        self.membership
            .keys
            .save_to_directory(dir, &self.membership.compiled)?;
        Ok(())
    }

    pub fn load_from_directory(
        registry: &CircuitRegistry<F, B>,
        preimage_shape: PreimageShape,
        membership_shape: MembershipShape,
        dir: &Path,
    ) -> Result<Self, ProverError> {
        Ok(Self {
            preimage: CircuitArtifacts::<F, HashPreimageCircuit<F>, B>::load(
                registry,
                preimage_shape,
                dir,
            )?,
            membership: CircuitArtifacts::<F, MerkleMembershipCircuit<F>, B>::load(
                registry,
                membership_shape,
                dir,
            )?,
        })
    }
}

/// Compile and set up both circuits in parallel.
///
/// Each setup draws from its own `StdRng`, both seeded from `seed`, so the
/// same seed always yields the same keys.
pub fn setup_all<F: PrimeField, B: ProofBackend<F>>(
    registry: &CircuitRegistry<F, B>,
    preimage_shape: PreimageShape,
    membership_shape: MembershipShape,
    seed: u64,
) -> Result<CircuitKeys<F, B>, ProverError> {
    let mut seeds = StdRng::seed_from_u64(seed);
    let mut preimage_rng = StdRng::seed_from_u64(seeds.next_u64());
    let mut membership_rng = StdRng::seed_from_u64(seeds.next_u64());

    info!(?preimage_shape, ?membership_shape, "running setup for all circuits");
    let (preimage, membership) = rayon::join(
        || {
            CircuitArtifacts::<F, HashPreimageCircuit<F>, B>::generate(
                registry,
                preimage_shape,
                &mut preimage_rng,
            )
        },
        || {
            CircuitArtifacts::<F, MerkleMembershipCircuit<F>, B>::generate(
                registry,
                membership_shape,
                &mut membership_rng,
            )
        },
    );

    Ok(CircuitKeys {
        preimage: preimage?,
        membership: membership?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Groth16Backend;
    use crate::registry::Groth16Registry;
    use ark_bn254::{Bn254, Fr};
    use knowledge_circuits::FieldParameters;
    use std::sync::Arc;

    fn registry() -> Groth16Registry<Bn254> {
        CircuitRegistry::new(Arc::new(FieldParameters::standard().unwrap()))
    }

    #[test]
    fn test_save_and_load_keys() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let compiled = registry
            .compile::<HashPreimageCircuit<Fr>>(PreimageShape::new(1).unwrap())
            .unwrap();
        let keys = registry.setup(&compiled, &mut rng).unwrap();
        keys.save_to_directory(dir.path(), &compiled).unwrap();

        let name = compiled.artifact_name();
        assert!(dir.path().join(format!("{}.pk", name)).exists());
        assert!(dir.path().join(format!("{}.vk", name)).exists());

        let loaded =
            KeyPair::<Fr, Groth16Backend<Bn254>>::load_from_directory(dir.path(), &compiled)
                .unwrap();
        assert_eq!(
            loaded.verifying_key_bytes().unwrap(),
            keys.verifying_key_bytes().unwrap()
        );
        assert_eq!(
            loaded.proving_key_bytes().unwrap(),
            keys.proving_key_bytes().unwrap()
        );
        assert_eq!(loaded.verifying_key, keys.verifying_key);
    }

    #[test]
    fn test_load_rejects_fingerprint_mismatch() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let compiled = registry
            .compile::<HashPreimageCircuit<Fr>>(PreimageShape::new(1).unwrap())
            .unwrap();
        let keys = registry.setup(&compiled, &mut rng).unwrap();
        keys.save_to_directory(dir.path(), &compiled).unwrap();

        let metadata_path = dir
            .path()
            .join(format!("{}.json", compiled.artifact_name()));
        let mut metadata: serde_json::Value =
            serde_json::from_slice(&fs::read(&metadata_path).unwrap()).unwrap();
        metadata["fingerprint"] = json!("00");
        fs::write(&metadata_path, metadata.to_string()).unwrap();

        let err = KeyPair::<Fr, Groth16Backend<Bn254>>::load_from_directory(
            dir.path(),
            &compiled,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ProverError::FingerprintMismatch { .. }));
    }

    #[test]
    fn test_load_missing_keys() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();

        let compiled = registry
            .compile::<HashPreimageCircuit<Fr>>(PreimageShape::new(1).unwrap())
            .unwrap();

        let err = KeyPair::<Fr, Groth16Backend<Bn254>>::load_from_directory(
            dir.path(),
            &compiled,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ProverError::Io(_)));
    }

    #[test]
    fn test_setup_all_is_deterministic() {
        let registry = registry();
        let preimage_shape = PreimageShape::new(1).unwrap();
        let membership_shape = MembershipShape::private(2).unwrap();

        let first = setup_all(&registry, preimage_shape, membership_shape, 7).unwrap();
        let second = setup_all(&registry, preimage_shape, membership_shape, 7).unwrap();

        assert_eq!(
            first.preimage.keys.verifying_key_bytes().unwrap(),
            second.preimage.keys.verifying_key_bytes().unwrap()
        );
        assert_eq!(
            first.membership.keys.verifying_key_bytes().unwrap(),
            second.membership.keys.verifying_key_bytes().unwrap()
        );
        assert_eq!(first.membership.compiled.shape(), &membership_shape);
    }
}
