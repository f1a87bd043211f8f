//! Prove knowledge of a message's preimage, then verify the proof.
//!
//! Usage: prove-message <message> [keys-dir]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use ark_bn254::{Bn254, Fr};
use ark_ff::{BigInteger, PrimeField};
use knowledge_circuits::{FieldParameters, HashPreimageCircuit, PreimageShape};
use knowledge_prover::{
    prove_message, verify_preimage, CircuitArtifacts, Groth16Backend, Groth16Registry, KeyPair,
    ProverError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), ProverError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let message = args.next().unwrap_or_else(|| "secret_something".to_string());
    let keys_dir = args.next().map(PathBuf::from);

    let registry = Groth16Registry::<Bn254>::new(Arc::new(FieldParameters::standard()?));
    let shape = PreimageShape::for_message::<Fr>(message.len());
    let compiled = registry.compile::<HashPreimageCircuit<Fr>>(shape)?;

    let mut rng = rand::thread_rng();
    let keys = match &keys_dir {
        Some(dir) if dir.exists() => {
            tracing::info!("Loading existing circuit keys from {:?}", dir);
            KeyPair::<Fr, Groth16Backend<Bn254>>::load_from_directory(dir, &compiled)?
        }
        _ => {
            tracing::info!("Running trusted setup...");
            let keys = registry.setup(&compiled, &mut rng)?;
            if let Some(dir) = &keys_dir {
                keys.save_to_directory(dir, &compiled)?;
                tracing::info!("Circuit keys saved to {:?}", dir);
            }
            keys
        }
    };
    let artifacts = CircuitArtifacts { compiled, keys };

    let start = Instant::now();
    let result = prove_message(&registry, &artifacts, message.as_bytes(), &mut rng)?;
    println!("Proof generated in {:?}", start.elapsed());

    let hash = result.public_inputs.as_slice()[0];
    println!("Public hash: 0x{}", hex::encode(hash.into_bigint().to_bytes_be()));

    let valid = verify_preimage(
        &registry,
        &artifacts.keys.verifying_key,
        &result.proof,
        hash,
    )?;
    if valid {
        println!("Proof verified");
    } else {
        eprintln!("Proof verification failed");
        std::process::exit(1);
    }

    Ok(())
}
