//! Print constraint counts for a range of circuit shapes.

use std::sync::Arc;

use ark_bn254::{Bn254, Fr};
use knowledge_circuits::{
    FieldParameters, HashPreimageCircuit, LeafVisibility, MembershipShape,
    MerkleMembershipCircuit, PreimageShape,
};
use knowledge_prover::{Groth16Registry, ProverError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), ProverError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let registry = Groth16Registry::<Bn254>::new(Arc::new(FieldParameters::standard()?));
    println!("MiMC rounds: {}", registry.params().mimc().rounds());
    println!();

    println!("{:<56} {:>12} {:>10}", "circuit", "constraints", "witnesses");
    for block_count in [1, 2, 4, 8] {
        let compiled =
            registry.compile::<HashPreimageCircuit<Fr>>(PreimageShape::new(block_count)?)?;
        println!(
            "{:<56} {:>12} {:>10}",
            compiled.descriptor().to_string(),
            compiled.num_constraints(),
            compiled.matrices().num_witness_variables
        );
    }

    for depth in [0, 4, 16, 32] {
        for visibility in [LeafVisibility::Private, LeafVisibility::Public] {
            let shape = MembershipShape::new(depth, visibility)?;
            let compiled = registry.compile::<MerkleMembershipCircuit<Fr>>(shape)?;
            println!(
                "{:<56} {:>12} {:>10}",
                compiled.descriptor().to_string(),
                compiled.num_constraints(),
                compiled.matrices().num_witness_variables
            );
        }
    }

    Ok(())
}
