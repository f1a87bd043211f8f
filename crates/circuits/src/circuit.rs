//! Declarative circuit descriptors and the contract every circuit implements.

use std::fmt;
use std::sync::Arc;

use ark_ff::PrimeField;
use ark_relations::r1cs::ConstraintSynthesizer;

use crate::encoder;
use crate::error::{AssignmentError, EncodingError, WitnessError};
use crate::params::FieldParameters;

/// Whether a signal is known to the verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalRole {
    Private,
    Public,
}

impl fmt::Display for SignalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalRole::Private => write!(f, "private"),
            SignalRole::Public => write!(f, "public"),
        }
    }
}

/// One named group of field elements allocated by a circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    pub name: &'static str,
    pub role: SignalRole,
    pub arity: usize,
}

/// Signals of a circuit in allocation order.
///
/// Public signals appear in the same order as the verifier's public inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitDescriptor {
    pub name: &'static str,
    pub signals: Vec<Signal>,
}

impl CircuitDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            signals: Vec::new(),
        }
    }

    pub fn private(self, name: &'static str, arity: usize) -> Self {
        self.signal(name, SignalRole::Private, arity)
    }

    pub fn public(self, name: &'static str, arity: usize) -> Self {
        self.signal(name, SignalRole::Public, arity)
    }

    fn signal(mut self, name: &'static str, role: SignalRole, arity: usize) -> Self {
        self.signals.push(Signal { name, role, arity });
        self
    }

    /// Total arity of public signals.
    pub fn num_public_inputs(&self) -> usize {
        self.arity_of(SignalRole::Public)
    }

    /// Total arity of private signals.
    pub fn num_private_inputs(&self) -> usize {
        self.arity_of(SignalRole::Private)
    }

    fn arity_of(&self, role: SignalRole) -> usize {
        self.signals
            .iter()
            .filter(|s| s.role == role)
            .map(|s| s.arity)
            .sum()
    }

    pub fn find(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for CircuitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, signal) in self.signals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}[{}]", signal.name, signal.role, signal.arity)?;
        }
        write!(f, ")")
    }
}

/// Ordered public projection of an assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicInputs<F: PrimeField>(Vec<F>);

impl<F: PrimeField> PublicInputs<F> {
    pub fn new(values: Vec<F>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[F] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<F> {
        self.0
    }

    /// Canonical byte encoding, one fixed-width element after another.
    pub fn to_bytes(&self) -> Vec<u8> {
        encoder::decode(&self.0)
    }

    /// Parse the [`Self::to_bytes`] encoding, rejecting values outside the field.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        encoder::from_bytes(bytes).map(Self)
    }
}

impl<F: PrimeField> From<Vec<F>> for PublicInputs<F> {
    fn from(values: Vec<F>) -> Self {
        Self(values)
    }
}

/// Contract shared by every circuit variant.
///
/// A circuit value either carries a full assignment (for proving) or none at
/// all (a *blank* circuit, for compilation and setup). Compilation depends
/// only on [`Circuit::Shape`].
pub trait Circuit<F: PrimeField>: ConstraintSynthesizer<F> + Clone {
    type Shape: Clone + fmt::Debug + PartialEq + Eq;

    /// Circuit with no assigned values.
    fn blank(shape: Self::Shape, params: Arc<FieldParameters<F>>) -> Result<Self, WitnessError>;

    fn shape(&self) -> &Self::Shape;

    fn params(&self) -> &Arc<FieldParameters<F>>;

    /// Same shape and parameters with every assignment dropped.
    fn to_blank(&self) -> Self;

    fn descriptor(&self) -> CircuitDescriptor;

    /// Check that every declared signal has a value of the declared arity.
    fn check_assignment(&self) -> Result<(), WitnessError>;

    /// Public signals in allocation order.
    fn public_inputs(&self) -> Result<PublicInputs<F>, AssignmentError>;
}
