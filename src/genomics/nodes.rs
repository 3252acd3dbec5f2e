use crate::NeuronId;

use serde::{Deserialize, Serialize};

use std::fmt;

/// The activation function applied to a neuron's
/// accumulated input during network evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationType {
    /// x
    None,
    /// 1 / (1 + exp(-x))
    Sigmoid,
    /// tanh(x)
    Tanh,
}

/// The structural function of a neuron within the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronRole {
    /// Input neurons, at depth 0.
    Input,
    /// The bias neuron, at depth 0. Always activates to 1.
    Bias,
    /// Hidden neurons, created by splitting a connection.
    Hidden,
    /// Output neurons, at depth 1.
    Output,
}

/// Neuron genes are the structural elements of genomes
/// between which connection genes are created.
///
/// Each neuron occupies a `depth` in `[0.0, 1.0]`: 0 is the
/// input layer, 1 the output layer, and hidden neurons take
/// the midpoint depth of the connection they were split into.
///
/// Two neuron genes are equal iff their `(id, depth, role)`
/// triples are equal; the activation function does not take
/// part in identity. This is the equality the innovation
/// registry uses to recognize historically identical mutations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeuronGene {
    id: NeuronId,
    activation: ActivationType,
    role: NeuronRole,
    depth: f64,
}

impl NeuronGene {
    /// Creates a new neuron gene with the given parameters.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{ActivationType, NeuronGene, NeuronRole};
    ///
    /// let neuron = NeuronGene::new(5, ActivationType::Tanh, NeuronRole::Hidden, 0.5);
    ///
    /// assert_eq!(neuron.id(), 5);
    /// assert_eq!(neuron.role(), NeuronRole::Hidden);
    /// assert_eq!(neuron.depth(), 0.5);
    /// ```
    pub fn new(
        id: NeuronId,
        activation: ActivationType,
        role: NeuronRole,
        depth: f64,
    ) -> NeuronGene {
        NeuronGene {
            id,
            activation,
            role,
            depth,
        }
    }

    /// Returns the neuron's id.
    pub fn id(&self) -> NeuronId {
        self.id
    }

    /// Returns the neuron's activation type.
    pub fn activation_type(&self) -> ActivationType {
        self.activation
    }

    /// Returns the neuron's role.
    pub fn role(&self) -> NeuronRole {
        self.role
    }

    /// Returns the neuron's depth within the network.
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Applies the neuron's activation function to `input`.
    ///
    /// Bias neurons ignore their input and always yield 1.0.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{ActivationType, NeuronGene, NeuronRole};
    ///
    /// let bias = NeuronGene::new(2, ActivationType::None, NeuronRole::Bias, 0.0);
    /// assert_eq!(bias.activate(-3.5), 1.0);
    ///
    /// let output = NeuronGene::new(3, ActivationType::Tanh, NeuronRole::Output, 1.0);
    /// assert_eq!(output.activate(0.0), 0.0);
    /// ```
    pub fn activate(&self, input: f64) -> f64 {
        if self.role == NeuronRole::Bias {
            return 1.0;
        }
        match self.activation {
            ActivationType::None => input,
            ActivationType::Sigmoid => 1.0 / (1.0 + (-input).exp()),
            ActivationType::Tanh => input.tanh(),
        }
    }
}

impl PartialEq for NeuronGene {
    fn eq(&self, other: &NeuronGene) -> bool {
        self.id == other.id && self.depth == other.depth && self.role == other.role
    }
}

impl fmt::Display for NeuronGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}[{:?}, {:?}, d={:.3}]",
            self.id, self.role, self.activation, self.depth
        )
    }
}
