use crate::{Innovation, NeuronId};

use serde::{Deserialize, Serialize};

use std::fmt;

/// Connection genes are the principal components of genomes.
/// Each one links a source neuron to a target neuron at a
/// strictly greater depth, and becomes a weighted network
/// connection during evaluation.
///
/// Endpoints are neuron ids into the owning genome's neuron
/// table; a connection never outlives its genome. Disabled
/// connections are skipped during evaluation but retained
/// for historical alignment.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ConnectionGene {
    source: NeuronId,
    target: NeuronId,
    weight: f64,
    enabled: bool,
    innovation: Innovation,
}

impl ConnectionGene {
    /// Creates a new connection gene with the specified parameters.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::ConnectionGene;
    ///
    /// let connection = ConnectionGene::new(3, 9, 2.0, true, 42);
    ///
    /// assert_eq!(connection.source(), 3);
    /// assert_eq!(connection.target(), 9);
    /// assert_eq!(connection.weight(), 2.0);
    /// assert!(connection.enabled());
    /// assert_eq!(connection.innovation(), 42);
    /// ```
    pub fn new(
        source: NeuronId,
        target: NeuronId,
        weight: f64,
        enabled: bool,
        innovation: Innovation,
    ) -> ConnectionGene {
        ConnectionGene {
            source,
            target,
            weight,
            enabled,
            innovation,
        }
    }

    /// Returns the id of the connection's source neuron.
    pub fn source(&self) -> NeuronId {
        self.source
    }

    /// Returns the id of the connection's target neuron.
    pub fn target(&self) -> NeuronId {
        self.target
    }

    /// Returns the connection's weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Sets the connection's weight.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Returns whether the connection participates in evaluation.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the connection's enabled status.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the connection's innovation number.
    pub fn innovation(&self) -> Innovation {
        self.innovation
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:?}[{:?}->{:?}, {:.3}]{}",
            if self.enabled { "" } else { "(" },
            self.innovation,
            self.source,
            self.target,
            self.weight,
            if self.enabled { "" } else { ")" },
        )
    }
}
