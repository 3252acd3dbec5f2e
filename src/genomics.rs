//! Foundational types for genetic encoding and manipulation of
//! feed-forward neural networks.
//!
//! Genomes are the focal point of this module. Each genome holds a
//! table of [neuron genes], addressed by id, and a list of weighted
//! [connection genes] whose endpoints are ids into that table. Every
//! neuron occupies a real-valued depth in `[0, 1]` and every
//! connection runs from a lesser depth to a strictly greater one,
//! which is what keeps the encoded networks feed-forward through any
//! sequence of structural mutations.
//!
//! Structural changes are identified across the whole population by
//! innovation numbers handed out by the [`InnovationRegistry`], the
//! basis of genome alignment during [crossover] and of the
//! compatibility distance used for speciation.
//!
//! [neuron genes]: NeuronGene
//! [connection genes]: ConnectionGene
//! [crossover]: NeatCrossover

mod config;
mod crossover;
mod errors;
mod genes;
mod history;
mod mutation;
mod nodes;

pub use config::GeneticConfig;
pub use crossover::NeatCrossover;
pub use genes::ConnectionGene;
pub use history::{InnovationRecord, InnovationRegistry};
pub use mutation::NeatMutation;
pub use nodes::{ActivationType, NeuronGene, NeuronRole};

use crate::{Innovation, NeuronId};

use ahash::RandomState;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::collections::{HashMap, HashSet};
use std::fmt;

/// A genome encoding a feed-forward neural network.
///
/// Neuron genes live in an id-keyed table; connection genes keep
/// their insertion order, which is also the order evaluation
/// propagates them in. The genome carries the fitness assigned to
/// it by the most recent evaluation (0 until evaluated).
///
/// Genomes are built by [`NetworkGenome::new`], varied by
/// [`NeatMutation`] and [`NeatCrossover`], and never modified by
/// either: both operators work on deep copies so parents stay
/// intact for elitism and reselection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkGenome {
    neurons: HashMap<NeuronId, NeuronGene, RandomState>,
    connections: Vec<ConnectionGene>,
    fitness: f64,
}

impl NetworkGenome {
    /// Generates a minimal genome for the configured number of
    /// inputs and outputs.
    ///
    /// Input neurons take ids `0..n` at depth 0, the bias neuron id
    /// `n` at depth 0, and output neurons (tanh) ids `n+1..=n+m` at
    /// depth 1. Every input and bias neuron is connected to every
    /// output neuron with a weight drawn uniformly from [-1, 1];
    /// each connection's innovation number comes from the registry,
    /// so all initial genomes of a run are fully aligned.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{GeneticConfig, InnovationRegistry, NetworkGenome};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig::standard(
    ///     NonZeroUsize::new(2).unwrap(),
    ///     NonZeroUsize::new(1).unwrap(),
    /// );
    /// let mut registry = InnovationRegistry::new();
    /// let mut rng = StdRng::seed_from_u64(0);
    ///
    /// let genome = NetworkGenome::new(&config, &mut registry, &mut rng);
    ///
    /// // (2 inputs + bias) × 1 output
    /// assert_eq!(genome.gene_count(), 3);
    /// assert_eq!(genome.neurons().count(), 4);
    /// ```
    pub fn new(
        config: &GeneticConfig,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) -> NetworkGenome {
        let input_count = config.input_count.get();
        let output_count = config.output_count.get();

        let mut neurons: HashMap<NeuronId, NeuronGene, RandomState> =
            HashMap::with_capacity_and_hasher(input_count + output_count + 1, RandomState::new());
        for id in 0..input_count {
            neurons.insert(
                id,
                NeuronGene::new(id, ActivationType::None, NeuronRole::Input, 0.0),
            );
        }
        neurons.insert(
            input_count,
            NeuronGene::new(input_count, ActivationType::None, NeuronRole::Bias, 0.0),
        );
        for offset in 1..=output_count {
            let id = input_count + offset;
            neurons.insert(
                id,
                NeuronGene::new(id, ActivationType::Tanh, NeuronRole::Output, 1.0),
            );
        }

        let mut connections = Vec::with_capacity((input_count + 1) * output_count);
        for source in 0..=input_count {
            for offset in 1..=output_count {
                let target = input_count + offset;
                let innovation = registry.resolve(&neurons[&source], &neurons[&target]);
                connections.push(ConnectionGene::new(
                    source,
                    target,
                    rng.gen_range(-1.0..=1.0),
                    true,
                    innovation,
                ));
            }
        }

        NetworkGenome {
            neurons,
            connections,
            fitness: 0.0,
        }
    }

    /// Computes the network's output for the given input vector.
    ///
    /// Input values are bound by position to the neurons with ids
    /// `0..inputs.len()`. Every enabled connection then propagates
    /// `source value × weight` additively into its target's
    /// accumulator, in the genome's stored connection order; a
    /// source with no accumulated value contributes 0. Finally each
    /// output neuron, in ascending id order, applies its activation
    /// function to its accumulator.
    pub fn get_output(&self, inputs: &[f64]) -> Vec<f64> {
        let mut values: HashMap<NeuronId, f64, RandomState> =
            HashMap::with_capacity_and_hasher(self.neurons.len(), RandomState::new());
        for (id, value) in inputs.iter().enumerate() {
            values.insert(id, *value);
        }

        for connection in &self.connections {
            if connection.enabled() {
                let contribution =
                    values.get(&connection.source()).copied().unwrap_or(0.0) * connection.weight();
                *values.entry(connection.target()).or_insert(0.0) += contribution;
            }
        }

        self.output_ids()
            .iter()
            .map(|id| self.neurons[id].activate(values.get(id).copied().unwrap_or(0.0)))
            .collect()
    }

    /// Returns the genome's fitness as of its last evaluation, or
    /// 0 if it has never been evaluated.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Sets the genome's fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Returns the genome's gene count, i.e. its number of
    /// connection genes.
    pub fn gene_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns an iterator over the genome's neuron genes, in
    /// arbitrary order.
    pub fn neurons(&self) -> impl Iterator<Item = &NeuronGene> {
        self.neurons.values()
    }

    /// Returns the neuron gene with the given id, if present.
    pub fn neuron(&self, id: NeuronId) -> Option<&NeuronGene> {
        self.neurons.get(&id)
    }

    /// Returns an iterator over the genome's connection genes, in
    /// stored order.
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionGene> {
        self.connections.iter()
    }

    /// Returns whether the genome has a connection from `source`
    /// to `target`, enabled or not.
    pub fn has_connection(&self, source: NeuronId, target: NeuronId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source() == source && c.target() == target)
    }

    /// Returns the highest neuron id in the genome.
    ///
    /// # Panics
    /// If the genome has no neurons, which the factory and both
    /// operators never produce.
    pub fn max_neuron_id(&self) -> NeuronId {
        self.neurons
            .keys()
            .copied()
            .max()
            .expect("genome has no neurons")
    }

    /// Counts the connection genes present in exactly one of the
    /// two genomes whose innovation number falls *within* the other
    /// genome's innovation range (strictly less than its maximum).
    ///
    /// The count is symmetric: both genomes' exclusive genes
    /// contribute.
    pub fn count_disjoint_genes(&self, other: &NetworkGenome) -> usize {
        let (ours, our_max) = self.innovation_span();
        let (theirs, their_max) = other.innovation_span();
        ours.iter()
            .filter(|i| !theirs.contains(i) && **i < their_max)
            .count()
            + theirs
                .iter()
                .filter(|i| !ours.contains(i) && **i < our_max)
                .count()
    }

    /// Counts the connection genes present in exactly one of the
    /// two genomes whose innovation number falls *beyond* the other
    /// genome's innovation range (strictly greater than its
    /// maximum).
    ///
    /// The count is symmetric: both genomes' exclusive genes
    /// contribute.
    pub fn count_excess_genes(&self, other: &NetworkGenome) -> usize {
        let (ours, our_max) = self.innovation_span();
        let (theirs, their_max) = other.innovation_span();
        ours.iter()
            .filter(|i| !theirs.contains(i) && **i > their_max)
            .count()
            + theirs
                .iter()
                .filter(|i| !ours.contains(i) && **i > our_max)
                .count()
    }

    /// Returns the average absolute weight difference between the
    /// two genomes' matching genes, or 0 if no genes match.
    pub fn average_weight_difference(&self, other: &NetworkGenome) -> f64 {
        let their_weights: HashMap<Innovation, f64, RandomState> = other
            .connections
            .iter()
            .map(|c| (c.innovation(), c.weight()))
            .collect();

        let mut matching = 0;
        let mut total_difference = 0.0;
        for connection in &self.connections {
            if let Some(weight) = their_weights.get(&connection.innovation()) {
                total_difference += (connection.weight() - weight).abs();
                matching += 1;
            }
        }

        if matching == 0 {
            0.0
        } else {
            total_difference / matching as f64
        }
    }

    /// The genome's output neuron ids in ascending order, which is
    /// also the order of [`get_output`]'s result vector.
    ///
    /// [`get_output`]: NetworkGenome::get_output
    fn output_ids(&self) -> Vec<NeuronId> {
        let mut ids: Vec<NeuronId> = self
            .neurons
            .values()
            .filter(|n| n.role() == NeuronRole::Output)
            .map(|n| n.id())
            .collect();
        ids.sort_unstable();
        ids
    }

    fn innovation_span(&self) -> (HashSet<Innovation, RandomState>, Innovation) {
        let innovations: HashSet<Innovation, RandomState> =
            self.connections.iter().map(|c| c.innovation()).collect();
        let max = innovations.iter().copied().max().unwrap_or(0);
        (innovations, max)
    }
}

impl fmt::Display for NetworkGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut neurons: Vec<&NeuronGene> = self.neurons.values().collect();
        neurons.sort_unstable_by(|a, b| {
            a.depth()
                .partial_cmp(&b.depth())
                .expect("neuron depth is NaN")
                .then(a.id().cmp(&b.id()))
        });
        writeln!(f, "Genome (fitness {:.3}):", self.fitness)?;
        for neuron in neurons {
            writeln!(f, "  {}", neuron)?;
        }
        for connection in &self.connections {
            writeln!(f, "  {}", connection)?;
        }
        Ok(())
    }
}
