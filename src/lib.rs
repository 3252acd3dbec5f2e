//! An implementation of NeuroEvolution of Augmenting Topologies
//! for strictly feed-forward networks, following the 2002 paper:
//! <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! Genomes encode a network as neuron genes arranged by depth plus a flat
//! list of connection genes. Structural mutations grow the topology, a
//! process-wide [`InnovationRegistry`] keeps historically identical
//! mutations aligned across the population, and speciation with fitness
//! sharing protects new structure while it optimizes.
//!
//! All randomized operations draw from a caller-supplied [`Rng`], so a
//! fixed-seed generator makes entire runs reproducible.
//!
//! [`InnovationRegistry`]: crate::genomics::InnovationRegistry
//! [`Rng`]: rand::Rng
//!
//! # Example usage: Evolution of an XOR agent
//! ```
//! use ferroneat::genomics::{GeneticConfig, NeatCrossover, NeatMutation, NetworkGenome};
//! use ferroneat::populations::{Neat, PopulationConfig};
//! use ferroneat::Environment;
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::num::NonZeroUsize;
//!
//! struct Xor;
//!
//! const ROWS: [([f64; 2], f64); 4] = [
//!     ([0.0, 0.0], 0.0),
//!     ([0.0, 1.0], 1.0),
//!     ([1.0, 0.0], 1.0),
//!     ([1.0, 1.0], 0.0),
//! ];
//!
//! impl Environment for Xor {
//!     fn evaluate(&mut self, genome: &NetworkGenome) -> f64 {
//!         let error: f64 = ROWS
//!             .iter()
//!             .map(|(inputs, expected)| (genome.get_output(inputs)[0] - expected).abs())
//!             .sum();
//!         (4.0 - error).powf(2.0)
//!     }
//!
//!     fn solved(&mut self, genome: &NetworkGenome) -> bool {
//!         ROWS.iter()
//!             .all(|(inputs, expected)| (genome.get_output(inputs)[0] - expected).abs() < 0.3)
//!     }
//! }
//!
//! let genetic_config = GeneticConfig::standard(
//!     NonZeroUsize::new(2).unwrap(),
//!     NonZeroUsize::new(1).unwrap(),
//! );
//! let population_config = PopulationConfig::standard(
//!     NonZeroUsize::new(50).unwrap(),
//!     NonZeroUsize::new(10).unwrap(),
//! );
//!
//! let mut neat = Neat::new(
//!     StdRng::seed_from_u64(42),
//!     NeatCrossover,
//!     NeatMutation,
//!     genetic_config,
//!     population_config,
//! );
//!
//! let best = neat.solve(&mut Xor);
//! assert!(best.get_output(&[1.0, 0.0])[0].is_finite());
//! ```

pub mod genomics;
pub mod populations;

use genomics::NetworkGenome;

/// Identifier type used to designate historically
/// identical structural mutations for the purposes of
/// genome comparison and crossover alignment.
pub type Innovation = usize;

/// Identifier type for neuron genes. Unique within a run
/// for input, bias and output neurons; hidden neurons mint
/// per-genome ids during the neuron-addition mutation.
pub type NeuronId = usize;

/// A task against which genomes are scored. Implemented by the
/// reinforcement-learning environments consuming this crate; the
/// search driver only ever calls these two methods.
///
/// Higher fitness is better. `solved` is the task-specific success
/// predicate that terminates the search early.
pub trait Environment {
    /// Runs the genome's forward pass against the task and
    /// returns its fitness score.
    fn evaluate(&mut self, genome: &NetworkGenome) -> f64;

    /// Returns whether the genome solves the task.
    fn solved(&mut self, genome: &NetworkGenome) -> bool;
}
