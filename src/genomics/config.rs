use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for genome generation, mutation and
/// crossover.
///
/// The `standard` constructor carries the canonical parameter
/// set the operators were tuned with; individual fields can be
/// overridden afterwards since all are public.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Number of inputs in a network.
    pub input_count: NonZeroUsize,
    /// Number of outputs in a network.
    pub output_count: NonZeroUsize,
    /// Chance of the neuron-addition mutation being applied.
    pub neuron_addition_chance: f64,
    /// Chance of the connection-addition mutation being applied,
    /// if neuron addition was not.
    pub connection_addition_chance: f64,
    /// Chance of the weight mutation being applied, if no
    /// structural mutation was.
    pub weight_mutation_chance: f64,
    /// Chance of a mutated weight being replaced outright by a
    /// fresh uniform value rather than perturbed.
    pub weight_reset_chance: f64,
    /// Scale applied to gaussian noise during weight perturbation.
    pub weight_perturbation_power: f64,
    /// Half-width of the uniform jitter applied to every weight
    /// inherited during crossover.
    pub crossover_weight_perturbation: f64,
    /// Weight of the excess gene count in the compatibility
    /// distance between genomes.
    pub excess_gene_factor: f64,
    /// Weight of the disjoint gene count in the compatibility
    /// distance between genomes.
    pub disjoint_gene_factor: f64,
    /// Weight of the average weight difference of matching genes
    /// in the compatibility distance between genomes.
    pub weight_difference_factor: f64,
}

impl GeneticConfig {
    /// Returns the canonical configuration for networks with the
    /// given number of inputs and outputs.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::GeneticConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig::standard(
    ///     NonZeroUsize::new(3).unwrap(),
    ///     NonZeroUsize::new(2).unwrap(),
    /// );
    ///
    /// assert_eq!(config.input_count.get(), 3);
    /// assert_eq!(config.weight_mutation_chance, 0.8);
    /// ```
    pub fn standard(input_count: NonZeroUsize, output_count: NonZeroUsize) -> GeneticConfig {
        GeneticConfig {
            input_count,
            output_count,
            neuron_addition_chance: 0.2,
            connection_addition_chance: 0.3,
            weight_mutation_chance: 0.8,
            weight_reset_chance: 0.1,
            weight_perturbation_power: 0.3,
            crossover_weight_perturbation: 0.1,
            excess_gene_factor: 1.0,
            disjoint_gene_factor: 1.0,
            weight_difference_factor: 3.0,
        }
    }
}
