use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for the generational search driver.
///
/// Population size and generation limit are `NonZeroUsize`, so a
/// degenerate zero-sized run is unrepresentable rather than a
/// runtime failure. The `standard` constructor carries the
/// canonical parameter set; all fields are public and can be
/// overridden afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of genomes in the population.
    pub size: NonZeroUsize,
    /// Generation count after which the search stops and returns
    /// the best genome found so far.
    pub max_generations: NonZeroUsize,
    /// Starting compatibility threshold for species assignment.
    pub initial_compatibility_threshold: f64,
    /// Step by which the compatibility threshold moves toward the
    /// target species count each generation.
    pub threshold_adjustment: f64,
    /// Lower bound the compatibility threshold never drops below.
    pub threshold_floor: f64,
    /// Species count the threshold adjustment steers toward.
    pub target_species: usize,
    /// Number of top genomes copied unmodified into the next
    /// generation, both globally and within each species.
    pub elitism: usize,
    /// Number of contenders in each tournament-selection round
    /// when topping up the population.
    pub tournament_size: usize,
}

impl PopulationConfig {
    /// Returns the canonical driver configuration for the given
    /// population size and generation limit.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::populations::PopulationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = PopulationConfig::standard(
    ///     NonZeroUsize::new(100).unwrap(),
    ///     NonZeroUsize::new(25).unwrap(),
    /// );
    ///
    /// assert_eq!(config.size.get(), 100);
    /// assert_eq!(config.target_species, 5);
    /// assert_eq!(config.initial_compatibility_threshold, 3.0);
    /// ```
    pub fn standard(size: NonZeroUsize, max_generations: NonZeroUsize) -> PopulationConfig {
        PopulationConfig {
            size,
            max_generations,
            initial_compatibility_threshold: 3.0,
            threshold_adjustment: 0.4,
            threshold_floor: 1.0,
            target_species: 5,
            elitism: 2,
            tournament_size: 5,
        }
    }
}
