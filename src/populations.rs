//! Generational evolution of genome populations.
//!
//! The [`Neat`] driver owns a population of genomes, partitions it
//! into [`Species`] by compatibility distance, and advances it one
//! generation at a time: fitness evaluation, speciation, fitness
//! sharing, offspring allocation and reproduction. [`Neat::solve`]
//! runs the whole loop against an [`Environment`] until the task is
//! solved or the generation limit is reached.
//!
//! The driver owns the run's single random generator; constructed
//! with a fixed-seed [`StdRng`], entire runs are reproducible.
//!
//! [`Environment`]: crate::Environment
//! [`StdRng`]: rand::rngs::StdRng

mod config;
pub mod logging;
mod species;

pub use config::PopulationConfig;
pub use species::Species;

use crate::genomics::{
    GeneticConfig, InnovationRegistry, NeatCrossover, NeatMutation, NetworkGenome,
};
use crate::Environment;

use rand::Rng;

use std::mem;

/// The generational search driver.
///
/// Holds the full state of an evolutionary run: the population, its
/// species partition, the innovation registry, the adaptive
/// compatibility threshold and the generation counter. The genetic
/// operators and random generator are supplied at construction and
/// used for every randomized decision of the run.
///
/// [`solve`] drives the complete loop; [`evaluate_fitness`] and
/// [`evolve`] expose the two halves of a generation for callers
/// that want to observe or interleave (e.g. with an
/// [`EvolutionLogger`]).
///
/// [`solve`]: Neat::solve
/// [`evaluate_fitness`]: Neat::evaluate_fitness
/// [`evolve`]: Neat::evolve
/// [`EvolutionLogger`]: logging::EvolutionLogger
pub struct Neat<R: Rng> {
    rng: R,
    crossover: NeatCrossover,
    mutation: NeatMutation,
    genetic_config: GeneticConfig,
    population_config: PopulationConfig,
    registry: InnovationRegistry,
    population: Vec<NetworkGenome>,
    species: Vec<Species>,
    compatibility_threshold: f64,
    generation: usize,
}

impl<R: Rng> Neat<R> {
    /// Creates a driver with a freshly generated population.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{GeneticConfig, NeatCrossover, NeatMutation};
    /// use ferroneat::populations::{Neat, PopulationConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::num::NonZeroUsize;
    ///
    /// let neat = Neat::new(
    ///     StdRng::seed_from_u64(42),
    ///     NeatCrossover,
    ///     NeatMutation,
    ///     GeneticConfig::standard(
    ///         NonZeroUsize::new(2).unwrap(),
    ///         NonZeroUsize::new(1).unwrap(),
    ///     ),
    ///     PopulationConfig::standard(
    ///         NonZeroUsize::new(20).unwrap(),
    ///         NonZeroUsize::new(10).unwrap(),
    ///     ),
    /// );
    ///
    /// assert_eq!(neat.genomes().count(), 20);
    /// assert_eq!(neat.generation(), 0);
    /// ```
    pub fn new(
        rng: R,
        crossover: NeatCrossover,
        mutation: NeatMutation,
        genetic_config: GeneticConfig,
        population_config: PopulationConfig,
    ) -> Neat<R> {
        let mut neat = Neat {
            rng,
            crossover,
            mutation,
            compatibility_threshold: population_config.initial_compatibility_threshold,
            genetic_config,
            population_config,
            registry: InnovationRegistry::new(),
            population: vec![],
            species: vec![],
            generation: 0,
        };
        neat.initialize_population();
        neat
    }

    /// Runs the full evolutionary loop against `environment` and
    /// returns the solving genome, or the best genome ever observed
    /// if the generation limit is reached first.
    ///
    /// The population is regenerated from scratch, so repeated
    /// `solve` calls are independent runs (sharing the innovation
    /// registry). Each generation every genome is evaluated, the
    /// best-ever genome is updated on strict improvement, and the
    /// current champion is checked against [`Environment::solved`]
    /// before the population evolves.
    pub fn solve(&mut self, environment: &mut impl Environment) -> NetworkGenome {
        self.initialize_population();
        self.generation = 0;

        let mut best_overall: Option<NetworkGenome> = None;
        loop {
            self.evaluate_fitness(environment);

            let current_best = self.champion().clone();
            if best_overall
                .as_ref()
                .map_or(true, |best| current_best.fitness() > best.fitness())
            {
                best_overall = Some(current_best.clone());
            }

            if environment.solved(&current_best) {
                return current_best;
            }

            self.evolve();
            self.generation += 1;

            if self.generation >= self.population_config.max_generations.get() {
                return best_overall.expect("no generation was evaluated");
            }
        }
    }

    /// Evaluates every genome in the population against
    /// `environment` and assigns it the resulting fitness.
    pub fn evaluate_fitness(&mut self, environment: &mut impl Environment) {
        for genome in &mut self.population {
            let fitness = environment.evaluate(genome);
            genome.set_fitness(fitness);
        }
    }

    /// Advances the population by one generation.
    ///
    /// Re-speciates the evaluated population, steers the
    /// compatibility threshold toward the target species count,
    /// applies fitness sharing and allocates offspring quotas; then
    /// assembles the next population from the global elites, each
    /// species' evolved members, and tournament-bred children (or
    /// fresh genomes when no parent is available) up to the
    /// configured size.
    ///
    /// Call after [`evaluate_fitness`]; fitness sharing makes this
    /// a one-shot step per generation.
    ///
    /// [`evaluate_fitness`]: Neat::evaluate_fitness
    pub fn evolve(&mut self) {
        self.speciate_population();
        self.adjust_compatibility_threshold();
        self.allocate_offspring();

        // The old generation, carrying shared fitness: the pool the
        // global elites and tournament parents are drawn from.
        let parent_pool: Vec<NetworkGenome> = self
            .species
            .iter()
            .flat_map(|s| s.members().cloned())
            .collect();

        let mut next_population = Vec::with_capacity(self.population_config.size.get());
        next_population.extend(self.global_elites(&parent_pool));

        for species in &mut self.species {
            species.evolve(
                &self.crossover,
                &self.mutation,
                self.population_config.elitism,
                &self.genetic_config,
                &mut self.registry,
                &mut self.rng,
            );
            next_population.extend(species.members().cloned());
        }

        while next_population.len() < self.population_config.size.get() {
            let parents = self
                .tournament_select(&parent_pool)
                .cloned()
                .zip(self.tournament_select(&parent_pool).cloned());
            let child = match parents {
                Some((parent1, parent2)) => {
                    let child =
                        self.crossover
                            .apply(&parent1, &parent2, &self.genetic_config, &mut self.rng);
                    self.mutation
                        .apply(&child, &self.genetic_config, &mut self.registry, &mut self.rng)
                }
                None => NetworkGenome::new(
                    &self.genetic_config,
                    &mut self.registry,
                    &mut self.rng,
                ),
            };
            next_population.push(child);
        }

        next_population.truncate(self.population_config.size.get());
        self.population = next_population;
    }

    /// Returns the best genome of the current population by
    /// fitness.
    ///
    /// # Panics
    /// If a genome's fitness is NaN.
    pub fn champion(&self) -> &NetworkGenome {
        self.population
            .iter()
            .max_by(|a, b| {
                a.fitness()
                    .partial_cmp(&b.fitness())
                    .unwrap_or_else(|| panic!("NaN fitness value in population"))
            })
            .expect("empty population has no champion")
    }

    /// Returns an iterator over the current population.
    pub fn genomes(&self) -> impl Iterator<Item = &NetworkGenome> {
        self.population.iter()
    }

    /// Returns the population's species as of the most recent
    /// speciation.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the current compatibility threshold for species
    /// assignment.
    pub fn compatibility_threshold(&self) -> f64 {
        self.compatibility_threshold
    }

    /// Returns the run's innovation registry.
    pub fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }

    fn initialize_population(&mut self) {
        self.population.clear();
        self.species.clear();
        for _ in 0..self.population_config.size.get() {
            let genome =
                NetworkGenome::new(&self.genetic_config, &mut self.registry, &mut self.rng);
            self.population.push(genome.clone());
            self.assign_to_species(genome);
        }
    }

    /// Moves the whole population into species, founding a new one
    /// for every genome incompatible with all existing species.
    /// Species left without members are dropped.
    fn speciate_population(&mut self) {
        for species in &mut self.species {
            species.clear_members();
        }
        let population = mem::take(&mut self.population);
        for genome in population {
            self.assign_to_species(genome);
        }
        self.species.retain(|s| !s.is_empty());
    }

    fn assign_to_species(&mut self, genome: NetworkGenome) {
        for species in &mut self.species {
            if species.is_compatible(&genome, self.compatibility_threshold, &self.genetic_config)
            {
                species.add_member(genome);
                return;
            }
        }
        self.species.push(Species::new(genome));
    }

    /// Nudges the compatibility threshold by one step toward the
    /// target species count, never below the configured floor.
    fn adjust_compatibility_threshold(&mut self) {
        if self.species.len() < self.population_config.target_species {
            self.compatibility_threshold -= self.population_config.threshold_adjustment;
        } else if self.species.len() > self.population_config.target_species {
            self.compatibility_threshold += self.population_config.threshold_adjustment;
        }
        self.compatibility_threshold = self
            .compatibility_threshold
            .max(self.population_config.threshold_floor);
    }

    /// Applies fitness sharing to every species and computes each
    /// one's offspring quota. One-shot per generation: member
    /// fitness is divided in place.
    fn allocate_offspring(&mut self) {
        let total_shared_fitness: f64 = self
            .species
            .iter_mut()
            .map(|s| s.shared_fitness())
            .sum();
        for species in &mut self.species {
            species.allocate_offspring(
                total_shared_fitness,
                self.population_config.size.get(),
            );
        }
    }

    /// Clones of the `elitism` best genomes of the parent pool.
    fn global_elites(&self, parent_pool: &[NetworkGenome]) -> Vec<NetworkGenome> {
        let mut elites: Vec<&NetworkGenome> = parent_pool.iter().collect();
        elites.sort_by(|a, b| {
            b.fitness()
                .partial_cmp(&a.fitness())
                .unwrap_or_else(|| panic!("NaN fitness value in population"))
        });
        elites
            .into_iter()
            .take(self.population_config.elitism)
            .cloned()
            .collect()
    }

    /// Tournament selection over the parent pool: the fittest of
    /// `tournament_size` uniformly random picks. `None` for an
    /// empty pool.
    fn tournament_select<'a>(
        &mut self,
        parent_pool: &'a [NetworkGenome],
    ) -> Option<&'a NetworkGenome> {
        if parent_pool.is_empty() {
            return None;
        }
        (0..self.population_config.tournament_size)
            .map(|_| &parent_pool[self.rng.gen_range(0..parent_pool.len())])
            .max_by(|a, b| {
                a.fitness()
                    .partial_cmp(&b.fitness())
                    .unwrap_or_else(|| panic!("NaN fitness value in population"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::num::NonZeroUsize;

    fn driver(size: usize, max_generations: usize, seed: u64) -> Neat<StdRng> {
        Neat::new(
            StdRng::seed_from_u64(seed),
            NeatCrossover,
            NeatMutation,
            GeneticConfig::standard(
                NonZeroUsize::new(2).unwrap(),
                NonZeroUsize::new(1).unwrap(),
            ),
            PopulationConfig::standard(
                NonZeroUsize::new(size).unwrap(),
                NonZeroUsize::new(max_generations).unwrap(),
            ),
        )
    }

    struct ConstantFitness(f64);

    impl Environment for ConstantFitness {
        fn evaluate(&mut self, _: &NetworkGenome) -> f64 {
            self.0
        }

        fn solved(&mut self, _: &NetworkGenome) -> bool {
            false
        }
    }

    /// Rewards smaller first outputs for the all-ones input.
    struct PushDown;

    impl Environment for PushDown {
        fn evaluate(&mut self, genome: &NetworkGenome) -> f64 {
            1.0 - genome.get_output(&[1.0, 1.0])[0]
        }

        fn solved(&mut self, _: &NetworkGenome) -> bool {
            false
        }
    }

    #[test]
    fn initial_population_has_the_configured_size() {
        let neat = driver(30, 5, 40);
        assert_eq!(neat.genomes().count(), 30);
        assert!(neat.species().iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn speciation_partitions_the_population() {
        let mut neat = driver(40, 5, 41);
        neat.evaluate_fitness(&mut ConstantFitness(1.0));
        neat.speciate_population();

        let member_total: usize = neat.species().iter().map(|s| s.len()).sum();
        assert_eq!(member_total, 40);
        assert!(neat.species().iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn evolution_preserves_the_population_size() {
        let mut neat = driver(25, 5, 42);
        let mut environment = PushDown;
        for _ in 0..5 {
            neat.evaluate_fitness(&mut environment);
            neat.evolve();
            assert_eq!(neat.genomes().count(), 25);
        }
    }

    #[test]
    fn threshold_never_drops_below_the_floor() {
        let mut neat = driver(10, 5, 43);
        let mut environment = ConstantFitness(1.0);
        for _ in 0..20 {
            neat.evaluate_fitness(&mut environment);
            neat.evolve();
            assert!(neat.compatibility_threshold() >= 1.0);
        }
    }

    #[test]
    fn zero_fitness_populations_keep_evolving() {
        let mut neat = driver(15, 5, 44);
        let mut environment = ConstantFitness(0.0);
        for _ in 0..3 {
            neat.evaluate_fitness(&mut environment);
            neat.evolve();
        }
        assert_eq!(neat.genomes().count(), 15);
        // Every surviving species got its diversity-floor quota.
        assert!(neat.species().iter().all(|s| s.offspring_count() >= 1));
    }

    #[test]
    fn solve_stops_at_the_generation_limit() {
        let mut neat = driver(10, 3, 45);
        let best = neat.solve(&mut ConstantFitness(2.0));
        assert_eq!(neat.generation(), 3);
        // Best-ever tracking captures the raw evaluated fitness,
        // before fitness sharing divides it.
        assert_eq!(best.fitness(), 2.0);
    }

    #[test]
    fn solve_returns_immediately_on_a_solving_champion() {
        struct AlwaysSolved;
        impl Environment for AlwaysSolved {
            fn evaluate(&mut self, _: &NetworkGenome) -> f64 {
                1.0
            }
            fn solved(&mut self, _: &NetworkGenome) -> bool {
                true
            }
        }

        let mut neat = driver(10, 5, 46);
        let best = neat.solve(&mut AlwaysSolved);
        assert_eq!(neat.generation(), 0);
        assert_eq!(best.fitness(), 1.0);
    }

    #[test]
    fn fixed_seeds_reproduce_runs() {
        let mut first = driver(20, 4, 47);
        let mut second = driver(20, 4, 47);

        let best_first = first.solve(&mut PushDown);
        let best_second = second.solve(&mut PushDown);

        assert_eq!(best_first.fitness(), best_second.fitness());
        assert_eq!(
            best_first.get_output(&[1.0, 1.0]),
            best_second.get_output(&[1.0, 1.0])
        );
    }
}
