use crate::genomics::{
    GeneticConfig, InnovationRegistry, NeatCrossover, NeatMutation, NetworkGenome,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A cluster of genomes within a compatibility threshold of a
/// shared representative.
///
/// Species are the unit of fitness sharing: a genome competes
/// primarily within its species, so novel topologies get time to
/// optimize before facing the whole population. The representative
/// is the best member as of the species' last evolution (its
/// founding genome before that).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Species {
    representative: NetworkGenome,
    members: Vec<NetworkGenome>,
    shared_fitness: f64,
    offspring_count: usize,
}

impl Species {
    /// Creates a species founded by `representative`, which also
    /// becomes its first member.
    pub fn new(representative: NetworkGenome) -> Species {
        Species {
            members: vec![representative.clone()],
            representative,
            shared_fitness: 0.0,
            offspring_count: 0,
        }
    }

    /// Returns whether `genome`'s compatibility distance to the
    /// species representative is strictly below `threshold`.
    pub fn is_compatible(
        &self,
        genome: &NetworkGenome,
        threshold: f64,
        config: &GeneticConfig,
    ) -> bool {
        self.compatibility_distance(genome, config) < threshold
    }

    /// Computes the compatibility distance between `genome` and the
    /// species representative:
    ///
    /// `c1·excess/N + c2·disjoint/N + c3·avg_weight_difference`
    ///
    /// where `N` is the larger of the two genomes' gene counts and
    /// the coefficients come from `config`. Two genomes without any
    /// connection genes are at distance 0.
    pub fn compatibility_distance(&self, genome: &NetworkGenome, config: &GeneticConfig) -> f64 {
        let n = genome.gene_count().max(self.representative.gene_count());
        if n == 0 {
            return 0.0;
        }
        let excess = genome.count_excess_genes(&self.representative) as f64;
        let disjoint = genome.count_disjoint_genes(&self.representative) as f64;
        let weight_difference = genome.average_weight_difference(&self.representative);
        config.excess_gene_factor * excess / n as f64
            + config.disjoint_gene_factor * disjoint / n as f64
            + config.weight_difference_factor * weight_difference
    }

    /// Replaces every member's raw fitness with its shared fitness
    /// (raw fitness divided by species size) and returns the sum of
    /// the members' shared fitness.
    ///
    /// This is a one-shot, non-idempotent operation: shared fitness
    /// replaces raw fitness for all subsequent uses this generation,
    /// and a second call would divide again. The returned sum is
    /// cached for [`allocate_offspring`].
    ///
    /// [`allocate_offspring`]: Species::allocate_offspring
    pub fn shared_fitness(&mut self) -> f64 {
        let size = self.members.len() as f64;
        for member in &mut self.members {
            let shared = member.fitness() / size;
            member.set_fitness(shared);
        }
        self.shared_fitness = self.members.iter().map(|m| m.fitness()).sum();
        self.shared_fitness
    }

    /// Sets the species' offspring quota for the coming generation:
    /// its proportional share of the population by shared fitness,
    /// floored at 1 so every surviving species reproduces. A
    /// non-positive `total_shared_fitness` degenerates to the floor.
    ///
    /// Call after [`shared_fitness`], whose cached sum the quota is
    /// computed from.
    ///
    /// [`shared_fitness`]: Species::shared_fitness
    pub fn allocate_offspring(&mut self, total_shared_fitness: f64, population_size: usize) {
        self.offspring_count = if total_shared_fitness <= 0.0 {
            1
        } else {
            let quota = self.shared_fitness / total_shared_fitness * population_size as f64;
            if quota < 1.0 {
                1
            } else {
                quota as usize
            }
        };
    }

    /// Replaces the species' members with the next generation:
    /// clones of the current top `elitism` members, then offspring
    /// bred by roulette-selecting two parents, crossing them and
    /// mutating the child until the offspring quota is met. The new
    /// best member becomes the representative.
    ///
    /// # Panics
    /// If the species has no members or a member's fitness is NaN.
    pub fn evolve(
        &mut self,
        crossover: &NeatCrossover,
        mutation: &NeatMutation,
        elitism: usize,
        config: &GeneticConfig,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) {
        self.sort_members_descending();

        let mut next: Vec<NetworkGenome> = self
            .members
            .iter()
            .take(elitism)
            .cloned()
            .collect();

        let total: f64 = self.members.iter().map(|m| m.fitness()).sum();
        let probabilities: Vec<f64> = self
            .members
            .iter()
            .map(|m| m.fitness() / total)
            .collect();

        while next.len() < self.offspring_count {
            let parent1 = self.select_parent(&probabilities, rng);
            let parent2 = self.select_parent(&probabilities, rng);
            let child = crossover.apply(parent1, parent2, config, rng);
            next.push(mutation.apply(&child, config, registry, rng));
        }

        self.members = next;
        self.sort_members_descending();
        self.representative = self.members[0].clone();
    }

    /// Fitness-proportional selection over the current members.
    /// Degenerate probability distributions (all-zero or NaN from a
    /// zero fitness total) fall through to the last member.
    fn select_parent<'a>(
        &'a self,
        probabilities: &[f64],
        rng: &mut impl Rng,
    ) -> &'a NetworkGenome {
        let roll: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (member, probability) in self.members.iter().zip(probabilities) {
            cumulative += probability;
            if roll <= cumulative {
                return member;
            }
        }
        self.members.last().expect("empty species has no members")
    }

    fn sort_members_descending(&mut self) {
        self.members.sort_by(|a, b| {
            b.fitness()
                .partial_cmp(&a.fitness())
                .unwrap_or_else(|| panic!("NaN fitness value in species"))
        });
    }

    /// Returns the species' best member by fitness.
    ///
    /// # Panics
    /// If the species has no members.
    pub fn champion(&self) -> &NetworkGenome {
        self.members
            .iter()
            .max_by(|a, b| {
                a.fitness()
                    .partial_cmp(&b.fitness())
                    .unwrap_or_else(|| panic!("NaN fitness value in species"))
            })
            .expect("empty species has no champion")
    }

    /// Returns the species' current representative.
    pub fn representative(&self) -> &NetworkGenome {
        &self.representative
    }

    /// Returns an iterator over the species' members.
    pub fn members(&self) -> impl Iterator<Item = &NetworkGenome> {
        self.members.iter()
    }

    /// Returns the number of members in the species.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the species has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the species' current offspring quota.
    pub fn offspring_count(&self) -> usize {
        self.offspring_count
    }

    pub(crate) fn add_member(&mut self, genome: NetworkGenome) {
        self.members.push(genome);
    }

    pub(crate) fn clear_members(&mut self) {
        self.members.clear();
    }
}
