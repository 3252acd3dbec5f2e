use crate::genomics::{ConnectionGene, GeneticConfig, NetworkGenome};
use crate::Innovation;

use ahash::RandomState;
use rand::Rng;

use std::collections::HashMap;

/// The crossover operator.
///
/// Recombines two parent genomes into a child biased toward the
/// fitter parent: the child's topology is the fitter parent's, and
/// only genes both parents carry can contribute the other parent's
/// weight. Neither parent is modified.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeatCrossover;

impl NeatCrossover {
    /// Returns the offspring of the two parent genomes.
    ///
    /// The fitter parent is the one with higher fitness; ties go to
    /// `parent1`. For each of the fitter parent's connection genes,
    /// in stored order: a gene whose innovation number also appears
    /// in the other parent is *matching* and is cloned from either
    /// parent with equal probability, keeping that side's weight and
    /// enabled status; a gene exclusive to the fitter parent is
    /// cloned from it unconditionally. The other parent's exclusive
    /// genes are never inherited. Every inherited gene's weight is
    /// then jittered by an independent uniform draw in
    /// ±`crossover_weight_perturbation`.
    ///
    /// The child's neuron table is copied from the fitter parent,
    /// and its fitness starts at 0.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{
    ///     GeneticConfig, InnovationRegistry, NeatCrossover, NetworkGenome,
    /// };
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
    /// let mut first = NetworkGenome::new(&config, &mut registry, &mut rng);
    /// let second = NetworkGenome::new(&config, &mut registry, &mut rng);
    /// first.set_fitness(2.0);
    ///
    /// let child = NeatCrossover.apply(&first, &second, &config, &mut rng);
    ///
    /// assert_eq!(child.gene_count(), first.gene_count());
    /// assert_eq!(child.fitness(), 0.0);
    /// ```
    pub fn apply(
        &self,
        parent1: &NetworkGenome,
        parent2: &NetworkGenome,
        config: &GeneticConfig,
        rng: &mut impl Rng,
    ) -> NetworkGenome {
        let (fitter, other) = if parent1.fitness() >= parent2.fitness() {
            (parent1, parent2)
        } else {
            (parent2, parent1)
        };

        let other_genes: HashMap<Innovation, &ConnectionGene, RandomState> = other
            .connections
            .iter()
            .map(|c| (c.innovation(), c))
            .collect();

        let jitter = config.crossover_weight_perturbation;
        let mut connections = Vec::with_capacity(fitter.connections.len());
        for gene in &fitter.connections {
            let mut inherited = match other_genes.get(&gene.innovation()) {
                Some(counterpart) if rng.gen::<bool>() => (*counterpart).clone(),
                _ => gene.clone(),
            };
            inherited.set_weight(inherited.weight() + rng.gen_range(-jitter..=jitter));
            connections.push(inherited);
        }

        NetworkGenome {
            neurons: fitter.neurons.clone(),
            connections,
            fitness: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ActivationType, NeuronGene, NeuronRole};
    use crate::NeuronId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::num::NonZeroUsize;

    fn config() -> GeneticConfig {
        GeneticConfig::standard(NonZeroUsize::new(1).unwrap(), NonZeroUsize::new(1).unwrap())
    }

    fn genome(genes: &[(Innovation, f64)], fitness: f64) -> NetworkGenome {
        let mut neurons: HashMap<NeuronId, NeuronGene, RandomState> = HashMap::default();
        neurons.insert(
            0,
            NeuronGene::new(0, ActivationType::None, NeuronRole::Input, 0.0),
        );
        neurons.insert(
            1,
            NeuronGene::new(1, ActivationType::Tanh, NeuronRole::Output, 1.0),
        );
        NetworkGenome {
            neurons,
            connections: genes
                .iter()
                .map(|(innovation, weight)| ConnectionGene::new(0, 1, *weight, true, *innovation))
                .collect(),
            fitness,
        }
    }

    #[test]
    fn exclusive_genes_come_from_the_fitter_parent_only() {
        let fitter = genome(&[(1, 0.5), (2, -0.5)], 5.0);
        let weaker = genome(&[(2, 0.75), (3, 1.0)], 3.0);
        let mut rng = StdRng::seed_from_u64(20);

        for _ in 0..50 {
            let child = NeatCrossover.apply(&fitter, &weaker, &config(), &mut rng);
            let innovations: Vec<Innovation> =
                child.connections().map(|c| c.innovation()).collect();
            assert_eq!(innovations, vec![1, 2]);

            // Gene 2 matches, so its weight is one parent's plus
            // jitter in [-0.1, 0.1].
            let matched = child.connections().find(|c| c.innovation() == 2).unwrap();
            let near = |base: f64| (matched.weight() - base).abs() <= 0.1 + 1e-12;
            assert!(near(-0.5) || near(0.75));
        }
    }

    #[test]
    fn matching_genes_keep_the_chosen_parents_enabled_flag() {
        let mut fitter = genome(&[(1, 0.5)], 5.0);
        let mut weaker = genome(&[(1, 5.0)], 3.0);
        weaker.connections[0].set_enabled(false);
        let mut rng = StdRng::seed_from_u64(25);

        let mut saw_enabled = false;
        let mut saw_disabled = false;
        for _ in 0..50 {
            let child = NeatCrossover.apply(&fitter, &weaker, &config(), &mut rng);
            let inherited = child.connections().next().unwrap();

            // The weights are far apart, so they identify which
            // parent the gene was cloned from; the enabled flag
            // must come from the same parent.
            if (inherited.weight() - 0.5).abs() <= 0.1 + 1e-12 {
                assert!(inherited.enabled());
                saw_enabled = true;
            } else {
                assert!((inherited.weight() - 5.0).abs() <= 0.1 + 1e-12);
                assert!(!inherited.enabled());
                saw_disabled = true;
            }
        }
        assert!(saw_enabled && saw_disabled);

        // The same holds with the disabled copy on the fitter side.
        fitter.connections[0].set_enabled(false);
        weaker.connections[0].set_enabled(true);
        let child = NeatCrossover.apply(&fitter, &weaker, &config(), &mut rng);
        let inherited = child.connections().next().unwrap();
        assert_eq!(
            inherited.enabled(),
            (inherited.weight() - 5.0).abs() <= 0.1 + 1e-12
        );
    }

    #[test]
    fn argument_order_does_not_change_the_fitter_parent() {
        let fitter = genome(&[(1, 0.5), (2, -0.5)], 5.0);
        let weaker = genome(&[(2, 0.75), (3, 1.0)], 3.0);
        let mut rng = StdRng::seed_from_u64(21);

        let child = NeatCrossover.apply(&weaker, &fitter, &config(), &mut rng);
        let innovations: Vec<Innovation> = child.connections().map(|c| c.innovation()).collect();
        assert_eq!(innovations, vec![1, 2]);
    }

    #[test]
    fn ties_favor_the_first_argument() {
        let first = genome(&[(1, 0.5)], 4.0);
        let second = genome(&[(2, 1.0)], 4.0);
        let mut rng = StdRng::seed_from_u64(22);

        let child = NeatCrossover.apply(&first, &second, &config(), &mut rng);
        assert_eq!(child.connections().next().unwrap().innovation(), 1);
    }

    #[test]
    fn child_fitness_is_reset() {
        let first = genome(&[(1, 0.5)], 4.0);
        let second = genome(&[(1, 1.0)], 2.0);
        let mut rng = StdRng::seed_from_u64(23);

        let child = NeatCrossover.apply(&first, &second, &config(), &mut rng);
        assert_eq!(child.fitness(), 0.0);
    }

    #[test]
    fn child_shares_the_fitter_parents_topology() {
        let mut registry = crate::genomics::InnovationRegistry::new();
        let mut rng = StdRng::seed_from_u64(24);
        let config = config();

        let mut first = NetworkGenome::new(&config, &mut registry, &mut rng);
        let second = NetworkGenome::new(&config, &mut registry, &mut rng);
        first.set_fitness(1.0);

        let child = NeatCrossover.apply(&first, &second, &config, &mut rng);
        assert_eq!(child.neurons().count(), first.neurons().count());
        for neuron in child.neurons() {
            assert_eq!(Some(neuron), first.neuron(neuron.id()));
        }
    }
}
