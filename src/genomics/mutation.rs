use crate::genomics::errors::MutationError;
use crate::genomics::{
    ActivationType, ConnectionGene, GeneticConfig, InnovationRegistry, NetworkGenome, NeuronGene,
    NeuronRole,
};
use crate::NeuronId;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::StandardNormal;

/// The mutation operator.
///
/// [`apply`] clones the parent genome and performs exactly one of
/// four actions on the clone, chosen by independent probability
/// draws in a fixed priority order: neuron addition, else
/// connection addition, else weight mutation, else connection
/// toggling. The parent is never modified.
///
/// Structural dead-ends (no connection to split or toggle, no
/// neuron pair left to connect) are benign no-ops returning the
/// unchanged clone, so mutation never fails the generational loop.
/// The individual actions are also exposed directly for callers
/// composing their own operators.
///
/// [`apply`]: NeatMutation::apply
#[derive(Clone, Copy, Debug, Default)]
pub struct NeatMutation;

impl NeatMutation {
    /// Returns a mutated clone of `parent`.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{
    ///     GeneticConfig, InnovationRegistry, NeatMutation, NetworkGenome,
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
    /// let parent = NetworkGenome::new(&config, &mut registry, &mut rng);
    /// let parent_genes = parent.gene_count();
    ///
    /// let child = NeatMutation.apply(&parent, &config, &mut registry, &mut rng);
    ///
    /// // The parent is untouched, whatever happened to the child.
    /// assert_eq!(parent.gene_count(), parent_genes);
    /// ```
    pub fn apply(
        &self,
        parent: &NetworkGenome,
        config: &GeneticConfig,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) -> NetworkGenome {
        if rng.gen::<f64>() < config.neuron_addition_chance {
            self.add_neuron(parent, registry, rng)
        } else if rng.gen::<f64>() < config.connection_addition_chance {
            self.add_connection(parent, registry, rng)
        } else if rng.gen::<f64>() < config.weight_mutation_chance {
            self.mutate_weights(parent, config, rng)
        } else {
            self.toggle_connection(parent, rng)
        }
    }

    /// Returns a clone of `parent` with one connection split by a
    /// new hidden neuron.
    ///
    /// A uniformly random connection (enabled or not) is disabled
    /// and replaced by a tanh hidden neuron at the midpoint of its
    /// endpoints' depths, wired source→new with weight 1 and
    /// new→target with the split connection's weight. The new
    /// neuron's id is the genome's highest id plus one; both
    /// replacement connections resolve their innovation numbers
    /// through the registry.
    ///
    /// No-op if the genome has no connections.
    pub fn add_neuron(
        &self,
        parent: &NetworkGenome,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) -> NetworkGenome {
        let mut child = parent.clone();
        // Dead ends leave the clone unchanged.
        let _ = Self::split_connection(&mut child, registry, rng);
        child
    }

    /// Returns a clone of `parent` with one new feed-forward
    /// connection, if any viable neuron pair remains.
    ///
    /// Sources are all non-output neurons, targets all non-input,
    /// non-bias neurons. Both candidate lists are shuffled, and the
    /// first pair with distinct ids, strictly increasing depth and
    /// no existing connection receives a uniform [-1, 1] weight and
    /// a registry-resolved innovation number.
    ///
    /// No-op if every viable pair is already connected.
    pub fn add_connection(
        &self,
        parent: &NetworkGenome,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) -> NetworkGenome {
        let mut child = parent.clone();
        let _ = Self::connect_pair(&mut child, registry, rng);
        child
    }

    /// Returns a clone of `parent` with every connection's weight
    /// mutated: with probability `weight_reset_chance` the weight
    /// is replaced by a fresh uniform [-1, 1] draw, otherwise
    /// gaussian noise scaled by `weight_perturbation_power` is
    /// added to it.
    pub fn mutate_weights(
        &self,
        parent: &NetworkGenome,
        config: &GeneticConfig,
        rng: &mut impl Rng,
    ) -> NetworkGenome {
        let mut child = parent.clone();
        for connection in &mut child.connections {
            if rng.gen::<f64>() < config.weight_reset_chance {
                connection.set_weight(rng.gen_range(-1.0..=1.0));
            } else {
                let noise: f64 = rng.sample(StandardNormal);
                connection.set_weight(connection.weight() + noise * config.weight_perturbation_power);
            }
        }
        child
    }

    /// Returns a clone of `parent` with one uniformly random
    /// connection's enabled status flipped.
    ///
    /// No-op if the genome has no connections.
    pub fn toggle_connection(&self, parent: &NetworkGenome, rng: &mut impl Rng) -> NetworkGenome {
        let mut child = parent.clone();
        if !child.connections.is_empty() {
            let index = rng.gen_range(0..child.connections.len());
            let enabled = child.connections[index].enabled();
            child.connections[index].set_enabled(!enabled);
        }
        child
    }

    fn split_connection(
        child: &mut NetworkGenome,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) -> Result<(), MutationError> {
        if child.connections.is_empty() {
            return Err(MutationError::EmptyGenome);
        }

        let index = rng.gen_range(0..child.connections.len());
        child.connections[index].set_enabled(false);
        let (source, target, weight) = {
            let split = &child.connections[index];
            (split.source(), split.target(), split.weight())
        };

        let id = child.max_neuron_id() + 1;
        let depth = (child.neurons[&source].depth() + child.neurons[&target].depth()) / 2.0;
        let hidden = NeuronGene::new(id, ActivationType::Tanh, NeuronRole::Hidden, depth);

        let incoming = registry.resolve(&child.neurons[&source], &hidden);
        let outgoing = registry.resolve(&hidden, &child.neurons[&target]);
        child
            .connections
            .push(ConnectionGene::new(source, id, 1.0, true, incoming));
        child
            .connections
            .push(ConnectionGene::new(id, target, weight, true, outgoing));
        child.neurons.insert(id, hidden);
        Ok(())
    }

    fn connect_pair(
        child: &mut NetworkGenome,
        registry: &mut InnovationRegistry,
        rng: &mut impl Rng,
    ) -> Result<(), MutationError> {
        let mut sources: Vec<NeuronId> = child
            .neurons
            .values()
            .filter(|n| n.role() != NeuronRole::Output)
            .map(|n| n.id())
            .collect();
        let mut targets: Vec<NeuronId> = child
            .neurons
            .values()
            .filter(|n| !matches!(n.role(), NeuronRole::Input | NeuronRole::Bias))
            .map(|n| n.id())
            .collect();

        // Table iteration order varies between maps; sorting before
        // shuffling keeps fixed-seed runs reproducible.
        sources.sort_unstable();
        targets.sort_unstable();
        sources.shuffle(rng);
        targets.shuffle(rng);

        for &source in &sources {
            for &target in &targets {
                if source != target
                    && child.neurons[&source].depth() < child.neurons[&target].depth()
                    && !child.has_connection(source, target)
                {
                    let innovation =
                        registry.resolve(&child.neurons[&source], &child.neurons[&target]);
                    child.connections.push(ConnectionGene::new(
                        source,
                        target,
                        rng.gen_range(-1.0..=1.0),
                        true,
                        innovation,
                    ));
                    return Ok(());
                }
            }
        }
        Err(MutationError::NoViablePair)
    }
}
