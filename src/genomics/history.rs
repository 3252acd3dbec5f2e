use crate::genomics::NeuronGene;
use crate::Innovation;

use serde::{Deserialize, Serialize};

/// A single entry of the innovation registry: the stable id
/// assigned to the structural change connecting `source` to
/// `target`.
///
/// The `seen` flag is transient bookkeeping, raised whenever a
/// lookup returns this record again.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InnovationRecord {
    id: Innovation,
    source: NeuronGene,
    target: NeuronGene,
    seen: bool,
}

impl InnovationRecord {
    /// Returns the record's innovation number.
    pub fn id(&self) -> Innovation {
        self.id
    }

    /// Returns the source neuron of the recorded structural change.
    pub fn source(&self) -> &NeuronGene {
        &self.source
    }

    /// Returns the target neuron of the recorded structural change.
    pub fn target(&self) -> &NeuronGene {
        &self.target
    }

    /// Returns whether a later lookup has resolved to this record.
    pub fn seen(&self) -> bool {
        self.seen
    }
}

/// The process-wide ledger of structural innovations.
///
/// Every structural change (performed by the genome factory, the
/// neuron-addition mutation or the connection-addition mutation, on
/// any genome in the population) resolves its `(source, target)`
/// neuron pairing through one shared registry.
/// Identical changes made independently thus converge on a single
/// innovation number, which is what makes crossover alignment and
/// compatibility distance meaningful across the whole run.
///
/// Neuron identity is [`NeuronGene`] equality: `(id, depth, role)`.
/// The registry only ever grows, and lives for the entire run.
///
/// This type is single-threaded; anyone parallelizing mutation or
/// evaluation must serialize calls to [`resolve`] behind a mutex,
/// or racing insertions of the same change would mint two ids for
/// one innovation.
///
/// [`resolve`]: InnovationRegistry::resolve
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InnovationRegistry {
    records: Vec<InnovationRecord>,
}

impl InnovationRegistry {
    /// Creates an empty registry.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::InnovationRegistry;
    ///
    /// let registry = InnovationRegistry::new();
    /// assert!(registry.is_empty());
    /// ```
    pub fn new() -> InnovationRegistry {
        InnovationRegistry { records: vec![] }
    }

    /// Returns the innovation number of the structural change
    /// connecting `source` to `target`, minting a fresh one if the
    /// change has never been recorded.
    ///
    /// Fresh ids are allocated monotonically as the current record
    /// count. A lookup that hits an existing record marks it as seen.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{ActivationType, InnovationRegistry, NeuronGene, NeuronRole};
    ///
    /// let mut registry = InnovationRegistry::new();
    /// let a = NeuronGene::new(0, ActivationType::None, NeuronRole::Input, 0.0);
    /// let b = NeuronGene::new(1, ActivationType::Tanh, NeuronRole::Output, 1.0);
    ///
    /// let id = registry.resolve(&a, &b);
    ///
    /// // The same pairing always resolves to the same id.
    /// assert_eq!(registry.resolve(&a, &b), id);
    ///
    /// // The reverse pairing is a different structural change.
    /// assert_ne!(registry.resolve(&b, &a), id);
    /// ```
    pub fn resolve(&mut self, source: &NeuronGene, target: &NeuronGene) -> Innovation {
        for record in &mut self.records {
            if record.source == *source && record.target == *target {
                record.seen = true;
                return record.id;
            }
        }

        let id = self.records.len();
        self.records.push(InnovationRecord {
            id,
            source: source.clone(),
            target: target.clone(),
            seen: false,
        });
        id
    }

    /// Returns the number of recorded innovations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the registry has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the complete record of innovations,
    /// in order of allocation.
    pub fn records(&self) -> impl Iterator<Item = &InnovationRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ActivationType, NeuronRole};

    fn input(id: usize) -> NeuronGene {
        NeuronGene::new(id, ActivationType::None, NeuronRole::Input, 0.0)
    }

    fn output(id: usize) -> NeuronGene {
        NeuronGene::new(id, ActivationType::Tanh, NeuronRole::Output, 1.0)
    }

    #[test]
    fn ids_are_monotonic_and_stable() {
        let mut registry = InnovationRegistry::new();

        let first = registry.resolve(&input(0), &output(2));
        let second = registry.resolve(&input(1), &output(2));
        assert_eq!(first, 0);
        assert_eq!(second, 1);

        // Re-resolving either pairing returns the original id
        // without growing the registry.
        assert_eq!(registry.resolve(&input(0), &output(2)), first);
        assert_eq!(registry.resolve(&input(1), &output(2)), second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_marks_records_as_seen() {
        let mut registry = InnovationRegistry::new();
        registry.resolve(&input(0), &output(1));
        assert!(!registry.records().next().unwrap().seen());

        registry.resolve(&input(0), &output(1));
        assert!(registry.records().next().unwrap().seen());
    }

    #[test]
    fn neuron_identity_includes_depth_and_role() {
        let mut registry = InnovationRegistry::new();
        let hidden = NeuronGene::new(5, ActivationType::Tanh, NeuronRole::Hidden, 0.5);
        let deeper = NeuronGene::new(5, ActivationType::Tanh, NeuronRole::Hidden, 0.75);

        let a = registry.resolve(&input(0), &hidden);
        let b = registry.resolve(&input(0), &deeper);
        assert_ne!(a, b);
    }
}
