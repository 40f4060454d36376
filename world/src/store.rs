//! Ordered collection of placed instances and identity allocation.

use std::collections::HashSet;

use farm_planner_core::{CatalogId, CellCoord, InstanceId, ItemDefinition, PlacedInstance};

const FIRST_SEQUENCE: u64 = 1;

/// Insertion-ordered set of placed instances, unique by [`InstanceId`].
///
/// Owns the identity counter: sequences only grow for the lifetime of the
/// store, including across [`PlacementStore::clear`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementStore {
    entries: Vec<PlacedInstance>,
    next_sequence: u64,
}

impl Default for PlacementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementStore {
    /// Creates an empty store with a fresh identity counter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: FIRST_SEQUENCE,
        }
    }

    /// Rebuilds a store from previously persisted instances.
    ///
    /// Later duplicates of an id are dropped. The counter resumes past the
    /// largest sequence found so new ids never collide with loaded ones.
    #[must_use]
    pub fn from_instances(instances: impl IntoIterator<Item = PlacedInstance>) -> Self {
        let mut seen = HashSet::new();
        let mut store = Self::new();
        for instance in instances {
            if !seen.insert(instance.id.clone()) {
                tracing::warn!(instance = %instance.id, "dropping duplicate placed instance");
                continue;
            }
            if let Some(sequence) = instance.id.sequence() {
                match sequence.checked_add(1) {
                    Some(next) => store.next_sequence = store.next_sequence.max(next),
                    None => {
                        tracing::warn!(
                            instance = %instance.id,
                            "sequence exhausted, not seeding counter"
                        );
                    }
                }
            }
            store.entries.push(instance);
        }
        store
    }

    /// Iterator over the placed instances in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedInstance> {
        self.entries.iter()
    }

    /// Number of placed instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an instance by id.
    #[must_use]
    pub fn get(&self, id: &InstanceId) -> Option<&PlacedInstance> {
        self.entries.iter().find(|instance| &instance.id == id)
    }

    /// Returns the instance whose occupied cells contain `cell`, if any.
    #[must_use]
    pub fn instance_at(&self, cell: CellCoord) -> Option<&PlacedInstance> {
        self.entries.iter().find(|instance| instance.occupies(cell))
    }

    /// Counts placed instances per catalog item, in order of first placement.
    #[must_use]
    pub fn counts_by_catalog(&self) -> Vec<(CatalogId, usize)> {
        let mut counts: Vec<(CatalogId, usize)> = Vec::new();
        for instance in &self.entries {
            match counts
                .iter_mut()
                .find(|(id, _)| id == &instance.definition.id)
            {
                Some((_, count)) => *count += 1,
                None => counts.push((instance.definition.id.clone(), 1)),
            }
        }
        counts
    }

    /// Sequence the next placement will receive.
    #[must_use]
    pub const fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Assigns the next free sequence. Ids already in the store are skipped,
    /// and the counter wraps to the first sequence when exhausted.
    pub(crate) fn insert(&mut self, definition: ItemDefinition, anchor: CellCoord) -> PlacedInstance {
        let id = loop {
            let candidate = InstanceId::new(&definition.id, self.next_sequence);
            self.next_sequence = self.next_sequence.checked_add(1).unwrap_or(FIRST_SEQUENCE);
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        let instance = PlacedInstance {
            id,
            definition,
            anchor,
        };
        self.entries.push(instance.clone());
        instance
    }

    pub(crate) fn remove(&mut self, id: &InstanceId) -> Option<PlacedInstance> {
        let position = self.entries.iter().position(|instance| &instance.id == id)?;
        Some(self.entries.remove(position))
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }
}
