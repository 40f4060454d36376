//! Placement validation and store mutation.

use std::fmt;

use farm_planner_core::{CellCoord, CellRect, InstanceId, ItemDefinition, PlacedInstance};

use crate::{store::PlacementStore, terrain::TerrainMap};

/// Internal cause of a rejected placement, kept for diagnostics only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rejection {
    OutOfBounds,
    Unbuildable(CellCoord),
    Occupied(CellCoord),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "footprint leaves the grid"),
            Self::Unbuildable(cell) => write!(f, "terrain at {cell} is not buildable"),
            Self::Occupied(cell) => write!(f, "cell {cell} is already occupied"),
        }
    }
}

/// Decides placement legality against a fixed terrain.
#[derive(Clone, Debug)]
pub struct PlacementEngine {
    terrain: TerrainMap,
}

impl PlacementEngine {
    /// Creates an engine validating against the provided terrain.
    #[must_use]
    pub const fn new(terrain: TerrainMap) -> Self {
        Self { terrain }
    }

    /// Terrain the engine validates against.
    #[must_use]
    pub const fn terrain(&self) -> &TerrainMap {
        &self.terrain
    }

    /// Reports whether `item` may be placed at `anchor` given the current store.
    ///
    /// A placement is legal when every occupied cell is inside the grid, on
    /// buildable terrain, and not occupied by an existing instance.
    #[must_use]
    pub fn validate(&self, anchor: CellCoord, item: &ItemDefinition, store: &PlacementStore) -> bool {
        match self.check(anchor, item, store) {
            Ok(()) => true,
            Err(reason) => {
                tracing::trace!(item = %item.id, %anchor, %reason, "placement invalid");
                false
            }
        }
    }

    /// Places `item` at `anchor`, assigning the next instance id.
    ///
    /// Does not validate. Callers must check [`PlacementEngine::validate`]
    /// against the same store first.
    pub fn place(
        &self,
        anchor: CellCoord,
        item: ItemDefinition,
        store: &mut PlacementStore,
    ) -> PlacedInstance {
        let instance = store.insert(item, anchor);
        tracing::debug!(instance = %instance.id, %anchor, "item placed");
        instance
    }

    /// Removes the instance with `id`. Unknown ids are ignored.
    pub fn remove(&self, id: &InstanceId, store: &mut PlacementStore) -> Option<PlacedInstance> {
        let removed = store.remove(id);
        if removed.is_some() {
            tracing::debug!(instance = %id, "item removed");
        }
        removed
    }

    /// Lifts an instance off the grid, returning its definition and former anchor.
    pub fn begin_move(
        &self,
        id: &InstanceId,
        store: &mut PlacementStore,
    ) -> Option<(ItemDefinition, CellCoord)> {
        self.remove(id, store)
            .map(|instance| (instance.definition, instance.anchor))
    }

    fn check(
        &self,
        anchor: CellCoord,
        item: &ItemDefinition,
        store: &PlacementStore,
    ) -> Result<(), Rejection> {
        let region = item.geometry.occupied_region(anchor);
        if !self.terrain.contains(anchor) || !self.encloses(&region) {
            return Err(Rejection::OutOfBounds);
        }

        if let Some(cell) = region.cells().find(|cell| !self.terrain.is_buildable(*cell)) {
            return Err(Rejection::Unbuildable(cell));
        }

        if let Some(cell) = region
            .cells()
            .find(|cell| store.instance_at(*cell).is_some())
        {
            return Err(Rejection::Occupied(cell));
        }

        Ok(())
    }

    fn encloses(&self, region: &CellRect) -> bool {
        let origin = region.origin();
        origin.column() >= 0
            && origin.row() >= 0
            && region.end_column() <= i64::from(self.terrain.columns())
            && region.end_row() <= i64::from(self.terrain.rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::DEFAULT_TERRAIN_CODE;
    use farm_planner_core::{CatalogId, Geometry, ItemVisual, SemanticType, TerrainCode};

    fn machine(width: u32, height: u32) -> ItemDefinition {
        ItemDefinition {
            id: CatalogId::new("machine"),
            name: "Machine".to_owned(),
            semantic_type: SemanticType::Machine,
            visual: ItemVisual::new("#aaaaaa", "⚙️"),
            geometry: Geometry::Block { width, height },
        }
    }

    fn open_field() -> PlacementEngine {
        PlacementEngine::new(TerrainMap::uniform(6, 6, DEFAULT_TERRAIN_CODE).expect("terrain"))
    }

    #[test]
    fn rejection_reports_first_failing_rule() {
        let terrain = TerrainMap::from_rows(vec![
            vec![TerrainCode::new(1), TerrainCode::new(3)],
            vec![TerrainCode::new(1), TerrainCode::new(1)],
        ])
        .expect("terrain");
        let engine = PlacementEngine::new(terrain);
        let mut store = PlacementStore::new();

        assert_eq!(
            engine.check(CellCoord::new(1, 1), &machine(2, 1), &store),
            Err(Rejection::OutOfBounds)
        );
        assert_eq!(
            engine.check(CellCoord::new(0, 0), &machine(2, 2), &store),
            Err(Rejection::Unbuildable(CellCoord::new(1, 0)))
        );

        let _ = engine.place(CellCoord::new(0, 1), machine(1, 1), &mut store);
        assert_eq!(
            engine.check(CellCoord::new(0, 0), &machine(1, 2), &store),
            Err(Rejection::Occupied(CellCoord::new(0, 1)))
        );
    }

    #[test]
    fn footprint_reaching_last_column_is_in_bounds() {
        let engine = open_field();
        let store = PlacementStore::new();
        assert!(engine.validate(CellCoord::new(4, 4), &machine(2, 2), &store));
        assert!(!engine.validate(CellCoord::new(5, 4), &machine(2, 2), &store));
    }

    #[test]
    fn huge_footprints_never_overflow() {
        let engine = open_field();
        let store = PlacementStore::new();
        assert!(!engine.validate(
            CellCoord::new(i32::MAX, i32::MAX),
            &machine(u32::MAX, u32::MAX),
            &store
        ));
    }

    #[test]
    fn begin_move_returns_definition_and_anchor() {
        let engine = open_field();
        let mut store = PlacementStore::new();
        let placed = engine.place(CellCoord::new(2, 3), machine(2, 2), &mut store);

        let (definition, anchor) = engine
            .begin_move(&placed.id, &mut store)
            .expect("instance exists");
        assert_eq!(definition, machine(2, 2));
        assert_eq!(anchor, CellCoord::new(2, 3));
        assert!(store.is_empty());
        assert!(engine.begin_move(&placed.id, &mut store).is_none());
    }
}
