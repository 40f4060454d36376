#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative placement state for the farm planner.

mod catalog;
mod engine;
mod store;
mod terrain;

use farm_planner_core::{Command, Event};

pub use catalog::ItemCatalog;
pub use engine::PlacementEngine;
pub use store::PlacementStore;
pub use terrain::{default_palette, CellEdges, TerrainError, TerrainMap, DEFAULT_TERRAIN_CODE};

/// Terrain, validation rules, and the placed instances they govern.
#[derive(Clone, Debug)]
pub struct Farm {
    engine: PlacementEngine,
    store: PlacementStore,
}

impl Farm {
    /// Creates an empty farm over the provided terrain.
    #[must_use]
    pub fn new(terrain: TerrainMap) -> Self {
        Self::with_store(terrain, PlacementStore::new())
    }

    /// Creates a farm over the provided terrain holding previously placed instances.
    #[must_use]
    pub const fn with_store(terrain: TerrainMap, store: PlacementStore) -> Self {
        Self {
            engine: PlacementEngine::new(terrain),
            store,
        }
    }
}

/// Applies the provided command to the farm.
///
/// `PlaceItem` validates and places against the same store state, so a
/// sequence of commands can never commit two colliding placements.
pub fn apply(farm: &mut Farm, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceItem { item, anchor } => {
            if farm.engine.validate(anchor, &item, &farm.store) {
                let instance = farm.engine.place(anchor, item, &mut farm.store);
                out_events.push(Event::ItemPlaced { instance });
            } else {
                tracing::debug!(item = %item.id, %anchor, "placement rejected");
                out_events.push(Event::PlacementRejected {
                    item: item.id,
                    anchor,
                });
            }
        }
        Command::RemoveItem { instance } => {
            if let Some(removed) = farm.engine.remove(&instance, &mut farm.store) {
                out_events.push(Event::ItemRemoved {
                    region: removed.occupied_region(),
                    instance: removed.id,
                });
            }
        }
        Command::BeginMove { instance } => {
            if let Some((item, anchor)) = farm.engine.begin_move(&instance, &mut farm.store) {
                out_events.push(Event::MoveStarted {
                    instance,
                    item,
                    anchor,
                });
            }
        }
        Command::ClearAll => {
            let removed = farm.store.clear();
            tracing::debug!(removed, "store cleared");
            out_events.push(Event::StoreCleared { removed });
        }
    }
}

/// Query functions that provide read-only access to the farm.
pub mod query {
    use farm_planner_core::{CellCoord, ItemDefinition, PlacedInstance};

    use super::{Farm, PlacementEngine, PlacementStore, TerrainMap};

    /// Provides read-only access to the farm's terrain.
    #[must_use]
    pub fn terrain(farm: &Farm) -> &TerrainMap {
        farm.engine.terrain()
    }

    /// Provides read-only access to the placed instances.
    #[must_use]
    pub fn store(farm: &Farm) -> &PlacementStore {
        &farm.store
    }

    /// Provides read-only access to the placement rules.
    #[must_use]
    pub fn engine(farm: &Farm) -> &PlacementEngine {
        &farm.engine
    }

    /// Reports whether `item` could be placed at `anchor` right now.
    #[must_use]
    pub fn is_placeable(farm: &Farm, anchor: CellCoord, item: &ItemDefinition) -> bool {
        farm.engine.validate(anchor, item, &farm.store)
    }

    /// Returns the instance occupying `cell`, if any.
    #[must_use]
    pub fn instance_at(farm: &Farm, cell: CellCoord) -> Option<&PlacedInstance> {
        farm.store.instance_at(cell)
    }
}
