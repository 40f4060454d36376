//! Registry of placeable item definitions.

use farm_planner_core::{CatalogId, Geometry, ItemDefinition, ItemVisual, SemanticType};

/// Ordered, caller-supplied list of item definitions.
///
/// Contents are not validated: duplicate ids resolve to the first entry and
/// degenerate geometries are accepted as given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    entries: Vec<ItemDefinition>,
}

impl ItemCatalog {
    /// Creates a catalog from the provided definitions.
    #[must_use]
    pub fn new(entries: Vec<ItemDefinition>) -> Self {
        Self { entries }
    }

    /// Farm catalog shipped with the planner.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            block("crop", "Crop", SemanticType::Crop, 1, "#f6c73b75", "🌱"),
            radius("sprinkler-9x9", "9×9 Sprinkler", SemanticType::Sprinkler, 4, "#3b82f6", "💧"),
            radius("sprinkler-5x5", "5×5 Sprinkler", SemanticType::Sprinkler, 2, "#60a5fa", "💧"),
            radius("sprinkler-3x3", "3×3 Sprinkler", SemanticType::Sprinkler, 1, "#93c5fd", "💧"),
            block("tree-2x2", "2×2 Tree", SemanticType::Tree, 2, "#22c55e", "🌳"),
            block("tree-3x3", "3×3 Tree", SemanticType::Tree, 3, "#16a34a", "🌳"),
            radius("scarecrow-11x11", "11×11 Scarecrow", SemanticType::Scarecrow, 5, "#eab308", "🎃"),
            radius("scarecrow-5x5", "5×5 Scarecrow", SemanticType::Scarecrow, 2, "#fbbf24", "🎃"),
            radius("scarecrow-ultimate", "Ultimate Scarecrow", SemanticType::Scarecrow, 9, "#ffbf54", "🎃"),
            block("machine-1", "Machine 1x1", SemanticType::Machine, 1, "#aaaaaa", "⚙️"),
            block("machine-2", "Machine 2x2", SemanticType::Machine, 2, "#333333", "⚙️"),
        ])
    }

    /// Looks up a definition by catalog key.
    #[must_use]
    pub fn get(&self, id: &CatalogId) -> Option<&ItemDefinition> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Iterator over the definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.entries.iter()
    }

    /// Number of definitions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn block(
    id: &str,
    name: &str,
    semantic_type: SemanticType,
    side: u32,
    color: &str,
    icon: &str,
) -> ItemDefinition {
    ItemDefinition {
        id: CatalogId::new(id),
        name: name.to_owned(),
        semantic_type,
        visual: ItemVisual::new(color, icon),
        geometry: Geometry::Block {
            width: side,
            height: side,
        },
    }
}

fn radius(
    id: &str,
    name: &str,
    semantic_type: SemanticType,
    radius: u32,
    color: &str,
    icon: &str,
) -> ItemDefinition {
    ItemDefinition {
        id: CatalogId::new(id),
        name: name.to_owned(),
        semantic_type,
        visual: ItemVisual::new(color, icon),
        geometry: Geometry::Radius { radius },
    }
}
