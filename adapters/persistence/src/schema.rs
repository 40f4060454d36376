//! Persisted placement records and their migration to the current schema.

use farm_planner_core::{
    CellCoord, Geometry, InstanceId, ItemDefinition, ItemVisual, PlacedInstance, PlacementKind,
    SemanticType,
};
use serde::{Deserialize, Serialize};

/// Placement record in the current width/height + placement-kind schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRecord {
    /// Instance identifier, `{catalog_id}-{sequence}`.
    pub id: String,
    /// Display name of the item.
    pub name: String,
    /// Semantic category of the item.
    #[serde(alias = "itemType")]
    pub semantic_type: SemanticType,
    /// Display colour.
    pub color: String,
    /// Display icon.
    pub icon: String,
    /// Anchor column.
    pub x: i32,
    /// Anchor row.
    pub y: i32,
    /// Footprint width; for radius items the side of the influence square.
    pub width: u32,
    /// Footprint height; for radius items the side of the influence square.
    pub height: u32,
    /// Geometry discriminant. Records written without it are blocks.
    #[serde(default, alias = "placement")]
    pub placement_kind: PlacementKind,
    /// Influence radius of radius items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
}

impl CurrentRecord {
    /// Captures a placed instance as a record.
    #[must_use]
    pub fn from_instance(instance: &PlacedInstance) -> Self {
        let definition = &instance.definition;
        let (width, height, radius) = match definition.geometry {
            Geometry::Block { width, height } => (width, height, None),
            Geometry::Radius { radius } => {
                let side = radius.saturating_mul(2).saturating_add(1);
                (side, side, Some(radius))
            }
        };

        Self {
            id: instance.id.as_str().to_owned(),
            name: definition.name.clone(),
            semantic_type: definition.semantic_type,
            color: definition.visual.color.clone(),
            icon: definition.visual.icon.clone(),
            x: instance.anchor.column(),
            y: instance.anchor.row(),
            width,
            height,
            placement_kind: definition.geometry.kind(),
            radius,
        }
    }

    /// Rebuilds the placed instance described by the record.
    ///
    /// The catalog id is recovered from the instance id. A radius record
    /// without a radius gets radius `0`.
    #[must_use]
    pub fn into_instance(self) -> PlacedInstance {
        let id = InstanceId::from_raw(self.id);
        let geometry = match self.placement_kind {
            PlacementKind::Block => Geometry::Block {
                width: self.width,
                height: self.height,
            },
            PlacementKind::Radius => Geometry::Radius {
                radius: self.radius.unwrap_or(0),
            },
        };

        PlacedInstance {
            definition: ItemDefinition {
                id: id.catalog_id(),
                name: self.name,
                semantic_type: self.semantic_type,
                visual: ItemVisual::new(self.color, self.icon),
                geometry,
            },
            anchor: CellCoord::new(self.x, self.y),
            id,
        }
    }
}

/// Placement record in the legacy single-size schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    /// Instance identifier.
    pub id: String,
    /// Display name of the item.
    pub name: String,
    /// Semantic category of the item.
    #[serde(alias = "itemType")]
    pub semantic_type: SemanticType,
    /// Display colour.
    pub color: String,
    /// Display icon.
    pub icon: String,
    /// Anchor column.
    pub x: i32,
    /// Anchor row.
    pub y: i32,
    /// Footprint side, used as both width and height.
    pub size: u32,
}

/// Record as found in persisted state, in either schema generation.
///
/// Decoding tries the current schema first; records without `width` and
/// `height` fall through to the legacy schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedRecord {
    /// Record already in the current schema.
    Current(CurrentRecord),
    /// Record in the legacy single-size schema.
    Legacy(LegacyRecord),
}

/// Upgrades a record to the current schema. Current records pass through unchanged.
///
/// Legacy sprinklers and scarecrows become radius items with radius
/// `size / 2` (rounded down); everything else becomes a `size × size` block.
/// The anchor is kept as recorded.
#[must_use]
pub fn migrate_record(record: PersistedRecord) -> CurrentRecord {
    match record {
        PersistedRecord::Current(current) => current,
        PersistedRecord::Legacy(legacy) => {
            let (placement_kind, radius) = if legacy.semantic_type.is_radial() {
                (PlacementKind::Radius, Some(legacy.size / 2))
            } else {
                (PlacementKind::Block, None)
            };

            CurrentRecord {
                id: legacy.id,
                name: legacy.name,
                semantic_type: legacy.semantic_type,
                color: legacy.color,
                icon: legacy.icon,
                x: legacy.x,
                y: legacy.y,
                width: legacy.size,
                height: legacy.size,
                placement_kind,
                radius,
            }
        }
    }
}

/// Upgrades every record to the current schema, preserving order.
#[must_use]
pub fn migrate_records(records: Vec<PersistedRecord>) -> Vec<CurrentRecord> {
    records.into_iter().map(migrate_record).collect()
}

/// Upgrades raw records and rebuilds the placed instances they describe.
#[must_use]
pub fn migrate(records: Vec<PersistedRecord>) -> Vec<PlacedInstance> {
    migrate_records(records)
        .into_iter()
        .map(CurrentRecord::into_instance)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_planner_core::CatalogId;

    fn decode(json: &str) -> PersistedRecord {
        serde_json::from_str(json).expect("record decodes")
    }

    #[test]
    fn records_with_dimensions_decode_as_current() {
        let record = decode(
            r##"{"id":"tree-2x2-4","name":"2×2 Tree","semanticType":"tree","color":"#22c55e",
                "icon":"🌳","x":3,"y":4,"width":2,"height":2,"placementKind":"block"}"##,
        );
        assert!(matches!(record, PersistedRecord::Current(_)));
    }

    #[test]
    fn records_with_size_decode_as_legacy() {
        let record = decode(
            r##"{"id":"crop-1","name":"Crop","itemType":"crop","size":1,"itemSize":1,
                "color":"#f6c73b75","icon":"🌱","x":0,"y":0}"##,
        );
        let PersistedRecord::Legacy(legacy) = record else {
            panic!("expected legacy record");
        };
        assert_eq!(legacy.semantic_type, SemanticType::Crop);
        assert_eq!(legacy.size, 1);
    }

    #[test]
    fn missing_placement_kind_defaults_to_block() {
        let record = decode(
            r##"{"id":"machine-2-9","name":"Machine 2x2","semanticType":"machine",
                "color":"#333333","icon":"⚙️","x":1,"y":1,"width":2,"height":2}"##,
        );
        let current = migrate_record(record);
        assert_eq!(current.placement_kind, PlacementKind::Block);
    }

    #[test]
    fn radius_record_without_radius_has_zero_radius() {
        let record = decode(
            r##"{"id":"sprinkler-3x3-2","name":"3×3 Sprinkler","semanticType":"sprinkler",
                "color":"#93c5fd","icon":"💧","x":5,"y":5,"width":3,"height":3,
                "placementKind":"radius"}"##,
        );
        let instance = migrate(vec![record]).remove(0);
        assert_eq!(instance.definition.geometry, Geometry::Radius { radius: 0 });
    }

    #[test]
    fn legacy_block_keeps_anchor_and_size() {
        let legacy = PersistedRecord::Legacy(LegacyRecord {
            id: "tree-3x3-5".to_owned(),
            name: "3×3 Tree".to_owned(),
            semantic_type: SemanticType::Tree,
            color: "#16a34a".to_owned(),
            icon: "🌳".to_owned(),
            x: 7,
            y: 2,
            size: 3,
        });
        let instance = migrate(vec![legacy]).remove(0);
        assert_eq!(instance.anchor, CellCoord::new(7, 2));
        assert_eq!(
            instance.definition.geometry,
            Geometry::Block {
                width: 3,
                height: 3
            }
        );
        assert_eq!(instance.definition.id, CatalogId::new("tree-3x3"));
        assert_eq!(instance.id.as_str(), "tree-3x3-5");
    }

    #[test]
    fn radius_instances_write_influence_side_as_dimensions() {
        let instance = PlacedInstance {
            id: InstanceId::from_raw("scarecrow-11x11-1"),
            definition: ItemDefinition {
                id: CatalogId::new("scarecrow-11x11"),
                name: "11×11 Scarecrow".to_owned(),
                semantic_type: SemanticType::Scarecrow,
                visual: ItemVisual::new("#eab308", "🎃"),
                geometry: Geometry::Radius { radius: 5 },
            },
            anchor: CellCoord::new(20, 20),
        };
        let record = CurrentRecord::from_instance(&instance);
        assert_eq!((record.width, record.height), (11, 11));
        assert_eq!(record.radius, Some(5));
        assert_eq!(record.placement_kind, PlacementKind::Radius);
        assert_eq!(record.into_instance(), instance);
    }

    #[test]
    fn serialized_records_use_camel_case_and_omit_missing_radius() {
        let record = CurrentRecord {
            id: "crop-1".to_owned(),
            name: "Crop".to_owned(),
            semantic_type: SemanticType::Crop,
            color: "#f6c73b75".to_owned(),
            icon: "🌱".to_owned(),
            x: 0,
            y: 0,
            width: 1,
            height: 1,
            placement_kind: PlacementKind::Block,
            radius: None,
        };
        let json = serde_json::to_value(&record).expect("record encodes");
        assert_eq!(json["semanticType"], "crop");
        assert_eq!(json["placementKind"], "block");
        assert!(json.get("radius").is_none());
    }
}
