#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the farm planner.
//!
//! This crate defines the value types and the message surface that connect
//! adapters, the authoritative farm, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the farm executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems react to. Systems query immutable state and respond
//! exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible placement mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests placement of an item anchored at the provided cell.
    PlaceItem {
        /// Catalog definition of the item to place.
        item: ItemDefinition,
        /// Anchor cell for the placement.
        anchor: CellCoord,
    },
    /// Requests removal of a placed instance.
    RemoveItem {
        /// Identifier of the instance targeted for removal.
        instance: InstanceId,
    },
    /// Lifts a placed instance off the grid so it can be placed again elsewhere.
    BeginMove {
        /// Identifier of the instance being moved.
        instance: InstanceId,
    },
    /// Removes every placed instance.
    ClearAll,
}

/// Events broadcast by the farm after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an item was placed onto the grid.
    ItemPlaced {
        /// Instance created by the placement.
        instance: PlacedInstance,
    },
    /// Reports that a placement request was rejected.
    ///
    /// No reason is attached: callers only distinguish accept from reject.
    PlacementRejected {
        /// Catalog identifier of the rejected item.
        item: CatalogId,
        /// Anchor cell provided in the placement request.
        anchor: CellCoord,
    },
    /// Confirms that an instance was removed from the grid.
    ItemRemoved {
        /// Identifier of the removed instance.
        instance: InstanceId,
        /// Cells the instance occupied before removal.
        region: CellRect,
    },
    /// Confirms that an instance was lifted off the grid for moving.
    MoveStarted {
        /// Identifier the instance carried before it was lifted.
        instance: InstanceId,
        /// Definition to re-select for the follow-up placement.
        item: ItemDefinition,
        /// Anchor the instance occupied before it was lifted.
        anchor: CellCoord,
    },
    /// Confirms that the store was emptied.
    StoreCleared {
        /// Number of instances that were removed.
        removed: usize,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so positions left of or above the grid can be
/// represented; such cells are never inside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the coordinate shifted by the provided deltas, saturating at the `i32` range.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self {
            column: self.column.saturating_add(columns),
            row: self.row.saturating_add(rows),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Exclusive column bound of the rectangle.
    ///
    /// Widened to `i64` so rectangles touching the edge of the `i32` range
    /// never overflow.
    #[must_use]
    pub const fn end_column(&self) -> i64 {
        self.origin.column as i64 + self.size.width as i64
    }

    /// Exclusive row bound of the rectangle.
    #[must_use]
    pub const fn end_row(&self) -> i64 {
        self.origin.row as i64 + self.size.height as i64
    }

    /// Reports whether the rectangle covers no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    /// Reports whether the provided cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        column >= i64::from(self.origin.column())
            && column < self.end_column()
            && row >= i64::from(self.origin.row())
            && row < self.end_row()
    }

    /// Reports whether the two rectangles share at least one cell.
    #[must_use]
    pub fn intersects(&self, other: &CellRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        i64::from(self.origin.column()) < other.end_column()
            && i64::from(other.origin.column()) < self.end_column()
            && i64::from(self.origin.row()) < other.end_row()
            && i64::from(other.origin.row()) < self.end_row()
    }

    /// Iterates over the cells of the rectangle in row-major order.
    ///
    /// Cells that would fall outside the `i32` coordinate range are skipped.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let first_column = i64::from(self.origin.column());
        let end_column = self.end_column();
        (i64::from(self.origin.row())..self.end_row()).flat_map(move |row| {
            (first_column..end_column).filter_map(move |column| {
                let column = i32::try_from(column).ok()?;
                let row = i32::try_from(row).ok()?;
                Some(CellCoord::new(column, row))
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Discriminant of a [`Geometry`] as written into persisted records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementKind {
    /// Fixed rectangular footprint anchored at the top-left cell.
    #[default]
    Block,
    /// Single occupied anchor cell with a surrounding influence square.
    Radius,
}

/// Placement geometry of a catalog item.
///
/// All occupancy logic goes through [`Geometry::occupied_region`]; the
/// semantic type of an item never influences collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "lowercase")]
pub enum Geometry {
    /// Occupies every cell of a `width × height` rectangle from the anchor.
    Block {
        /// Footprint width in cells.
        width: u32,
        /// Footprint height in cells.
        height: u32,
    },
    /// Occupies only the anchor; influences a `(2·radius+1)²` square around it.
    Radius {
        /// Distance in cells from the anchor to the edge of the influence square.
        radius: u32,
    },
}

impl Geometry {
    /// Placement kind written into persisted records.
    #[must_use]
    pub const fn kind(&self) -> PlacementKind {
        match self {
            Self::Block { .. } => PlacementKind::Block,
            Self::Radius { .. } => PlacementKind::Radius,
        }
    }

    /// Cells claimed by an item of this geometry placed at `anchor`.
    #[must_use]
    pub const fn occupied_region(&self, anchor: CellCoord) -> CellRect {
        let size = match *self {
            Self::Block { width, height } => CellRectSize::new(width, height),
            Self::Radius { .. } => CellRectSize::new(1, 1),
        };
        CellRect::from_origin_and_size(anchor, size)
    }

    /// Iterates over the cells claimed by an item of this geometry placed at `anchor`.
    pub fn occupied_cells(&self, anchor: CellCoord) -> impl Iterator<Item = CellCoord> {
        self.occupied_region(anchor).cells()
    }

    /// Cells visually influenced by an item of this geometry placed at `anchor`.
    ///
    /// The region is not clipped to the grid.
    #[must_use]
    pub fn influence_region(&self, anchor: CellCoord) -> CellRect {
        match *self {
            Self::Block { .. } => self.occupied_region(anchor),
            Self::Radius { radius } => {
                let reach = i32::try_from(radius).unwrap_or(i32::MAX);
                let side = radius.saturating_mul(2).saturating_add(1);
                CellRect::from_origin_and_size(
                    anchor.offset(-reach, -reach),
                    CellRectSize::new(side, side),
                )
            }
        }
    }
}

/// Semantic category of a catalog item. Cosmetic metadata only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// Planted crop.
    Crop,
    /// Watering sprinkler.
    Sprinkler,
    /// Fruit or decorative tree.
    Tree,
    /// Crow-repelling scarecrow.
    Scarecrow,
    /// Processing machine.
    Machine,
    /// Any category this build does not know about.
    #[serde(other)]
    Other,
}

impl SemanticType {
    /// Reports whether legacy records of this type describe a radius item.
    #[must_use]
    pub const fn is_radial(self) -> bool {
        matches!(self, Self::Sprinkler | Self::Scarecrow)
    }

    /// Lowercase name used in persisted records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Sprinkler => "sprinkler",
            Self::Tree => "tree",
            Self::Scarecrow => "scarecrow",
            Self::Machine => "machine",
            Self::Other => "other",
        }
    }
}

/// Visual presentation of a catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemVisual {
    /// CSS-style colour string, e.g. `#3b82f6`.
    pub color: String,
    /// Short glyph drawn on the anchor cell.
    pub icon: String,
}

impl ItemVisual {
    /// Creates a visual descriptor.
    #[must_use]
    pub fn new(color: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            icon: icon.into(),
        }
    }
}

/// Stable key of a catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    /// Wraps the provided catalog key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Unique identifier of a placed instance: `{catalog_id}-{sequence}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Creates the identifier for the `sequence`-th placement of a catalog item.
    #[must_use]
    pub fn new(catalog: &CatalogId, sequence: u64) -> Self {
        Self(format!("{catalog}-{sequence}"))
    }

    /// Wraps an identifier read back from persisted state.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix assigned by the identity counter, if present.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        let (_, suffix) = self.0.rsplit_once('-')?;
        suffix.parse().ok()
    }

    /// Catalog key the identifier was derived from.
    ///
    /// Identifiers without a numeric suffix are returned whole.
    #[must_use]
    pub fn catalog_id(&self) -> CatalogId {
        match self.0.rsplit_once('-') {
            Some((prefix, suffix)) if suffix.parse::<u64>().is_ok() => CatalogId::new(prefix),
            _ => CatalogId::new(self.0.clone()),
        }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Catalog entry describing a placeable item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Stable catalog key.
    pub id: CatalogId,
    /// Human-readable name.
    pub name: String,
    /// Semantic category, used for presentation and legacy migration only.
    pub semantic_type: SemanticType,
    /// Colour and icon.
    pub visual: ItemVisual,
    /// Placement geometry.
    pub geometry: Geometry,
}

/// Item placed onto the grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlacedInstance {
    /// Identifier assigned when the instance was placed.
    pub id: InstanceId,
    /// Definition the instance was placed from.
    pub definition: ItemDefinition,
    /// Anchor cell of the placement.
    pub anchor: CellCoord,
}

impl PlacedInstance {
    /// Cells claimed by the instance.
    #[must_use]
    pub const fn occupied_region(&self) -> CellRect {
        self.definition.geometry.occupied_region(self.anchor)
    }

    /// Reports whether the instance claims the provided cell.
    #[must_use]
    pub fn occupies(&self, cell: CellCoord) -> bool {
        self.occupied_region().contains(cell)
    }

    /// Cells visually influenced by the instance.
    #[must_use]
    pub fn influence_region(&self) -> CellRect {
        self.definition.geometry.influence_region(self.anchor)
    }
}

/// Raw terrain code stored per grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainCode(u8);

impl TerrainCode {
    /// Creates a terrain code wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric code.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Presentation and buildability of a terrain code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainDescriptor {
    /// Short terrain name, e.g. `soil`.
    pub name: String,
    /// CSS-style colour used to paint the cell.
    pub display_color: String,
    /// Whether items may be placed on cells of this terrain.
    pub buildable: bool,
}

impl TerrainDescriptor {
    /// Creates a terrain descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, display_color: impl Into<String>, buildable: bool) -> Self {
        Self {
            name: name.into(),
            display_color: display_color.into(),
            buildable,
        }
    }
}
