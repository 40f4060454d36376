//! Immutable terrain lookup for the planning grid.

use std::collections::BTreeMap;

use farm_planner_core::{CellCoord, TerrainCode, TerrainDescriptor};
use thiserror::Error;

/// Code that unknown and missing cells resolve through.
pub const DEFAULT_TERRAIN_CODE: TerrainCode = TerrainCode::new(1);

/// Errors raised while building a [`TerrainMap`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TerrainError {
    /// The grid has no rows or its first row has no cells.
    #[error("terrain grid must contain at least one cell")]
    EmptyGrid,
    /// The grid exceeds the signed coordinate range.
    #[error("terrain grid of {columns}x{rows} cells exceeds the supported coordinate range")]
    TooLarge {
        /// Requested number of columns.
        columns: usize,
        /// Requested number of rows.
        rows: usize,
    },
}

/// Which sides of a buildable cell border unbuildable ground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellEdges {
    /// Edge shared with the cell above.
    pub top: bool,
    /// Edge shared with the cell to the right.
    pub right: bool,
    /// Edge shared with the cell below.
    pub bottom: bool,
    /// Edge shared with the cell to the left.
    pub left: bool,
}

/// Fixed `columns × rows` grid of terrain codes with their descriptors.
#[derive(Clone, Debug)]
pub struct TerrainMap {
    columns: u32,
    rows: u32,
    codes: Vec<TerrainCode>,
    palette: BTreeMap<TerrainCode, TerrainDescriptor>,
    fallback: TerrainDescriptor,
}

impl TerrainMap {
    /// Builds a map from row-major code rows using the default palette.
    ///
    /// The grid is as wide as the first row. Short rows are padded and longer
    /// rows truncated, with padding cells resolving to [`DEFAULT_TERRAIN_CODE`].
    pub fn from_rows(rows: Vec<Vec<TerrainCode>>) -> Result<Self, TerrainError> {
        let column_count = rows.first().map_or(0, Vec::len);
        let row_count = rows.len();
        let (columns, row_bound) = checked_dimensions(column_count, row_count)?;

        let mut codes = Vec::with_capacity(column_count * row_count);
        for row in rows {
            let padding = column_count.saturating_sub(row.len());
            codes.extend(row.into_iter().take(column_count));
            codes.extend(std::iter::repeat(DEFAULT_TERRAIN_CODE).take(padding));
        }

        Ok(Self {
            columns,
            rows: row_bound,
            codes,
            palette: default_palette(),
            fallback: soil(),
        })
    }

    /// Builds a map where every cell carries the same code.
    pub fn uniform(columns: u32, rows: u32, code: TerrainCode) -> Result<Self, TerrainError> {
        let column_count = usize::try_from(columns).unwrap_or(usize::MAX);
        let row_count = usize::try_from(rows).unwrap_or(usize::MAX);
        let _ = checked_dimensions(column_count, row_count)?;
        Self::from_rows(vec![vec![code; column_count]; row_count])
    }

    /// Overrides or extends the palette entry for `code`.
    #[must_use]
    pub fn with_descriptor(mut self, code: TerrainCode, descriptor: TerrainDescriptor) -> Self {
        let _ = self.palette.insert(code, descriptor);
        self
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside `[0, columns) × [0, rows)`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Terrain code stored at the cell, or `None` outside the grid.
    #[must_use]
    pub fn code(&self, cell: CellCoord) -> Option<TerrainCode> {
        self.index(cell)
            .and_then(|index| self.codes.get(index).copied())
    }

    /// Resolves the descriptor for the cell, or `None` outside the grid.
    ///
    /// Codes missing from the palette resolve to the descriptor of
    /// [`DEFAULT_TERRAIN_CODE`].
    #[must_use]
    pub fn descriptor(&self, cell: CellCoord) -> Option<&TerrainDescriptor> {
        let code = self.code(cell)?;
        Some(self.resolve(code))
    }

    /// Reports whether items may be placed on the cell.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.descriptor(cell)
            .map_or(false, |descriptor| descriptor.buildable)
    }

    /// Reports which sides of a buildable cell face unbuildable ground.
    ///
    /// Unbuildable and out-of-bounds cells report no edges.
    #[must_use]
    pub fn buildable_edges(&self, cell: CellCoord) -> CellEdges {
        if !self.is_buildable(cell) {
            return CellEdges::default();
        }

        CellEdges {
            top: !self.is_buildable(cell.offset(0, -1)),
            right: !self.is_buildable(cell.offset(1, 0)),
            bottom: !self.is_buildable(cell.offset(0, 1)),
            left: !self.is_buildable(cell.offset(-1, 0)),
        }
    }

    fn resolve(&self, code: TerrainCode) -> &TerrainDescriptor {
        self.palette
            .get(&code)
            .or_else(|| self.palette.get(&DEFAULT_TERRAIN_CODE))
            .unwrap_or(&self.fallback)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Palette installed on every new map.
#[must_use]
pub fn default_palette() -> BTreeMap<TerrainCode, TerrainDescriptor> {
    BTreeMap::from([
        (
            TerrainCode::new(0),
            TerrainDescriptor::new("void", "#1f2937", false),
        ),
        (DEFAULT_TERRAIN_CODE, soil()),
        (
            TerrainCode::new(2),
            TerrainDescriptor::new("grass", "#86efac", true),
        ),
        (
            TerrainCode::new(3),
            TerrainDescriptor::new("water", "#38bdf8", false),
        ),
        (
            TerrainCode::new(4),
            TerrainDescriptor::new("rock", "#9ca3af", false),
        ),
        (
            TerrainCode::new(5),
            TerrainDescriptor::new("building", "#78350f", false),
        ),
    ])
}

fn soil() -> TerrainDescriptor {
    TerrainDescriptor::new("soil", "#a16207", true)
}

fn checked_dimensions(columns: usize, rows: usize) -> Result<(u32, u32), TerrainError> {
    if columns == 0 || rows == 0 {
        return Err(TerrainError::EmptyGrid);
    }

    let too_large = TerrainError::TooLarge { columns, rows };
    let column_bound = i32::try_from(columns).map_err(|_| too_large.clone())?;
    let row_bound = i32::try_from(rows).map_err(|_| too_large)?;
    Ok((column_bound.unsigned_abs(), row_bound.unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(rows: &[&[u8]]) -> Vec<Vec<TerrainCode>> {
        rows.iter()
            .map(|row| row.iter().copied().map(TerrainCode::new).collect())
            .collect()
    }

    #[test]
    fn dimensions_follow_first_row_and_row_count() {
        let map = TerrainMap::from_rows(codes(&[&[1, 1, 1], &[1, 1, 1]])).expect("valid map");
        assert_eq!(map.columns(), 3);
        assert_eq!(map.rows(), 2);
    }

    #[test]
    fn out_of_bounds_cells_are_never_buildable() {
        let map = TerrainMap::uniform(4, 4, DEFAULT_TERRAIN_CODE).expect("valid map");
        for cell in [
            CellCoord::new(-1, 0),
            CellCoord::new(0, -1),
            CellCoord::new(4, 0),
            CellCoord::new(0, 4),
            CellCoord::new(i32::MIN, i32::MAX),
        ] {
            assert!(!map.is_buildable(cell), "{cell} must not be buildable");
            assert!(map.descriptor(cell).is_none());
        }
        assert!(map.is_buildable(CellCoord::new(3, 3)));
    }

    #[test]
    fn unknown_codes_fall_back_to_default_descriptor() {
        let map = TerrainMap::from_rows(codes(&[&[42]])).expect("valid map");
        let descriptor = map.descriptor(CellCoord::new(0, 0)).expect("in bounds");
        assert_eq!(descriptor.name, "soil");
        assert!(map.is_buildable(CellCoord::new(0, 0)));
    }

    #[test]
    fn short_rows_are_padded_with_default_code() {
        let map = TerrainMap::from_rows(codes(&[&[3, 3, 3], &[3]])).expect("valid map");
        assert_eq!(map.code(CellCoord::new(2, 1)), Some(DEFAULT_TERRAIN_CODE));
        assert!(map.is_buildable(CellCoord::new(2, 1)));
        assert!(!map.is_buildable(CellCoord::new(0, 1)));
    }

    #[test]
    fn palette_overrides_apply() {
        let map = TerrainMap::uniform(2, 2, TerrainCode::new(9))
            .expect("valid map")
            .with_descriptor(
                TerrainCode::new(9),
                TerrainDescriptor::new("lava", "#ff0000", false),
            );
        assert!(!map.is_buildable(CellCoord::new(1, 1)));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(
            TerrainMap::from_rows(Vec::new()).unwrap_err(),
            TerrainError::EmptyGrid
        );
        assert_eq!(
            TerrainMap::from_rows(vec![Vec::new()]).unwrap_err(),
            TerrainError::EmptyGrid
        );
    }

    #[test]
    fn edges_mark_borders_with_unbuildable_ground() {
        let map = TerrainMap::from_rows(codes(&[&[1, 3], &[1, 1]])).expect("valid map");
        assert_eq!(
            map.buildable_edges(CellCoord::new(0, 0)),
            CellEdges {
                top: true,
                right: true,
                bottom: false,
                left: true,
            }
        );
        assert_eq!(
            map.buildable_edges(CellCoord::new(1, 0)),
            CellEdges::default()
        );
    }
}
