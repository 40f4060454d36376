//! TOML configuration describing the planning grid and the item catalog.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use farm_planner_core::{
    CatalogId, Geometry, ItemDefinition, ItemVisual, PlacementKind, SemanticType, TerrainCode,
    TerrainDescriptor,
};
use farm_planner_world::{ItemCatalog, TerrainMap, DEFAULT_TERRAIN_CODE};
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;
const DEFAULT_COLUMNS: u32 = 70;
const DEFAULT_ROWS: u32 = 40;

/// Terrain and catalog the planner session runs against.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) terrain: TerrainMap,
    pub(crate) catalog: ItemCatalog,
}

impl Settings {
    /// Uniform soil grid with the builtin catalog.
    pub(crate) fn builtin() -> Result<Self> {
        let terrain = TerrainMap::uniform(DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TERRAIN_CODE)
            .context("failed to build default terrain")?;
        Ok(Self {
            terrain,
            catalog: ItemCatalog::builtin(),
        })
    }

    /// Loads settings from `path`, or the builtin settings when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read planner config at {}", path.display()))?;
        let settings = parse_config(&contents)
            .with_context(|| format!("invalid planner config at {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            columns = settings.terrain.columns(),
            rows = settings.terrain.rows(),
            items = settings.catalog.len(),
            "planner config loaded"
        );
        Ok(settings)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    terrain: Option<TerrainSection>,
    #[serde(default)]
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TerrainSection {
    #[serde(default)]
    rows: Vec<Vec<u8>>,
    #[serde(default)]
    palette: Vec<PaletteEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PaletteEntry {
    code: u8,
    name: String,
    color: String,
    buildable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemEntry {
    id: String,
    name: String,
    #[serde(default)]
    semantic_type: Option<SemanticType>,
    color: String,
    icon: String,
    #[serde(default)]
    placement: PlacementKind,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    radius: Option<u32>,
}

impl ItemEntry {
    fn into_definition(self) -> Result<ItemDefinition> {
        let geometry = match self.placement {
            PlacementKind::Block => {
                let width = self.width.unwrap_or(1);
                Geometry::Block {
                    width,
                    height: self.height.unwrap_or(width),
                }
            }
            PlacementKind::Radius => {
                let Some(radius) = self.radius else {
                    bail!("radius item `{}` is missing `radius`", self.id);
                };
                Geometry::Radius { radius }
            }
        };

        Ok(ItemDefinition {
            id: CatalogId::new(self.id),
            name: self.name,
            semantic_type: self.semantic_type.unwrap_or(SemanticType::Other),
            visual: ItemVisual::new(self.color, self.icon),
            geometry,
        })
    }
}

fn parse_config(contents: &str) -> Result<Settings> {
    let config: ConfigFile =
        toml::from_str(contents).context("failed to parse planner config toml contents")?;
    if config.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported planner config version {}; expected {}",
            config.version,
            SUPPORTED_CONFIG_VERSION
        );
    }

    let terrain = match config.terrain {
        Some(section) => build_terrain(section)?,
        None => TerrainMap::uniform(DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TERRAIN_CODE)
            .context("failed to build default terrain")?,
    };

    let catalog = if config.items.is_empty() {
        ItemCatalog::builtin()
    } else {
        let entries = config
            .items
            .into_iter()
            .map(ItemEntry::into_definition)
            .collect::<Result<Vec<_>>>()?;
        ItemCatalog::new(entries)
    };

    Ok(Settings { terrain, catalog })
}

fn build_terrain(section: TerrainSection) -> Result<TerrainMap> {
    let mut terrain = if section.rows.is_empty() {
        TerrainMap::uniform(DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TERRAIN_CODE)
    } else {
        TerrainMap::from_rows(
            section
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(TerrainCode::new).collect())
                .collect(),
        )
    }
    .context("failed to build terrain from config")?;

    for entry in section.palette {
        terrain = terrain.with_descriptor(
            TerrainCode::new(entry.code),
            TerrainDescriptor::new(entry.name, entry.color, entry.buildable),
        );
    }
    Ok(terrain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_planner_core::CellCoord;

    #[test]
    fn minimal_config_uses_builtin_grid_and_catalog() {
        let settings = parse_config("version = 1").expect("config parses");
        assert_eq!(settings.terrain.columns(), DEFAULT_COLUMNS);
        assert_eq!(settings.terrain.rows(), DEFAULT_ROWS);
        assert_eq!(settings.catalog, ItemCatalog::builtin());
    }

    #[test]
    fn terrain_rows_and_palette_overrides_apply() {
        let config = r##"
            version = 1

            [terrain]
            rows = [
                [1, 1, 3],
                [2, 6, 6],
            ]

            [[terrain.palette]]
            code = 6
            name = "path"
            color = "#d6d3d1"
            buildable = true

            [[terrain.palette]]
            code = 3
            name = "shallow water"
            color = "#7dd3fc"
            buildable = true
        "##;

        let settings = parse_config(config).expect("config parses");
        let terrain = &settings.terrain;
        assert_eq!((terrain.columns(), terrain.rows()), (3, 2));
        assert!(terrain.is_buildable(CellCoord::new(1, 1)), "custom code is buildable");
        assert!(terrain.is_buildable(CellCoord::new(2, 0)), "override replaces default");
        assert_eq!(
            terrain
                .descriptor(CellCoord::new(2, 0))
                .map(|descriptor| descriptor.name.as_str()),
            Some("shallow water")
        );
    }

    #[test]
    fn custom_items_replace_builtin_catalog() {
        let config = r##"
            version = 1

            [[items]]
            id = "bench"
            name = "Bench"
            color = "#92400e"
            icon = "🪑"
            width = 2
            height = 1

            [[items]]
            id = "lamp"
            name = "Lamp"
            semantic_type = "other"
            color = "#fde047"
            icon = "💡"
            placement = "radius"
            radius = 3
        "##;

        let settings = parse_config(config).expect("config parses");
        let catalog = &settings.catalog;
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog
                .get(&CatalogId::new("bench"))
                .map(|item| item.geometry),
            Some(Geometry::Block {
                width: 2,
                height: 1
            })
        );
        let lamp = catalog.get(&CatalogId::new("lamp")).expect("lamp present");
        assert_eq!(lamp.geometry, Geometry::Radius { radius: 3 });
        assert_eq!(lamp.semantic_type, SemanticType::Other);
    }

    #[test]
    fn radius_item_without_radius_is_rejected() {
        let config = r##"
            version = 1

            [[items]]
            id = "lamp"
            name = "Lamp"
            color = "#fde047"
            icon = "💡"
            placement = "radius"
        "##;

        let error = parse_config(config).expect_err("radius is required");
        assert!(error.to_string().contains("lamp"));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let error = parse_config("version = 2").expect_err("version 2 is unsupported");
        assert!(error.to_string().contains("unsupported planner config version"));
    }

    #[test]
    fn empty_terrain_rows_fall_back_to_default_grid() {
        let settings = parse_config("version = 1\n[terrain]\n").expect("config parses");
        assert_eq!(settings.terrain.columns(), DEFAULT_COLUMNS);
    }

    #[test]
    fn missing_config_path_uses_builtin_settings() {
        let settings = Settings::load(None).expect("builtin settings");
        assert_eq!(settings.catalog.len(), ItemCatalog::builtin().len());
    }
}
