#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for planning farm layouts on a terrain grid.

mod config;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use farm_planner_core::{
    CatalogId, CellCoord, Command, Event, Geometry, InstanceId, ItemDefinition,
};
use farm_planner_persistence::{self as persistence, LayoutSnapshot, PersistedRecord};
use farm_planner_system_planner::{PlacementPreview, Planner, PlannerInput};
use farm_planner_world::{self as world, query, Farm, ItemCatalog};

use config::Settings;
use logging::LogArgs;

#[derive(Debug, Parser)]
#[command(name = "farm-planner")]
#[command(about = "Plan crops, sprinklers, scarecrows and machines on a farm grid")]
struct Cli {
    /// JSON file holding the placed instances
    #[arg(long, global = true, default_value = "placements.json")]
    state: PathBuf,

    /// TOML file describing the terrain grid and item catalog
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the placeable items
    Catalog,
    /// List the placed instances
    List,
    /// Report whether an item fits at a cell without placing it
    Check(Target),
    /// Place an item at a cell
    Place(Target),
    /// Remove a placed instance
    Remove {
        /// Instance identifier, e.g. `crop-3`
        id: String,
    },
    /// Move a placed instance to a new anchor
    Move {
        /// Instance identifier, e.g. `crop-3`
        id: String,
        /// Target column
        #[arg(allow_hyphen_values = true)]
        x: i32,
        /// Target row
        #[arg(allow_hyphen_values = true)]
        y: i32,
    },
    /// Remove every placed instance
    Clear,
    /// Print the layout as a shareable string
    Export,
    /// Replace the placed instances with a shared layout string
    Import {
        /// Layout string produced by `export`
        layout: String,
    },
    /// Rewrite the state file in the current record schema
    Migrate,
}

#[derive(Debug, clap::Args)]
struct Target {
    /// Catalog id of the item, e.g. `sprinkler-5x5`
    item: String,
    /// Anchor column
    #[arg(allow_hyphen_values = true)]
    x: i32,
    /// Anchor row
    #[arg(allow_hyphen_values = true)]
    y: i32,
}

/// Loaded terrain, catalog and placements for one invocation.
struct Session {
    farm: Farm,
    catalog: ItemCatalog,
    state: PathBuf,
}

impl Session {
    fn open(state: PathBuf, config: Option<&Path>) -> Result<Self> {
        let Settings { terrain, catalog } = Settings::load(config)?;
        let store = persistence::load_store(&state);
        Ok(Self {
            farm: Farm::with_store(terrain, store),
            catalog,
            state,
        })
    }

    fn item(&self, id: &str) -> Result<ItemDefinition> {
        self.catalog
            .get(&CatalogId::new(id))
            .cloned()
            .with_context(|| format!("unknown catalog item `{id}`; run `farm-planner catalog`"))
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.farm, command, &mut events);
        events
    }

    fn save(&self) -> Result<()> {
        persistence::save_store(&self.state, query::store(&self.farm))
            .with_context(|| format!("failed to save placements to {}", self.state.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.log.init();

    if let Commands::Migrate = cli.command {
        return migrate_state(&cli.state);
    }

    let mut session = Session::open(cli.state, cli.config.as_deref())?;
    match cli.command {
        Commands::Catalog => print_catalog(&session.catalog),
        Commands::List => print_instances(&session.farm),
        Commands::Check(target) => check(&session, &target)?,
        Commands::Place(target) => place(&mut session, &target)?,
        Commands::Remove { id } => remove(&mut session, &id)?,
        Commands::Move { id, x, y } => move_instance(&mut session, &id, CellCoord::new(x, y))?,
        Commands::Clear => clear(&mut session)?,
        Commands::Export => export(&session)?,
        Commands::Import { layout } => import(&mut session, &layout)?,
        Commands::Migrate => {}
    }
    Ok(())
}

fn describe(geometry: Geometry) -> String {
    match geometry {
        Geometry::Block { width, height } => format!("block {width}×{height}"),
        Geometry::Radius { radius } => {
            let side = u64::from(radius) * 2 + 1;
            format!("radius {radius} ({side}×{side})")
        }
    }
}

fn print_catalog(catalog: &ItemCatalog) {
    for item in catalog.iter() {
        println!(
            "{:<20} {} {:<20} {}",
            item.id,
            item.visual.icon,
            item.name,
            describe(item.geometry)
        );
    }
}

fn print_instances(farm: &Farm) {
    let store = query::store(farm);
    if store.is_empty() {
        println!("no items placed");
        return;
    }
    for instance in store.iter() {
        println!(
            "{:<24} {:<10} {}",
            instance.id,
            instance.anchor.to_string(),
            describe(instance.definition.geometry)
        );
    }
    for (catalog_id, count) in store.counts_by_catalog() {
        println!("{catalog_id}: {count}");
    }
}

/// Runs one planner pass that selects `item` and confirms at `anchor`.
fn plan_placement(farm: &Farm, item: ItemDefinition, anchor: CellCoord) -> Vec<Command> {
    let mut planner = Planner::new();
    let mut commands = Vec::new();
    planner.handle(
        &[],
        PlannerInput {
            select: Some(item),
            confirm_action: true,
            cursor_cell: Some(anchor),
            ..PlannerInput::default()
        },
        |cell| query::instance_at(farm, cell).map(|instance| instance.id.clone()),
        |anchor, item| query::is_placeable(farm, anchor, item),
        &mut commands,
    );
    commands
}

fn check(session: &Session, target: &Target) -> Result<()> {
    let item = session.item(&target.item)?;
    let anchor = CellCoord::new(target.x, target.y);
    let placeable = query::is_placeable(&session.farm, anchor, &item);
    let preview = PlacementPreview::new(item, anchor, placeable);
    let occupied = preview.occupied;
    let influence = preview.influence;
    println!(
        "{} at {}: {}",
        preview.item.id,
        preview.anchor,
        if preview.placeable { "placeable" } else { "blocked" }
    );
    println!(
        "occupies {}×{} from {}, influences {}×{} from {}",
        occupied.size().width(),
        occupied.size().height(),
        occupied.origin(),
        influence.size().width(),
        influence.size().height(),
        influence.origin()
    );
    Ok(())
}

fn place(session: &mut Session, target: &Target) -> Result<()> {
    let item = session.item(&target.item)?;
    let anchor = CellCoord::new(target.x, target.y);
    let commands = plan_placement(&session.farm, item, anchor);
    if commands.is_empty() {
        bail!("cannot place `{}` at {anchor}", target.item);
    }

    let mut placed = Vec::new();
    for command in commands {
        for event in session.apply(command) {
            if let Event::ItemPlaced { instance } = event {
                placed.push(instance.id);
            }
        }
    }
    session.save()?;
    for id in placed {
        println!("placed {id}");
    }
    Ok(())
}

fn remove(session: &mut Session, id: &str) -> Result<()> {
    let events = session.apply(Command::RemoveItem {
        instance: InstanceId::from_raw(id),
    });
    let Some(Event::ItemRemoved { instance, .. }) = events.into_iter().next() else {
        bail!("no placed instance `{id}`");
    };
    session.save()?;
    println!("removed {instance}");
    Ok(())
}

fn move_instance(session: &mut Session, id: &str, target: CellCoord) -> Result<()> {
    let mut staged = session.farm.clone();
    let mut events = Vec::new();
    world::apply(
        &mut staged,
        Command::BeginMove {
            instance: InstanceId::from_raw(id),
        },
        &mut events,
    );
    let Some(Event::MoveStarted { item, anchor, .. }) = events.pop() else {
        bail!("no placed instance `{id}`");
    };

    let commands = plan_placement(&staged, item, target);
    if commands.is_empty() {
        bail!("cannot move `{id}` from {anchor} to {target}");
    }
    for command in commands {
        world::apply(&mut staged, command, &mut events);
    }
    let Some(Event::ItemPlaced { instance }) = events.pop() else {
        bail!("cannot move `{id}` from {anchor} to {target}");
    };

    session.farm = staged;
    session.save()?;
    println!("moved {id} to {} as {}", instance.anchor, instance.id);
    Ok(())
}

fn clear(session: &mut Session) -> Result<()> {
    let events = session.apply(Command::ClearAll);
    session.save()?;
    if let Some(Event::StoreCleared { removed }) = events.first() {
        println!("removed {removed} items");
    }
    Ok(())
}

fn export(session: &Session) -> Result<()> {
    let terrain = query::terrain(&session.farm);
    let snapshot =
        LayoutSnapshot::capture(terrain.columns(), terrain.rows(), query::store(&session.farm));
    let layout = snapshot.encode().context("failed to encode layout")?;
    println!("{layout}");
    Ok(())
}

fn import(session: &mut Session, layout: &str) -> Result<()> {
    let snapshot = LayoutSnapshot::decode(layout).context("failed to decode layout string")?;
    let terrain = query::terrain(&session.farm).clone();
    if (snapshot.columns, snapshot.rows) != (terrain.columns(), terrain.rows()) {
        bail!(
            "layout was planned on a {}×{} grid but the configured grid is {}×{}",
            snapshot.columns,
            snapshot.rows,
            terrain.columns(),
            terrain.rows()
        );
    }

    session.farm = Farm::with_store(terrain, snapshot.into_store());
    session.save()?;
    println!("imported {} items", query::store(&session.farm).len());
    Ok(())
}

fn migrate_state(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read placement state at {}", path.display()))?;
    let records = persistence::parse_records(&contents)
        .with_context(|| format!("failed to parse placement state at {}", path.display()))?;
    let legacy = records
        .iter()
        .filter(|record| matches!(record, PersistedRecord::Legacy(_)))
        .count();

    let store = world::PlacementStore::from_instances(persistence::migrate(records));
    persistence::save_store(path, &store)
        .with_context(|| format!("failed to save placements to {}", path.display()))?;
    tracing::info!(path = %path.display(), legacy, total = store.len(), "state migrated");
    println!("upgraded {legacy} legacy records, {} records written", store.len());
    Ok(())
}
