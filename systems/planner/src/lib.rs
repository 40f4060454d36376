#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure planning-session system responsible for emitting placement, removal,
//! and move commands.

use farm_planner_core::{CellCoord, CellRect, Command, Event, InstanceId, ItemDefinition};

/// Declarative placement preview describing a potential placement under the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Item proposed for placement.
    pub item: ItemDefinition,
    /// Anchor cell under the cursor.
    pub anchor: CellCoord,
    /// Cells the item would occupy if placed.
    pub occupied: CellRect,
    /// Cells the item would visually influence, unclipped.
    pub influence: CellRect,
    /// Indicates whether the preview represents a valid placement location.
    pub placeable: bool,
}

impl PlacementPreview {
    /// Creates a preview for `item` at `anchor`.
    #[must_use]
    pub fn new(item: ItemDefinition, anchor: CellCoord, placeable: bool) -> Self {
        let occupied = item.geometry.occupied_region(anchor);
        let influence = item.geometry.influence_region(anchor);
        Self {
            item,
            anchor,
            occupied,
            influence,
            placeable,
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlannerInput {
    /// Catalog item picked by the player on this frame.
    pub select: Option<ItemDefinition>,
    /// Indicates whether the player asked to drop the current selection.
    pub deselect_action: bool,
    /// Indicates whether the player cancelled the current selection and move.
    pub cancel_action: bool,
    /// Indicates whether the player toggled delete mode.
    pub toggle_delete_mode: bool,
    /// Indicates whether the player confirmed an action on the hovered cell.
    pub confirm_action: bool,
    /// Indicates whether the player asked to remove everything.
    pub clear_action: bool,
    /// Cell currently hovered by the cursor, `None` when off the grid.
    pub cursor_cell: Option<CellCoord>,
}

/// Planning-session system that translates input into placement commands.
#[derive(Clone, Debug, Default)]
pub struct Planner {
    selected: Option<ItemDefinition>,
    moving: bool,
    delete_mode: bool,
    hovered: Option<CellCoord>,
}

impl Planner {
    /// Creates a planner with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: None,
            moving: false,
            delete_mode: false,
            hovered: None,
        }
    }

    /// Item currently selected for placement.
    #[must_use]
    pub const fn selected(&self) -> Option<&ItemDefinition> {
        self.selected.as_ref()
    }

    /// Reports whether the selection is an instance being moved.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Reports whether confirming over an instance removes it.
    #[must_use]
    pub const fn delete_mode(&self) -> bool {
        self.delete_mode
    }

    /// Cell the preview is anchored at.
    #[must_use]
    pub const fn hovered(&self) -> Option<CellCoord> {
        self.hovered
    }

    /// Builds the preview for the selected item at the hovered cell.
    ///
    /// `is_placeable` should mirror the farm's `query::is_placeable`.
    pub fn preview<V>(&self, mut is_placeable: V) -> Option<PlacementPreview>
    where
        V: FnMut(CellCoord, &ItemDefinition) -> bool,
    {
        let item = self.selected.as_ref()?;
        let anchor = self.hovered?;
        let placeable = is_placeable(anchor, item);
        Some(PlacementPreview::new(item.clone(), anchor, placeable))
    }

    /// Consumes farm events and adapter-derived input to emit planner commands.
    ///
    /// The `instance_at` closure should mirror the farm's `query::instance_at`
    /// helper and `is_placeable` its `query::is_placeable`.
    pub fn handle<F, V>(
        &mut self,
        events: &[Event],
        input: PlannerInput,
        mut instance_at: F,
        is_placeable: V,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<InstanceId>,
        V: FnMut(CellCoord, &ItemDefinition) -> bool,
    {
        self.hovered = input.cursor_cell;

        for event in events {
            match event {
                Event::MoveStarted { item, anchor, .. } => {
                    self.selected = Some(item.clone());
                    self.hovered = Some(*anchor);
                    self.moving = true;
                }
                Event::ItemPlaced { instance } if self.moving => {
                    tracing::debug!(instance = %instance.id, "move completed");
                    self.clear_selection();
                }
                _ => {}
            }
        }

        if let Some(item) = input.select {
            self.selected = Some(item);
        }

        if input.cancel_action || (input.deselect_action && self.selected.is_some()) {
            self.clear_selection();
        }

        if input.toggle_delete_mode {
            self.delete_mode = !self.delete_mode;
        }

        if input.confirm_action {
            self.confirm(&mut instance_at, is_placeable, out);
        }

        if input.clear_action {
            out.push(Command::ClearAll);
        }
    }

    fn confirm<F, V>(&self, instance_at: &mut F, is_placeable: V, out: &mut Vec<Command>)
    where
        F: FnMut(CellCoord) -> Option<InstanceId>,
        V: FnMut(CellCoord, &ItemDefinition) -> bool,
    {
        let Some(cell) = self.hovered else {
            return;
        };

        let hovered_instance = instance_at(cell);
        if self.delete_mode {
            if let Some(instance) = hovered_instance {
                out.push(Command::RemoveItem { instance });
                return;
            }
        }

        if self.selected.is_some() {
            if let Some(preview) = self.preview(is_placeable) {
                if preview.placeable {
                    out.push(Command::PlaceItem {
                        item: preview.item,
                        anchor: preview.anchor,
                    });
                }
            }
            return;
        }

        if let Some(instance) = hovered_instance {
            out.push(Command::BeginMove { instance });
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.moving = false;
    }
}
