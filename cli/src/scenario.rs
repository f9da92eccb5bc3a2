//! Scenario files and the replay loop that drives a `DragCoordinator`.

#[cfg(test)]
#[path = "scenario_test.rs"]
mod scenario_test;

use std::time::{Duration, Instant};

use catgrid::{
    ConfigError, CoordinatorError, DragConfig, DragCoordinator, Grid, GridConfig, GridId, ItemConfig, Notification,
    Point, PointerEvent,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("grid `{0}` is not defined in the scenario")]
    UnknownGrid(String),
    #[error("grid `{0}` is defined twice")]
    DuplicateGrid(String),
    #[error("item `{item}` not found in grid `{grid}`")]
    UnknownItem { grid: String, item: String },
    #[error("invalid grid config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] CoordinatorError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub grids: Vec<GridSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSpec {
    pub name: String,
    #[serde(default)]
    pub config: GridConfig,
    #[serde(default)]
    pub origin: Point,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

/// One recorded input. Coordinates are page pixels; the screen position is
/// taken to be the same point.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Down { grid: String, item: String, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Leave { grid: String },
    Cancel,
    Resize { grid: String, item: ItemConfig },
    DragOver { item: ItemConfig, x: f64, y: f64 },
    Drop { item: ItemConfig, x: f64, y: f64 },
}

pub struct Replay {
    coordinator: DragCoordinator,
    names: Vec<(String, GridId)>,
    clock: Instant,
    step: Duration,
}

impl Replay {
    /// Build and register every grid of the scenario.
    ///
    /// Moves are stamped on a virtual clock advancing by `step` per input so
    /// the move throttle behaves the same on every run.
    pub fn new(grids: Vec<GridSpec>, config: DragConfig, step: Duration) -> Result<Self, ReplayError> {
        let mut coordinator = DragCoordinator::new(config);
        let mut names: Vec<(String, GridId)> = Vec::with_capacity(grids.len());
        for spec in grids {
            if names.iter().any(|(name, _)| *name == spec.name) {
                return Err(ReplayError::DuplicateGrid(spec.name));
            }
            let grid = Grid::with_items(spec.config, spec.items)?.at(spec.origin);
            let id = coordinator.register_grid(grid);
            debug!(name = %spec.name, grid = %id, "scenario grid ready");
            names.push((spec.name, id));
        }
        Ok(Self { coordinator, names, clock: Instant::now(), step })
    }

    #[must_use]
    pub fn coordinator(&self) -> &DragCoordinator {
        &self.coordinator
    }

    /// Feed one step and return the notifications it produced. Accepted
    /// moves are applied before returning.
    pub fn apply(&mut self, step: &Step) -> Result<Vec<Notification>, ReplayError> {
        self.clock += self.step;
        let notes = match step {
            Step::Down { grid, item, x, y } => {
                let id = self.grid_id(grid)?;
                let config = self
                    .coordinator
                    .grid(id)
                    .and_then(|g| g.item(item))
                    .cloned()
                    .ok_or_else(|| ReplayError::UnknownItem { grid: grid.clone(), item: item.clone() })?;
                self.coordinator.pointer_down(id, &config, PointerEvent::at(*x, *y))?
            }
            Step::Move { x, y } => self.coordinator.pointer_move_at(PointerEvent::at(*x, *y), self.clock),
            Step::Up { x, y } => self.coordinator.pointer_up(PointerEvent::at(*x, *y)),
            Step::Leave { grid } => {
                let id = self.grid_id(grid)?;
                self.coordinator.pointer_leave(id)?
            }
            Step::Cancel => self.coordinator.cancel(),
            Step::Resize { grid, item } => {
                let id = self.grid_id(grid)?;
                vec![self.coordinator.resize_finished(id, item.clone())?]
            }
            Step::DragOver { item, x, y } => self.coordinator.external_drag_over(item, PointerEvent::at(*x, *y)),
            Step::Drop { item, x, y } => self.coordinator.external_drop(item, PointerEvent::at(*x, *y)),
        };
        for note in &notes {
            if let Notification::ItemMoved(m) = note {
                self.coordinator.apply_move(m)?;
            }
        }
        Ok(notes)
    }

    /// Run every step, rendering each notification as JSON.
    pub fn run(&mut self, steps: &[Step]) -> Result<Vec<Value>, ReplayError> {
        let mut out = Vec::new();
        for step in steps {
            let notes = self.apply(step)?;
            out.extend(notes.iter().map(|n| self.render(n)));
        }
        Ok(out)
    }

    #[must_use]
    pub fn render(&self, note: &Notification) -> Value {
        match note {
            Notification::DragStarted { origin, item } => {
                json!({"event": "drag_started", "grid": self.name_of(*origin), "item": item})
            }
            Notification::Placeholder { grid, placeholder } => {
                json!({"event": "placeholder", "grid": self.name_of(*grid), "placeholder": placeholder})
            }
            Notification::ItemMoved(m) => json!({
                "event": "item_moved",
                "grid": self.name_of(m.grid),
                "origin": self.name_of(m.origin),
                "old": m.old_config,
                "new": m.new_config,
            }),
            Notification::ItemAdded { grid, item } => {
                json!({"event": "item_added", "grid": self.name_of(*grid), "item": item})
            }
            Notification::ItemResizeStop { grid, item } => {
                json!({"event": "item_resize_stop", "grid": self.name_of(*grid), "item": item})
            }
            Notification::DragEnded { committed } => json!({"event": "drag_ended", "committed": committed}),
        }
    }

    /// Current items of every grid, keyed by scenario name.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let mut grids = Map::new();
        for (name, id) in &self.names {
            let items = self.coordinator.grid(*id).map_or(&[][..], Grid::items);
            grids.insert(name.clone(), json!(items));
        }
        json!({"event": "final", "grids": grids})
    }

    fn grid_id(&self, name: &str) -> Result<GridId, ReplayError> {
        self.names
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
            .ok_or_else(|| ReplayError::UnknownGrid(name.to_owned()))
    }

    fn name_of(&self, id: GridId) -> String {
        self.names
            .iter()
            .find(|(_, g)| *g == id)
            .map_or_else(|| id.to_string(), |(name, _)| name.clone())
    }
}
