//! Grid city-builder simulation core.
//!
//! Buildings are placed on and demolished from a fixed grid. Each placement
//! costs money scaled by the tile's land value, and land values are shaped by
//! the influence of nearby buildings. Every transition produces a fresh
//! `(grid, resources)` pair; nothing is mutated behind a caller's back.

pub mod buildings;
pub mod cost;
pub mod grid;
pub mod land_value;
pub mod ledger;
pub mod placement;
pub mod render;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod web;

pub use buildings::{BuildingKind, BuildingSpec, ResourceKind};
pub use grid::{Grid, GridCell, Occupancy, Position};
pub use ledger::Resources;
pub use placement::{DemolishError, Demolition, PlaceError, Placement};
pub use scenario::{Scenario, ScenarioLoader};
pub use session::{Command, Event, Session, SessionError, SessionSettings, Tool};
pub use snapshot::{CellView, CitySnapshot, TileInfo};
