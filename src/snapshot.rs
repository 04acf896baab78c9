//! Read-only views handed to renderers and API clients

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingKind, ResourceKind};
use crate::cost::adjusted_cost;
use crate::grid::{Grid, GridCell, Occupancy};
use crate::ledger::Resources;
use crate::session::Tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub x: i32,
    pub y: i32,
    pub occupancy: Occupancy,
    pub land_value: u8,
}

impl From<&GridCell> for CellView {
    fn from(cell: &GridCell) -> Self {
        Self {
            x: cell.position.x,
            y: cell.position.y,
            occupancy: cell.occupancy,
            land_value: cell.land_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub width: u32,
    pub height: u32,
    pub resources: Resources,
    pub tool: Tool,
    /// Row-major.
    pub cells: Vec<CellView>,
}

impl CitySnapshot {
    pub fn capture(grid: &Grid, resources: Resources, tool: Tool) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            resources,
            tool,
            cells: grid.cells().map(CellView::from).collect(),
        }
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&CellView> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPreview {
    pub kind: BuildingKind,
    pub cost: i64,
    pub base_cost: i64,
    pub provides: Vec<(ResourceKind, i64)>,
}

impl BuildPreview {
    pub fn new(kind: BuildingKind, land_value: u8) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            cost: adjusted_cost(spec.base_cost, land_value),
            base_cost: spec.base_cost,
            provides: spec.provides.to_vec(),
        }
    }
}

/// Hover details for a single tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tile", rename_all = "snake_case")]
pub enum TileInfo {
    Empty {
        x: i32,
        y: i32,
        land_value: u8,
        preview: Option<BuildPreview>,
        bulldozing: bool,
    },
    Occupied {
        x: i32,
        y: i32,
        kind: BuildingKind,
        land_value: u8,
        /// Declared base cost, not the adjusted price that was paid.
        original_cost: i64,
        provides: Vec<(ResourceKind, i64)>,
    },
}

impl TileInfo {
    pub fn describe(cell: &GridCell, tool: Tool) -> Self {
        let (x, y) = (cell.position.x, cell.position.y);
        match cell.occupancy {
            Occupancy::Empty => TileInfo::Empty {
                x,
                y,
                land_value: cell.land_value,
                preview: match tool {
                    Tool::Build(kind) => Some(BuildPreview::new(kind, cell.land_value)),
                    _ => None,
                },
                bulldozing: tool == Tool::Bulldoze,
            },
            Occupancy::Occupied(kind) => TileInfo::Occupied {
                x,
                y,
                kind,
                land_value: cell.land_value,
                original_cost: kind.base_cost(),
                provides: kind.spec().provides.to_vec(),
            },
        }
    }
}
