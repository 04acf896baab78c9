//! Session controller - owns the current city and serializes every transition

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::buildings::BuildingKind;
use crate::grid::{Grid, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::land_value::recompute_all;
use crate::ledger::{self, Resources, STARTING_MONEY};
use crate::placement::{self, DemolishError, PlaceError};
use crate::snapshot::{CitySnapshot, TileInfo};

pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub width: u32,
    pub height: u32,
    pub starting_money: i64,
    pub history_limit: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            starting_money: STARTING_MONEY,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// What a click on the map does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "tool", content = "kind", rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Idle,
    Build(BuildingKind),
    Bulldoze,
}

/// Input intents. Scenario scripts and the web API both speak this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Select { kind: BuildingKind },
    Bulldoze,
    ClearTool,
    Click { x: i32, y: i32 },
    Place { kind: BuildingKind, x: i32, y: i32 },
    Demolish { x: i32, y: i32 },
    Undo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Placed {
        kind: BuildingKind,
        x: i32,
        y: i32,
        cost: i64,
    },
    Demolished {
        kind: BuildingKind,
        x: i32,
        y: i32,
        refund: i64,
    },
    ToolChanged { tool: Tool },
    Undone,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Placed { kind, x, y, cost } => {
                write!(f, "Built {kind} at ({x}, {y}) for ${cost}")
            }
            Event::Demolished { refund, .. } => write!(f, "Demolished! Refund: ${refund}"),
            Event::ToolChanged { tool } => match tool {
                Tool::Idle => f.write_str("No tool selected"),
                Tool::Build(kind) => write!(f, "Selected {kind}"),
                Tool::Bulldoze => f.write_str("Bulldoze mode"),
            },
            Event::Undone => f.write_str("Undid last change"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Place(#[from] PlaceError),
    #[error(transparent)]
    Demolish(#[from] DemolishError),
    #[error("Select a building or the bulldozer before clicking ({x}, {y})")]
    NoToolSelected { x: i32, y: i32 },
    #[error("Nothing to undo")]
    NothingToUndo,
}

impl SessionError {
    /// Stable machine-readable tag for API clients.
    pub fn reason(&self) -> &'static str {
        match self {
            SessionError::Place(PlaceError::InvalidPosition { .. }) => "invalid_position",
            SessionError::Place(PlaceError::Occupied { .. }) => "occupied",
            SessionError::Place(PlaceError::InsufficientFunds { .. }) => "insufficient_funds",
            SessionError::Demolish(_) => "demolish_failed",
            SessionError::NoToolSelected { .. } => "no_tool_selected",
            SessionError::NothingToUndo => "nothing_to_undo",
        }
    }
}

#[derive(Debug, Clone)]
struct Checkpoint {
    grid: Grid,
    resources: Resources,
}

/// The single owner of the city. Every mutation goes through here and swaps
/// in a complete new `(grid, resources)` pair, so readers never observe a
/// half-applied change.
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    resources: Resources,
    tool: Tool,
    history: VecDeque<Checkpoint>,
    history_limit: usize,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        let grid = recompute_all(&Grid::create(settings.width, settings.height));
        let resources = ledger::recompute(&grid, settings.starting_money);
        info!(
            width = settings.width,
            height = settings.height,
            money = resources.money,
            "session started"
        );
        Self {
            grid,
            resources,
            tool: Tool::Idle,
            history: VecDeque::new(),
            history_limit: settings.history_limit,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn apply(&mut self, command: Command) -> Result<Event, SessionError> {
        debug!(?command, "applying command");
        match command {
            Command::Select { kind } => Ok(self.select(kind)),
            Command::Bulldoze => Ok(self.toggle_bulldoze()),
            Command::ClearTool => Ok(self.clear_tool()),
            Command::Click { x, y } => self.click(x, y),
            Command::Place { kind, x, y } => self.place(kind, x, y),
            Command::Demolish { x, y } => self.demolish(x, y),
            Command::Undo => self.undo(),
        }
    }

    pub fn select(&mut self, kind: BuildingKind) -> Event {
        self.tool = Tool::Build(kind);
        Event::ToolChanged { tool: self.tool }
    }

    /// Enters bulldoze mode, or leaves it when already active. Either way any
    /// selected building is dropped.
    pub fn toggle_bulldoze(&mut self) -> Event {
        self.tool = match self.tool {
            Tool::Bulldoze => Tool::Idle,
            _ => Tool::Bulldoze,
        };
        Event::ToolChanged { tool: self.tool }
    }

    pub fn clear_tool(&mut self) -> Event {
        self.tool = Tool::Idle;
        Event::ToolChanged { tool: self.tool }
    }

    /// Applies the current tool at `(x, y)`.
    pub fn click(&mut self, x: i32, y: i32) -> Result<Event, SessionError> {
        match self.tool {
            Tool::Build(kind) => self.place(kind, x, y),
            Tool::Bulldoze => self.demolish(x, y),
            Tool::Idle => Err(SessionError::NoToolSelected { x, y }),
        }
    }

    pub fn place(&mut self, kind: BuildingKind, x: i32, y: i32) -> Result<Event, SessionError> {
        let placed = placement::place(&self.grid, x, y, kind, &self.resources)?;
        self.commit(placed.grid, placed.resources);
        Ok(Event::Placed {
            kind,
            x,
            y,
            cost: placed.cost,
        })
    }

    pub fn demolish(&mut self, x: i32, y: i32) -> Result<Event, SessionError> {
        let demolished = placement::demolish(&self.grid, x, y, &self.resources)?;
        self.commit(demolished.grid, demolished.resources);
        Ok(Event::Demolished {
            kind: demolished.kind,
            x,
            y,
            refund: demolished.refund,
        })
    }

    /// Restores the city exactly as it was before the last place/demolish,
    /// money included.
    pub fn undo(&mut self) -> Result<Event, SessionError> {
        let checkpoint = self.history.pop_back().ok_or(SessionError::NothingToUndo)?;
        self.grid = checkpoint.grid;
        self.resources = checkpoint.resources;
        debug!(remaining = self.history.len(), "undo");
        Ok(Event::Undone)
    }

    pub fn inspect(&self, x: i32, y: i32) -> Option<TileInfo> {
        self.grid
            .get(x, y)
            .map(|cell| TileInfo::describe(cell, self.tool))
    }

    pub fn snapshot(&self) -> CitySnapshot {
        CitySnapshot::capture(&self.grid, self.resources, self.tool)
    }

    fn commit(&mut self, grid: Grid, resources: Resources) {
        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(Checkpoint {
                grid: std::mem::replace(&mut self.grid, grid),
                resources: std::mem::replace(&mut self.resources, resources),
            });
        } else {
            self.grid = grid;
            self.resources = resources;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Occupancy;

    #[test]
    fn click_dispatches_on_tool() {
        let mut session = Session::default();
        assert_eq!(
            session.click(1, 1),
            Err(SessionError::NoToolSelected { x: 1, y: 1 })
        );

        session.select(BuildingKind::Road);
        assert!(matches!(session.click(1, 1), Ok(Event::Placed { cost: 100, .. })));

        session.toggle_bulldoze();
        assert_eq!(
            session.click(1, 1),
            Ok(Event::Demolished {
                kind: BuildingKind::Road,
                x: 1,
                y: 1,
                refund: 50,
            })
        );
        assert_eq!(session.resources().money, 10_000 - 100 + 50);
    }

    #[test]
    fn bulldoze_toggle_clears_selection() {
        let mut session = Session::default();
        session.select(BuildingKind::Power);
        session.toggle_bulldoze();
        assert_eq!(session.tool(), Tool::Bulldoze);
        session.toggle_bulldoze();
        assert_eq!(session.tool(), Tool::Idle);
    }

    #[test]
    fn failed_commands_leave_state_alone() {
        let mut session = Session::new(SessionSettings {
            starting_money: 50,
            ..SessionSettings::default()
        });
        let before = session.snapshot();
        let err = session.place(BuildingKind::Road, 0, 0).unwrap_err();
        assert_eq!(err.reason(), "insufficient_funds");
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn undo_restores_grid_and_money() {
        let mut session = Session::default();
        session.place(BuildingKind::Power, 5, 5).unwrap();
        session.place(BuildingKind::Residential, 0, 0).unwrap();
        assert_eq!(session.resources().money, 10_000 - 5_000 - 500);

        session.apply(Command::Undo).unwrap();
        assert_eq!(session.resources().money, 5_000);
        assert_eq!(session.resources().population, 0);
        assert!(session.grid().get(0, 0).unwrap().occupancy.is_empty());
        assert_eq!(session.grid().get(6, 6).unwrap().land_value, 3);

        session.undo().unwrap();
        assert!(session.grid().cells().all(|cell| cell.land_value == 5));
        assert_eq!(session.undo(), Err(SessionError::NothingToUndo));
    }

    #[test]
    fn history_is_bounded() {
        let mut session = Session::new(SessionSettings {
            history_limit: 2,
            ..SessionSettings::default()
        });
        for x in 0..4 {
            session.place(BuildingKind::Road, x, 0).unwrap();
        }
        assert_eq!(session.history_len(), 2);
        session.undo().unwrap();
        session.undo().unwrap();
        assert_eq!(
            session.grid().get(1, 0).unwrap().occupancy,
            Occupancy::Occupied(BuildingKind::Road)
        );
        assert!(session.undo().is_err());
    }

    #[test]
    fn inspect_previews_selected_building() {
        let mut session = Session::default();
        session.place(BuildingKind::Commercial, 5, 5).unwrap();
        session.select(BuildingKind::Industrial);

        match session.inspect(6, 5) {
            Some(TileInfo::Empty {
                land_value,
                preview: Some(preview),
                ..
            }) => {
                assert_eq!(land_value, 7);
                assert_eq!(preview.cost, 2_400);
                assert_eq!(preview.base_cost, 2_000);
            }
            other => panic!("unexpected tile info {other:?}"),
        }

        match session.inspect(5, 5) {
            Some(TileInfo::Occupied {
                kind,
                original_cost,
                ..
            }) => {
                assert_eq!(kind, BuildingKind::Commercial);
                assert_eq!(original_cost, 1_000);
            }
            other => panic!("unexpected tile info {other:?}"),
        }
        assert!(session.inspect(-1, 5).is_none());
    }

    #[test]
    fn commands_round_trip_through_json() {
        let command: Command =
            serde_json::from_str(r#"{"command":"place","kind":"road","x":2,"y":3}"#).unwrap();
        assert_eq!(
            command,
            Command::Place {
                kind: BuildingKind::Road,
                x: 2,
                y: 3
            }
        );
    }
}
