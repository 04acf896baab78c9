//! Placement rules - validated place/demolish transitions over grid snapshots

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::buildings::BuildingKind;
use crate::cost::{adjusted_cost, demolition_refund};
use crate::grid::{Grid, GridCell, Occupancy};
use crate::land_value::recompute_all;
use crate::ledger::{self, Resources};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PlaceError {
    #[error("Invalid position ({x}, {y})!")]
    InvalidPosition { x: i32, y: i32 },
    #[error("Cannot build here! ({x}, {y}) already holds a {existing} building")]
    Occupied {
        x: i32,
        y: i32,
        existing: BuildingKind,
    },
    #[error("Not enough money! {kind} costs ${cost}, you have ${available}")]
    InsufficientFunds {
        kind: BuildingKind,
        cost: i64,
        available: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DemolishError {
    #[error("Nothing to demolish at ({x}, {y})")]
    NothingToDemolish { x: i32, y: i32 },
}

/// A successful placement: the new grid and ledger plus what was paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub grid: Grid,
    pub resources: Resources,
    pub kind: BuildingKind,
    pub cost: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demolition {
    pub grid: Grid,
    pub resources: Resources,
    pub kind: BuildingKind,
    pub refund: i64,
}

/// Checks whether `kind` may go on `cell` and returns the adjusted price.
///
/// Only occupancy and money are checked. The building's declared `requires`
/// are not enforced.
pub fn can_place(
    cell: &GridCell,
    kind: BuildingKind,
    resources: &Resources,
) -> Result<i64, PlaceError> {
    if let Occupancy::Occupied(existing) = cell.occupancy {
        return Err(PlaceError::Occupied {
            x: cell.position.x,
            y: cell.position.y,
            existing,
        });
    }
    let cost = adjusted_cost(kind.base_cost(), cell.land_value);
    if resources.money < cost {
        return Err(PlaceError::InsufficientFunds {
            kind,
            cost,
            available: resources.money,
        });
    }
    Ok(cost)
}

pub fn place(
    grid: &Grid,
    x: i32,
    y: i32,
    kind: BuildingKind,
    resources: &Resources,
) -> Result<Placement, PlaceError> {
    let cell = grid.get(x, y).ok_or(PlaceError::InvalidPosition { x, y })?;
    // Priced against the land value before this building changes it.
    let cost = can_place(cell, kind, resources)?;

    let built = grid
        .with_occupancy(x, y, Occupancy::Occupied(kind))
        .ok_or(PlaceError::InvalidPosition { x, y })?;
    let resources = ledger::recompute(&built, resources.money.saturating_sub(cost));
    let grid = recompute_all(&built);
    debug!(%kind, x, y, cost, money = resources.money, "placed building");

    Ok(Placement {
        grid,
        resources,
        kind,
        cost,
    })
}

pub fn demolish(
    grid: &Grid,
    x: i32,
    y: i32,
    resources: &Resources,
) -> Result<Demolition, DemolishError> {
    let kind = grid
        .get(x, y)
        .and_then(|cell| cell.occupancy.building())
        .ok_or(DemolishError::NothingToDemolish { x, y })?;
    let refund = demolition_refund(kind.base_cost());

    let cleared = grid
        .with_occupancy(x, y, Occupancy::Empty)
        .ok_or(DemolishError::NothingToDemolish { x, y })?;
    let resources = ledger::recompute(&cleared, resources.money.saturating_add(refund));
    let grid = recompute_all(&cleared);
    debug!(%kind, x, y, refund, money = resources.money, "demolished building");

    Ok(Demolition {
        grid,
        resources,
        kind,
        refund,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (Grid, Resources) {
        (Grid::create(20, 15), Resources::default())
    }

    #[test]
    fn place_charges_adjusted_cost_and_updates_totals() {
        let (grid, resources) = fresh();
        let placed = place(&grid, 3, 3, BuildingKind::Residential, &resources).unwrap();
        assert_eq!(placed.cost, 500);
        assert_eq!(placed.resources.money, 9_500);
        assert_eq!(placed.resources.population, 4);
        assert_eq!(
            placed.grid.get(3, 3).unwrap().occupancy,
            Occupancy::Occupied(BuildingKind::Residential)
        );
    }

    #[test]
    fn price_uses_land_value_before_placement() {
        let (grid, resources) = fresh();
        let road = place(&grid, 5, 5, BuildingKind::Road, &resources).unwrap();
        // (6, 5) now sits at 6 thanks to the road.
        let shop = place(&road.grid, 6, 5, BuildingKind::Commercial, &road.resources).unwrap();
        assert_eq!(shop.cost, 1100);
        assert_eq!(shop.resources.money, 10_000 - 100 - 1100);
    }

    #[test]
    fn place_out_of_bounds_is_invalid_position() {
        let (grid, resources) = fresh();
        let err = place(&grid, 20, 0, BuildingKind::Road, &resources).unwrap_err();
        assert_eq!(err, PlaceError::InvalidPosition { x: 20, y: 0 });
        let err = place(&grid, -1, 3, BuildingKind::Road, &resources).unwrap_err();
        assert_eq!(err, PlaceError::InvalidPosition { x: -1, y: 3 });
    }

    #[test]
    fn occupied_wins_over_insufficient_funds() {
        let (grid, resources) = fresh();
        let placed = place(&grid, 1, 1, BuildingKind::Road, &resources).unwrap();
        let broke = Resources::new(0);
        let err = place(&placed.grid, 1, 1, BuildingKind::Power, &broke).unwrap_err();
        assert!(matches!(err, PlaceError::Occupied { existing: BuildingKind::Road, .. }));
    }

    #[test]
    fn requirements_are_not_enforced() {
        let (grid, resources) = fresh();
        // Commercial declares power and population requirements; none exist yet.
        assert!(place(&grid, 0, 0, BuildingKind::Commercial, &resources).is_ok());
    }

    #[test]
    fn can_place_reports_cost() {
        let grid = Grid::create(3, 3);
        let cell = grid.get(1, 1).unwrap();
        assert_eq!(can_place(cell, BuildingKind::Power, &Resources::new(5_000)), Ok(5_000));
        assert_eq!(
            can_place(cell, BuildingKind::Power, &Resources::new(4_999)),
            Err(PlaceError::InsufficientFunds {
                kind: BuildingKind::Power,
                cost: 5_000,
                available: 4_999,
            })
        );
    }

    #[test]
    fn demolish_refunds_half_base_cost() {
        let (grid, resources) = fresh();
        let shop = place(&grid, 5, 5, BuildingKind::Road, &resources).unwrap();
        let shop = place(&shop.grid, 6, 5, BuildingKind::Commercial, &shop.resources).unwrap();
        let gone = demolish(&shop.grid, 6, 5, &shop.resources).unwrap();
        assert_eq!(gone.kind, BuildingKind::Commercial);
        assert_eq!(gone.refund, 500, "refund ignores the 1100 actually paid");
        assert_eq!(gone.resources.money, shop.resources.money + 500);
        assert!(gone.grid.get(6, 5).unwrap().occupancy.is_empty());
    }

    #[test]
    fn demolish_restores_neighbour_values() {
        let (grid, resources) = fresh();
        let plant = place(&grid, 5, 5, BuildingKind::Power, &resources).unwrap();
        assert_eq!(plant.grid.get(7, 7).unwrap().land_value, 3);
        let gone = demolish(&plant.grid, 5, 5, &plant.resources).unwrap();
        assert!(gone.grid.cells().all(|cell| cell.land_value == 5));
        assert_eq!(gone.resources.power, 0);
    }

    #[test]
    fn demolish_empty_or_outside_fails() {
        let (grid, resources) = fresh();
        assert_eq!(
            demolish(&grid, 2, 2, &resources).unwrap_err(),
            DemolishError::NothingToDemolish { x: 2, y: 2 }
        );
        assert!(demolish(&grid, 99, 2, &resources).is_err());
    }

    #[test]
    fn balance_saturates_instead_of_overflowing() {
        let grid = Grid::create(20, 15);
        let placed = place(&grid, 0, 0, BuildingKind::Power, &Resources::new(i64::MAX)).unwrap();
        assert_eq!(placed.resources.money, i64::MAX - 5_000);

        let near_max = Resources::new(i64::MAX - 1);
        let gone = demolish(&placed.grid, 0, 0, &near_max).unwrap();
        assert_eq!(gone.refund, 2_500);
        assert_eq!(gone.resources.money, i64::MAX);

        let overdrawn = Resources::new(i64::MIN);
        let gone = demolish(&placed.grid, 0, 0, &overdrawn).unwrap();
        assert_eq!(gone.resources.money, i64::MIN + 2_500);
    }

    #[test]
    fn errors_serialize_with_reason_tag() {
        let json = serde_json::to_value(PlaceError::InvalidPosition { x: 1, y: 2 }).unwrap();
        assert_eq!(json["reason"], "invalid_position");
    }
}
