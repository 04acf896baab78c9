//! Land value engine - per-tile value derived from nearby building influence

use tracing::trace;

use crate::buildings::BuildingKind;
use crate::grid::{Grid, Position, BASE_LAND_VALUE, MAX_LAND_VALUE};

/// How strongly a building kind shifts land value around it, and how far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Influence {
    pub value: i32,
    pub radius: u32,
}

pub fn influence(kind: BuildingKind) -> Influence {
    match kind {
        BuildingKind::Commercial => Influence { value: 2, radius: 1 },
        BuildingKind::Industrial => Influence {
            value: -1,
            radius: 1,
        },
        BuildingKind::Power => Influence {
            value: -2,
            radius: 2,
        },
        BuildingKind::Road => Influence { value: 1, radius: 1 },
        BuildingKind::Residential => Influence { value: 0, radius: 0 },
    }
}

/// Land value of the tile at `target`: the base value plus the full influence
/// of every building within its radius (excluding the tile itself), clamped
/// once at the end.
pub fn compute_land_value(grid: &Grid, target: Position) -> u8 {
    let total = grid
        .occupied()
        .filter_map(|(position, kind)| {
            let influence = influence(kind);
            let distance = position.distance(target);
            (distance > 0 && distance <= influence.radius).then_some(influence.value)
        })
        .fold(i32::from(BASE_LAND_VALUE), |acc, value| acc + value);
    clamp_land_value(total)
}

/// Recomputes every tile from scratch. Cells whose value does not change keep
/// sharing storage with `grid`.
pub fn recompute_all(grid: &Grid) -> Grid {
    let updates: Vec<(Position, u8)> = grid
        .cells()
        .filter_map(|cell| {
            let value = compute_land_value(grid, cell.position);
            (value != cell.land_value).then_some((cell.position, value))
        })
        .collect();
    trace!(changed = updates.len(), "recomputed land values");

    updates
        .into_iter()
        .fold(grid.clone(), |next, (position, value)| {
            next.update(position.x, position.y, |cell| cell.land_value = value)
                .unwrap_or(next)
        })
}

fn clamp_land_value(total: i32) -> u8 {
    total.clamp(0, i32::from(MAX_LAND_VALUE)) as u8
}
