//! Resource ledger - population and power derived from the grid, money carried over

use serde::{Deserialize, Serialize};

use crate::buildings::ResourceKind;
use crate::grid::Grid;

pub const STARTING_MONEY: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub money: i64,
    pub population: i64,
    pub power: i64,
}

impl Resources {
    pub fn new(money: i64) -> Self {
        Self {
            money,
            population: 0,
            power: 0,
        }
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new(STARTING_MONEY)
    }
}

/// Totals for `grid`. Population and power are summed from every occupied
/// tile; money is a running balance and is passed through untouched, even for
/// buildings that declare a money yield.
pub fn recompute(grid: &Grid, current_money: i64) -> Resources {
    let (population, power) = grid
        .occupied()
        .map(|(_, kind)| kind.spec())
        .fold((0, 0), |(population, power), spec| {
            (
                population + spec.provides(ResourceKind::Population),
                power + spec.provides(ResourceKind::Power),
            )
        });
    Resources {
        money: current_money,
        population,
        power,
    }
}
