//! Cost model - land-value-adjusted construction prices and demolition refunds

use crate::grid::BASE_LAND_VALUE;

const STEP_PER_LAND_VALUE: f64 = 0.1;
const MIN_MULTIPLIER: f64 = 0.5;
const MAX_MULTIPLIER: f64 = 1.5;
const REFUND_RATE: f64 = 0.5;

/// Price multiplier for a tile: 1.0 at the baseline, 10% per land-value point
/// either side, limited to [0.5, 1.5].
pub fn cost_multiplier(land_value: u8) -> f64 {
    let offset = f64::from(land_value) - f64::from(BASE_LAND_VALUE);
    (1.0 + offset * STEP_PER_LAND_VALUE).clamp(MIN_MULTIPLIER, MAX_MULTIPLIER)
}

pub fn adjusted_cost(base_cost: i64, land_value: u8) -> i64 {
    (base_cost as f64 * cost_multiplier(land_value)).round() as i64
}

/// Half of the declared base cost, rounded down. The price actually paid at
/// placement time plays no part.
pub fn demolition_refund(base_cost: i64) -> i64 {
    (base_cost as f64 * REFUND_RATE).floor() as i64
}
