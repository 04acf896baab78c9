//! Building catalog - the static data behind every placeable kind

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resources a building can declare it provides or requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Money,
    Population,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Residential,
    Commercial,
    Industrial,
    Power,
    Road,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 5] = [
        BuildingKind::Residential,
        BuildingKind::Commercial,
        BuildingKind::Industrial,
        BuildingKind::Power,
        BuildingKind::Road,
    ];

    pub fn spec(self) -> &'static BuildingSpec {
        match self {
            BuildingKind::Residential => &RESIDENTIAL,
            BuildingKind::Commercial => &COMMERCIAL,
            BuildingKind::Industrial => &INDUSTRIAL,
            BuildingKind::Power => &POWER_PLANT,
            BuildingKind::Road => &ROAD,
        }
    }

    pub fn base_cost(self) -> i64 {
        self.spec().base_cost
    }

    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::Residential => "residential",
            BuildingKind::Commercial => "commercial",
            BuildingKind::Industrial => "industrial",
            BuildingKind::Power => "power",
            BuildingKind::Road => "road",
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared economics of one building kind.
///
/// `requires` is carried as data but placement never checks it; only money
/// gates construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingSpec {
    pub base_cost: i64,
    pub provides: &'static [(ResourceKind, i64)],
    pub requires: &'static [(ResourceKind, i64)],
}

impl BuildingSpec {
    /// Amount of `resource` this building provides, zero when undeclared.
    pub fn provides(&self, resource: ResourceKind) -> i64 {
        lookup(self.provides, resource)
    }

    pub fn requires(&self, resource: ResourceKind) -> i64 {
        lookup(self.requires, resource)
    }
}

fn lookup(amounts: &[(ResourceKind, i64)], resource: ResourceKind) -> i64 {
    amounts
        .iter()
        .filter(|(kind, _)| *kind == resource)
        .map(|(_, amount)| *amount)
        .sum()
}

const RESIDENTIAL: BuildingSpec = BuildingSpec {
    base_cost: 500,
    provides: &[(ResourceKind::Population, 4)],
    requires: &[(ResourceKind::Power, 1)],
};

const COMMERCIAL: BuildingSpec = BuildingSpec {
    base_cost: 1000,
    provides: &[(ResourceKind::Money, 100)],
    requires: &[(ResourceKind::Power, 2), (ResourceKind::Population, 2)],
};

const INDUSTRIAL: BuildingSpec = BuildingSpec {
    base_cost: 2000,
    provides: &[(ResourceKind::Money, 200)],
    requires: &[(ResourceKind::Power, 3)],
};

const POWER_PLANT: BuildingSpec = BuildingSpec {
    base_cost: 5000,
    provides: &[(ResourceKind::Power, 10)],
    requires: &[],
};

const ROAD: BuildingSpec = BuildingSpec {
    base_cost: 100,
    provides: &[],
    requires: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_declared_costs() {
        let costs: Vec<i64> = BuildingKind::ALL.iter().map(|k| k.base_cost()).collect();
        assert_eq!(costs, vec![500, 1000, 2000, 5000, 100]);
    }

    #[test]
    fn undeclared_resources_read_as_zero() {
        let road = BuildingKind::Road.spec();
        assert_eq!(road.provides(ResourceKind::Population), 0);
        assert_eq!(road.requires(ResourceKind::Power), 0);
        assert_eq!(BuildingKind::Commercial.spec().requires(ResourceKind::Population), 2);
    }

    #[test]
    fn kinds_serialize_in_snake_case() {
        let json = serde_json::to_string(&BuildingKind::Power).unwrap();
        assert_eq!(json, "\"power\"");
        let parsed: BuildingKind = serde_json::from_str("\"residential\"").unwrap();
        assert_eq!(parsed, BuildingKind::Residential);
    }
}
