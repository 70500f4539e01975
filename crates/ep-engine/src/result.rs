//! Projection result types.
//!
//! Field names and nesting are part of the downstream contract: presentation
//! layers derive every chart and Sankey diagram purely from this shape, so
//! the serialized form uses the camelCase names consumers index by.
//! All energy quantities are gigajoules; display-unit conversion is the
//! consumer's concern.

use ep_core::{Real, ShareMap, SubsectorMap, ValueMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything computed for one projection year.
///
/// Created and written exactly once per year, in increasing year order, and
/// never mutated afterwards; later years only read prior years' `activity`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyResult {
    /// Activity level per sector/subsector.
    pub activity: SubsectorMap<Real>,
    /// Demand technology shares (0–100) per sector/subsector.
    pub demand_tech_mix: SubsectorMap<ShareMap>,
    /// Power production technology shares (0–100).
    pub power_prod_mix: ShareMap,
    /// Hydrogen production technology shares (0–100).
    pub hydrogen_prod_mix: ShareMap,
    /// Activity attributed to each technology.
    pub demand_tech_activity: SubsectorMap<ValueMap>,
    /// Final energy consumption: sector → subsector → tech → fuel (GJ).
    pub fec_detailed: SubsectorMap<BTreeMap<String, ValueMap>>,
    /// Useful energy: sector → subsector → tech → fuel (GJ).
    pub ue_detailed: SubsectorMap<BTreeMap<String, ValueMap>>,
    pub fec_by_fuel: ValueMap,
    pub ue_by_fuel: ValueMap,
    pub ue_by_subsector: SubsectorMap<Real>,
    /// Energy consumption after the hydrogen cascade: `Hydrogen` removed,
    /// hydrogen production input fuels merged in.
    pub ec_post_hydrogen: ValueMap,
    /// Energy consumption after the power cascade: `Electricity` removed,
    /// power production input fuels merged in.
    pub ec_post_power: ValueMap,
    /// Primary energy demand per primary fuel.
    pub ped_by_fuel: ValueMap,
}

/// Full multi-year projection for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// Scenario name as given in the scenario parameters.
    pub scenario: String,
    /// Projection years in increasing order.
    pub years: Vec<i32>,
    /// Year → result table, ordered by year.
    pub by_year: BTreeMap<i32, YearlyResult>,
}

impl Projection {
    pub fn get(&self, year: i32) -> Option<&YearlyResult> {
        self.by_year.get(&year)
    }

    /// Iterate results in increasing year order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &YearlyResult)> + '_ {
        self.by_year.iter().map(|(year, result)| (*year, result))
    }
}
