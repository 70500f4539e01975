//! Dataset and scenario schema definitions.

use ep_core::{Real, ShareMap, SubsectorMap, ValueMap, nested2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Last year the first growth phase applies to: stepping into a year up to
/// and including this one uses `p1`, later steps use `p2`.
pub const GROWTH_PHASE_SPLIT_YEAR: i32 = 2035;

/// Conversion efficiency assumed when no level of the efficiency table
/// carries an entry.
pub const DEFAULT_EFFICIENCY: Real = 0.65;

/// Structured input dataset, produced by the external data loader and
/// treated as read-only for the duration of a run.
///
/// All tables are name-keyed nested maps; a missing key at any level means
/// "no contribution" to downstream computations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub start_year: i32,
    pub end_year: i32,
    /// Ordered projection years, inclusive of both ends, yearly step.
    #[serde(default)]
    pub years: Vec<i32>,

    // Taxonomy
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub subsectors: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub technologies: SubsectorMap<Vec<String>>,
    #[serde(default)]
    pub power_techs: Vec<String>,
    #[serde(default)]
    pub hydrogen_techs: Vec<String>,
    #[serde(default)]
    pub end_use_fuels: Vec<String>,
    #[serde(default)]
    pub primary_fuels: Vec<String>,
    /// End-use fuel → conversion technologies that produce it.
    #[serde(default)]
    pub other_conv_techs: BTreeMap<String, Vec<String>>,

    // Demand side
    #[serde(default)]
    pub base_activity: SubsectorMap<Real>,
    /// Display units only; never used in computation.
    #[serde(default)]
    pub activity_units: SubsectorMap<String>,
    /// Base-year technology shares (0–100) per sector/subsector.
    #[serde(default)]
    pub base_demand_tech_mix: SubsectorMap<ShareMap>,
    /// Energy input per unit activity: sector → subsector → tech → fuel.
    #[serde(default)]
    pub unit_energy_consumption: SubsectorMap<BTreeMap<String, ValueMap>>,
    #[serde(default)]
    pub efficiency: EfficiencyTable,

    // Transformation side
    #[serde(default)]
    pub base_power_prod_mix: ShareMap,
    #[serde(default)]
    pub base_hydrogen_prod_mix: ShareMap,
    /// Power production tech → input fuel → energy per unit electricity out.
    #[serde(default)]
    pub power_tech_unit_energy_cons: BTreeMap<String, ValueMap>,
    /// Hydrogen production tech → input fuel → energy per unit hydrogen out.
    #[serde(default)]
    pub hydrogen_tech_unit_energy_cons: BTreeMap<String, ValueMap>,
    /// End-use fuel → conversion tech → primary fuel → energy per unit out.
    #[serde(default)]
    pub other_tech_unit_energy_cons: BTreeMap<String, BTreeMap<String, ValueMap>>,
    /// End-use fuel → conversion tech → share (0–100) of that fuel's supply.
    #[serde(default)]
    pub base_other_prod_mix: BTreeMap<String, ShareMap>,
}

impl Dataset {
    /// Subsectors of a sector (empty when unknown).
    pub fn subsectors_of(&self, sector: &str) -> &[String] {
        self.subsectors.get(sector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Demand technologies competing within one sector/subsector
    /// (empty when unknown).
    pub fn demand_techs(&self, sector: &str, subsector: &str) -> &[String] {
        nested2(&self.technologies, sector, subsector)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Conversion technologies producing an end-use fuel (empty when the
    /// fuel has no declared chain).
    pub fn conv_techs_of(&self, end_use_fuel: &str) -> &[String] {
        self.other_conv_techs
            .get(end_use_fuel)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Conversion efficiency (0–1) with an explicit fallback hierarchy:
/// tech+fuel → tech → subsector → `default`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyTable {
    /// sector → subsector → tech → fuel → efficiency
    #[serde(default)]
    pub by_tech_fuel: SubsectorMap<BTreeMap<String, ValueMap>>,
    /// sector → subsector → tech → efficiency
    #[serde(default)]
    pub by_tech: SubsectorMap<ValueMap>,
    /// sector → subsector → efficiency
    #[serde(default)]
    pub by_subsector: SubsectorMap<Real>,
    #[serde(default = "default_efficiency")]
    pub default: Real,
}

impl Default for EfficiencyTable {
    fn default() -> Self {
        Self {
            by_tech_fuel: SubsectorMap::default(),
            by_tech: SubsectorMap::default(),
            by_subsector: SubsectorMap::default(),
            default: DEFAULT_EFFICIENCY,
        }
    }
}

fn default_efficiency() -> Real {
    DEFAULT_EFFICIENCY
}

impl EfficiencyTable {
    /// Resolve the efficiency for one tech/fuel pair through the fallback
    /// hierarchy.
    pub fn lookup(&self, sector: &str, subsector: &str, tech: &str, fuel: &str) -> Real {
        if let Some(eta) = nested2(&self.by_tech_fuel, sector, subsector)
            .and_then(|techs| techs.get(tech))
            .and_then(|fuels| fuels.get(fuel))
        {
            return *eta;
        }
        if let Some(eta) =
            nested2(&self.by_tech, sector, subsector).and_then(|techs| techs.get(tech))
        {
            return *eta;
        }
        if let Some(eta) = nested2(&self.by_subsector, sector, subsector) {
            return *eta;
        }
        self.default
    }
}

/// Scenario parameters for one projection run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// `"sector|subsector"` → two-phase multiplicative growth factors.
    #[serde(default)]
    pub activity_growth_factors: BTreeMap<String, GrowthPhases>,
    /// `"Category|CategoryKey|Tech"` → declared behavior.
    #[serde(default)]
    pub tech_behaviors_and_params: BTreeMap<String, TechBehavior>,
}

impl Scenario {
    /// Declared behavior for a technology in a category; absent entries
    /// default to [`TechBehavior::Fixed`].
    pub fn behavior_for(&self, category: &CategoryId, tech: &str) -> TechBehavior {
        self.tech_behaviors_and_params
            .get(&category.behavior_key(tech))
            .copied()
            .unwrap_or(TechBehavior::Fixed)
    }

    pub fn growth_for(&self, sector: &str, subsector: &str) -> Option<GrowthPhases> {
        self.activity_growth_factors
            .get(&growth_key(sector, subsector))
            .copied()
    }
}

/// Lookup key for [`Scenario::activity_growth_factors`].
pub fn growth_key(sector: &str, subsector: &str) -> String {
    format!("{sector}|{subsector}")
}

/// Year-over-year multiplicative activity growth, split at
/// [`GROWTH_PHASE_SPLIT_YEAR`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GrowthPhases {
    pub p1: Real,
    pub p2: Real,
}

impl GrowthPhases {
    /// Factor applied when stepping into `year` from the year before.
    pub fn factor_for(&self, year: i32) -> Real {
        if year <= GROWTH_PHASE_SPLIT_YEAR {
            self.p1
        } else {
            self.p2
        }
    }
}

/// Declared share trajectory for one technology within its category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "behavior", rename_all = "kebab-case")]
pub enum TechBehavior {
    /// Retain the base-year share, scaled only by normalization.
    Fixed,
    /// Same base-year share, filled only after s-curve and fixed
    /// technologies have claimed their budget.
    Decline,
    /// Share follows the forced-logistic curve through
    /// `(base_year, base_share)` and `(target_year, target_share)`.
    #[serde(rename_all = "camelCase")]
    SCurve {
        target_share: Real,
        target_year: Real,
        k_value: Real,
        midpoint_year: Real,
    },
}

/// Identity of one allocation category: the set of technologies competing
/// for a single 100-point share budget.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CategoryId {
    Demand { sector: String, subsector: String },
    Power,
    Hydrogen,
}

impl CategoryId {
    pub fn demand(sector: impl Into<String>, subsector: impl Into<String>) -> Self {
        Self::Demand {
            sector: sector.into(),
            subsector: subsector.into(),
        }
    }

    /// Wire-format key of the category itself, e.g. `Demand|Industry|Steel`.
    pub fn key(&self) -> String {
        match self {
            Self::Demand { sector, subsector } => format!("Demand|{sector}|{subsector}"),
            Self::Power => "Power|Power".to_string(),
            Self::Hydrogen => "Hydrogen|Hydrogen".to_string(),
        }
    }

    /// Wire-format key of one technology's behavior entry.
    pub fn behavior_key(&self, tech: &str) -> String {
        format!("{}|{tech}", self.key())
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_tags_round_trip() {
        let yaml = r#"
behavior: s-curve
targetShare: 100.0
targetYear: 2050.0
kValue: 0.2
midpointYear: 2037.0
"#;
        let parsed: TechBehavior = serde_yaml::from_str(yaml).unwrap();
        match parsed {
            TechBehavior::SCurve {
                target_share,
                target_year,
                k_value,
                midpoint_year,
            } => {
                assert_eq!(target_share, 100.0);
                assert_eq!(target_year, 2050.0);
                assert_eq!(k_value, 0.2);
                assert_eq!(midpoint_year, 2037.0);
            }
            other => panic!("expected s-curve, got {other:?}"),
        }

        let fixed: TechBehavior = serde_yaml::from_str("behavior: fixed").unwrap();
        assert_eq!(fixed, TechBehavior::Fixed);
        let decline: TechBehavior = serde_yaml::from_str("behavior: decline").unwrap();
        assert_eq!(decline, TechBehavior::Decline);
    }

    #[test]
    fn behavior_defaults_to_fixed() {
        let scenario = Scenario::default();
        let cat = CategoryId::demand("Industry", "Steel");
        assert_eq!(scenario.behavior_for(&cat, "BF-BOF"), TechBehavior::Fixed);
    }

    #[test]
    fn category_keys_match_wire_format() {
        let demand = CategoryId::demand("Industry", "Steel");
        assert_eq!(demand.key(), "Demand|Industry|Steel");
        assert_eq!(demand.behavior_key("EAF"), "Demand|Industry|Steel|EAF");
        assert_eq!(CategoryId::Power.behavior_key("Wind"), "Power|Power|Wind");
        assert_eq!(
            CategoryId::Hydrogen.behavior_key("Electrolysis"),
            "Hydrogen|Hydrogen|Electrolysis"
        );
    }

    #[test]
    fn growth_phase_split() {
        let phases = GrowthPhases { p1: 1.05, p2: 1.02 };
        assert_eq!(phases.factor_for(2024), 1.05);
        assert_eq!(phases.factor_for(2035), 1.05);
        assert_eq!(phases.factor_for(2036), 1.02);
    }

    #[test]
    fn efficiency_fallback_hierarchy() {
        let mut table = EfficiencyTable::default();
        table
            .by_subsector
            .entry("Industry".to_string())
            .or_default()
            .insert("Steel".to_string(), 0.8);
        table
            .by_tech
            .entry("Industry".to_string())
            .or_default()
            .entry("Steel".to_string())
            .or_default()
            .insert("EAF".to_string(), 0.9);
        table
            .by_tech_fuel
            .entry("Industry".to_string())
            .or_default()
            .entry("Steel".to_string())
            .or_default()
            .entry("EAF".to_string())
            .or_default()
            .insert("Electricity".to_string(), 0.95);

        // Most specific level wins
        assert_eq!(table.lookup("Industry", "Steel", "EAF", "Electricity"), 0.95);
        // Tech level when the fuel has no entry
        assert_eq!(table.lookup("Industry", "Steel", "EAF", "Coal"), 0.9);
        // Subsector level when the tech has no entry
        assert_eq!(table.lookup("Industry", "Steel", "BF-BOF", "Coal"), 0.8);
        // Global default otherwise
        assert_eq!(
            table.lookup("Transport", "Cars", "ICE", "Oil"),
            DEFAULT_EFFICIENCY
        );
    }
}
