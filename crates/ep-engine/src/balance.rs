//! Per-year energy balance cascade.
//!
//! Converts one year's activity levels and mix distributions into the full
//! energy balance: technology activity, final energy consumption and useful
//! energy by fuel, then transformation-sector input demand (hydrogen, power,
//! other primary-conversion chains) and finally primary energy demand.
//!
//! Stages run in strict dependency order; every nested lookup defaults to
//! zero, so a missing data point degrades a single contribution instead of
//! failing the projection.

use crate::result::YearlyResult;
use ep_core::{
    Real, SHARE_TOTAL, ShareMap, SubsectorMap, ValueMap, add_to, nested2, nested3, value2_or_zero,
    value_or_zero,
};
use ep_model::Dataset;
use std::collections::{BTreeMap, BTreeSet};

/// Transformed carrier removed by the hydrogen cascade.
pub const HYDROGEN: &str = "Hydrogen";
/// Transformed carrier removed by the power cascade.
pub const ELECTRICITY: &str = "Electricity";

/// The three mix distributions feeding one year's balance.
#[derive(Debug, Clone, Default)]
pub struct YearMixes {
    pub demand: SubsectorMap<ShareMap>,
    pub power: ShareMap,
    pub hydrogen: ShareMap,
}

/// Compute the full balance for one year from its activity levels and mix
/// distributions.
pub fn compute_balance(dataset: &Dataset, activity: SubsectorMap<Real>, mixes: YearMixes) -> YearlyResult {
    let demand_tech_activity = compute_tech_activity(dataset, &activity, &mixes.demand);

    let mut fec_detailed: SubsectorMap<BTreeMap<String, ValueMap>> = SubsectorMap::new();
    let mut ue_detailed: SubsectorMap<BTreeMap<String, ValueMap>> = SubsectorMap::new();
    let mut fec_by_fuel = ValueMap::new();
    let mut ue_by_fuel = ValueMap::new();
    let mut ue_by_subsector = SubsectorMap::new();

    for sector in &dataset.sectors {
        for subsector in dataset.subsectors_of(sector) {
            for tech in dataset.demand_techs(sector, subsector) {
                let tech_activity = nested2(&demand_tech_activity, sector, subsector)
                    .map(|techs| value_or_zero(techs, tech))
                    .unwrap_or(0.0);
                let Some(fuel_cons) = nested3(&dataset.unit_energy_consumption, sector, subsector, tech)
                else {
                    continue;
                };
                for (fuel, unit_cons) in fuel_cons {
                    let fec = tech_activity * unit_cons;
                    let ue = fec * dataset.efficiency.lookup(sector, subsector, tech, fuel);

                    fec_detailed
                        .entry(sector.clone())
                        .or_default()
                        .entry(subsector.clone())
                        .or_default()
                        .entry(tech.clone())
                        .or_default()
                        .insert(fuel.clone(), fec);
                    ue_detailed
                        .entry(sector.clone())
                        .or_default()
                        .entry(subsector.clone())
                        .or_default()
                        .entry(tech.clone())
                        .or_default()
                        .insert(fuel.clone(), ue);

                    add_to(&mut fec_by_fuel, fuel, fec);
                    add_to(&mut ue_by_fuel, fuel, ue);
                    *ue_by_subsector
                        .entry(sector.clone())
                        .or_default()
                        .entry(subsector.clone())
                        .or_insert(0.0) += ue;
                }
            }
        }
    }

    // Hydrogen cascade: hydrogen demand becomes production input-fuel demand.
    let hydrogen_demand = value_or_zero(&fec_by_fuel, HYDROGEN);
    let hydrogen_inputs = production_inputs(
        hydrogen_demand,
        &mixes.hydrogen,
        &dataset.hydrogen_tech_unit_energy_cons,
    );
    let mut ec_post_hydrogen = fec_by_fuel.clone();
    ec_post_hydrogen.remove(HYDROGEN);
    merge_into(&mut ec_post_hydrogen, &hydrogen_inputs);

    // Power cascade: identical pattern on the electricity that remains.
    let electricity_demand = value_or_zero(&ec_post_hydrogen, ELECTRICITY);
    let power_inputs = production_inputs(
        electricity_demand,
        &mixes.power,
        &dataset.power_tech_unit_energy_cons,
    );
    let mut ec_post_power = ec_post_hydrogen.clone();
    ec_post_power.remove(ELECTRICITY);
    merge_into(&mut ec_post_power, &power_inputs);

    // Other-transform cascade: end-use fuels with declared conversion chains
    // become primary-fuel input demand, distributed by the base production mix.
    let mut other_inputs = ValueMap::new();
    for (fuel, demand) in &ec_post_power {
        let techs = dataset.conv_techs_of(fuel);
        if techs.is_empty() {
            continue;
        }
        let mix = dataset.base_other_prod_mix.get(fuel);
        for tech in techs {
            let share = mix.map(|m| value_or_zero(m, tech)).unwrap_or(0.0);
            let output = demand * share / SHARE_TOTAL;
            let Some(coeffs) = nested2(&dataset.other_tech_unit_energy_cons, fuel, tech) else {
                continue;
            };
            for (primary, coeff) in coeffs {
                add_to(&mut other_inputs, primary, output * coeff);
            }
        }
    }

    let ped_by_fuel = aggregate_ped(dataset, &ec_post_power, &other_inputs);

    YearlyResult {
        activity,
        demand_tech_mix: mixes.demand,
        power_prod_mix: mixes.power,
        hydrogen_prod_mix: mixes.hydrogen,
        demand_tech_activity,
        fec_detailed,
        ue_detailed,
        fec_by_fuel,
        ue_by_fuel,
        ue_by_subsector,
        ec_post_hydrogen,
        ec_post_power,
        ped_by_fuel,
    }
}

/// Stage 1: activity attributed to each technology by its mix share.
fn compute_tech_activity(
    dataset: &Dataset,
    activity: &SubsectorMap<Real>,
    demand_mix: &SubsectorMap<ShareMap>,
) -> SubsectorMap<ValueMap> {
    let mut tech_activity = SubsectorMap::new();
    for sector in &dataset.sectors {
        for subsector in dataset.subsectors_of(sector) {
            let level = value2_or_zero(activity, sector, subsector);
            let mut by_tech = ValueMap::new();
            for tech in dataset.demand_techs(sector, subsector) {
                let share = nested2(demand_mix, sector, subsector)
                    .map(|mix| value_or_zero(mix, tech))
                    .unwrap_or(0.0);
                by_tech.insert(tech.clone(), share / SHARE_TOTAL * level);
            }
            tech_activity
                .entry(sector.clone())
                .or_default()
                .insert(subsector.clone(), by_tech);
        }
    }
    tech_activity
}

/// Input-fuel demand of a production pool meeting `demand` units of output,
/// distributed across technologies by their mix shares.
fn production_inputs(
    demand: Real,
    mix: &ShareMap,
    unit_cons: &BTreeMap<String, ValueMap>,
) -> ValueMap {
    let mut inputs = ValueMap::new();
    for (tech, share) in mix {
        let output = demand * share / SHARE_TOTAL;
        let Some(fuels) = unit_cons.get(tech) else {
            continue;
        };
        for (fuel, coeff) in fuels {
            add_to(&mut inputs, fuel, output * coeff);
        }
    }
    inputs
}

fn merge_into(target: &mut ValueMap, additions: &ValueMap) {
    for (fuel, value) in additions {
        add_to(target, fuel, *value);
    }
}

/// Stage 6: primary energy demand.
///
/// A primary fuel's direct post-power demand is counted only when the fuel
/// was neither converted by an other-transform chain nor consumed as an
/// input to one; otherwise the chain inputs already carry that energy.
fn aggregate_ped(dataset: &Dataset, ec_post_power: &ValueMap, other_inputs: &ValueMap) -> ValueMap {
    let mut chain_inputs: BTreeSet<&String> = BTreeSet::new();
    for (fuel, by_tech) in &dataset.other_tech_unit_energy_cons {
        if dataset.conv_techs_of(fuel).is_empty() {
            continue;
        }
        for primaries in by_tech.values() {
            chain_inputs.extend(primaries.keys());
        }
    }

    let mut ped_by_fuel = ValueMap::new();
    for primary in &dataset.primary_fuels {
        let mut value = value_or_zero(other_inputs, primary);
        let converted = !dataset.conv_techs_of(primary).is_empty();
        if !converted && !chain_inputs.contains(primary) {
            value += value_or_zero(ec_post_power, primary);
        }
        ped_by_fuel.insert(primary.clone(), value);
    }
    ped_by_fuel
}
