//! Projection runner: the year loop.
//!
//! Activity is a pure recurrence on the previous year's level, so it is
//! precomputed in one sequential forward pass; mix allocation and the balance
//! cascade for each year then depend only on that year's activity and can run
//! sequentially or in parallel with identical output.

use crate::balance::{YearMixes, compute_balance};
use crate::error::{EngineError, EngineResult};
use crate::result::{Projection, YearlyResult};
use ep_core::{Real, ShareMap, SubsectorMap, nested2};
use ep_model::{CategoryId, Dataset, Scenario};
use ep_solver::allocate_category_mix;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Options for projection runs.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Compute years in parallel after the activity forward pass.
    pub parallel: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Project one scenario across the dataset's full year range.
pub fn run_projection(dataset: &Dataset, scenario: &Scenario) -> EngineResult<Projection> {
    run_projection_with(dataset, scenario, &RunOptions::default())
}

pub fn run_projection_with(
    dataset: &Dataset,
    scenario: &Scenario,
    opts: &RunOptions,
) -> EngineResult<Projection> {
    if dataset.years.is_empty() {
        return Err(EngineError::EmptyYears {
            start_year: dataset.start_year,
            end_year: dataset.end_year,
        });
    }
    for pair in dataset.years.windows(2) {
        if pair[1] != pair[0] + 1 {
            return Err(EngineError::YearSequence {
                expected: pair[0] + 1,
                found: pair[1],
            });
        }
    }

    let activities = activity_series(dataset, scenario)?;

    let by_year: BTreeMap<i32, YearlyResult> = if opts.parallel {
        activities
            .par_iter()
            .map(|(year, activity)| (*year, compute_year(dataset, scenario, *year, activity)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    } else {
        activities
            .iter()
            .map(|(year, activity)| (*year, compute_year(dataset, scenario, *year, activity)))
            .collect()
    };

    Ok(Projection {
        scenario: scenario.name.clone(),
        years: dataset.years.clone(),
        by_year,
    })
}

fn compute_year(
    dataset: &Dataset,
    scenario: &Scenario,
    year: i32,
    activity: &SubsectorMap<Real>,
) -> YearlyResult {
    debug!(year, "computing projection year");
    let mixes = allocate_mixes(dataset, scenario, year);
    compute_balance(dataset, activity.clone(), mixes)
}

/// Sequential forward pass over the activity recurrence.
///
/// The base year seeds from `base_activity`; every later year derives from
/// the previous year's level and that subsector's phase-split growth factor.
fn activity_series(
    dataset: &Dataset,
    scenario: &Scenario,
) -> EngineResult<BTreeMap<i32, SubsectorMap<Real>>> {
    let mut series = BTreeMap::new();
    for &year in &dataset.years {
        let activity = if year == dataset.start_year {
            dataset.base_activity.clone()
        } else {
            let prev = series
                .get(&(year - 1))
                .ok_or(EngineError::MissingPriorActivity { year })?;
            grow_activity(prev, scenario, year)
        };
        series.insert(year, activity);
    }
    Ok(series)
}

fn grow_activity(
    prev: &SubsectorMap<Real>,
    scenario: &Scenario,
    year: i32,
) -> SubsectorMap<Real> {
    let mut next = SubsectorMap::new();
    for (sector, by_subsector) in prev {
        for (subsector, level) in by_subsector {
            let factor = match scenario.growth_for(sector, subsector) {
                Some(phases) => {
                    let factor = phases.factor_for(year);
                    if factor.is_nan() {
                        warn!(
                            sector = %sector,
                            subsector = %subsector,
                            year,
                            "NaN growth factor, holding activity level"
                        );
                        1.0
                    } else {
                        factor
                    }
                }
                None => {
                    debug!(
                        sector = %sector,
                        subsector = %subsector,
                        "no growth factor declared, holding activity level"
                    );
                    1.0
                }
            };
            next.entry(sector.clone())
                .or_default()
                .insert(subsector.clone(), level * factor);
        }
    }
    next
}

/// Allocate all mix distributions for one year: every sector/subsector
/// demand category plus the power and hydrogen pools.
fn allocate_mixes(dataset: &Dataset, scenario: &Scenario, year: i32) -> YearMixes {
    let base_year = dataset.start_year;
    let empty = ShareMap::new();

    let mut demand: SubsectorMap<ShareMap> = SubsectorMap::new();
    for sector in &dataset.sectors {
        for subsector in dataset.subsectors_of(sector) {
            let techs = dataset.demand_techs(sector, subsector);
            let base_mix =
                nested2(&dataset.base_demand_tech_mix, sector, subsector).unwrap_or(&empty);
            let category = CategoryId::demand(sector.clone(), subsector.clone());
            let mix = allocate_category_mix(techs, base_mix, scenario, &category, year, base_year);
            demand
                .entry(sector.clone())
                .or_default()
                .insert(subsector.clone(), mix);
        }
    }

    let power = allocate_category_mix(
        &dataset.power_techs,
        &dataset.base_power_prod_mix,
        scenario,
        &CategoryId::Power,
        year,
        base_year,
    );
    let hydrogen = allocate_category_mix(
        &dataset.hydrogen_techs,
        &dataset.base_hydrogen_prod_mix,
        scenario,
        &CategoryId::Hydrogen,
        year,
        base_year,
    );

    YearMixes {
        demand,
        power,
        hydrogen,
    }
}
