//! Structural validation of datasets and scenarios.
//!
//! Runs loader-side, before anything reaches the projection engine. The
//! engine itself only defends the fatal year-sequencing invariants; everything
//! caught here would otherwise degrade to silent zero-contributions.

use crate::schema::{Dataset, Scenario, TechBehavior};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Empty year sequence (startYear={start_year}, endYear={end_year})")]
    EmptyYears { start_year: i32, end_year: i32 },

    #[error("Year sequence broken at {found}: expected {expected}")]
    BrokenYearSequence { expected: i32, found: i32 },

    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_dataset(dataset: &Dataset) -> Result<(), ValidationError> {
    validate_years(dataset)?;

    let mut sector_ids = HashSet::new();
    for sector in &dataset.sectors {
        if !sector_ids.insert(sector) {
            return Err(ValidationError::DuplicateId {
                id: sector.clone(),
                context: "sectors".to_string(),
            });
        }
    }

    for (sector, subsectors) in &dataset.subsectors {
        if !sector_ids.contains(sector) {
            return Err(ValidationError::MissingReference {
                id: sector.clone(),
                context: "subsectors".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for subsector in subsectors {
            if !seen.insert(subsector) {
                return Err(ValidationError::DuplicateId {
                    id: subsector.clone(),
                    context: format!("subsectors of '{sector}'"),
                });
            }
        }
    }

    for (sector, by_subsector) in &dataset.technologies {
        if !sector_ids.contains(sector) {
            return Err(ValidationError::MissingReference {
                id: sector.clone(),
                context: "technologies".to_string(),
            });
        }
        let known: HashSet<&String> = dataset.subsectors_of(sector).iter().collect();
        for subsector in by_subsector.keys() {
            if !known.contains(subsector) {
                return Err(ValidationError::MissingReference {
                    id: subsector.clone(),
                    context: format!("technologies of '{sector}'"),
                });
            }
        }
    }

    validate_share_table(&dataset.base_power_prod_mix, "basePowerProdMix")?;
    validate_share_table(&dataset.base_hydrogen_prod_mix, "baseHydrogenProdMix")?;
    for (sector, by_subsector) in &dataset.base_demand_tech_mix {
        for (subsector, mix) in by_subsector {
            validate_share_table(mix, &format!("baseDemandTechMix[{sector}][{subsector}]"))?;
        }
    }
    for (fuel, mix) in &dataset.base_other_prod_mix {
        validate_share_table(mix, &format!("baseOtherProdMix[{fuel}]"))?;
    }

    for (sector, by_subsector) in &dataset.base_activity {
        for (subsector, activity) in by_subsector {
            if !activity.is_finite() || *activity < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("baseActivity[{sector}][{subsector}]"),
                    value: activity.to_string(),
                    reason: "activity must be finite and non-negative".to_string(),
                });
            }
        }
    }

    if !(dataset.efficiency.default > 0.0 && dataset.efficiency.default <= 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "efficiency.default".to_string(),
            value: dataset.efficiency.default.to_string(),
            reason: "default efficiency must be in (0, 1]".to_string(),
        });
    }

    Ok(())
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    for (key, phases) in &scenario.activity_growth_factors {
        if key.split('|').count() != 2 {
            return Err(ValidationError::InvalidValue {
                field: "activityGrowthFactors".to_string(),
                value: key.clone(),
                reason: "key must be 'sector|subsector'".to_string(),
            });
        }
        for (name, factor) in [("p1", phases.p1), ("p2", phases.p2)] {
            if factor.is_finite() && factor <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("activityGrowthFactors[{key}].{name}"),
                    value: factor.to_string(),
                    reason: "growth factor must be positive".to_string(),
                });
            }
        }
    }

    for (key, behavior) in &scenario.tech_behaviors_and_params {
        let segments: Vec<&str> = key.split('|').collect();
        let category_ok = match segments.first() {
            Some(&"Demand") => segments.len() == 4,
            Some(&"Power") | Some(&"Hydrogen") => segments.len() == 3,
            _ => false,
        };
        if !category_ok {
            return Err(ValidationError::InvalidValue {
                field: "techBehaviorsAndParams".to_string(),
                value: key.clone(),
                reason: "key must be 'Demand|sector|subsector|tech', \
                         'Power|Power|tech' or 'Hydrogen|Hydrogen|tech'"
                    .to_string(),
            });
        }
        if let TechBehavior::SCurve {
            target_share,
            target_year,
            ..
        } = behavior
        {
            if target_share.is_finite() && !(0.0..=100.0).contains(target_share) {
                return Err(ValidationError::InvalidValue {
                    field: format!("techBehaviorsAndParams[{key}].targetShare"),
                    value: target_share.to_string(),
                    reason: "target share must be within 0–100".to_string(),
                });
            }
            if target_year.is_finite() && (*target_year < 1900.0 || *target_year > 2200.0) {
                return Err(ValidationError::InvalidValue {
                    field: format!("techBehaviorsAndParams[{key}].targetYear"),
                    value: target_year.to_string(),
                    reason: "target year out of plausible range".to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_years(dataset: &Dataset) -> Result<(), ValidationError> {
    if dataset.years.is_empty() {
        return Err(ValidationError::EmptyYears {
            start_year: dataset.start_year,
            end_year: dataset.end_year,
        });
    }
    if dataset.years[0] != dataset.start_year {
        return Err(ValidationError::BrokenYearSequence {
            expected: dataset.start_year,
            found: dataset.years[0],
        });
    }
    for pair in dataset.years.windows(2) {
        if pair[1] != pair[0] + 1 {
            return Err(ValidationError::BrokenYearSequence {
                expected: pair[0] + 1,
                found: pair[1],
            });
        }
    }
    let last = *dataset.years.last().expect("years checked non-empty");
    if last != dataset.end_year {
        return Err(ValidationError::BrokenYearSequence {
            expected: dataset.end_year,
            found: last,
        });
    }
    Ok(())
}

fn validate_share_table(shares: &ep_core::ShareMap, field: &str) -> Result<(), ValidationError> {
    for (tech, share) in shares {
        if !share.is_finite() || *share < 0.0 || *share > 100.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("{field}[{tech}]"),
                value: share.to_string(),
                reason: "share must be within 0–100".to_string(),
            });
        }
    }
    Ok(())
}
