//! Category mix allocation.
//!
//! One allocation category is a set of technologies competing for a single
//! 100-point share budget: a sector/subsector demand mix, the power pool, or
//! the hydrogen pool. S-curve technologies take allocation priority (they are
//! the scenario-driven trajectories), fixed technologies hold their base
//! proportions while room remains, and decline technologies absorb whatever
//! displacement is left.

use crate::logistic::forced_logistic_share;
use ep_core::{Real, SHARE_EPS, SHARE_TOTAL, ShareMap, value_or_zero};
use ep_model::{CategoryId, Scenario, TechBehavior};
use tracing::debug;

/// Tolerance on `target_share ≈ 100` for the dominant-tech override.
const DOMINANT_EPS: Real = 1e-6;

/// Allocate one category's share distribution for `year`.
///
/// Behaviors come from the scenario's `"Category|Key|Tech"` entries; a
/// technology with no entry behaves as [`TechBehavior::Fixed`]. The result
/// carries one entry per technology in `techs` and sums to 100 unless every
/// share comes out ≈ 0 (then the raw shares are returned unnormalized rather
/// than dividing by zero).
///
/// An s-curve technology whose target share is ≈ 100 fully displaces the
/// category from its target year on: it gets 100, every other technology 0,
/// overriding all other allocation logic.
pub fn allocate_category_mix(
    techs: &[String],
    base_mix: &ShareMap,
    scenario: &Scenario,
    category: &CategoryId,
    year: i32,
    base_year: i32,
) -> ShareMap {
    let year_f = year as Real;
    let base_year_f = base_year as Real;

    let mut shares = ShareMap::new();
    let mut s_curve_total = 0.0;
    let mut dominant: Option<&String> = None;
    let mut fixed_techs: Vec<&String> = Vec::new();
    let mut decline_techs: Vec<&String> = Vec::new();

    for tech in techs {
        match scenario.behavior_for(category, tech) {
            TechBehavior::SCurve {
                target_share,
                target_year,
                k_value,
                midpoint_year,
            } => {
                let start_val = value_or_zero(base_mix, tech);
                let share = forced_logistic_share(
                    year_f,
                    k_value,
                    midpoint_year,
                    base_year_f,
                    start_val,
                    target_year,
                    target_share,
                );
                if dominant.is_none()
                    && (target_share - SHARE_TOTAL).abs() < DOMINANT_EPS
                    && year_f >= target_year
                {
                    dominant = Some(tech);
                }
                s_curve_total += share;
                shares.insert(tech.clone(), share);
            }
            TechBehavior::Fixed => fixed_techs.push(tech),
            TechBehavior::Decline => decline_techs.push(tech),
        }
    }

    if let Some(dominant) = dominant {
        debug!(category = %category, tech = %dominant, year, "dominant technology displaces category");
        let mut out = ShareMap::new();
        for tech in techs {
            let share = if tech == dominant { SHARE_TOTAL } else { 0.0 };
            out.insert(tech.clone(), share);
        }
        return out;
    }

    // Fixed technologies fill the budget the s-curves left, scaled down
    // proportionally when their combined base shares no longer fit.
    let remaining = (SHARE_TOTAL - s_curve_total).max(0.0);
    let fixed_base_total: Real = fixed_techs
        .iter()
        .map(|tech| value_or_zero(base_mix, tech))
        .sum();
    let fixed_scale = if fixed_base_total > SHARE_EPS {
        (remaining / fixed_base_total).min(1.0)
    } else {
        0.0
    };
    let mut fixed_total = 0.0;
    for tech in &fixed_techs {
        let share = value_or_zero(base_mix, tech) * fixed_scale;
        fixed_total += share;
        shares.insert((*tech).clone(), share);
    }

    // Decline technologies absorb whatever is left after that.
    let remaining_after_fixed = (remaining - fixed_total).max(0.0);
    let decline_base_total: Real = decline_techs
        .iter()
        .map(|tech| value_or_zero(base_mix, tech))
        .sum();
    let decline_scale = if decline_base_total > SHARE_EPS {
        (remaining_after_fixed / decline_base_total).min(1.0)
    } else {
        0.0
    };
    for tech in &decline_techs {
        let share = value_or_zero(base_mix, tech) * decline_scale;
        shares.insert((*tech).clone(), share);
    }

    normalize(&mut shares);
    shares
}

/// Rescale shares so they sum to exactly 100; a ≈ 0 total is left unchanged.
fn normalize(shares: &mut ShareMap) {
    let total: Real = shares.values().sum();
    if total > SHARE_EPS {
        let scale = SHARE_TOTAL / total;
        for share in shares.values_mut() {
            *share *= scale;
        }
    }
}
