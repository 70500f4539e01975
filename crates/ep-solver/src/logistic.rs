//! Forced-logistic share curves.

use ep_core::{Real, clamp_between};
use tracing::{debug, warn};

/// Steepness below which the logistic degenerates to a unit step / no-op.
const K_EPS: Real = 1e-9;
/// Exponent clamp keeping `exp` away from overflow.
const EXP_CLAMP: Real = 700.0;
/// Start/target difference below which the curve counts as flat.
const FLAT_SPAN_EPS: Real = 0.01;
/// Base/target year distance below which the interval is degenerate.
const MIN_YEAR_SPAN: Real = 0.1;
/// Sigma difference below which the anchors are numerically indistinguishable.
const SIGMA_EPS: Real = 1e-9;

/// Logistic sigmoid with steepness `k` and midpoint `t0`.
///
/// `|k| < 1e-9` degenerates to a unit step at `t0` (0 before, 1 after,
/// 0.5 at). The exponent is clamped to ±700 so the extremes saturate to
/// 0/1 instead of overflowing.
fn sigma(t: Real, k: Real, t0: Real) -> Real {
    if k.abs() < K_EPS {
        return if t < t0 {
            0.0
        } else if t > t0 {
            1.0
        } else {
            0.5
        };
    }
    let exponent = (-k * (t - t0)).clamp(-EXP_CLAMP, EXP_CLAMP);
    1.0 / (1.0 + exponent.exp())
}

/// Logistic share value at `year`, constrained to pass exactly through
/// `(base_year, start_val)` and `(target_year, target_val)`.
///
/// The caller supplies the shape (`k`, midpoint `t0`); the two asymptotes are
/// solved from the anchor constraints:
///
/// ```text
/// A = (start·σt − target·σs) / (σt − σs)
/// B = (target·(1 − σs) − start·(1 − σt)) / (σt − σs)
/// value(year) = A + (B − A)·σ(year)
/// ```
///
/// Degenerate inputs never fail, they fall back:
/// - any NaN input → `start_val` (logged)
/// - `|k| < 1e-9`, a flat start→target span, or a degenerate year interval
///   → `start_val`
/// - anchors numerically indistinguishable under `σ` → clamped linear
///   interpolation between them
///
/// Past `target_year` the value holds at `target_val` exactly; before that it
/// is clamped into `[min(start_val, target_val), max(start_val, target_val)]`
/// to absorb floating-point overshoot from ill-conditioned asymptote solves.
pub fn forced_logistic_share(
    year: Real,
    k: Real,
    t0: Real,
    base_year: Real,
    start_val: Real,
    target_year: Real,
    target_val: Real,
) -> Real {
    if year.is_nan()
        || k.is_nan()
        || t0.is_nan()
        || base_year.is_nan()
        || start_val.is_nan()
        || target_year.is_nan()
        || target_val.is_nan()
    {
        warn!(
            year,
            k, t0, base_year, start_val, target_year, target_val,
            "NaN input to forced logistic, holding start value"
        );
        return start_val;
    }
    if k.abs() < K_EPS {
        return start_val;
    }
    if (target_val - start_val).abs() < FLAT_SPAN_EPS {
        return start_val;
    }
    if (target_year - base_year).abs() < MIN_YEAR_SPAN {
        return start_val;
    }

    let sigma_s = sigma(base_year, k, t0);
    let sigma_t = sigma(target_year, k, t0);

    if (sigma_t - sigma_s).abs() < SIGMA_EPS {
        // Both anchors sit on the same saturated tail of the sigmoid; the
        // curve carries no usable shape between them.
        debug!(k, t0, base_year, target_year, "flat sigmoid span, using linear interpolation");
        if year <= base_year {
            return start_val;
        }
        if year >= target_year {
            return target_val;
        }
        let frac = (year - base_year) / (target_year - base_year);
        return start_val + (target_val - start_val) * frac;
    }

    let denom = sigma_t - sigma_s;
    let a = (start_val * sigma_t - target_val * sigma_s) / denom;
    let b = (target_val * (1.0 - sigma_s) - start_val * (1.0 - sigma_t)) / denom;

    if year > target_year {
        return target_val;
    }
    let value = a + (b - a) * sigma(year, k, t0);
    clamp_between(value, start_val, target_val)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn anchors_hold_for_non_degenerate_inputs(
            k in 0.05_f64..2.0,
            t0 in 2000.0_f64..2100.0,
            start_val in 0.0_f64..100.0,
            target_val in 0.0_f64..100.0,
        ) {
            prop_assume!((target_val - start_val).abs() >= 0.02);
            let base_year = 2020.0;
            let target_year = 2050.0;

            let at_base =
                forced_logistic_share(base_year, k, t0, base_year, start_val, target_year, target_val);
            let at_target =
                forced_logistic_share(target_year, k, t0, base_year, start_val, target_year, target_val);
            let past =
                forced_logistic_share(2070.0, k, t0, base_year, start_val, target_year, target_val);

            prop_assert!((at_base - start_val).abs() < 1e-6, "base anchor: {at_base} vs {start_val}");
            prop_assert!((at_target - target_val).abs() < 1e-6, "target anchor: {at_target} vs {target_val}");
            prop_assert_eq!(past, target_val);
        }
    }
}
