//! Name-keyed nested maps with get-or-default semantics.
//!
//! The balance cascade walks deeply nested tables (sector → subsector →
//! technology → fuel). A missing key at any level means "no contribution",
//! never an error, so every read goes through these helpers instead of ad hoc
//! indexing.

use crate::numeric::Real;
use std::collections::BTreeMap;

/// Fuel/technology name → numeric value (GJ, shares, coefficients).
///
/// `BTreeMap` keeps iteration order deterministic, which makes projection
/// output reproducible bit-for-bit across runs.
pub type ValueMap = BTreeMap<String, Real>;

/// Technology name → share of a 100-point category budget.
pub type ShareMap = ValueMap;

/// One value per sector/subsector pair.
pub type SubsectorMap<V> = BTreeMap<String, BTreeMap<String, V>>;

/// Value for `key`, or 0.0 when absent.
pub fn value_or_zero(map: &ValueMap, key: &str) -> Real {
    map.get(key).copied().unwrap_or(0.0)
}

/// Two-level lookup.
pub fn nested2<'a, V>(map: &'a SubsectorMap<V>, k1: &str, k2: &str) -> Option<&'a V> {
    map.get(k1).and_then(|inner| inner.get(k2))
}

/// Three-level lookup.
pub fn nested3<'a, V>(
    map: &'a BTreeMap<String, SubsectorMap<V>>,
    k1: &str,
    k2: &str,
    k3: &str,
) -> Option<&'a V> {
    map.get(k1).and_then(|inner| nested2(inner, k2, k3))
}

/// Two-level numeric lookup, 0.0 when any key is absent.
pub fn value2_or_zero(map: &SubsectorMap<Real>, k1: &str, k2: &str) -> Real {
    nested2(map, k1, k2).copied().unwrap_or(0.0)
}

/// Accumulate `delta` onto `map[key]`, creating the entry at 0.0 first.
pub fn add_to(map: &mut ValueMap, key: &str, delta: Real) {
    *map.entry(key.to_string()).or_insert(0.0) += delta;
}

/// Sum of all values in the map.
pub fn total(map: &ValueMap) -> Real {
    map.values().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_or_zero_defaults() {
        let mut map = ValueMap::new();
        map.insert("Coal".to_string(), 12.5);
        assert_eq!(value_or_zero(&map, "Coal"), 12.5);
        assert_eq!(value_or_zero(&map, "Gas"), 0.0);
    }

    #[test]
    fn nested_lookups_default_at_any_level() {
        let mut inner = ValueMap::new();
        inner.insert("Steel".to_string(), 42.0);
        let mut map = SubsectorMap::new();
        map.insert("Industry".to_string(), inner);

        assert_eq!(value2_or_zero(&map, "Industry", "Steel"), 42.0);
        assert_eq!(value2_or_zero(&map, "Industry", "Cement"), 0.0);
        assert_eq!(value2_or_zero(&map, "Transport", "Steel"), 0.0);
    }

    #[test]
    fn nested3_walks_three_levels() {
        let mut fuels = ValueMap::new();
        fuels.insert("Coal".to_string(), 1.5);
        let mut techs = SubsectorMap::new();
        techs.insert("BF-BOF".to_string(), fuels);
        let mut map = BTreeMap::new();
        map.insert("Industry".to_string(), techs);

        assert_eq!(
            nested3(&map, "Industry", "BF-BOF", "Coal").copied(),
            Some(1.5)
        );
        assert_eq!(nested3(&map, "Industry", "BF-BOF", "Gas"), None);
        assert_eq!(nested3(&map, "Industry", "EAF", "Coal"), None);
    }

    #[test]
    fn add_to_accumulates() {
        let mut map = ValueMap::new();
        add_to(&mut map, "Electricity", 10.0);
        add_to(&mut map, "Electricity", 2.5);
        assert_eq!(value_or_zero(&map, "Electricity"), 12.5);
    }

    #[test]
    fn total_sums_values() {
        let mut map = ValueMap::new();
        add_to(&mut map, "A", 1.0);
        add_to(&mut map, "B", 2.0);
        assert_eq!(total(&map), 3.0);
    }
}
