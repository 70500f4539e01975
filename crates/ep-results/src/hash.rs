//! Content-based hashing for run IDs.
//!
//! Two runs with identical dataset, scenario and engine version are the same
//! run: the projection is deterministic, so the hash doubles as a cache key.

use ep_model::{Dataset, Scenario};
use sha2::{Digest, Sha256};

pub fn compute_run_id(dataset: &Dataset, scenario: &Scenario, engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let dataset_json = serde_json::to_string(dataset).unwrap_or_default();
    hasher.update(dataset_json.as_bytes());

    let scenario_json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(scenario_json.as_bytes());

    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ep_model::GrowthPhases;

    fn dataset() -> Dataset {
        serde_yaml::from_str("startYear: 2023\nendYear: 2030\nyears: []").unwrap()
    }

    #[test]
    fn hash_stability() {
        let dataset = dataset();
        let scenario = Scenario::default();

        let hash1 = compute_run_id(&dataset, &scenario, "v1");
        let hash2 = compute_run_id(&dataset, &scenario, "v1");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let dataset = dataset();
        let scenario = Scenario::default();

        let mut changed = scenario.clone();
        changed
            .activity_growth_factors
            .insert("Industry|Steel".to_string(), GrowthPhases { p1: 1.1, p2: 1.0 });

        let hash1 = compute_run_id(&dataset, &scenario, "v1");
        let hash2 = compute_run_id(&dataset, &changed, "v1");
        let hash3 = compute_run_id(&dataset, &scenario, "v2");
        assert_ne!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }
}
