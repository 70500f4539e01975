//! ep-model: canonical dataset/scenario file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_dataset, validate_scenario};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_dataset_yaml(path: &std::path::Path) -> ModelResult<Dataset> {
    let content = std::fs::read_to_string(path)?;
    let dataset: Dataset = serde_yaml::from_str(&content)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

pub fn load_dataset_json(path: &std::path::Path) -> ModelResult<Dataset> {
    let content = std::fs::read_to_string(path)?;
    let dataset: Dataset = serde_json::from_str(&content)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

pub fn load_scenario_yaml(path: &std::path::Path) -> ModelResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn load_scenario_json(path: &std::path::Path) -> ModelResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

/// Load a dataset by file extension (`.yaml`/`.yml` or `.json`).
pub fn load_dataset(path: &std::path::Path) -> ModelResult<Dataset> {
    if has_json_extension(path) {
        load_dataset_json(path)
    } else {
        load_dataset_yaml(path)
    }
}

/// Load a scenario by file extension (`.yaml`/`.yml` or `.json`).
pub fn load_scenario(path: &std::path::Path) -> ModelResult<Scenario> {
    if has_json_extension(path) {
        load_scenario_json(path)
    } else {
        load_scenario_yaml(path)
    }
}

pub fn save_scenario_yaml(path: &std::path::Path, scenario: &Scenario) -> ModelResult<()> {
    validate_scenario(scenario)?;
    let content = serde_yaml::to_string(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn has_json_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("ep_model_{nanos}_{name}"))
    }

    #[test]
    fn scenario_yaml_round_trip() {
        let mut scenario = Scenario {
            name: "baseline".to_string(),
            ..Scenario::default()
        };
        scenario.activity_growth_factors.insert(
            "Industry|Steel".to_string(),
            GrowthPhases { p1: 1.05, p2: 1.02 },
        );
        scenario.tech_behaviors_and_params.insert(
            "Demand|Industry|Steel|EAF".to_string(),
            TechBehavior::SCurve {
                target_share: 90.0,
                target_year: 2045.0,
                k_value: 0.3,
                midpoint_year: 2034.0,
            },
        );

        let path = unique_temp_path("scenario.yaml");
        save_scenario_yaml(&path, &scenario).unwrap();
        let loaded = load_scenario(&path).unwrap();
        assert_eq!(loaded, scenario);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn invalid_scenario_fails_to_load() {
        let path = unique_temp_path("bad_scenario.yaml");
        std::fs::write(
            &path,
            "activityGrowthFactors:\n  NoPipeKey: { p1: 1.0, p2: 1.0 }\n",
        )
        .unwrap();
        let err = load_scenario(&path).unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));

        let _ = std::fs::remove_file(path);
    }
}
