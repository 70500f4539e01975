//! Run storage API.

use crate::types::{RunManifest, YearRecord};
use crate::{ResultsError, ResultsResult};
use ep_engine::Projection;
use std::fs;
use std::path::PathBuf;

/// Filesystem store: one directory per run holding `manifest.json` and
/// `years.jsonl` (one serialized year per line).
#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, projection: &Projection) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_path = run_dir.join("manifest.json");
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(manifest_path, manifest_json)?;

        let years_path = run_dir.join("years.jsonl");
        let mut content = String::new();
        for (year, result) in projection.iter() {
            let record = YearRecord {
                year,
                result: result.clone(),
            };
            content.push_str(&serde_json::to_string(&record)?);
            content.push('\n');
        }
        fs::write(years_path, content)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");
        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_projection(&self, run_id: &str) -> ResultsResult<Projection> {
        let manifest = self.load_manifest(run_id)?;
        let years_path = self.run_dir(run_id).join("years.jsonl");
        let content = fs::read_to_string(years_path)?;

        let mut years = Vec::new();
        let mut by_year = std::collections::BTreeMap::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let record: YearRecord = serde_json::from_str(line)?;
            years.push(record.year);
            by_year.insert(record.year, record.result);
        }

        Ok(Projection {
            scenario: manifest.scenario,
            years,
            by_year,
        })
    }

    /// Manifests of all stored runs, in directory order.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut manifests = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            if let Ok(manifest) = self.load_manifest(&run_id) {
                manifests.push(manifest);
            }
        }
        manifests.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(manifests)
    }
}
