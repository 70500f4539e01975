use clap::{Parser, Subcommand};
use ep_engine::{Projection, run_projection};
use ep_model::{Dataset, Scenario, load_dataset, load_scenario};
use ep_results::{RunManifest, RunStore, compute_run_id};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "ep-cli")]
#[command(about = "Enpath CLI - multi-sector energy projection tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate dataset and scenario file syntax and structure
    Validate {
        /// Path to the dataset YAML/JSON file
        dataset_path: PathBuf,
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
    },
    /// Run a scenario projection
    Run {
        /// Path to the dataset YAML/JSON file
        dataset_path: PathBuf,
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
        /// Directory for cached runs (default: ./.enpath/runs)
        #[arg(long)]
        runs_dir: Option<PathBuf>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs
    Runs {
        /// Directory for cached runs (default: ./.enpath/runs)
        #[arg(long)]
        runs_dir: Option<PathBuf>,
    },
    /// Export one fuel's trajectory from a projection as CSV
    Series {
        /// Path to the dataset YAML/JSON file
        dataset_path: PathBuf,
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
        /// Result table to export (fecByFuel, ueByFuel, ecPostHydrogen,
        /// ecPostPower, pedByFuel)
        table: String,
        /// Fuel name to export
        fuel: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Model error: {0}")]
    Model(#[from] ep_model::ModelError),

    #[error("Engine error: {0}")]
    Engine(#[from] ep_engine::EngineError),

    #[error("Results error: {0}")]
    Results(#[from] ep_results::ResultsError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown result table: {0}")]
    UnknownTable(String),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            dataset_path,
            scenario_path,
        } => cmd_validate(&dataset_path, &scenario_path),
        Commands::Run {
            dataset_path,
            scenario_path,
            runs_dir,
            no_cache,
        } => cmd_run(&dataset_path, &scenario_path, runs_dir, !no_cache).map(|_| ()),
        Commands::Runs { runs_dir } => cmd_runs(runs_dir),
        Commands::Series {
            dataset_path,
            scenario_path,
            table,
            fuel,
            output,
        } => cmd_series(&dataset_path, &scenario_path, &table, &fuel, output.as_deref()),
    }
}

fn cmd_validate(dataset_path: &Path, scenario_path: &Path) -> CliResult<()> {
    let dataset = load_dataset(dataset_path)?;
    let scenario = load_scenario(scenario_path)?;
    println!(
        "OK: dataset covers {}..={} ({} sectors), scenario '{}' carries {} behavior entries",
        dataset.start_year,
        dataset.end_year,
        dataset.sectors.len(),
        scenario.name,
        scenario.tech_behaviors_and_params.len(),
    );
    Ok(())
}

fn cmd_run(
    dataset_path: &Path,
    scenario_path: &Path,
    runs_dir: Option<PathBuf>,
    use_cache: bool,
) -> CliResult<Projection> {
    let dataset = load_dataset(dataset_path)?;
    let scenario = load_scenario(scenario_path)?;

    let store = RunStore::new(default_runs_dir(runs_dir))?;
    let run_id = compute_run_id(&dataset, &scenario, ENGINE_VERSION);

    if use_cache && store.has_run(&run_id) {
        println!("Using cached run {run_id}");
        return Ok(store.load_projection(&run_id)?);
    }

    let projection = run_and_store(&dataset, &scenario, &store, &run_id)?;
    println!(
        "Computed {} years for scenario '{}' (run {run_id})",
        projection.years.len(),
        projection.scenario,
    );
    Ok(projection)
}

fn run_and_store(
    dataset: &Dataset,
    scenario: &Scenario,
    store: &RunStore,
    run_id: &str,
) -> CliResult<Projection> {
    let projection = run_projection(dataset, scenario)?;
    let manifest = RunManifest::new(
        run_id.to_string(),
        scenario.name.clone(),
        dataset.start_year,
        dataset.end_year,
        ENGINE_VERSION,
    );
    store.save_run(&manifest, &projection)?;
    Ok(projection)
}

fn cmd_runs(runs_dir: Option<PathBuf>) -> CliResult<()> {
    let store = RunStore::new(default_runs_dir(runs_dir))?;
    let runs = store.list_runs()?;
    if runs.is_empty() {
        println!("No cached runs");
        return Ok(());
    }
    for manifest in runs {
        println!(
            "{}  {}  {}..={}  scenario '{}'",
            manifest.run_id,
            manifest.timestamp,
            manifest.start_year,
            manifest.end_year,
            manifest.scenario,
        );
    }
    Ok(())
}

fn cmd_series(
    dataset_path: &Path,
    scenario_path: &Path,
    table: &str,
    fuel: &str,
    output: Option<&Path>,
) -> CliResult<()> {
    let dataset = load_dataset(dataset_path)?;
    let scenario = load_scenario(scenario_path)?;
    let projection = run_projection(&dataset, &scenario)?;

    let mut csv = String::from("year,value_gj\n");
    for (year, result) in projection.iter() {
        let map = match table {
            "fecByFuel" => &result.fec_by_fuel,
            "ueByFuel" => &result.ue_by_fuel,
            "ecPostHydrogen" => &result.ec_post_hydrogen,
            "ecPostPower" => &result.ec_post_power,
            "pedByFuel" => &result.ped_by_fuel,
            other => return Err(CliError::UnknownTable(other.to_string())),
        };
        let value = map.get(fuel).copied().unwrap_or(0.0);
        csv.push_str(&format!("{year},{value}\n"));
    }

    match output {
        Some(path) => std::fs::write(path, csv)?,
        None => io::stdout().write_all(csv.as_bytes())?,
    }
    Ok(())
}

fn default_runs_dir(runs_dir: Option<PathBuf>) -> PathBuf {
    runs_dir.unwrap_or_else(|| PathBuf::from(".enpath").join("runs"))
}
