//! End-to-end projection runs against a small but complete dataset.

use ep_engine::{RunOptions, run_projection, run_projection_with};
use ep_model::{Dataset, GrowthPhases, Scenario, TechBehavior};

fn dataset() -> Dataset {
    let yaml = r#"
startYear: 2023
endYear: 2050
years: [2023, 2024, 2025, 2026, 2027, 2028, 2029, 2030, 2031, 2032, 2033,
        2034, 2035, 2036, 2037, 2038, 2039, 2040, 2041, 2042, 2043, 2044,
        2045, 2046, 2047, 2048, 2049, 2050]
sectors: [Industry]
subsectors:
  Industry: [Steel]
technologies:
  Industry:
    Steel: [A, B]
powerTechs: [CoalPlant, Wind]
hydrogenTechs: [Electrolysis]
endUseFuels: [Coal, Electricity, Hydrogen]
primaryFuels: [Coal, Renewables]
baseActivity:
  Industry:
    Steel: 100.0
baseDemandTechMix:
  Industry:
    Steel: { A: 70.0, B: 30.0 }
unitEnergyConsumption:
  Industry:
    Steel:
      A: { Coal: 2.0 }
      B: { Hydrogen: 1.2, Electricity: 0.6 }
basePowerProdMix: { CoalPlant: 50.0, Wind: 50.0 }
baseHydrogenProdMix: { Electrolysis: 100.0 }
powerTechUnitEnergyCons:
  CoalPlant: { Coal: 2.5 }
  Wind: { Renewables: 1.0 }
hydrogenTechUnitEnergyCons:
  Electrolysis: { Electricity: 1.4 }
"#;
    serde_yaml::from_str(yaml).unwrap()
}

fn scenario() -> Scenario {
    let mut scenario = Scenario {
        name: "net-zero".to_string(),
        ..Scenario::default()
    };
    scenario.activity_growth_factors.insert(
        "Industry|Steel".to_string(),
        GrowthPhases { p1: 1.05, p2: 1.02 },
    );
    scenario.tech_behaviors_and_params.insert(
        "Demand|Industry|Steel|B".to_string(),
        TechBehavior::SCurve {
            target_share: 100.0,
            target_year: 2050.0,
            k_value: 0.2,
            midpoint_year: 2037.0,
        },
    );
    scenario
}

#[test]
fn activity_follows_phase_split_growth() {
    let projection = run_projection(&dataset(), &scenario()).unwrap();

    let activity_of = |year: i32| projection.get(year).unwrap().activity["Industry"]["Steel"];
    assert_eq!(activity_of(2023), 100.0);

    let expected_2035 = 100.0 * 1.05_f64.powi(12);
    assert!((activity_of(2035) - expected_2035).abs() < 1e-9);
    assert!((activity_of(2036) - expected_2035 * 1.02).abs() < 1e-9);
}

#[test]
fn mix_transitions_from_base_to_full_displacement() {
    let projection = run_projection(&dataset(), &scenario()).unwrap();

    let mix_of = |year: i32| {
        let mix = &projection.get(year).unwrap().demand_tech_mix["Industry"]["Steel"];
        (mix["A"], mix["B"])
    };

    let (a, b) = mix_of(2023);
    assert!((a - 70.0).abs() < 1e-6);
    assert!((b - 30.0).abs() < 1e-6);

    let (a, b) = mix_of(2050);
    assert_eq!(a, 0.0);
    assert_eq!(b, 100.0);

    let mut prev_b = 0.0;
    for year in 2023..=2050 {
        let (a, b) = mix_of(year);
        assert!((a + b - 100.0).abs() < 1e-6, "year {year}: {a} + {b}");
        assert!(b >= prev_b - 1e-9, "year {year}: B fell from {prev_b} to {b}");
        prev_b = b;
    }
}

#[test]
fn cascade_conserves_energy_through_hydrogen_stage() {
    let projection = run_projection(&dataset(), &scenario()).unwrap();

    for (year, result) in projection.iter() {
        let fec_total: f64 = result.fec_by_fuel.values().sum();
        let hydrogen = result.fec_by_fuel.get("Hydrogen").copied().unwrap_or(0.0);
        // Single electrolysis tech at 100%: inputs are 1.4 × hydrogen demand.
        let expected: f64 = fec_total - hydrogen + hydrogen * 1.4;
        let post_total: f64 = result.ec_post_hydrogen.values().sum();
        assert!(
            (post_total - expected).abs() < 1e-6,
            "year {year}: {post_total} vs {expected}"
        );
    }
}

#[test]
fn quantities_stay_finite_and_non_negative() {
    let projection = run_projection(&dataset(), &scenario()).unwrap();

    for (year, result) in projection.iter() {
        for (table, name) in [
            (&result.fec_by_fuel, "fecByFuel"),
            (&result.ue_by_fuel, "ueByFuel"),
            (&result.ec_post_hydrogen, "ecPostHydrogen"),
            (&result.ec_post_power, "ecPostPower"),
            (&result.ped_by_fuel, "pedByFuel"),
        ] {
            for (fuel, value) in table {
                assert!(
                    value.is_finite() && *value >= 0.0,
                    "year {year} {name}[{fuel}] = {value}"
                );
            }
        }
    }
}

#[test]
fn reruns_are_bit_identical() {
    let dataset = dataset();
    let scenario = scenario();

    let first = run_projection(&dataset, &scenario).unwrap();
    let second = run_projection(&dataset, &scenario).unwrap();
    assert_eq!(first, second);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let dataset = dataset();
    let scenario = scenario();

    let parallel =
        run_projection_with(&dataset, &scenario, &RunOptions { parallel: true }).unwrap();
    let sequential =
        run_projection_with(&dataset, &scenario, &RunOptions { parallel: false }).unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn result_table_covers_every_year_once() {
    let projection = run_projection(&dataset(), &scenario()).unwrap();
    assert_eq!(projection.years.len(), 28);
    assert_eq!(projection.by_year.len(), 28);
    for year in &projection.years {
        assert!(projection.get(*year).is_some(), "missing {year}");
    }
}
