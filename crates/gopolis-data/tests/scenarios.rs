//! Loading scenarios from disk and running them.

use std::fs;
use std::path::{Path, PathBuf};

use gopolis_core::config::ShortfallPolicy;
use gopolis_core::driver::Simulation;
use gopolis_core::test_utils::{assert_invariants, gopher_town as builtin_town};
use gopolis_data::loader::{DataLoadError, build_scenario};
use gopolis_data::schema::ScenarioData;
use gopolis_data::{gopher_town, load_scenario, load_scenario_dir};
use proptest::prelude::*;

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gopolis_data_it_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn bundled_town_matches_builtin_town() {
    let loaded = gopher_town().unwrap().into_simulation();
    let builtin = Simulation::new(builtin_town(), 42);
    assert_eq!(loaded.state_hash(), builtin.state_hash());
}

#[test]
fn bundled_town_runs_ten_days_twice_alike() {
    let scenario = gopher_town().unwrap();
    let days = scenario.config.days;

    let mut a = scenario.simulation();
    let mut b = scenario.simulation();
    let ra = a.run(days);
    let rb = b.run(days);

    assert_eq!(ra, rb);
    assert_eq!(ra.len(), 10);
    assert_eq!(a.snapshot().to_string(), b.snapshot().to_string());
    assert_invariants(a.economy());
}

#[test]
fn same_town_in_three_formats() {
    let dir = make_test_dir("formats");
    let ron = r#"(
        name: Some("trio"),
        gophers: ["a", "b", "c", "d"],
        residentials: [(capacity: 4, residents: [0, 1, 2, 3])],
        commercials: [(capacity: 2)],
        industrials: [(capacity: 2, workers: [3])],
    )"#;
    let toml = r#"
name = "trio"
gophers = ["a", "b", "c", "d"]

[[residentials]]
capacity = 4
residents = [0, 1, 2, 3]

[[commercials]]
capacity = 2

[[industrials]]
capacity = 2
workers = [3]
"#;
    let json = r#"{
        "name": "trio",
        "gophers": ["a", "b", "c", "d"],
        "residentials": [{ "capacity": 4, "residents": [0, 1, 2, 3] }],
        "commercials": [{ "capacity": 2 }],
        "industrials": [{ "capacity": 2, "workers": [3] }]
    }"#;

    let mut hashes = Vec::new();
    for (file, content) in [("trio.ron", ron), ("trio.toml", toml), ("trio.json", json)] {
        let path = dir.join(file);
        fs::write(&path, content).unwrap();
        let mut sim = load_scenario(&path).unwrap().into_simulation();
        sim.run(5);
        hashes.push(sim.state_hash());
    }
    assert_eq!(hashes[0], hashes[1]);
    assert_eq!(hashes[1], hashes[2]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn rollback_policy_from_file() {
    let dir = make_test_dir("rollback");
    fs::write(
        dir.join("scenario.toml"),
        r#"
gophers = ["a", "b"]

[economy]
shortfall = "rollback"

[[residentials]]
capacity = 2
residents = [0, 1]

[[commercials]]
capacity = 2

[[industrials]]
capacity = 2
"#,
    )
    .unwrap();

    let scenario = load_scenario_dir(&dir).unwrap();
    assert_eq!(scenario.economy.config().shortfall, ShortfallPolicy::Rollback);
    let mut sim = scenario.into_simulation();
    for _ in 0..5 {
        sim.step_day();
        assert_invariants(sim.economy());
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_scenario_dir_is_reported() {
    let dir = make_test_dir("empty");
    assert!(matches!(
        load_scenario_dir(&dir),
        Err(DataLoadError::MissingRequired { .. })
    ));
    let _ = fs::remove_dir_all(&dir);
}

// ===========================================================================
// Generated towns
// ===========================================================================

fn town_toml(gophers: usize, homes: usize, shops: usize, plants: usize, cap: usize) -> String {
    let names: Vec<String> = (0..gophers).map(|i| format!("\"g{i}\"")).collect();
    let mut out = format!("seed = 7\ngophers = [{}]\n", names.join(", "));
    let mut next = 0;
    for _ in 0..homes {
        let end = (next + cap).min(gophers);
        let residents: Vec<String> = (next..end).map(|i| i.to_string()).collect();
        next = end;
        out += &format!(
            "\n[[residentials]]\ncapacity = {cap}\nresidents = [{}]\n",
            residents.join(", ")
        );
    }
    for _ in 0..shops {
        out += &format!("\n[[commercials]]\ncapacity = {cap}\n");
    }
    for _ in 0..plants {
        out += &format!("\n[[industrials]]\ncapacity = {cap}\n");
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any well-formed generated town loads and keeps its invariants.
    #[test]
    fn generated_towns_load_and_run(
        gophers in 0..24usize,
        homes in 0..6usize,
        shops in 0..4usize,
        plants in 0..4usize,
        cap in 1..6usize,
    ) {
        let src = town_toml(gophers, homes, shops, plants, cap);
        let data: ScenarioData = toml::from_str(&src).unwrap();
        let scenario = build_scenario(data, Path::new("generated.toml")).unwrap();
        prop_assert_eq!(scenario.economy.agents().len(), gophers);

        let mut sim = scenario.into_simulation();
        for _ in 0..4 {
            sim.step_day();
            assert_invariants(sim.economy());
        }
    }
}
