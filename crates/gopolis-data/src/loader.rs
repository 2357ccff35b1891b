//! Resolution pipeline: reads scenario files, resolves gopher references,
//! builds a ready-to-run simulation.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by the higher-level loading pipeline.

use std::path::{Path, PathBuf};

use gopolis_core::config::{ConfigError, EconomyConfig, SimulationConfig};
use gopolis_core::driver::Simulation;
use gopolis_core::economy::{Economy, EconomyError};
use gopolis_core::fixed::Fixed64;
use gopolis_core::id::{AgentId, Workplace};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::schema::{EconomyData, ScenarioData, WorkplaceData};

/// Base name looked up by [`load_scenario_dir`].
pub const SCENARIO_BASE_NAME: &str = "scenario";

const GOPHER_TOWN: &str = include_str!("../scenarios/gopher_town.toml");

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A building refers to a gopher index past the end of the list.
    #[error("{building} in {file} refers to gopher #{index}, but only {count} are listed")]
    UnknownGopher {
        file: PathBuf,
        building: String,
        index: usize,
        count: usize,
    },

    /// An economic constant does not fit the fixed-point range.
    #[error("{field} in {file} is not representable: {value}")]
    OutOfRange {
        file: PathBuf,
        field: &'static str,
        value: f64,
    },

    /// The configuration values are invalid.
    #[error("invalid configuration in {file}: {source}")]
    Config {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// The town could not be set up (double housing, full roster, ...).
    #[error("invalid town in {file}: {source}")]
    Economy {
        file: PathBuf,
        #[source]
        source: EconomyError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. `origin` only labels errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Resolution
// ===========================================================================

/// A scenario resolved into engine types.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub config: SimulationConfig,
    pub economy: Economy,
}

impl Scenario {
    /// A fresh simulation of this scenario, seeded from its config.
    pub fn simulation(&self) -> Simulation {
        Simulation::with_config(self.economy.clone(), &self.config)
    }

    pub fn into_simulation(self) -> Simulation {
        Simulation::with_config(self.economy, &self.config)
    }
}

fn to_fixed(file: &Path, field: &'static str, value: f64) -> Result<Fixed64, DataLoadError> {
    Fixed64::checked_from_num(value).ok_or_else(|| DataLoadError::OutOfRange {
        file: file.to_path_buf(),
        field,
        value,
    })
}

fn resolve_economy(data: &EconomyData, file: &Path) -> Result<EconomyConfig, DataLoadError> {
    Ok(EconomyConfig {
        goods_per_shopper: to_fixed(file, "goods_per_shopper", data.goods_per_shopper)?,
        goods_per_worker: to_fixed(file, "goods_per_worker", data.goods_per_worker)?,
        products_per_good: to_fixed(file, "products_per_good", data.products_per_good)?,
        products_per_worker: to_fixed(file, "products_per_worker", data.products_per_worker)?,
        shortfall: data.shortfall,
    })
}

/// Map gopher indices to spawned ids, failing on the first bad index.
fn resolve_gophers(
    indices: &[usize],
    ids: &[AgentId],
    building: impl Fn() -> String,
    file: &Path,
) -> Result<Vec<AgentId>, DataLoadError> {
    indices
        .iter()
        .map(|&index| {
            ids.get(index)
                .copied()
                .ok_or_else(|| DataLoadError::UnknownGopher {
                    file: file.to_path_buf(),
                    building: building(),
                    index,
                    count: ids.len(),
                })
        })
        .collect()
}

fn staff(
    economy: &mut Economy,
    workplace: Workplace,
    data: &WorkplaceData,
    ids: &[AgentId],
    file: &Path,
) -> Result<(), DataLoadError> {
    let workers = resolve_gophers(&data.workers, ids, || format!("{workplace:?}"), file)?;
    for agent in workers {
        economy
            .seed_worker(workplace, agent)
            .map_err(|source| DataLoadError::Economy {
                file: file.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}

/// Resolve deserialized data into a validated [`Scenario`].
///
/// Buildings are registered in file order, so ids and the order agents
/// look for work follow the file. `file` labels errors only.
pub fn build_scenario(data: ScenarioData, file: &Path) -> Result<Scenario, DataLoadError> {
    let config = SimulationConfig {
        seed: data.seed,
        days: data.days,
        tick_interval_ms: data.tick_interval_ms,
        economy: resolve_economy(&data.economy, file)?,
    };
    config.validate().map_err(|source| DataLoadError::Config {
        file: file.to_path_buf(),
        source,
    })?;

    let economy_err = |source| DataLoadError::Economy {
        file: file.to_path_buf(),
        source,
    };

    let mut economy = Economy::new(config.economy.clone());
    let ids = economy.spawn_many(data.gophers.iter().cloned());

    for (n, home) in data.residentials.iter().enumerate() {
        let residents = resolve_gophers(&home.residents, &ids, || format!("residential #{n}"), file)?;
        economy
            .add_residential(home.capacity, residents)
            .map_err(economy_err)?;
    }
    for shop in &data.commercials {
        let id = economy.add_commercial(shop.capacity);
        staff(&mut economy, id.into(), shop, &ids, file)?;
    }
    for plant in &data.industrials {
        let id = economy.add_industrial(plant.capacity);
        staff(&mut economy, id.into(), plant, &ids, file)?;
    }

    let name = data.name.unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string()
    });
    debug!(
        scenario = %name,
        gophers = ids.len(),
        residentials = data.residentials.len(),
        commercials = data.commercials.len(),
        industrials = data.industrials.len(),
        "scenario resolved"
    );

    Ok(Scenario {
        name,
        config,
        economy,
    })
}

// ===========================================================================
// Top-level API
// ===========================================================================

/// Load and resolve a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario, DataLoadError> {
    let data: ScenarioData = deserialize_file(path)?;
    let scenario = build_scenario(data, path)?;
    info!(scenario = %scenario.name, file = %path.display(), "scenario loaded");
    Ok(scenario)
}

/// Load `scenario.{ron,toml,json}` from a directory.
pub fn load_scenario_dir(dir: &Path) -> Result<Scenario, DataLoadError> {
    let path = require_data_file(dir, SCENARIO_BASE_NAME)?;
    load_scenario(&path)
}

/// The bundled reference town: 20 gophers, 5 residentials, 3 commercials
/// and 2 industrials of capacity 4, seed 42, 10 days.
pub fn gopher_town() -> Result<Scenario, DataLoadError> {
    let origin = Path::new("scenarios/gopher_town.toml");
    let data: ScenarioData = deserialize_str(GOPHER_TOWN, Format::Toml, origin)?;
    build_scenario(data, origin)
}

// ===========================================================================
// Tests
// ===========================================================================
