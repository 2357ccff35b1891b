pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Scenario, gopher_town, load_scenario, load_scenario_dir};
