//! Planner settings files.
//!
//! A settings file holds a single [`PlannerSettings`] value in RON, TOML or
//! JSON. Every field is optional; omitted ones take their defaults.
//!
//! ```ron
//! (
//!     solver: (max_iterations: 20000, epsilon: 1e-10, parallel: true),
//! )
//! ```

use crate::loader::{DataLoadError, deserialize_file, find_data_file};
use millwright_core::config::SolverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base name looked up by [`load_settings_from_dir`].
pub const SETTINGS_FILE: &str = "settings";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub solver: SolverConfig,
}

/// Load settings from a file, format chosen by extension.
pub fn load_settings(path: &Path) -> Result<PlannerSettings, DataLoadError> {
    let settings: PlannerSettings = deserialize_file(path)?;
    tracing::debug!(
        file = %path.display(),
        max_iterations = settings.solver.max_iterations,
        parallel = settings.solver.parallel,
        "loaded planner settings"
    );
    Ok(settings)
}

/// Load `settings.{ron,toml,json}` from `dir`, or defaults when absent.
pub fn load_settings_from_dir(dir: &Path) -> Result<PlannerSettings, DataLoadError> {
    match find_data_file(dir, SETTINGS_FILE)? {
        Some(path) => load_settings(&path),
        None => Ok(PlannerSettings::default()),
    }
}
