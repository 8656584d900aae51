//! Millwright Data -- graph snapshots and settings files.
//!
//! - [`schema`] -- the snapshot structs (PascalCase keys).
//! - [`import`] / [`export`] -- snapshot <-> graph, with missing
//!   placeholders for names the catalog does not know.
//! - [`codec`] -- JSON text and versioned `bitcode` binary encodings.
//! - [`loader`] / [`settings`] -- RON/TOML/JSON files and planner settings.

pub mod codec;
pub mod export;
pub mod import;
pub mod loader;
pub mod recipe_short;
pub mod schema;
pub mod settings;

pub use codec::CodecError;
pub use export::export_snapshot;
pub use import::{ImportError, ImportedNodes, import_into_planner, import_snapshot};
pub use loader::DataLoadError;
pub use schema::GraphSnapshot;
pub use settings::{PlannerSettings, load_settings};
