//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + `--set key=value` overrides
//!     → loader.rs (parse, flatten immediate children to strings)
//!     → MemoryConfigSource (external configuration source)
//!     → args.rs: ArgList (effective settings handed to the engine)
//!     → settings.rs: LayeredSettings (lookups against source + base store)
//! ```
//!
//! # Design Decisions
//! - Effective settings are assembled once per boot and frozen at engine start
//! - Values are always strings; typed reads go through `ArgList::flag`
//! - Existence checks favour the base store, value lookups favour the source

pub mod args;
pub mod keys;
pub mod loader;
pub mod settings;
pub mod source;

pub use args::ArgList;
pub use loader::{load_config, ConfigError};
pub use settings::{BaseSettings, LayeredSettings, SettingsStore};
pub use source::{ConfigSource, MemoryConfigSource};
