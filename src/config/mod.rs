//! Layered site configuration
//!
//! Facts are merged from four layers, later layers winning:
//! 1. Built-in defaults
//! 2. Site config (generated into the build tree)
//! 3. Local config (developer overrides)
//! 4. CLI flags (`--set`, `--feature`)

mod defaults;
mod loaded;
mod merge;

pub use defaults::BuiltinDefaults;
pub use loaded::{ConfigError, ConfigOrigin, ConfigSource, LoadedFacts};
pub use merge::{deep_merge, merge_layers, parse_override, parse_overrides};
