//! stderr logging for the `blockmap` binary.
//!
//! Levels come from `--log-level` (default `info`) plus any number of
//! `--log <crate>=<level>` overrides; `RUST_LOG`, when set, wins over both.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Logging options gathered from the command line.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// Per-crate overrides, keyed by tracing target (`blockmap_core`).
    pub targets: BTreeMap<String, String>,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            targets: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Apply one `--log` argument: `blockmap-avalanche=trace`. Crate names
    /// may use `-` or `_`.
    pub fn add_target(&mut self, arg: &str) -> anyhow::Result<()> {
        let (target, level) = arg
            .split_once('=')
            .with_context(|| format!("--log expects <crate>=<level>, got '{arg}'"))?;
        let target = target.trim();
        let level = level.trim().to_ascii_lowercase();
        if target.is_empty() {
            bail!("--log '{arg}' names no crate");
        }
        if !LEVELS.contains(&level.as_str()) {
            bail!("unknown log level '{level}' in --log '{arg}'");
        }
        self.targets.insert(target.replace('-', "_"), level);
        Ok(())
    }

    /// `EnvFilter` directives: the global level, then each override in
    /// target order, e.g. `"warn,blockmap_core=debug"`.
    pub fn directives(&self) -> String {
        self.targets
            .iter()
            .fold(self.level.clone(), |acc, (target, level)| format!("{acc},{target}={level}"))
    }
}

/// Install the global subscriber, writing to stderr so stdout carries only
/// the mapping output.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
