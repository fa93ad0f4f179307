use crate::tasks::TaskIndex;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = env!("CARGO_PKG_NAME");
const CONFIG_PATH_VAR: &str = "TASKCAL_CONFIG_PATH";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct Config {
    #[serde(default = "default_version")]
    pub(crate) version: i64,
    #[serde(default)]
    pub(crate) tasks: Tasks,
    #[serde(default)]
    pub(crate) log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            tasks: Tasks::default(),
            log: Log::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub(crate) struct Tasks {
    pub(crate) path: Option<PathBuf>,
    pub(crate) sample: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub(crate) struct Log {
    pub(crate) file: Option<PathBuf>,
    pub(crate) level: Option<String>,
}

fn default_version() -> i64 {
    CONFIG_VERSION
}

impl Config {
    pub(crate) fn default_path() -> Result<PathBuf> {
        default_path_from(env::var_os(CONFIG_PATH_VAR), dirs::config_dir())
    }

    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;
        if config.version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = {}",
                config.version,
                path.display(),
                CONFIG_VERSION
            );
        }
        Ok(config)
    }

    pub(crate) fn use_sample(&self) -> bool {
        self.tasks.sample.unwrap_or(true)
    }

    pub(crate) fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Load the tasks to show.  An explicitly configured task file must
    /// exist; the default one, `tasks.toml` in `config_dir`, may be absent, in
    /// which case the sample tasks are used if enabled.
    pub(crate) fn load_tasks(&self, config_dir: Option<&Path>) -> Result<TaskIndex> {
        if let Some(path) = &self.tasks.path {
            return TaskIndex::load(path)
                .with_context(|| format!("load tasks from {}", path.display()));
        }
        if let Some(path) = config_dir.map(|dir| dir.join("tasks.toml")) {
            if path.exists() {
                return TaskIndex::load(&path)
                    .with_context(|| format!("load tasks from {}", path.display()));
            }
        }
        if self.use_sample() {
            log::warn!("No task file found; showing the sample tasks");
            Ok(TaskIndex::sample())
        } else {
            log::info!("No task file found");
            Ok(TaskIndex::default())
        }
    }
}

fn default_path_from(
    env_override: Option<OsString>,
    config_root: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = env_override {
        return Ok(PathBuf::from(path));
    }
    let config_root = config_root.ok_or_else(|| {
        anyhow!("cannot resolve config directory; set {CONFIG_PATH_VAR} to the config file")
    })?;
    Ok(config_root.join(APP_NAME).join("config.toml"))
}
