use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::{DroidConfig, Transport};

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file.
    File(PathBuf),
    /// No file at this path; defaults were used.
    Missing(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::File(p) | ConfigSource::Missing(p) => p,
        }
    }
}

/// On-disk syntax of a config file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Toml,
        }
    }
}

/// Loads the droid configuration once at startup.
pub struct ConfigLoader {
    config: DroidConfig,
    source: ConfigSource,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > DROID_CONFIG env > ./droid.toml
    /// > ./config.yaml > ~/.droid/droid.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("DROID_CONFIG") {
            return PathBuf::from(p);
        }
        for local in ["droid.toml", "config.yaml"] {
            let local = PathBuf::from(local);
            if local.exists() {
                return local;
            }
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".droid")
            .join("droid.toml")
    }

    /// Load the config from disk, falling back to defaults when the file is absent.
    pub fn load(path: Option<&Path>) -> droid_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let loader = Self::load_with(&config_path, |key| std::env::var(key).ok())?;
        loader.log_notices();
        Ok(loader)
    }

    /// Emit the device-selection notices and any validation warnings.
    ///
    /// Split from loading so callers can install a subscriber in between.
    pub fn log_notices(&self) {
        for notice in self.notices() {
            match self.source {
                ConfigSource::Missing(_) => warn!("{notice}"),
                ConfigSource::File(_) => info!("{notice}"),
            }
        }
        if let Ok(warnings) = self.config.validate() {
            for w in &warnings {
                warn!("{}", w);
            }
        }
    }

    /// Load from an explicit path with a custom environment lookup.
    pub fn load_with(
        config_path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> droid_core::Result<Self> {
        let (config, source) = if config_path.exists() {
            let raw = std::fs::read_to_string(config_path)?;
            let config = Self::parse_as(&raw, ConfigFormat::from_path(config_path)).map_err(|e| {
                droid_core::DroidError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?;
            (config, ConfigSource::File(config_path.to_path_buf()))
        } else {
            (DroidConfig::default(), ConfigSource::Missing(config_path.to_path_buf()))
        };

        let config = Self::apply_env_overrides(config, env);

        // Warnings are reported by log_notices; errors fail the load
        config.validate().map_err(droid_core::DroidError::Config)?;

        Ok(Self { config, source })
    }

    /// Parse a `droid.toml` document.
    pub fn parse(raw: &str) -> Result<DroidConfig, toml::de::Error> {
        toml::from_str::<DroidConfig>(raw)
    }

    /// Parse a document in either supported syntax. YAML maps onto the same
    /// sections, and `name: null` is accepted there.
    pub fn parse_as(raw: &str, format: ConfigFormat) -> Result<DroidConfig, String> {
        match format {
            ConfigFormat::Toml => Self::parse(raw).map_err(|e| e.to_string()),
            // An empty YAML document is null, not an empty mapping
            ConfigFormat::Yaml if raw.trim().is_empty() => Ok(DroidConfig::default()),
            ConfigFormat::Yaml => serde_yaml::from_str::<DroidConfig>(raw).map_err(|e| e.to_string()),
        }
    }

    /// The effective configuration.
    pub fn get(&self) -> &DroidConfig {
        &self.config
    }

    pub fn into_config(self) -> DroidConfig {
        self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Human-readable lines describing how the device will be chosen.
    pub fn notices(&self) -> Vec<String> {
        match &self.source {
            ConfigSource::Missing(path) => vec![format!(
                "config file {} not found, using auto-selection for device",
                path.display()
            )],
            ConfigSource::File(path) => {
                let mut out = vec![format!("Loaded config from {}", path.display())];
                match self.config.device.requested_name() {
                    Some(name) => out.push(format!("Configured device: {name}")),
                    None => out.push(
                        "No device specified in config, will auto-select if only one device connected"
                            .into(),
                    ),
                }
                out
            }
        }
    }

    /// Apply env var overrides (DROID_DEVICE, DROID_TRANSPORT, etc.)
    fn apply_env_overrides(
        mut config: DroidConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> DroidConfig {
        if let Some(v) = env("DROID_DEVICE") {
            config.device.name = Some(v);
        }
        if let Some(v) = env("DROID_TRANSPORT") {
            match v.parse::<Transport>() {
                Ok(t) => config.server.transport = t,
                Err(e) => warn!(error = %e, "ignoring DROID_TRANSPORT"),
            }
        }
        if let Some(v) = env("DROID_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = env("DROID_ADB_PATH") {
            config.adb.path = PathBuf::from(v);
        }
        config
    }
}
