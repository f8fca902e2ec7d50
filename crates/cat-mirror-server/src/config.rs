use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cat_mirror::SyncSettings;
use cat_mirror_catapi::CatApiConfig;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "cat-mirror";

/// Top-level service configuration.
///
/// Read from `config.toml`, then overridden by environment variables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub catapi: CatApiSection,
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Database file. Defaults to `<cache_dir>/cat-mirror/catalog.db`.
    pub database: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            database: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatApiSection {
    pub base_url: Option<String>,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for CatApiSection {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSection {
    pub images_per_breed: u32,
    pub images_per_category: u32,
}

impl Default for SyncSection {
    fn default() -> Self {
        let settings = SyncSettings::default();
        Self {
            images_per_breed: settings.images_per_breed,
            images_per_category: settings.images_per_category,
        }
    }
}

impl ServerConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist. A missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Apply `CAT_MIRROR_*` and `CATAPI_*` overrides from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("CAT_MIRROR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CAT_MIRROR_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("invalid CAT_MIRROR_PORT: {port}"))?;
        }
        if let Some(database) = lookup("CAT_MIRROR_DATABASE") {
            self.server.database = Some(PathBuf::from(database));
        }
        if let Some(base_url) = lookup("CATAPI_BASE_URL") {
            self.catapi.base_url = Some(base_url);
        }
        if let Some(api_key) = lookup("CATAPI_API_KEY") {
            self.catapi.api_key = api_key;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Resolve the database file, creating its parent directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.server.database {
            Some(path) => path.clone(),
            None => dirs::cache_dir()
                .context("could not determine cache directory")?
                .join(APP_DIR)
                .join("catalog.db"),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        Ok(path)
    }

    pub fn catapi_config(&self) -> CatApiConfig {
        CatApiConfig {
            api_key: self.catapi.api_key.clone(),
            api_base_url: self.catapi.base_url.clone(),
            timeout: Some(Duration::from_secs(self.catapi.timeout_secs)),
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            images_per_breed: self.sync.images_per_breed,
            images_per_category: self.sync.images_per_category,
        }
    }
}

/// Config file path: `~/.config/cat-mirror/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}
