//! Application-level configuration loading: list page size and per-collection sort orders.

use std::{collections::HashMap, env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::models::EntityKind;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CHESS_ADMIN_CONFIG_PATH";
const DEFAULT_PAGE_LIMIT: u32 = 10;
const DEFAULT_SORT: &str = "id,DESC";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    page_limit: u32,
    default_sort: String,
    sort_overrides: HashMap<EntityKind, String>,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        page_limit = app_config.page_limit,
                        overrides = app_config.sort_overrides.len(),
                        "loaded list settings from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Rows per list page when the request does not say.
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Sort order of `kind` lists when the request does not say.
    pub fn sort_for(&self, kind: EntityKind) -> &str {
        self.sort_overrides
            .get(&kind)
            .map(String::as_str)
            .unwrap_or(&self.default_sort)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            default_sort: DEFAULT_SORT.to_string(),
            sort_overrides: HashMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    page_limit: Option<u32>,
    default_sort: Option<String>,
    /// Keyed by collection name, e.g. `{"matches": "begin,ASC"}`.
    sort: HashMap<EntityKind, String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            page_limit: value
                .page_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_PAGE_LIMIT),
            default_sort: value
                .default_sort
                .filter(|sort| !sort.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SORT.to_string()),
            sort_overrides: value.sort,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_list_ten_newest_first() {
        let config = AppConfig::default();
        assert_eq!(config.page_limit(), 10);
        assert_eq!(config.sort_for(EntityKind::Clubs), "id,DESC");
    }

    #[test]
    fn per_collection_sort_overrides_default() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"pageLimit": 25, "sort": {"matches": "begin,ASC"}}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.page_limit(), 25);
        assert_eq!(config.sort_for(EntityKind::Matches), "begin,ASC");
        assert_eq!(config.sort_for(EntityKind::Players), "id,DESC");
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        let raw: RawConfig = serde_json::from_str(r#"{"pageLimit": 0}"#).unwrap();
        assert_eq!(AppConfig::from(raw).page_limit(), 10);
    }
}
