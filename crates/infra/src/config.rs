//! Configuration loading.
//!
//! Everything comes from the environment; the enumerated sets can be
//! overridden with a JSON file:
//!
//! ```json
//! { "locations": ["HQ", "Depot", "Repair"], "item_types": ["laptop", "phone"] }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use equiptrack_auth::{AuthError, SharedCredentials};
use equiptrack_core::DomainError;
use equiptrack_ledger::Catalog;

pub const ENV_DATA_DIR: &str = "EQUIPTRACK_DATA_DIR";
pub const ENV_LOGIN: &str = "EQUIPTRACK_LOGIN";
pub const ENV_PASSWORD: &str = "EQUIPTRACK_PASSWORD";
pub const ENV_CATALOG: &str = "EQUIPTRACK_CATALOG";

const DEFAULT_DATA_DIR: &str = "./data";
const DEV_LOGIN: &str = "admin";
const DEV_PASSWORD: &str = "admin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read catalog file {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid catalog: {0}")]
    InvalidCatalog(#[from] DomainError),

    #[error("invalid credentials: {0}")]
    Credentials(#[from] AuthError),
}

/// Partial catalog as written in the override file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    locations: Option<Vec<String>>,
    item_types: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub credentials: SharedCredentials,
    pub catalog: Catalog,
}

impl TrackerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for variables (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let login = lookup(ENV_LOGIN).unwrap_or_else(|| {
            tracing::warn!("{ENV_LOGIN} not set; using insecure dev default");
            DEV_LOGIN.to_string()
        });
        let password = lookup(ENV_PASSWORD).unwrap_or_else(|| {
            tracing::warn!("{ENV_PASSWORD} not set; using insecure dev default");
            DEV_PASSWORD.to_string()
        });
        let credentials = SharedCredentials::new(login, password)?;

        let catalog = match lookup(ENV_CATALOG).filter(|v| !v.trim().is_empty()) {
            Some(path) => load_catalog(Path::new(&path))?,
            None => Catalog::default(),
        };

        Ok(Self {
            data_dir,
            credentials,
            catalog,
        })
    }
}

/// Read a catalog override file; omitted keys keep the defaults.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: CatalogFile =
        serde_json::from_str(&text).map_err(|source| ConfigError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;

    let defaults = Catalog::default();
    let locations = file
        .locations
        .unwrap_or_else(|| defaults.locations().map(|l| l.as_str().to_string()).collect());
    let item_types = file
        .item_types
        .unwrap_or_else(|| defaults.item_types().map(|t| t.as_str().to_string()).collect());

    Ok(Catalog::new(locations, item_types)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = TrackerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("./data"));
        assert_eq!(cfg.credentials.login(), "admin");
        assert_eq!(cfg.catalog, Catalog::default());
    }

    #[test]
    fn env_values_override_defaults() {
        let cfg = TrackerConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/equiptrack"),
            (ENV_LOGIN, "office"),
            (ENV_PASSWORD, "pa55"),
        ]))
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/equiptrack"));
        assert!(cfg.credentials.authenticate("office", "pa55").is_ok());
    }

    #[test]
    fn empty_password_is_refused() {
        let err = TrackerConfig::from_lookup(lookup(&[(ENV_PASSWORD, "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Credentials(_)));
    }

    #[test]
    fn catalog_file_overrides_only_given_sets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{ "locations": ["HQ", "Depot"] }"#).unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert!(catalog.location("depot").is_ok());
        assert!(catalog.location("Warehouse").is_err());
        assert!(catalog.item_type("laptop").is_ok());
    }

    #[test]
    fn bad_catalog_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("nope.json");
        assert!(matches!(load_catalog(&missing), Err(ConfigError::CatalogRead { .. })));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, r#"{ "sites": [] }"#).unwrap();
        assert!(matches!(load_catalog(&garbage), Err(ConfigError::CatalogParse { .. })));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, r#"{ "item_types": [] }"#).unwrap();
        assert!(matches!(load_catalog(&empty), Err(ConfigError::InvalidCatalog(_))));
    }
}
