//! Configuration loading and data folder resolution
//!
//! Resolution priority for the data folder (generated videos, scratch space):
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MICA_DATA_FOLDER`)
//! 3. TOML config file (`data_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service TOML configuration (`~/.config/mica/<service>.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data folder override (videos, scratch space)
    pub data_folder: Option<String>,

    /// Listen port override
    pub port: Option<u16>,

    /// LLM provider base URL (OpenAI-compatible chat completion API)
    pub llm_base_url: Option<String>,

    /// LLM provider API key
    pub llm_api_key: Option<String>,

    /// Avatar provider base URL (talks API)
    pub avatar_base_url: Option<String>,

    /// Avatar provider API key
    pub avatar_api_key: Option<String>,

    /// Backend service base URL (job posting corpus)
    pub backend_base_url: Option<String>,
}

/// Resolve the data folder following the documented priority order
pub fn resolve_data_folder(cli_arg: Option<&str>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("MICA_DATA_FOLDER") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = toml_config.data_folder.as_deref() {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Load the TOML config file for a service, if present
///
/// Looks in the user config directory first, then `/etc/mica` on Linux.
/// A missing file is not an error; it yields the default (empty) config.
pub fn load_toml_config(service: &str) -> Result<TomlConfig> {
    let Some(path) = config_file_path(service) else {
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Write the service TOML config (best-effort atomic: temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Config file location for a service on this platform
pub fn config_file_path(service: &str) -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mica").join(format!("{}.toml", service)));

    if cfg!(target_os = "linux") {
        if let Some(path) = &user_config {
            if path.exists() {
                return user_config;
            }
        }
        let system_config = PathBuf::from("/etc/mica").join(format!("{}.toml", service));
        if system_config.exists() {
            return Some(system_config);
        }
        user_config
    } else {
        user_config
    }
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("mica"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/mica"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("mica"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/mica"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("mica"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\mica"))
    } else {
        PathBuf::from("./mica_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_argument_wins() {
        std::env::remove_var("MICA_DATA_FOLDER");
        let toml = TomlConfig {
            data_folder: Some("/from/toml".to_string()),
            ..Default::default()
        };
        let resolved = resolve_data_folder(Some("/from/cli"), &toml);
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    #[serial]
    fn env_beats_toml() {
        std::env::set_var("MICA_DATA_FOLDER", "/from/env");
        let toml = TomlConfig {
            data_folder: Some("/from/toml".to_string()),
            ..Default::default()
        };
        let resolved = resolve_data_folder(None, &toml);
        std::env::remove_var("MICA_DATA_FOLDER");
        assert_eq!(resolved, PathBuf::from("/from/env"));
    }

    #[test]
    #[serial]
    fn toml_beats_default() {
        std::env::remove_var("MICA_DATA_FOLDER");
        let toml = TomlConfig {
            data_folder: Some("/from/toml".to_string()),
            ..Default::default()
        };
        let resolved = resolve_data_folder(None, &toml);
        assert_eq!(resolved, PathBuf::from("/from/toml"));
    }

    #[test]
    #[serial]
    fn default_when_nothing_configured() {
        std::env::remove_var("MICA_DATA_FOLDER");
        let resolved = resolve_data_folder(None, &TomlConfig::default());
        assert_eq!(resolved, default_data_folder());
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mica-ai.toml");

        let config = TomlConfig {
            data_folder: Some("/srv/mica".to_string()),
            port: Some(5728),
            llm_base_url: Some("https://api.example.com/v1".to_string()),
            ..Default::default()
        };
        write_toml_config(&config, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: TomlConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.data_folder.as_deref(), Some("/srv/mica"));
        assert_eq!(parsed.port, Some(5728));
    }
}
