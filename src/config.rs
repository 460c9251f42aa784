use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::portal::PortalError;
use crate::utils::media_url::media_origin;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const APP_DIR: &str = "course-portal";

#[derive(Clone, Debug)]
pub struct PortalConfig {
    /// Root of the REST API, e.g. `http://localhost:8080/api`.
    pub api_base_url: String,
    /// Where the login token is kept between runs.
    pub session_file: PathBuf,
    pub timeout: Duration,
}

/// Shape of the optional TOML config file. Every key may be omitted.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_base_url: Option<String>,
    session_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

pub fn default_config_file() -> PathBuf {
    app_dir().join("config.toml")
}

impl Default for PortalConfig {
    fn default() -> Self {
        PortalConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_file: app_dir().join("session.json"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl PortalConfig {
    /// Defaults overlaid with the TOML file at `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, PortalError> {
        let mut config = PortalConfig::default();
        if !path.exists() {
            log::debug!("no config file at {}, using defaults", path.display());
            return Ok(config);
        }
        let text = std::fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&text)?;
        if let Some(url) = file.api_base_url {
            config.api_base_url = url;
        }
        if let Some(session_file) = file.session_file {
            config.session_file = session_file;
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        self
    }

    pub fn with_session_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.session_file = path;
        }
        self
    }

    /// API base with exactly one trailing slash, ready for `Url::join`.
    pub fn api_root(&self) -> String {
        format!("{}/", self.api_base_url.trim().trim_end_matches('/'))
    }

    pub fn media_origin(&self) -> String {
        media_origin(&self.api_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let config = PortalConfig::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"https://portal.example.com/api/\"\ntimeout_secs = 5").unwrap();
        let config = PortalConfig::load(file.path()).unwrap();
        assert_eq!(config.api_root(), "https://portal.example.com/api/");
        assert_eq!(config.media_origin(), "https://portal.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"x\"").unwrap();
        assert!(matches!(PortalConfig::load(file.path()), Err(PortalError::Toml(_))));
    }

    #[test]
    fn blank_override_is_ignored() {
        let config = PortalConfig::default().with_api_base_url(Some("  ".into()));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
