use gowalker_core::{HttpConfig, Result};
use gowalker_vcs::bitbucket::BitbucketConfig;
use gowalker_vcs::github::GitHubConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration for the crawler.
///
/// Read from a JSON file; every field falls back to a default when
/// missing.
///
/// # Examples
///
/// ```
/// use gowalker::config::WalkerConfig;
///
/// let json = r#"{
///     "fetch_timeout_secs": 10,
///     "github": { "token": "abc" }
/// }"#;
///
/// let config: WalkerConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.fetch_timeout_secs, 10);
/// assert_eq!(config.github.token.as_deref(), Some("abc"));
/// assert!(!config.prod_mode);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct WalkerConfig {
    /// Upper bound for one fetch, resolution included.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Production mode skips local snapshots.
    #[serde(default)]
    pub prod_mode: bool,
    #[serde(default = "default_docs_js_path")]
    pub docs_js_path: PathBuf,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub bitbucket: BitbucketSection,
    #[serde(default)]
    pub recent_projects: RecentProjectsSection,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            prod_mode: false,
            docs_js_path: default_docs_js_path(),
            snapshot_path: default_snapshot_path(),
            http: HttpSection::default(),
            github: GitHubSection::default(),
            bitbucket: BitbucketSection::default(),
            recent_projects: RecentProjectsSection::default(),
        }
    }
}

impl WalkerConfig {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSection {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_http_timeout(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
        }
    }
}

impl From<&HttpSection> for HttpConfig {
    fn from(section: &HttpSection) -> Self {
        Self {
            user_agent: section.user_agent.clone(),
            timeout: Duration::from_secs(section.timeout_secs),
            max_concurrent_downloads: section.max_concurrent_downloads,
        }
    }
}

/// GitHub endpoints and credentials. URLs default to the public service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubSection {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl From<&GitHubSection> for GitHubConfig {
    fn from(section: &GitHubSection) -> Self {
        let defaults = Self::default();
        Self {
            api_url: section.api_url.clone().unwrap_or(defaults.api_url),
            raw_url: section.raw_url.clone().unwrap_or(defaults.raw_url),
            web_url: section.web_url.clone().unwrap_or(defaults.web_url),
            token: section.token.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitbucketSection {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl From<&BitbucketSection> for BitbucketConfig {
    fn from(section: &BitbucketSection) -> Self {
        let defaults = Self::default();
        Self {
            api_url: section.api_url.clone().unwrap_or(defaults.api_url),
            web_url: section.web_url.clone().unwrap_or(defaults.web_url),
        }
    }
}

/// Recently viewed projects list.
///
/// # Defaults
///
/// - `capacity`: `20`
/// - `max_path_len`: `40` (longer import paths are never listed)
#[derive(Debug, Clone, Deserialize)]
pub struct RecentProjectsSection {
    #[serde(default = "default_recent_capacity")]
    pub capacity: usize,
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,
}

impl Default for RecentProjectsSection {
    fn default() -> Self {
        Self {
            capacity: default_recent_capacity(),
            max_path_len: default_max_path_len(),
        }
    }
}

const fn default_fetch_timeout() -> u64 {
    40
}

fn default_docs_js_path() -> PathBuf {
    PathBuf::from("static/docs")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/snapshots")
}

fn default_user_agent() -> String {
    HttpConfig::default().user_agent
}

const fn default_http_timeout() -> u64 {
    30
}

const fn default_max_concurrent_downloads() -> usize {
    10
}

const fn default_recent_capacity() -> usize {
    gowalker_core::cache::DEFAULT_CAPACITY
}

const fn default_max_path_len() -> usize {
    40
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: WalkerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.fetch_timeout_secs, 40);
        assert_eq!(config.docs_js_path, PathBuf::from("static/docs"));
        assert_eq!(config.http.max_concurrent_downloads, 10);
        assert_eq!(config.recent_projects.capacity, 20);
        assert_eq!(config.recent_projects.max_path_len, 40);
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "prod_mode": true,
            "http": { "timeout_secs": 5 },
            "github": { "api_url": "http://localhost:1234" }
        }"#;
        let config: WalkerConfig = serde_json::from_str(json).unwrap();
        assert!(config.prod_mode);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_concurrent_downloads, 10);

        let github = GitHubConfig::from(&config.github);
        assert_eq!(github.api_url, "http://localhost:1234");
        assert_eq!(github.raw_url, "https://raw.githubusercontent.com");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gowalker.json");
        std::fs::write(&path, r#"{"fetch_timeout_secs": 3}"#).unwrap();
        let config = WalkerConfig::load(&path).unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        assert!(WalkerConfig::load(&path).is_err());
    }
}
