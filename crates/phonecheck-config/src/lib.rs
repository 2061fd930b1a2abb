use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "phonecheck";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_EXPECTED_CSV: &str = "expected-numbers.csv";
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;
pub const MAX_WAIT_TIMEOUT_MS: u64 = 120_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub expected_csv: PathBuf,
    pub base_url: Option<Url>,
    pub wait_timeout: Duration,
    pub user_agent: Option<String>,
    pub pages: Vec<PageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub name: String,
    pub location: PageLocation,
    pub selectors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLocation {
    Url(Url),
    File(PathBuf),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            expected_csv: PathBuf::from(DEFAULT_EXPECTED_CSV),
            base_url: None,
            wait_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            user_agent: None,
            pages: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn page(&self, name: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|page| page.name == name)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid wait_timeout_ms value: {0}")]
    InvalidWaitTimeout(u64),
    #[error("invalid base_url {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("invalid page name: {0:?}")]
    InvalidPageName(String),
    #[error("duplicate page name: {0}")]
    DuplicatePageName(String),
    #[error("page {page}: {reason}")]
    InvalidPageField { page: String, reason: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    expected_csv: Option<PathBuf>,
    base_url: Option<String>,
    wait_timeout_ms: Option<u64>,
    user_agent: Option<String>,
    #[serde(default)]
    pages: Vec<PageFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageFile {
    name: String,
    url: Option<String>,
    file: Option<PathBuf>,
    #[serde(default)]
    selectors: Vec<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(path) = parsed.expected_csv {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(path));
        }
        config.expected_csv = path;
    }

    if let Some(raw) = parsed.base_url {
        let url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidBaseUrl {
            value: raw.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: raw,
                reason: "scheme must be http or https".to_string(),
            });
        }
        config.base_url = Some(url);
    }

    if let Some(timeout_ms) = parsed.wait_timeout_ms {
        if timeout_ms == 0 || timeout_ms > MAX_WAIT_TIMEOUT_MS {
            return Err(ConfigError::InvalidWaitTimeout(timeout_ms));
        }
        config.wait_timeout = Duration::from_millis(timeout_ms);
    }

    if let Some(agent) = parsed.user_agent {
        let agent = agent.trim();
        if !agent.is_empty() {
            config.user_agent = Some(agent.to_string());
        }
    }

    let mut seen = HashSet::new();
    for page in parsed.pages {
        let page = resolve_page(page, config.base_url.as_ref())?;
        if !seen.insert(page.name.clone()) {
            return Err(ConfigError::DuplicatePageName(page.name));
        }
        config.pages.push(page);
    }

    Ok(config)
}

fn resolve_page(page: PageFile, base_url: Option<&Url>) -> Result<PageConfig> {
    let name = page.name.trim().to_string();
    if name.is_empty() {
        return Err(ConfigError::InvalidPageName(page.name));
    }
    let invalid = |reason: &str| ConfigError::InvalidPageField {
        page: name.clone(),
        reason: reason.to_string(),
    };

    let location = match (page.url, page.file) {
        (Some(_), Some(_)) => return Err(invalid("set either url or file, not both")),
        (None, None) => return Err(invalid("one of url or file is required")),
        (None, Some(file)) => {
            if file.as_os_str().is_empty() {
                return Err(invalid("file cannot be empty"));
            }
            PageLocation::File(file)
        }
        (Some(raw), None) => PageLocation::Url(resolve_page_url(raw.trim(), base_url).map_err(
            |reason| ConfigError::InvalidPageField {
                page: name.clone(),
                reason,
            },
        )?),
    };

    if page.selectors.is_empty() {
        return Err(invalid("at least one selector is required"));
    }
    let mut selectors = Vec::with_capacity(page.selectors.len());
    for selector in page.selectors {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(invalid("selectors cannot be empty"));
        }
        selectors.push(selector.to_string());
    }

    Ok(PageConfig {
        name,
        location,
        selectors,
    })
}

fn resolve_page_url(raw: &str, base_url: Option<&Url>) -> std::result::Result<Url, String> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base_url {
            Some(base) => base.join(raw).map_err(|err| err.to_string())?,
            None => return Err(format!("relative url {raw:?} requires base_url")),
        },
        Err(err) => return Err(err.to_string()),
    };
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("url must use http or https: {url}"));
    }
    Ok(url)
}
