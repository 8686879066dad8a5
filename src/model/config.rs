use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

pub const ENV_TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const ENV_SERPAPI_API_KEY: &str = "SERPAPI_API_KEY";
pub const ENV_ALPHA_VANTAGE_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const ENV_CONFIG_PATH: &str = "GEO_RISK_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_RISK_MODEL: &str = "RISK_MODEL";
const DEFAULT_RISK_MODEL: &str = "gpt-4";

const ENV_PACING_DELAY_MS: &str = "PACING_DELAY_MS";
const DEFAULT_PACING_DELAY_MS: u64 = 1000;

const ENV_TAVILY_BASE_URL: &str = "TAVILY_BASE_URL";
const ENV_SERPAPI_BASE_URL: &str = "SERPAPI_BASE_URL";
const ENV_YAHOO_FINANCE_BASE_URL: &str = "YAHOO_FINANCE_BASE_URL";
const ENV_ALPHA_VANTAGE_BASE_URL: &str = "ALPHA_VANTAGE_BASE_URL";

pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const SERPAPI_BASE_URL: &str = "https://serpapi.com";
pub const YAHOO_FINANCE_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

/// Web search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Domains web search is restricted to
    #[serde(default = "default_include_domains")]
    pub include_domains: Vec<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
}

fn default_include_domains() -> Vec<String> {
    ["reuters.com", "bloomberg.com", "ft.com", "wsj.com", "economist.com"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_max_results() -> usize {
    5
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            include_domains: default_include_domains(),
            max_results: default_max_results(),
            search_depth: default_search_depth(),
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub search: SearchConfig,
}

/// Provider credentials. Empty values are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub tavily: Option<String>,
    pub serpapi: Option<String>,
    pub alpha_vantage: Option<String>,
    pub openai: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            tavily: non_empty_var(ENV_TAVILY_API_KEY),
            serpapi: non_empty_var(ENV_SERPAPI_API_KEY),
            alpha_vantage: non_empty_var(ENV_ALPHA_VANTAGE_API_KEY),
            openai: non_empty_var(ENV_OPENAI_API_KEY),
        }
    }
}

/// Base URLs of the external providers
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub tavily: String,
    pub serpapi: String,
    pub yahoo_finance: String,
    pub alpha_vantage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            tavily: TAVILY_BASE_URL.to_string(),
            serpapi: SERPAPI_BASE_URL.to_string(),
            yahoo_finance: YAHOO_FINANCE_BASE_URL.to_string(),
            alpha_vantage: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tavily: std::env::var(ENV_TAVILY_BASE_URL).unwrap_or(defaults.tavily),
            serpapi: std::env::var(ENV_SERPAPI_BASE_URL).unwrap_or(defaults.serpapi),
            yahoo_finance: std::env::var(ENV_YAHOO_FINANCE_BASE_URL)
                .unwrap_or(defaults.yahoo_finance),
            alpha_vantage: std::env::var(ENV_ALPHA_VANTAGE_BASE_URL)
                .unwrap_or(defaults.alpha_vantage),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub search: SearchConfig,
    pub model: String,
    /// Pause after every assessed pair to stay under provider rate limits
    pub pacing_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            endpoints: Endpoints::default(),
            search: SearchConfig::default(),
            model: DEFAULT_RISK_MODEL.to_string(),
            pacing_delay: Duration::from_millis(DEFAULT_PACING_DELAY_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let model = std::env::var(ENV_RISK_MODEL).unwrap_or_else(|_| DEFAULT_RISK_MODEL.to_string());

        let pacing_delay = std::env::var(ENV_PACING_DELAY_MS)
            .ok()
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_PACING_DELAY_MS));

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let search = load_search_config(Path::new(&config_path));

        Self {
            credentials: Credentials::from_env(),
            endpoints: Endpoints::from_env(),
            search,
            model,
            pacing_delay,
        }
    }

    /// Names of required credentials that are not set, in a fixed order.
    /// The currency credential is optional and never reported here.
    pub fn missing_required_credentials(&self) -> Vec<&'static str> {
        let required = [
            (ENV_TAVILY_API_KEY, &self.credentials.tavily),
            (ENV_OPENAI_API_KEY, &self.credentials.openai),
            (ENV_SERPAPI_API_KEY, &self.credentials.serpapi),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Search settings from the `search` section of the YAML file at `path`.
/// A missing, unreadable or malformed file yields the built-in settings.
fn load_search_config(path: &Path) -> SearchConfig {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No search config file, using built-in news domains");
            return SearchConfig::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read search config, using built-in news domains");
            return SearchConfig::default();
        }
    };

    if contents.trim().is_empty() {
        return SearchConfig::default();
    }

    let mut search = match serde_yaml::from_str::<ConfigFile>(&contents) {
        Ok(file) => file.search,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Malformed search config, using built-in news domains");
            return SearchConfig::default();
        }
    };

    if search.max_results == 0 {
        tracing::warn!(path = %path.display(), "search.max_results must be positive, using {}", default_max_results());
        search.max_results = default_max_results();
    }

    tracing::info!(
        path = %path.display(),
        domains = search.include_domains.len(),
        max_results = search.max_results,
        depth = %search.search_depth,
        "Loaded search settings"
    );
    search
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
