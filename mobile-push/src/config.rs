//! Provider configuration: credentials, app groups and loaders.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{Platform, PushError, Result, RetryPolicy};

/// Name of the app group used by [`UrbanAirshipConfig::from_env`].
pub const DEFAULT_APP_GROUP: &str = "default-app-group";

const DEFAULT_BASE_URL: &str = "https://go.urbanairship.com";
const DEFAULT_PARSE_SERVER_URL: &str = "https://api.parse.com/1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for validating configuration.
pub trait Validate {
    /// Check invariants that deserialization alone cannot express.
    fn validate(&self) -> Result<()>;
}

/// Urban Airship credentials for a single app.
///
/// Any missing or empty value makes the app "empty": it is skipped at send
/// time instead of failing the batch.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Application key.
    #[serde(default)]
    pub app_key: Option<String>,
    /// Application secret.
    #[serde(default)]
    pub app_secret: Option<String>,
    /// Master secret, used for server-side API calls.
    #[serde(default)]
    pub master_secret: Option<String>,
}

impl Credentials {
    /// Create a complete set of credentials.
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        master_secret: impl Into<String>,
    ) -> Self {
        Self {
            app_key: Some(app_key.into()),
            app_secret: Some(app_secret.into()),
            master_secret: Some(master_secret.into()),
        }
    }

    /// Check if any of the three secrets is missing or empty.
    pub fn is_empty(&self) -> bool {
        [&self.app_key, &self.app_secret, &self.master_secret]
            .iter()
            .any(|value| value.as_deref().is_none_or(str::is_empty))
    }

    /// Get the basic auth pair (app key, master secret) when complete.
    pub(crate) fn basic_auth(&self) -> Option<(&str, &str)> {
        if self.is_empty() {
            return None;
        }
        Some((self.app_key.as_deref()?, self.master_secret.as_deref()?))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .field(
                "master_secret",
                &self.master_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Ordered mapping of app name to credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppGroup(IndexMap<String, Credentials>);

impl AppGroup {
    /// Create an empty app group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an app.
    pub fn with_app(mut self, name: impl Into<String>, credentials: Credentials) -> Self {
        self.0.insert(name.into(), credentials);
        self
    }

    /// Iterate apps in their configured order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Credentials)> {
        self.0.iter().map(|(name, creds)| (name.as_str(), creds))
    }

    /// Number of apps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the group has no apps.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Named app groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppGroups(IndexMap<String, AppGroup>);

impl AppGroups {
    /// Create an empty set of app groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group.
    pub fn with_group(mut self, name: impl Into<String>, group: AppGroup) -> Self {
        self.0.insert(name.into(), group);
        self
    }

    /// Get a group by name.
    pub fn get(&self, name: &str) -> Option<&AppGroup> {
        self.0.get(name)
    }

    /// Check if a group is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Registered group names, in configured order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no group is registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn default_platforms() -> Vec<Platform> {
    Platform::ALL.to_vec()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_parse_server_url() -> String {
    DEFAULT_PARSE_SERVER_URL.to_string()
}

fn default_parse_application() -> String {
    "live".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Urban Airship provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrbanAirshipConfig {
    /// App group used when a notification does not pick one.
    #[serde(alias = "default-app-group")]
    pub default_app_group: String,
    /// All registered app groups.
    #[serde(alias = "app-groups")]
    pub app_groups: AppGroups,
    /// Outbound proxy, either a URL or `host:port`.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Platforms targeted unless a notification overrides them.
    #[serde(default = "default_platforms", alias = "default-platforms")]
    pub default_platforms: Vec<Platform>,
    /// Vendor base URL.
    #[serde(default = "default_base_url", alias = "base-url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs", alias = "timeout-secs")]
    pub timeout_secs: u64,
    /// Transient failure retry policy.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl UrbanAirshipConfig {
    /// Create a configuration with defaults for everything but the groups.
    pub fn new(default_app_group: impl Into<String>, app_groups: AppGroups) -> Self {
        Self {
            default_app_group: default_app_group.into(),
            app_groups,
            proxy: None,
            default_platforms: default_platforms(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }

    /// Build a single-app configuration from `URBAN_AIRSHIP_*` variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Missing credentials are not an error here; the app is skipped at send
    /// time.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let credentials = Credentials {
            app_key: var("URBAN_AIRSHIP_APP_KEY"),
            app_secret: var("URBAN_AIRSHIP_APP_SECRET"),
            master_secret: var("URBAN_AIRSHIP_MASTER_SECRET"),
        };

        let groups = AppGroups::new().with_group(
            DEFAULT_APP_GROUP,
            AppGroup::new().with_app("app-1", credentials),
        );

        let mut config = Self::new(DEFAULT_APP_GROUP, groups);
        config.proxy = var("URBAN_AIRSHIP_PROXY");
        config.validate()?;
        Ok(config)
    }

    /// Set the outbound proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the default platforms.
    pub fn default_platforms(mut self, platforms: impl Into<Vec<Platform>>) -> Self {
        self.default_platforms = platforms.into();
        self
    }

    /// Set the vendor base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Proxy as a URL, adding an `http://` scheme to bare `host:port` values.
    pub(crate) fn proxy_url(&self) -> Option<String> {
        let proxy = self.proxy.as_deref().filter(|p| !p.trim().is_empty())?;
        if proxy.contains("://") {
            Some(proxy.to_string())
        } else {
            Some(format!("http://{}", proxy))
        }
    }
}

impl Validate for UrbanAirshipConfig {
    fn validate(&self) -> Result<()> {
        if self.default_app_group.is_empty() {
            return Err(PushError::Config("Missing default-app-group config".into()));
        }

        if self.app_groups.is_empty() {
            return Err(PushError::Config("Missing app-groups config".into()));
        }

        for name in self.app_groups.names() {
            if self.app_groups.get(name).is_some_and(AppGroup::is_empty) {
                return Err(PushError::Config(format!(
                    "app-group [{}] does not contain any apps",
                    name
                )));
            }
        }

        if !self.app_groups.contains(&self.default_app_group) {
            return Err(PushError::ApplicationNotFound(format!(
                "default-app-group [{}] was not found in list of app-groups",
                self.default_app_group
            )));
        }

        if self.default_platforms.is_empty() {
            return Err(PushError::Config("default_platforms cannot be empty".into()));
        }

        validate_url(&self.base_url, "base_url")?;

        if let Some(proxy) = self.proxy_url() {
            validate_url(&proxy, "proxy")?;
        }

        Ok(())
    }
}

/// Parse application credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct ParseApplication {
    /// Application id.
    pub app_id: String,
    /// REST API key.
    pub rest_key: String,
    /// Master key.
    #[serde(default)]
    pub master_key: Option<String>,
}

impl ParseApplication {
    /// Create application credentials without a master key.
    pub fn new(app_id: impl Into<String>, rest_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            rest_key: rest_key.into(),
            master_key: None,
        }
    }

    /// Set the master key.
    pub fn master_key(mut self, key: impl Into<String>) -> Self {
        self.master_key = Some(key.into());
        self
    }
}

impl fmt::Debug for ParseApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseApplication")
            .field("app_id", &self.app_id)
            .field("rest_key", &"<redacted>")
            .field("master_key", &self.master_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parse provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Application used when a notification does not pick one.
    #[serde(default = "default_parse_application", alias = "default-application")]
    pub default_application: String,
    /// Named applications, typically `live` and `development`.
    pub applications: IndexMap<String, ParseApplication>,
    /// REST API root.
    #[serde(default = "default_parse_server_url", alias = "server-url")]
    pub server_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs", alias = "timeout-secs")]
    pub timeout_secs: u64,
}

impl ParseConfig {
    /// Create a configuration with a single application.
    pub fn new(name: impl Into<String>, application: ParseApplication) -> Self {
        let name = name.into();
        let mut applications = IndexMap::new();
        applications.insert(name.clone(), application);
        Self {
            default_application: name,
            applications,
            server_url: default_parse_server_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Register another application.
    pub fn with_application(
        mut self,
        name: impl Into<String>,
        application: ParseApplication,
    ) -> Self {
        self.applications.insert(name.into(), application);
        self
    }

    /// Set the REST API root.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }
}

impl Validate for ParseConfig {
    fn validate(&self) -> Result<()> {
        if self.applications.is_empty() {
            return Err(PushError::Config("Missing Parse applications config".into()));
        }

        if !self.applications.contains_key(&self.default_application) {
            return Err(PushError::ApplicationNotFound(format!(
                "Parse application [{}] not found",
                self.default_application
            )));
        }

        for (name, app) in &self.applications {
            if app.app_id.is_empty() || app.rest_key.is_empty() {
                return Err(PushError::Config(format!(
                    "Parse application [{}] requires app_id and rest_key",
                    name
                )));
            }
        }

        validate_url(&self.server_url, "server_url")
    }
}

/// Top-level configuration selecting a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Provider name: `urban-airship` or `parse`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Urban Airship settings.
    #[serde(default, alias = "urban-airship")]
    pub urban_airship: Option<UrbanAirshipConfig>,
    /// Parse settings.
    #[serde(default)]
    pub parse: Option<ParseConfig>,
}

fn default_provider() -> String {
    "urban-airship".to_string()
}

impl PushConfig {
    /// Create an Urban Airship configuration.
    pub fn urban_airship(config: UrbanAirshipConfig) -> Self {
        Self {
            provider: default_provider(),
            urban_airship: Some(config),
            parse: None,
        }
    }

    /// Create a Parse configuration.
    pub fn parse(config: ParseConfig) -> Self {
        Self {
            provider: "parse".to_string(),
            urban_airship: None,
            parse: Some(config),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| PushError::Config(format!("JSON parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a `.toml` or `.json` file, picking the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PushError::Config("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;

        match ext.to_lowercase().as_str() {
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            other => Err(PushError::Config(format!("Unsupported format: {}", other))),
        }
    }
}

impl Validate for PushConfig {
    fn validate(&self) -> Result<()> {
        if let Some(ua) = &self.urban_airship {
            ua.validate()?;
        }
        if let Some(parse) = &self.parse {
            parse.validate()?;
        }
        Ok(())
    }
}

fn validate_url(value: &str, field: &str) -> Result<()> {
    let url = url::Url::parse(value)
        .map_err(|e| PushError::Config(format!("{} is not a valid URL: {}", field, e)))?;
    if url.host_str().is_none() {
        return Err(PushError::Config(format!("{} must contain a host", field)));
    }
    Ok(())
}
