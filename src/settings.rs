use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};

pub const PLACEHOLDER_BACKEND_URL: &str = "https://placeholder.supabase.co";
pub const PLACEHOLDER_ANON_KEY: &str = "placeholder-key";

const MIN_ANON_KEY_LEN: usize = 20;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub backend_url: String,

    #[serde(default)]
    pub backend_anon_key: String,

    #[serde(default = "default_bucket")]
    pub storage_bucket: String,

    #[serde(default)]
    pub allow_demo_login: bool,

    #[serde(default = "default_demo_email")]
    pub demo_admin_email: String,

    #[serde(default = "default_demo_password")]
    pub demo_admin_password: String,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_project_list_timeout")]
    pub project_list_timeout_secs: u64,

    #[serde(default = "default_window_days")]
    pub analytics_window_days: i64,

    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_bucket() -> String {
    "documents".to_string()
}
fn default_demo_email() -> String {
    "admin@example.com".to_string()
}
fn default_demo_password() -> String {
    "password123".to_string()
}
fn default_cache_ttl() -> u64 {
    5 * 60
}
fn default_project_list_timeout() -> u64 {
    10
}
fn default_window_days() -> i64 {
    30
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            backend_url: PLACEHOLDER_BACKEND_URL.to_string(),
            backend_anon_key: PLACEHOLDER_ANON_KEY.to_string(),
            storage_bucket: default_bucket(),
            allow_demo_login: false,
            demo_admin_email: default_demo_email(),
            demo_admin_password: default_demo_password(),
            cache_ttl_secs: default_cache_ttl(),
            project_list_timeout_secs: default_project_list_timeout(),
            analytics_window_days: default_window_days(),
            dark_mode: false,
            cors_allowed_origins: default_cors_origins(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `config/` files and `APP_*` variables.
    ///
    /// Missing backend credentials are not fatal: the placeholder backend is
    /// used and [`AppConfig::config_warning`] reports the problem.
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.env = env_name;

        if config.backend_url.trim().is_empty() {
            config.backend_url = PLACEHOLDER_BACKEND_URL.to_string();
        }
        if config.backend_anon_key.trim().is_empty() {
            config.backend_anon_key = PLACEHOLDER_ANON_KEY.to_string();
        }

        config.validate()?;

        if let Some(warning) = config.config_warning() {
            tracing::warn!("{}", warning);
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if url::Url::parse(&self.backend_url).is_err() {
            errors.push("BACKEND_URL must be an absolute URL");
        }
        if self.project_list_timeout_secs == 0 {
            errors.push("PROJECT_LIST_TIMEOUT_SECS must be positive");
        }
        if self.analytics_window_days <= 0 {
            errors.push("ANALYTICS_WINDOW_DAYS must be positive");
        }
        if self.is_production() && self.allow_demo_login {
            errors.push("Demo login is not allowed in production");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    /// True when both backend credentials look real.
    pub fn is_backend_configured(&self) -> bool {
        let url_ok = url::Url::parse(&self.backend_url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
            && self.backend_url != PLACEHOLDER_BACKEND_URL;

        url_ok
            && self.backend_anon_key != PLACEHOLDER_ANON_KEY
            && self.backend_anon_key.len() > MIN_ANON_KEY_LEN
    }

    pub fn config_warning(&self) -> Option<String> {
        if self.is_backend_configured() {
            return None;
        }
        Some(
            "Backend appears to be unconfigured. Please set APP_BACKEND_URL and \
             APP_BACKEND_ANON_KEY in your environment."
                .to_string(),
        )
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn project_list_timeout(&self) -> Duration {
        Duration::from_secs(self.project_list_timeout_secs)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() || self == PLACEHOLDER_ANON_KEY {
            "[MISSING]"
        } else if self.len() <= MIN_ANON_KEY_LEN {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("backend_url", &self.backend_url)
            .field("backend_anon_key", &self.backend_anon_key.redact())
            .field("storage_bucket", &self.storage_bucket)
            .field("allow_demo_login", &self.allow_demo_login)
            .field("demo_admin_email", &self.demo_admin_email)
            .field("demo_admin_password", &self.demo_admin_password.redact())
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("project_list_timeout_secs", &self.project_list_timeout_secs)
            .field("analytics_window_days", &self.analytics_window_days)
            .field("dark_mode", &self.dark_mode)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}
