use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Deserialize, Clone, PartialEq)]
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

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackendKind {
    Memory,
    Redis,
}

impl fmt::Display for RateLimitBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitBackendKind::Memory => write!(f, "memory"),
            RateLimitBackendKind::Redis => write!(f, "redis"),
        }
    }
}

/// Public-facing identity of the consultant, used in emails and SEO artifacts.
#[derive(Deserialize, Clone, Debug)]
pub struct BrandConfig {
    #[serde(default = "default_brand_name")]
    pub name: String,

    #[serde(default = "default_tagline")]
    pub tagline: String,

    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default = "default_accent_color")]
    pub accent_color: String,

    #[serde(default = "default_calendly_url")]
    pub calendly_url: String,

    #[serde(default = "default_brand_email")]
    pub email: String,

    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub from: Option<String>,

    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub allow_plaintext: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        SmtpConfig {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: None,
            timeout_secs: default_smtp_timeout(),
            allow_plaintext: false,
        }
    }
}

impl SmtpConfig {
    /// Host, username and password must all be present before a session is attempted.
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.is_empty()
    }

    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }

    pub fn sender(&self) -> &str {
        self.from
            .as_deref()
            .filter(|from| !from.trim().is_empty())
            .unwrap_or(&self.username)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ContactConfig {
    /// Operator address that receives lead notifications.
    #[serde(default)]
    pub recipient: String,

    #[serde(default = "default_min_elapsed_ms")]
    pub min_elapsed_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        ContactConfig {
            recipient: String::new(),
            min_elapsed_ms: default_min_elapsed_ms(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_backend")]
    pub backend: RateLimitBackendKind,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,

    #[serde(default)]
    pub redis_url: Option<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            backend: default_rate_limit_backend(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            purge_interval_secs: default_purge_interval(),
            redis_url: None,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
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

    #[serde(default = "default_true")]
    pub trust_forwarded_headers: bool,

    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default)]
    pub brand: BrandConfig,

    #[serde(default)]
    pub smtp: SmtpConfig,

    #[serde(default)]
    pub contact: ContactConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Consultancy-API".to_string()
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
fn default_true() -> bool {
    true
}
fn default_site_url() -> String {
    "https://robknowlton.com".to_string()
}
fn default_brand_name() -> String {
    "Rob Knowlton".to_string()
}
fn default_tagline() -> String {
    "I make your tech actually work.".to_string()
}
fn default_location() -> String {
    "Los Angeles, CA".to_string()
}
fn default_accent_color() -> String {
    "#00ff88".to_string()
}
fn default_calendly_url() -> String {
    "https://calendly.com/your-calendly-link".to_string()
}
fn default_brand_email() -> String {
    "rob@rknowlton.com".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_smtp_timeout() -> u64 {
    20
}
fn default_min_elapsed_ms() -> u64 {
    3000
}
fn default_rate_limit_backend() -> RateLimitBackendKind {
    RateLimitBackendKind::Memory
}
fn default_max_requests() -> u32 {
    3
}
fn default_window_secs() -> u64 {
    15 * 60
}
fn default_purge_interval() -> u64 {
    5 * 60
}

impl Default for BrandConfig {
    fn default() -> Self {
        BrandConfig {
            name: default_brand_name(),
            tagline: default_tagline(),
            location: default_location(),
            accent_color: default_accent_color(),
            calendly_url: default_calendly_url(),
            email: default_brand_email(),
            logo_path: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            trust_forwarded_headers: true,
            site_url: default_site_url(),
            brand: BrandConfig::default(),
            smtp: SmtpConfig::default(),
            contact: ContactConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
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
                    .separator("__")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Conventional flat variables fill whatever the layered sources left empty
        fill_from_env(&mut config.smtp.host, "SMTP_HOST");
        fill_from_env(&mut config.smtp.username, "SMTP_USER");
        fill_from_env(&mut config.smtp.password, "SMTP_PASS");
        fill_from_env(&mut config.contact.recipient, "CONTACT_EMAIL");
        if let Some(port) = env::var("SMTP_PORT").ok().and_then(|p| p.parse().ok()) {
            if env::var("APP_SMTP__PORT").is_err() {
                config.smtp.port = port;
            }
        }
        if let Ok(url) = env::var("SITE_URL") {
            if env::var("APP_SITE_URL").is_err() {
                config.site_url = url;
            }
        }
        if let Ok(url) = env::var("CALENDLY_URL") {
            if env::var("APP_BRAND__CALENDLY_URL").is_err() {
                config.brand.calendly_url = url;
            }
        }
        if config.rate_limit.redis_url.is_none() {
            config.rate_limit.redis_url = env::var("REDIS_URL").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !is_absolute_url(&self.site_url) {
            errors.push("SITE_URL must be an absolute URL".to_string());
        }
        if !is_absolute_url(&self.brand.calendly_url) {
            errors.push("BRAND.CALENDLY_URL must be an absolute URL".to_string());
        }
        if !is_hex_color(&self.brand.accent_color) {
            errors.push(format!(
                "BRAND.ACCENT_COLOR must be a #rrggbb colour, got {}",
                self.brand.accent_color
            ));
        }
        if self.worker_count == 0 {
            errors.push("WORKER_COUNT must be at least 1".to_string());
        }
        if self.rate_limit.max_requests == 0 {
            errors.push("RATE_LIMIT.MAX_REQUESTS must be at least 1".to_string());
        }
        if self.rate_limit.window_secs == 0 {
            errors.push("RATE_LIMIT.WINDOW_SECS must be at least 1".to_string());
        }
        if self.rate_limit.backend == RateLimitBackendKind::Redis
            && self.rate_limit.redis_url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            errors.push("RATE_LIMIT.REDIS_URL must be set for the redis backend".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    /// Operator address for lead notifications, falling back to the public brand address.
    pub fn notification_recipient(&self) -> &str {
        if self.contact.recipient.trim().is_empty() {
            &self.brand.email
        } else {
            &self.contact.recipient
        }
    }

    /// Site URL without a trailing slash, ready for path concatenation.
    pub fn site_base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

fn fill_from_env(current: &mut String, env_key: &str) {
    if current.trim().is_empty() {
        if let Ok(value) = env::var(env_key) {
            *current = value;
        }
    }
}

fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.has_host())
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
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
        if self.is_empty() {
            "[MISSING]"
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

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.redact())
            .field("from", &self.from)
            .field("timeout_secs", &self.timeout_secs)
            .field("allow_plaintext", &self.allow_plaintext)
            .finish()
    }
}

impl fmt::Debug for RateLimitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitConfig")
            .field("backend", &self.backend)
            .field("max_requests", &self.max_requests)
            .field("window_secs", &self.window_secs)
            .field("purge_interval_secs", &self.purge_interval_secs)
            .field("redis_url", &self.redis_url.as_deref().map(|u| u.redact()))
            .finish()
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
            .field("trust_forwarded_headers", &self.trust_forwarded_headers)
            .field("site_url", &self.site_url)
            .field("brand", &self.brand)
            .field("smtp", &self.smtp)
            .field("contact", &self.contact)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}
