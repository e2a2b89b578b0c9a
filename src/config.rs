// Configuration, read from the environment (and a .env file when present):
// - server listening address/port
// - store API base URL, token, timeout, retries and rate limit
// - admin deep link and tracking URL templates
// - cache settings (size, TTL)
// - basic-auth users (USUARIO_n / SENHA_n)

use dotenv::dotenv;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://loja.mueller.ind.br/rest/V1";
pub const DEFAULT_ADMIN_URL_TEMPLATE: &str =
    "https://loja.mueller.ind.br/admin/sales/order/view/order_id/{entity_id}/";
pub const DEFAULT_TRACKING_URL_TEMPLATE: &str =
    "https://rastreamento.correios.com.br/app/index.php?objetos={code}";

/// Username → password allow-list for the basic-auth gate.
#[derive(Clone, Default)]
pub struct Credentials {
    users: HashMap<String, String>,
}

impl Credentials {
    pub fn new<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: pairs
                .into_iter()
                .map(|(user, pass)| (user.into(), pass.into()))
                .collect(),
        }
    }

    /// Read `USUARIO_1`/`SENHA_1`, `USUARIO_2`/`SENHA_2`, ... until the first gap.
    pub fn from_env() -> Self {
        let mut users = HashMap::new();
        for n in 1.. {
            let (Ok(user), Ok(pass)) = (env::var(format!("USUARIO_{}", n)), env::var(format!("SENHA_{}", n))) else {
                break;
            };
            if !user.is_empty() {
                users.insert(user, pass);
            }
        }
        Self { users }
    }

    pub fn verify(&self, user: &str, password: &str) -> bool {
        self.users.get(user).is_some_and(|expected| expected == password)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// Passwords stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.users.keys().collect();
        names.sort();
        f.debug_struct("Credentials").field("users", &names).finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub upstream_base_url: String,
    pub upstream_token: String,
    pub upstream_timeout_secs: u64,
    pub upstream_max_retries: usize,
    pub upstream_rate_limit: Option<u32>,
    pub admin_url_template: String,
    pub tracking_url_template: Option<String>,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub order_lookback_months: u32,
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_token: String::new(),
            upstream_timeout_secs: 30,
            upstream_max_retries: 2,
            upstream_rate_limit: None,
            admin_url_template: DEFAULT_ADMIN_URL_TEMPLATE.to_string(),
            tracking_url_template: Some(DEFAULT_TRACKING_URL_TEMPLATE.to_string()),
            cache_ttl: Duration::from_secs(300),
            cache_max_capacity: 1000,
            order_lookback_months: 6,
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.server_port);
        let upstream_base_url =
            env::var("UPSTREAM_BASE_URL").unwrap_or(defaults.upstream_base_url);
        let upstream_token = env::var("UPSTREAM_TOKEN")
            .or_else(|_| env::var("MUELLER_TOKEN"))
            .unwrap_or_default();
        let upstream_timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .map(|v| v.parse().unwrap_or(defaults.upstream_timeout_secs))
            .unwrap_or(defaults.upstream_timeout_secs);
        let upstream_max_retries = env::var("UPSTREAM_MAX_RETRIES")
            .map(|v| v.parse().unwrap_or(defaults.upstream_max_retries))
            .unwrap_or(defaults.upstream_max_retries);
        let upstream_rate_limit = env::var("UPSTREAM_RATE_LIMIT")
            .map(|v| v.parse().ok())
            .unwrap_or(None);
        let admin_url_template =
            env::var("ADMIN_URL_TEMPLATE").unwrap_or(defaults.admin_url_template);
        // An empty TRACKING_URL_TEMPLATE disables tracking links.
        let tracking_url_template = match env::var("TRACKING_URL_TEMPLATE") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(v),
            Err(_) => defaults.tracking_url_template,
        };
        let cache_ttl = env::var("CACHE_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_max_capacity = env::var("CACHE_MAX_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_max_capacity);
        let order_lookback_months = env::var("ORDER_LOOKBACK_MONTHS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.order_lookback_months);

        Self {
            server_host,
            server_port,
            upstream_base_url,
            upstream_token,
            upstream_timeout_secs,
            upstream_max_retries,
            upstream_rate_limit,
            admin_url_template,
            tracking_url_template,
            cache_ttl,
            cache_max_capacity,
            order_lookback_months,
            credentials: Credentials::from_env(),
        }
    }
}

// The token stays out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_token_set", &!self.upstream_token.is_empty())
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("upstream_max_retries", &self.upstream_max_retries)
            .field("upstream_rate_limit", &self.upstream_rate_limit)
            .field("admin_url_template", &self.admin_url_template)
            .field("tracking_url_template", &self.tracking_url_template)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_max_capacity", &self.cache_max_capacity)
            .field("order_lookback_months", &self.order_lookback_months)
            .field("credentials", &self.credentials)
            .finish()
    }
}
