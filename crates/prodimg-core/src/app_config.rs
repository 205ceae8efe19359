use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Knobs for the resolution pipeline.
///
/// `max_candidates` and `name_threshold` have no documented derivation; they are
/// exposed so operators can tune them per target site.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// HTML results endpoint of the search engine; the query goes in `q`.
    pub search_url: String,
    pub user_agent: String,
    /// Applied to every outbound request (search and candidate pages).
    pub request_timeout_secs: u64,
    pub max_candidates: usize,
    /// Minimum title similarity in `[0, 1]` for the name strategy.
    pub name_threshold: f64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            search_url: "https://html.duckduckgo.com/html/".to_string(),
            user_agent: "prodimg/0.1 (product-image-resolver)".to_string(),
            request_timeout_secs: 10,
            max_candidates: 8,
            name_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Site used when a request omits `site`.
    pub default_site: String,
    pub cache_max_age_secs: u64,
    pub resolver: ResolverSettings,
}
