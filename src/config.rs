use std::env;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Upstream proxy read from `PROXY_*` variables
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// `None` unless both host and port are set
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Some(Self {
            host: non_empty("PROXY_HOST")?,
            port: non_empty("PROXY_PORT")?,
            username: non_empty("PROXY_USERNAME"),
            password: non_empty("PROXY_PASSWORD"),
        })
    }

    pub fn server(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

/// Options used when launching Chrome
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_size: (u32, u32),
    pub proxy: Option<ProxyConfig>,
    pub user_agent: Option<String>,
    /// Extra request headers sent with every navigation
    pub extra_headers: Vec<(String, String)>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: (1920, 1080),
            proxy: None,
            user_agent: None,
            extra_headers: Vec::new(),
        }
    }
}

/// Credentials and model name for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY"))?;
        let model = non_empty("GEMINI_MODEL")
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Some(Self { api_key, model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_proxy_requires_host_and_port() {
        assert!(ProxyConfig::from_lookup(lookup(&[("PROXY_HOST", "p.example")])).is_none());

        let proxy = ProxyConfig::from_lookup(lookup(&[
            ("PROXY_HOST", "p.example"),
            ("PROXY_PORT", "8080"),
            ("PROXY_USERNAME", "user"),
            ("PROXY_PASSWORD", ""),
        ]))
        .expect("proxy configured");
        assert_eq!(proxy.server(), "http://p.example:8080");
        assert_eq!(proxy.username.as_deref(), Some("user"));
        assert!(proxy.password.is_none());
        assert!(proxy.has_credentials());
    }

    #[test]
    fn test_gemini_key_fallback_and_default_model() {
        let cfg = GeminiConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "k")])).expect("key");
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.model, DEFAULT_GEMINI_MODEL);
        assert!(GeminiConfig::from_lookup(lookup(&[])).is_none());
    }

    #[test]
    fn test_blank_gemini_key_falls_back() {
        let cfg = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "  "),
            ("GOOGLE_API_KEY", "g-key"),
            ("GEMINI_MODEL", ""),
        ]))
        .expect("fallback key");
        assert_eq!(cfg.api_key, "g-key");
        assert_eq!(cfg.model, DEFAULT_GEMINI_MODEL);
    }
}
