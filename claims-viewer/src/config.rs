use anyhow::Context as _;
use claims_core::{ClaimSchema, ClaimsPage, HttpClaimSource, RefreshPolicy};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub api_url: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub refresh_policy: RefreshPolicy,
    pub schema_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh_policy: RefreshPolicy::None,
            schema_path: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(api_url) = lookup("CLAIMS_API_URL") {
            config.api_url = api_url;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port}"))?;
        }
        if let Some(secs) = lookup("CLAIMS_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().with_context(|| {
                format!("CLAIMS_REQUEST_TIMEOUT_SECS must be whole seconds, got {secs}")
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(policy) = lookup("CLAIMS_REFRESH_POLICY") {
            config.refresh_policy = policy.parse()?;
        }
        config.schema_path = lookup("CLAIMS_SCHEMA_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    pub fn load_schema(&self) -> anyhow::Result<ClaimSchema> {
        load_schema(self.schema_path.as_deref())
    }

    /// Page backed by the HTTP claims backend
    pub fn build_page(&self) -> anyhow::Result<ClaimsPage> {
        let source = HttpClaimSource::new(&self.api_url, Some(self.request_timeout))?;
        info!(
            api_url = %source.base_url(),
            refresh_policy = ?self.refresh_policy,
            "claims backend configured"
        );
        Ok(ClaimsPage::new(Arc::new(source), self.load_schema()?)
            .with_refresh_policy(self.refresh_policy))
    }
}

/// Schema from a JSON file, or the built-in one when no path is given
pub fn load_schema(path: Option<&std::path::Path>) -> anyhow::Result<ClaimSchema> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read schema {}", path.display()))?;
            Ok(ClaimSchema::from_json_str(&raw)?)
        }
        None => Ok(ClaimSchema::default()),
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
    fn test_defaults() {
        let config = ViewerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.api_url, "http://localhost:5000");
    }

    #[test]
    fn test_overrides() {
        let config = ViewerConfig::from_lookup(lookup(&[
            ("CLAIMS_API_URL", "http://claims:8080/api"),
            ("PORT", "8000"),
            ("CLAIMS_REQUEST_TIMEOUT_SECS", "5"),
            ("CLAIMS_REFRESH_POLICY", "reload-list"),
            ("CLAIMS_SCHEMA_PATH", "/etc/claims/schema.json"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://claims:8080/api");
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.refresh_policy, RefreshPolicy::ReloadList);
        assert_eq!(
            config.schema_path,
            Some(PathBuf::from("/etc/claims/schema.json"))
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ViewerConfig::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(ViewerConfig::from_lookup(lookup(&[("CLAIMS_REFRESH_POLICY", "often")])).is_err());
    }

    #[test]
    fn test_missing_schema_file_fails() {
        let config = ViewerConfig {
            schema_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..ViewerConfig::default()
        };
        assert!(config.load_schema().is_err());
        assert_eq!(load_schema(None).unwrap(), ClaimSchema::default());
    }
}
