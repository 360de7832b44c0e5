use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::PortalId;
use crate::scrapers::types::{JustJoinItConfig, NoFluffJobsConfig};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "JOB_TRACKER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Retry and transport settings shared by every portal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Extra attempts after a connection-level failure
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Sleep before retry n is `backoff_factor_ms * n`
    #[serde(default = "default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            backoff_factor_ms: default_backoff_factor_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Whole application configuration, as read from `config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    /// Portals scraped on each run, in order
    #[serde(default = "default_enabled_portals")]
    pub enabled_portals: Vec<PortalId>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub nfj: Option<NoFluffJobsConfig>,
    #[serde(default)]
    pub jji: Option<JustJoinItConfig>,
}

impl AppConfig {
    /// Resolve the config path from the environment, falling back to `config.yaml`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Read and validate the config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for portal in &self.enabled_portals {
            let missing = match portal {
                PortalId::NoFluffJobs => self.nfj.is_none(),
                PortalId::JustJoinIt => self.jji.is_none(),
                PortalId::BullDogJob | PortalId::SolidJobs => false,
            };
            if missing {
                bail!("Portal '{}' is enabled but has no '{}' section", portal, portal);
            }
        }
        Ok(())
    }
}

fn default_retries() -> u32 {
    5
}

fn default_backoff_factor_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_output_file() -> PathBuf {
    PathBuf::from("offers/job_offers.yaml")
}

fn default_enabled_portals() -> Vec<PortalId> {
    vec![PortalId::JustJoinIt, PortalId::NoFluffJobs]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::types::SalaryThreshold;

    const SAMPLE: &str = r#"
enabled_portals: [jji, nfj]
nfj:
  data_sources:
    - label: DevOps
      url: https://nofluffjobs.com/pl/devops?page=
jji:
  data_sources:
    - label: DevOps + AWS
      url: https://justjoin.it/all/all/mid/20k?q=DevOps@category;AWS@skill
      filters:
        categories: [devops]
        skills: [AWS]
        employment_type: b2b
        disclosed_salary: true
        experience_level: mid
        min_salary: 20k
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = AppConfig::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(config.output_file, PathBuf::from("offers/job_offers.yaml"));
        assert_eq!(config.http.retries, 5);
        assert_eq!(config.http.backoff_factor_ms, 1000);

        let nfj = config.nfj.unwrap();
        assert_eq!(nfj.base_url, "https://nofluffjobs.com/");
        assert_eq!(nfj.request_delay_ms, 200);
        assert_eq!(nfj.max_pages, None);
        assert_eq!(nfj.data_sources[0].label, "DevOps");

        let jji = config.jji.unwrap();
        let filters = &jji.data_sources[0].filters;
        assert_eq!(filters.skills, vec!["AWS"]);
        assert_eq!(filters.employment_type.as_deref(), Some("b2b"));
        assert_eq!(filters.min_salary, Some(SalaryThreshold(20_000)));
    }

    #[test]
    fn test_unknown_portal_is_rejected() {
        let err = AppConfig::from_yaml_str("enabled_portals: [nfj, monster]\n").unwrap_err();
        let unknown = err
            .chain()
            .any(|cause| cause.to_string().contains("Unknown job portal: monster"));
        assert!(unknown, "unexpected error: {err:#}");
    }

    #[test]
    fn test_enabled_portal_without_section_fails() {
        let err = AppConfig::from_yaml_str("enabled_portals: [nfj]\n").unwrap_err();
        assert!(format!("{err:#}").contains("no 'nfj' section"));
    }

    #[test]
    fn test_source_without_url_fails() {
        let yaml = "enabled_portals: [nfj]\nnfj:\n  data_sources:\n    - label: Rust\n";
        assert!(AppConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_stub_portals_need_no_section() {
        let config = AppConfig::from_yaml_str("enabled_portals: [bdj, sj]\n").unwrap();
        assert_eq!(
            config.enabled_portals,
            vec![PortalId::BullDogJob, PortalId::SolidJobs]
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::load("/definitely/not/here/config.yaml").is_err());
    }
}
