//! Configuration for the page inbox export
//!
//! Defaults are compiled in; an optional config.yml can override them and
//! CLI flags override both.

use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

use crate::export::transcript::Locale;
use crate::graph::GRAPH_API_URL;
use crate::{Error, Result};

/// Obtained from https://www.facebook.com/pg/ZhennovateUWC/about/.
pub const FACEBOOK_PAGE_ID: &str = "366767477271199";
pub const OUTPUT_DIRECTORY: &str = "Conversations";
pub const LOCALE: &str = "en-US";
/// Mountain Time
pub const TIME_ZONE: &str = "America/Denver";
/// Maximum number of elements to request per Graph API call; Facebook may send fewer.
pub const LIMIT: u32 = 99999;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const CONFIG_FILE: &str = "config.yml";

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    export: Option<YamlExport>,
}

#[derive(Debug, Default, Deserialize)]
struct YamlExport {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    page_id: Option<String>,
    output_dir: Option<String>,
    api_url: Option<String>,
    locale: Option<String>,
    time_zone: Option<String>,
    limit: Option<u32>,
    concurrency: Option<usize>,
}

/// Page ids are long numbers; accept them quoted or bare.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Everything an export run needs besides the access token.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub page_id: String,
    pub output_dir: PathBuf,
    pub api_url: String,
    pub locale: Locale,
    pub time_zone: Tz,
    pub limit: u32,
    pub concurrency: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_id: FACEBOOK_PAGE_ID.to_string(),
            output_dir: PathBuf::from(OUTPUT_DIRECTORY),
            api_url: GRAPH_API_URL.to_string(),
            locale: Locale::EnUs,
            time_zone: chrono_tz::America::Denver,
            limit: LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ExportConfig {
    /// Load `path` if it exists, otherwise return defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let yaml: YamlConfig = serde_yaml::from_str(content).map_err(|e| {
            Error::InvalidArgument(format!("failed to parse config file: {}", e))
        })?;
        let export = yaml.export.unwrap_or_default();

        let mut config = Self::default();
        if let Some(page_id) = resolve_env(export.page_id) {
            config.page_id = page_id;
        }
        if let Some(dir) = resolve_env(export.output_dir) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(url) = resolve_env(export.api_url) {
            config.api_url = url;
        }
        if let Some(locale) = resolve_env(export.locale) {
            config.locale = Locale::parse(&locale)?;
        }
        if let Some(tz) = resolve_env(export.time_zone) {
            config.time_zone = parse_time_zone(&tz)?;
        }
        if let Some(limit) = export.limit {
            config.limit = limit;
        }
        if let Some(concurrency) = export.concurrency {
            config.concurrency = concurrency;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the exporter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.page_id.trim().is_empty() {
            return Err(Error::InvalidArgument("page id is empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::InvalidArgument(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(Error::InvalidArgument("limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Public page URL, used in operator guidance.
    pub fn page_url(&self) -> String {
        format!("https://www.facebook.com/{}", self.page_id)
    }
}

pub fn parse_time_zone(raw: &str) -> Result<Tz> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| Error::InvalidArgument(format!("unknown time zone '{}'", raw)))
}

/// `${VAR}` values are read from the environment; empty values count as unset.
fn resolve_env(value: Option<String>) -> Option<String> {
    let value = value?;
    let resolved = match value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(var_name) => std::env::var(var_name).ok()?,
        None => value,
    };
    Some(resolved).filter(|v| !v.trim().is_empty())
}
