//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Precedence: `PREP_`-prefixed environment variables win over the file.
//! String values may reference environment variables as `${VAR}`; expansion
//! is recursive with a depth cap so cyclic definitions terminate.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct PrepConfig {
    pub llm: LlmProviderConfig,
    pub markets: MarketsConfig,
    #[serde(default)]
    pub wiki: WikiConfig,
}

/// The tag is `provider`; one variant per supported chat backend.
#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmProviderConfig {
    Cohere {
        api_key: String,
        #[serde(default = "default_cohere_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default = "default_cohere_endpoint")]
        endpoint: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct MarketsConfig {
    pub api_key: String,
    #[serde(default = "default_markets_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct WikiConfig {
    #[serde(default = "default_wiki_base")]
    pub base_url: String,
    #[serde(default = "default_wiki_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_wiki_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_wiki_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            base_url: default_wiki_base(),
            user_agent: default_wiki_user_agent(),
            accept_language: default_wiki_accept_language(),
            timeout_secs: default_wiki_timeout_secs(),
        }
    }
}

fn default_cohere_model() -> String {
    "command-r-plus".into()
}
fn default_cohere_endpoint() -> String {
    "https://api.cohere.com/v2/".into()
}
fn default_markets_endpoint() -> String {
    "https://financialmodelingprep.com/api/v3/".into()
}
fn default_wiki_base() -> String {
    "https://en.wikipedia.org/wiki/".into()
}
fn default_wiki_user_agent() -> String {
    "Mozilla/5.0".into()
}
fn default_wiki_accept_language() -> String {
    "en-US,en;q=0.9".into()
}
fn default_wiki_timeout_secs() -> u64 {
    10
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct PrepConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PrepConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PrepConfigLoader {
    /// Start with sensible defaults: `PREP_` env overrides, `__` separator.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("PREP").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so env-only deployments work.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use prep_config::{LlmProviderConfig, PrepConfigLoader};
    ///
    /// let cfg = PrepConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: "cohere"
    ///   api_key: "example"
    /// markets:
    ///   api_key: "example"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// let LlmProviderConfig::Cohere { model, .. } = cfg.llm;
    /// assert_eq!(model, "command-r-plus");
    /// assert_eq!(cfg.wiki.timeout_secs, 10);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// Sources are merged first, `${VAR}` placeholders expanded, and only
    /// then materialised into the strongly typed config.
    pub fn load(self) -> Result<PrepConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PrepConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
