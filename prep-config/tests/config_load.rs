use prep_config::{LlmProviderConfig, PrepConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
llm:
  provider: cohere
  api_key: "${COHERE_API_KEY}"
  model: "command-r-plus"
  temperature: 0.7
markets:
  api_key: "${FMP_API_KEY}"
wiki:
  timeout_secs: 10
  "#;
    let p = write_yaml(&tmp, "prep.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("COHERE_API_KEY", Some("co-key")),
            ("FMP_API_KEY", Some("fmp-key")),
        ],
        || {
            let config = PrepConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load prep config");

            let LlmProviderConfig::Cohere {
                api_key,
                model,
                temperature,
                endpoint,
            } = config.llm;
            assert_eq!(api_key, "co-key");
            assert_eq!(model, "command-r-plus");
            assert_eq!(temperature, Some(0.7));
            assert!(endpoint.contains("cohere.com"));

            assert_eq!(config.markets.api_key, "fmp-key");
            assert!(config.markets.endpoint.contains("financialmodelingprep"));
            assert_eq!(config.wiki.user_agent, "Mozilla/5.0");
        },
    );
}

#[test]
#[serial]
fn test_missing_optional_file_falls_back_to_inline_sources() {
    let config = PrepConfigLoader::new()
        .with_optional_file("does-not-exist.yaml")
        .with_yaml_str(
            r#"
llm:
  provider: cohere
  api_key: "inline"
markets:
  api_key: "inline"
"#,
        )
        .load()
        .expect("load without file");

    let LlmProviderConfig::Cohere { api_key, .. } = config.llm;
    assert_eq!(api_key, "inline");
}

#[test]
#[serial]
fn test_required_file_missing_is_an_error() {
    let result = PrepConfigLoader::new()
        .with_file("definitely-not-here.yaml")
        .load();

    assert!(result.is_err());
}
