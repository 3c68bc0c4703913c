use std::sync::OnceLock;

use prep_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "prep-tests",
            emit_stderr: true,
            format: if std::env::var("PREP_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug",
            ..LogConfig::default()
        };

        prep_common::observability::init_logging(config).unwrap_or_default()
    });
}
