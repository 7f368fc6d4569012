use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use error_stack::{report, ResultExt};
use serde::de::IntoDeserializer;
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};
use thiserror::Error;

use super::{
    service_account_config::ServiceAccountConfig, sheets_config::SheetsConfig,
    telemetry_config::TelemetryConfig,
};

pub const DEFAULT_CONFIG_PATH: &str = "Config";

#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sheets: SheetsConfig,
    /// Absent credentials are reported when a connection is attempted.
    #[serde(default)]
    pub gcp_service_account: Option<ServiceAccountConfig>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config from '{0}'")]
    Read(String),
    #[error("Failed to deserialize config from '{origin}' at field '{path}'")]
    Deserialize { origin: String, path: String },
}

impl AppConfig {
    /// Loads `path` (any extension the `config` crate knows) and then applies
    /// `AMR_<SECTION>__<KEY>` environment overrides.
    pub fn load(path: &str) -> error_stack::Result<AppConfig, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("AMR")
                    .prefix_separator("_")
                    .separator("__"),
            );
        Self::from_builder(builder, path)
    }

    pub fn from_toml_str(contents: &str) -> error_stack::Result<AppConfig, ConfigError> {
        let builder = Config::builder().add_source(File::from_str(contents, FileFormat::Toml));
        Self::from_builder(builder, "<inline>")
    }

    fn from_builder(
        builder: ConfigBuilder<config::builder::DefaultState>,
        origin: &str,
    ) -> error_stack::Result<AppConfig, ConfigError> {
        let value = builder
            .build()
            .change_context_lazy(|| ConfigError::Read(origin.to_string()))?
            .try_deserialize::<serde_json::Value>()
            .change_context_lazy(|| ConfigError::Read(origin.to_string()))?;

        let mut track = Track::new();
        let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
        AppConfig::deserialize(path_de).map_err(|error| {
            let path = track
                .path()
                .iter()
                .map(|seg| match seg {
                    Segment::Seq { index } => format!("[{}]", index),
                    Segment::Map { key } => format!(".{}", key),
                    Segment::Enum { variant } => format!("::{}", variant),
                    Segment::Unknown => String::from("<?>"),
                })
                .collect::<String>();

            report!(ConfigError::Deserialize {
                origin: origin.to_string(),
                path: path.trim_start_matches('.').to_string(),
            })
            .attach_printable(error.to_string())
        })
    }
}
