#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// OTLP/gRPC collector, e.g. `http://localhost:4317`. Export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_file() -> String {
    "amr_data_entry.log".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            otlp_endpoint: None,
        }
    }
}
