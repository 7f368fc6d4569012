#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    /// Title of the spreadsheet records are appended to.
    #[serde(default = "default_store_name")]
    pub store_name: String,
    /// `RAW` stores values as typed, `USER_ENTERED` lets Sheets parse them.
    #[serde(default = "default_value_input_option")]
    pub value_input_option: String,
}

fn default_store_name() -> String {
    "AMR_Data".to_string()
}

fn default_value_input_option() -> String {
    "RAW".to_string()
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            store_name: default_store_name(),
            value_input_option: default_value_input_option(),
        }
    }
}
