use enotes_ceramic::{DEFAULT_CERAMIC_URL, DEFAULT_REQUEST_TIMEOUT};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_PATH: &str = "./src/config.json";
pub const DEFAULT_SEED_ENV: &str = "SEED";
pub const DEFAULT_DEFINITION_NAME: &str = "encrypted-notes";
pub const DEFAULT_DEFINITION_DESCRIPTION: &str = "Encrypted text notes";

/// Settings for a bootstrap run.
///
/// Every field has a default, so an empty TOML file (or no file at all) is
/// a valid configuration. Command-line flags are applied on top by `main`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the Ceramic node.
    pub ceramic_url: String,

    /// Where the config record is written.
    pub output_path: PathBuf,

    /// Name of the environment variable holding the hex seed.
    pub seed_env: String,

    /// Per-request timeout for every network call.
    pub request_timeout_secs: u64,

    /// Optional log filter (e.g., "info", "enotes_bootstrap=debug").
    pub log_level: Option<String>,

    pub definition: DefinitionSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefinitionSettings {
    pub name: String,
    pub description: String,
    /// Commit URL of a schema the definition document itself must conform to.
    pub schema: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ceramic_url: DEFAULT_CERAMIC_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            seed_env: DEFAULT_SEED_ENV.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            log_level: None,
            definition: DefinitionSettings::default(),
        }
    }
}

impl Default for DefinitionSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_DEFINITION_NAME.to_string(),
            description: DEFAULT_DEFINITION_DESCRIPTION.to_string(),
            schema: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
