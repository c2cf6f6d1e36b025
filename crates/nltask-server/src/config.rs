use crate::cli::Cli;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use nltask_core::extraction::ExtractionConfig;
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_FILE: &str = "nltask.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Listen address for the HTTP API
    #[serde(default = "default_bind")]
    pub bind: String,
    /// JSON file holding the tasks
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// IANA timezone; the system timezone when unset
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data").join("tasks.json")
}

impl Config {
    /// Layered configuration: config file, then `NLTASK_` variables, then the
    /// conventional OpenRouter variables, then command-line flags.
    pub fn new(cli: &Cli) -> Result<Self, figment::Error> {
        Self::figment(cli).extract()
    }

    fn figment(cli: &Cli) -> Figment {
        let config_file = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        Figment::new()
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("NLTASK_").split("__"))
            .merge(
                Env::raw()
                    .only(&["OPENROUTER_API_KEY", "OPENROUTER_BASE_URL"])
                    .map(|key| {
                        if key.as_str().eq_ignore_ascii_case("OPENROUTER_API_KEY") {
                            "extraction.api_key".into()
                        } else {
                            "extraction.base_url".into()
                        }
                    }),
            )
            .merge(Serialized::defaults(cli.overrides()))
    }
}
