use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print `value` in the machine formats, or the `human` rendering.
    pub fn emit<T, F>(self, value: &T, human: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce() -> String,
    {
        let rendered = match self {
            OutputFormat::Human => human(),
            OutputFormat::Json => {
                serde_json::to_string_pretty(value).context("Failed to encode JSON output")?
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(value).context("Failed to encode YAML output")?
            }
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}
