use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    pub dataverse: DataverseSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataverseSettings {
    /// Installation root, e.g. `https://entrepot.recherche.data.gouv.fr`
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: default_directory(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Turtle,
    NTriples,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Turtle => "ttl",
            OutputFormat::NTriples => "nt",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Turtle => "turtle",
            OutputFormat::NTriples => "n-triples",
            OutputFormat::Json => "json",
        })
    }
}

fn default_timeout() -> u64 { 60 }
fn default_directory() -> String { "output".to_string() }

impl Configuration {
    /// Load configuration from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Configuration name is empty");
        }

        let base_url = url::Url::parse(&self.dataverse.base_url)
            .with_context(|| format!("Invalid Dataverse base URL: {}", self.dataverse.base_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("Dataverse base URL must use http or https: {}", base_url);
        }

        if self.dataverse.timeout == 0 {
            anyhow::bail!("Dataverse timeout must be greater than zero");
        }

        if self.output.directory.trim().is_empty() {
            anyhow::bail!("No output directory defined");
        }

        Ok(())
    }

    /// Create an example configuration
    pub fn example() -> Self {
        Configuration {
            name: "Recherche Data Gouv".to_string(),
            dataverse: DataverseSettings {
                base_url: "https://entrepot.recherche.data.gouv.fr".to_string(),
                timeout: default_timeout(),
                accept_invalid_certs: false,
            },
            output: OutputSettings {
                format: OutputFormat::Turtle,
                directory: default_directory(),
            },
        }
    }
}
