use std::fs;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::app::CreateRequest;
use crate::diagnostics::DiagnosticSink;
use crate::domain::{BrowserMode, DEFAULT_HUB_EMAIL, Hub, HubLayout};
use crate::error::HubError;

pub const DEFAULT_CONFIG_FILE: &str = "trackhub.json";

/// Settings for `create`, from `trackhub.json` and/or the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub hub_name: Option<String>,
    #[serde(default)]
    pub genome: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub bigwig: Vec<String>,
    #[serde(default)]
    pub bigbed: Vec<String>,
    #[serde(default)]
    pub sample_sheet: Option<String>,
    #[serde(default)]
    pub sample_regex: Option<String>,
    #[serde(default)]
    pub annotation_regex: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub hub_url: Option<String>,
    #[serde(default)]
    pub hub_description: Option<String>,
    #[serde(default)]
    pub mode: Option<BrowserMode>,
    #[serde(default)]
    pub layout: Option<HubLayout>,
}

impl Config {
    /// Values set in `other` win; pattern lists are replaced, not appended.
    pub fn overlay(self, other: Config) -> Config {
        Config {
            schema_version: other.schema_version.or(self.schema_version),
            hub_name: other.hub_name.or(self.hub_name),
            genome: other.genome.or(self.genome),
            output_dir: other.output_dir.or(self.output_dir),
            bigwig: if other.bigwig.is_empty() {
                self.bigwig
            } else {
                other.bigwig
            },
            bigbed: if other.bigbed.is_empty() {
                self.bigbed
            } else {
                other.bigbed
            },
            sample_sheet: other.sample_sheet.or(self.sample_sheet),
            sample_regex: other.sample_regex.or(self.sample_regex),
            annotation_regex: other.annotation_regex.or(self.annotation_regex),
            email: other.email.or(self.email),
            hub_url: other.hub_url.or(self.hub_url),
            hub_description: other.hub_description.or(self.hub_description),
            mode: other.mode.or(self.mode),
            layout: other.layout.or(self.layout),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub hub_name: String,
    pub genome: String,
    pub output_dir: Utf8PathBuf,
    pub bigwig: Vec<String>,
    pub bigbed: Vec<String>,
    pub sample_sheet: Option<PathBuf>,
    pub sample_regex: Option<String>,
    pub annotation_regex: Option<String>,
    pub email: String,
    pub hub_url: Option<String>,
    pub hub_description: Option<PathBuf>,
    pub mode: BrowserMode,
    pub layout: HubLayout,
}

impl ResolvedConfig {
    /// Reads the description file, if any, and builds the pipeline request.
    pub fn into_request(self, sink: &dyn DiagnosticSink) -> CreateRequest {
        let description = self.hub_description.as_deref().and_then(|path| {
            match fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(err) => {
                    sink.warn(format!(
                        "Ignoring hub description {}: {err}",
                        path.display()
                    ));
                    None
                }
            }
        });

        let mut hub = Hub::new(self.hub_name, self.genome, self.mode);
        hub.email = self.email;
        hub.url = self.hub_url;
        hub.description = description;

        CreateRequest {
            signal_patterns: self.bigwig,
            annotation_patterns: self.bigbed,
            sample_sheet: self.sample_sheet,
            sample_regex: self.sample_regex,
            annotation_regex: self.annotation_regex,
            hub,
            layout: self.layout,
            output_dir: self.output_dir,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads an explicit config file, or `trackhub.json` from the working
    /// directory when present. No file means an empty config.
    pub fn load(path: Option<&Path>) -> Result<Config, HubError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if !config_path.exists() {
            return match path {
                Some(_) => Err(HubError::MissingConfig(config_path)),
                None => Ok(Config::default()),
            };
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| HubError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| HubError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, HubError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let hub_name = required(config.hub_name, "hub_name")?;
        let genome = required(config.genome, "genome")?;
        let output_dir = Utf8PathBuf::from(required(config.output_dir, "output_dir")?);

        if config.bigwig.is_empty() && config.bigbed.is_empty() {
            return Err(HubError::NoInputs);
        }

        Ok(ResolvedConfig {
            schema_version,
            hub_name,
            genome,
            output_dir,
            bigwig: config.bigwig,
            bigbed: config.bigbed,
            sample_sheet: config.sample_sheet.map(PathBuf::from),
            sample_regex: config.sample_regex,
            annotation_regex: config.annotation_regex,
            email: config.email.unwrap_or_else(|| DEFAULT_HUB_EMAIL.to_string()),
            hub_url: config.hub_url,
            hub_description: config.hub_description.map(PathBuf::from),
            mode: config.mode.unwrap_or_default(),
            layout: config.layout.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, HubError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| HubError::MissingSetting(name.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::diagnostics::MemorySink;

    fn minimal() -> Config {
        Config {
            hub_name: Some("Ribo".to_string()),
            genome: Some("hg38".to_string()),
            output_dir: Some("hubs".to_string()),
            bigwig: vec!["data/*.bw".to_string()],
            ..Config::default()
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let resolved = ConfigLoader::resolve_config(minimal()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.email, "noreply@example.com");
        assert_eq!(resolved.mode, BrowserMode::Native);
        assert_eq!(resolved.layout, HubLayout::Unified);
        assert_eq!(resolved.output_dir, Utf8PathBuf::from("hubs"));
    }

    #[test]
    fn resolve_requires_inputs_and_names() {
        let mut config = minimal();
        config.bigwig.clear();
        assert_matches!(ConfigLoader::resolve_config(config), Err(HubError::NoInputs));

        let mut config = minimal();
        config.genome = Some("  ".to_string());
        assert_matches!(
            ConfigLoader::resolve_config(config),
            Err(HubError::MissingSetting(name)) if name == "genome"
        );
    }

    #[test]
    fn overlay_prefers_command_line() {
        let file = Config {
            genome: Some("mm10".to_string()),
            bigbed: vec!["peaks/*.bb".to_string()],
            mode: Some(BrowserMode::CrossCompatible),
            ..minimal()
        };
        let cli = Config {
            genome: Some("hg19".to_string()),
            bigwig: vec!["other/*.bw".to_string()],
            ..Config::default()
        };

        let merged = file.overlay(cli);
        assert_eq!(merged.genome.as_deref(), Some("hg19"));
        assert_eq!(merged.bigwig, vec!["other/*.bw".to_string()]);
        assert_eq!(merged.bigbed, vec!["peaks/*.bb".to_string()]);
        assert_eq!(merged.mode, Some(BrowserMode::CrossCompatible));
        assert_eq!(merged.hub_name.as_deref(), Some("Ribo"));
    }

    #[test]
    fn load_parses_json_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("trackhub.json");
        fs::write(
            &path,
            r#"{"hub_name":"Ribo","genome":"hg38","mode":"cross-compatible","layout":"per-kind","bigbed":["*.bb"]}"#,
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(config.mode, Some(BrowserMode::CrossCompatible));
        assert_eq!(config.layout, Some(HubLayout::PerKind));
        assert_eq!(config.bigbed, vec!["*.bb".to_string()]);
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = ConfigLoader::load(Some(Path::new("/no/such/trackhub.json")));
        assert_matches!(result, Err(HubError::MissingConfig(_)));
    }

    #[test]
    fn missing_description_only_warns() {
        let mut config = minimal();
        config.hub_description = Some("/no/such/description.html".to_string());
        let resolved = ConfigLoader::resolve_config(config).unwrap();

        let sink = MemorySink::new();
        let request = resolved.into_request(&sink);
        assert!(request.hub.description.is_none());
        assert_eq!(sink.warnings().len(), 1);
    }
}
