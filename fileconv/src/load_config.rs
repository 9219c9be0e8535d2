//! `load_config` module: reads the optional YAML file that tunes a conversion.
//!
//! ```yaml
//! options:
//!   csv:
//!     delimiter: ";"
//!     write_headers: true
//!   json:
//!     pretty: false
//!   xml:
//!     root_element: people
//!     record_element: person
//!     item_element: item
//!     indent: 4
//! ```
//!
//! Every key is optional. The YAML-side types stay private; callers get a
//! [`CliConfig`] holding core [`ConvertOptions`].

use anyhow::Result;
use fileconv_core::{ConvertOptions, CsvOptions, JsonOptions, XmlOptions};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "FILECONV_CONFIG";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliConfig {
    pub options: ConvertOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    options: RawOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOptions {
    csv: RawCsvOptions,
    json: JsonOptions,
    xml: XmlOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCsvOptions {
    delimiter: Option<String>,
    write_headers: Option<bool>,
}

impl RawCsvOptions {
    fn into_options(self) -> Result<CsvOptions> {
        let defaults = CsvOptions::default();
        let delimiter = match self.delimiter {
            Some(text) => parse_delimiter(&text)?,
            None => defaults.delimiter,
        };
        Ok(CsvOptions {
            delimiter,
            write_headers: self.write_headers.unwrap_or(defaults.write_headers),
        })
    }
}

fn parse_delimiter(text: &str) -> Result<u8> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => {
            error!(delimiter = text, "Rejected CSV delimiter");
            Err(anyhow::anyhow!(
                "CSV delimiter must be a single ASCII character"
            ))
        }
    }
}

/// Picks the config file: the `--config` flag wins over [`CONFIG_ENV_VAR`].
pub fn resolve_config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(config_path_from_env)
}

/// Reads [`CONFIG_ENV_VAR`], ignoring it when blank.
pub fn config_path_from_env() -> Option<PathBuf> {
    let value = std::env::var(CONFIG_ENV_VAR).ok()?;
    if value.trim().is_empty() {
        return None;
    }
    debug!(config_path = %value, "Using config path from environment");
    Some(PathBuf::from(value))
}

/// Loads a YAML config file into conversion options.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file deserialises to a YAML null, which means "all defaults".
    let raw: RawConfig = match serde_yaml::from_str::<Option<RawConfig>>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf.unwrap_or_default()
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    Ok(CliConfig {
        options: ConvertOptions {
            csv: raw.options.csv.into_options()?,
            json: raw.options.json,
            xml: raw.options.xml,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_must_be_one_ascii_char() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
        for bad in ["", ";;", "é"] {
            let err = parse_delimiter(bad).unwrap_err();
            assert_eq!(
                err.to_string(),
                "CSV delimiter must be a single ASCII character"
            );
        }
    }

    #[test]
    fn flag_wins_over_environment() {
        let flag = PathBuf::from("from-flag.yaml");
        assert_eq!(resolve_config_path(Some(flag.clone())), Some(flag));
    }
}
