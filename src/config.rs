use crate::error::{AgroError, Result};
use crate::models::{CropProfiles, CropType};
use crate::report::ReportFormat;
use dialoguer::{Input, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub crop_profiles: CropProfiles,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Days of readings behind the insights and per-parcela views.
    #[serde(default = "default_insight_window")]
    pub insight_window_days: i64,
    /// Days of readings included in exported reports.
    #[serde(default = "default_export_window")]
    pub export_window_days: i64,
    /// Readings newer than this many days count as "recent" for trends.
    #[serde(default = "default_trend_recent")]
    pub trend_recent_days: i64,
}

fn default_insight_window() -> i64 {
    7
}

fn default_export_window() -> i64 {
    30
}

fn default_trend_recent() -> i64 {
    crate::logic::trends::DEFAULT_RECENT_DAYS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            insight_window_days: default_insight_window(),
            export_window_days: default_export_window(),
            trend_recent_days: default_trend_recent(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub default_format: ReportFormat,
    /// Where reports are written; the current directory when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Loads the config file, or built-in defaults when there is none.
    ///
    /// An explicit `--config` path must exist.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(AgroError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p
            }
            None => {
                let p = Self::find_config_path()?;
                if !p.exists() {
                    tracing::debug!(path = ?p, "No config file, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| AgroError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::parse(&config_str)?;
        tracing::debug!(path = ?config_path, "Loaded configuration");
        Ok(config)
    }

    /// Parses YAML after `${VAR}` substitution and validates the result.
    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| AgroError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let a = &self.analysis;
        if a.insight_window_days <= 0 || a.export_window_days <= 0 || a.trend_recent_days <= 0 {
            return Err(AgroError::Config(
                "analysis windows must be positive numbers of days".into(),
            ));
        }
        if a.trend_recent_days >= a.insight_window_days {
            tracing::warn!(
                trend_recent_days = a.trend_recent_days,
                insight_window_days = a.insight_window_days,
                "Trend window covers the whole insight window; trends will be empty"
            );
        }
        self.crop_profiles.validate()
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        Self::default_config_path()
    }

    /// Default path for writing new config files (~/.config/agroinsights/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgroError::Config("Cannot determine config directory".into()))?
            .join("agroinsights");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up agroinsights!");
        println!();

        let defaults = Self::default();

        println!("Analysis windows");
        let insight_window_days: i64 = Input::new()
            .with_prompt("  Days of readings for insights")
            .default(defaults.analysis.insight_window_days)
            .interact_text()
            .map_err(|e| AgroError::Config(format!("Input error: {}", e)))?;

        let export_window_days: i64 = Input::new()
            .with_prompt("  Days of readings in exported reports")
            .default(defaults.analysis.export_window_days)
            .interact_text()
            .map_err(|e| AgroError::Config(format!("Input error: {}", e)))?;

        let trend_recent_days: i64 = Input::new()
            .with_prompt("  Days considered recent for trends")
            .default(defaults.analysis.trend_recent_days)
            .interact_text()
            .map_err(|e| AgroError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Reports");
        let formats = [ReportFormat::Structured, ReportFormat::Narrative];
        let format_names: Vec<&str> = formats.iter().map(|f| f.as_str()).collect();
        let format_idx = Select::new()
            .with_prompt("  Default export format")
            .items(&format_names[..])
            .default(0)
            .interact()
            .map_err(|e| AgroError::Config(format!("Input error: {}", e)))?;

        let output_dir: String = Input::new()
            .with_prompt("  Output directory (blank for current directory)")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AgroError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Crop profiles");
        let default_crop: String = Input::new()
            .with_prompt("  Crop used when a parcela's crop has no profile")
            .default(defaults.crop_profiles.default_crop.to_string())
            .interact_text()
            .map_err(|e| AgroError::Config(format!("Input error: {}", e)))?;

        println!();

        let mut crop_profiles = defaults.crop_profiles;
        crop_profiles.default_crop = CropType::from_str(&default_crop);

        let config = Config {
            analysis: AnalysisConfig {
                insight_window_days,
                export_window_days,
                trend_recent_days,
            },
            export: ExportConfig {
                default_format: formats[format_idx],
                output_dir: (!output_dir.trim().is_empty()).then(|| PathBuf::from(output_dir.trim())),
            },
            crop_profiles,
        };
        config.validate()?;

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| AgroError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# agroinsights configuration\n# Generated by `agroinsights init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        // Pattern is a literal and known to compile.
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return content.to_string();
        };

        re.replace_all(content, |caps: &regex_lite::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("AGROINSIGHTS_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| AgroError::Config("Cannot determine data directory".into()))?
            .join("agroinsights");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("agroinsights.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analysis.insight_window_days, 7);
        assert_eq!(config.analysis.export_window_days, 30);
        assert_eq!(config.analysis.trend_recent_days, 3);
        assert_eq!(config.export.default_format, ReportFormat::Structured);
        assert_eq!(config.crop_profiles.crops().count(), 4);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
analysis:
  export_window_days: 14
export:
  default_format: narrative
  output_dir: /tmp/reportes
"#,
        )
        .unwrap();
        assert_eq!(config.analysis.export_window_days, 14);
        assert_eq!(config.analysis.insight_window_days, 7);
        assert_eq!(config.export.default_format, ReportFormat::Narrative);
        assert_eq!(config.export.output_dir, Some(PathBuf::from("/tmp/reportes")));
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("AGROINSIGHTS_TEST_OUT_DIR", "/srv/reportes");
        let config = Config::parse(
            "export:\n  output_dir: ${AGROINSIGHTS_TEST_OUT_DIR}\n",
        )
        .unwrap();
        assert_eq!(config.export.output_dir, Some(PathBuf::from("/srv/reportes")));
    }

    #[test]
    fn unset_env_var_is_left_in_place() {
        let out = Config::substitute_env_vars("dir: ${AGROINSIGHTS_TEST_NEVER_SET_42}");
        assert_eq!(out, "dir: ${AGROINSIGHTS_TEST_NEVER_SET_42}");
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let err = Config::parse(
            r#"
crop_profiles:
  default_crop: Maíz
  profiles:
    Maíz:
      humedad: { min: 80, max: 60 }
      ph: { min: 6.0, max: 7.0 }
      nitrogeno: { min: 120, max: 180 }
      temperatura: { min: 20, max: 30 }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AgroError::Config(_)));
    }

    #[test]
    fn non_positive_window_is_rejected() {
        assert!(Config::parse("analysis:\n  insight_window_days: 0\n").is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = Config::load(Some(PathBuf::from("/nonexistent/agroinsights.yaml"))).unwrap_err();
        assert!(matches!(err, AgroError::Config(_)));
    }
}
