//! CountUp configuration file handling
//!
//! `countup.toml` describes a set of counters animated side by side:
//!
//! ```toml
//! [display]
//! fps = 60
//!
//! [[counter]]
//! label = "Downloads"
//! end = 125000
//! duration = 2500
//! ```

use anyhow::{Context, Result};
use countup_animation::{AnimationConfig, NumberLocale};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default file name looked up by `countup file` and written by `countup init`
pub const CONFIG_FILE_NAME: &str = "countup.toml";

/// Contents of `countup.toml`
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default, rename = "counter")]
    pub counters: Vec<CounterConfig>,
}

/// Terminal output settings
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Frames per second of the refresh loop
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Separators applied to every counter
    #[serde(default)]
    pub locale: NumberLocale,
}

fn default_fps() -> u32 {
    60
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            locale: NumberLocale::default(),
        }
    }
}

/// One `[[counter]]` entry
#[derive(Debug, Deserialize, Serialize)]
pub struct CounterConfig {
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub animation: AnimationConfig,
}

impl FileConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "No {} found. Run `countup init` to create one.",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: FileConfig = toml::from_str(content)?;

        if config.display.fps == 0 {
            anyhow::bail!("display.fps must be greater than zero");
        }
        for (index, counter) in config.counters.iter_mut().enumerate() {
            if !counter.animation.end_value.is_finite() {
                anyhow::bail!("counter #{} has a non-finite end value", index + 1);
            }
            if counter.label.is_empty() {
                counter.label = format!("counter {}", index + 1);
            }
            counter.animation.locale = config.display.locale.clone();
        }

        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize countup config")
    }

    /// Example configuration written by `countup init`
    pub fn example() -> Self {
        let counter = |label: &str, end: f64, duration: f64, delay: f64| CounterConfig {
            label: label.to_string(),
            animation: AnimationConfig {
                duration,
                delay,
                ..AnimationConfig::to(end)
            },
        };

        let mut revenue = counter("Revenue", 98_765.43, 3000.0, 500.0);
        revenue.animation.format = countup_animation::NumberFormat::Decimal;

        Self {
            display: DisplayConfig::default(),
            counters: vec![
                counter("Downloads", 125_000.0, 2500.0, 0.0),
                counter("Stars", 4_200.0, 2000.0, 250.0),
                revenue,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countup_animation::{Easing, NumberFormat};

    #[test]
    fn test_parse_counters() {
        let config = FileConfig::from_toml_str(
            r#"
            [display]
            fps = 30

            [[counter]]
            label = "Users"
            start = 100
            end = 1500
            duration = 1200
            easing = "linear"

            [[counter]]
            end = 9.99
            format = "decimal"
            "#,
        )
        .unwrap();

        assert_eq!(config.display.fps, 30);
        assert_eq!(config.counters.len(), 2);

        let users = &config.counters[0];
        assert_eq!(users.label, "Users");
        assert_eq!(users.animation.start_value, Some(100.0));
        assert_eq!(users.animation.end_value, 1500.0);
        assert_eq!(users.animation.duration, 1200.0);
        assert!(matches!(users.animation.easing, Easing::Linear));

        let second = &config.counters[1];
        assert_eq!(second.label, "counter 2");
        assert_eq!(second.animation.start_value, None);
        assert_eq!(second.animation.duration, 2000.0);
        assert!(matches!(second.animation.format, NumberFormat::Decimal));
    }

    #[test]
    fn test_display_locale_applies_to_counters() {
        let config = FileConfig::from_toml_str(
            r#"
            [display.locale]
            group_separator = "."
            decimal_separator = ","

            [[counter]]
            end = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.display.fps, 60);
        assert_eq!(config.counters[0].animation.locale, NumberLocale::new('.', ','));
    }

    #[test]
    fn test_rejects_zero_fps() {
        let err = FileConfig::from_toml_str("[display]\nfps = 0\n").unwrap_err();
        assert!(err.to_string().contains("fps"));
    }

    #[test]
    fn test_rejects_non_numeric_end() {
        assert!(FileConfig::from_toml_str("[[counter]]\nend = \"lots\"\n").is_err());
    }

    #[test]
    fn test_example_survives_serialization() {
        let text = FileConfig::example().to_toml().unwrap();
        let parsed = FileConfig::from_toml_str(&text).unwrap();

        assert_eq!(parsed.counters.len(), 3);
        assert_eq!(parsed.counters[2].label, "Revenue");
        assert_eq!(parsed.counters[2].animation.end_value, 98_765.43);
        assert_eq!(parsed.counters[1].animation.delay, 250.0);
    }

    #[test]
    fn test_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/countup.toml")).unwrap_err();
        assert!(err.to_string().contains("countup init"));
    }
}
