use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::averages::EDUCATION_LEVELS;
use crate::histogram::Thresholds;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub averages: AveragesConfig,
    #[serde(default)]
    pub histogram: HistogramConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragesConfig {
    /// Parental education levels, in axis order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for AveragesConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
        }
    }
}

fn default_categories() -> Vec<String> {
    EDUCATION_LEVELS.iter().map(|level| level.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    #[serde(default)]
    pub lo: f64,
    #[serde(default = "default_hi")]
    pub hi: f64,
    #[serde(default = "default_thresholds")]
    pub thresholds: Thresholds,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            lo: 0.0,
            hi: default_hi(),
            thresholds: default_thresholds(),
        }
    }
}

fn default_hi() -> f64 {
    100.0
}

fn default_thresholds() -> Thresholds {
    Thresholds::Nice(40)
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("failed to serialize default config")
    }
}
