//! Configuration types and builders.

use crate::error::{ConfigError, GuardError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Placeholder replaced by the target table name inside a marker.
pub const TABLE_PLACEHOLDER: &str = "{table}";

/// A structural marker and the weight it contributes when shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerWeight {
    pub marker: String,
    pub weight: u32,
}

impl MarkerWeight {
    pub fn new(marker: impl Into<String>, weight: u32) -> Self {
        Self {
            marker: marker.into(),
            weight,
        }
    }
}

/// Similarity scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub markers: Vec<MarkerWeight>,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                MarkerWeight::new("select", 15),
                MarkerWeight::new("from {table}", 15),
                MarkerWeight::new("where", 10),
                MarkerWeight::new("group by", 10),
                MarkerWeight::new("order by", 10),
                MarkerWeight::new("limit", 5),
                MarkerWeight::new("count", 10),
                MarkerWeight::new("avg", 10),
                MarkerWeight::new("sum", 10),
                MarkerWeight::new("round", 5),
            ],
            high_threshold: 80.0,
            medium_threshold: 60.0,
        }
    }
}

impl ScoringConfig {
    pub fn total_weight(&self) -> u64 {
        self.markers.iter().map(|m| u64::from(m.weight)).sum()
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.markers.is_empty() {
            return Err(ConfigError::MissingField("scoring.markers".into()));
        }
        if let Some(marker) = self.markers.iter().find(|m| m.marker.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "scoring.markers".into(),
                message: format!("Marker with weight {} has empty text", marker.weight).into(),
            });
        }
        if self.total_weight() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scoring.markers".into(),
                message: "Total marker weight must be greater than 0".into(),
            });
        }
        let in_range = |t: f64| (0.0..=100.0).contains(&t);
        if !in_range(self.high_threshold) || !in_range(self.medium_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "scoring thresholds".into(),
                message: "Thresholds must be between 0 and 100".into(),
            });
        }
        if self.medium_threshold > self.high_threshold {
            return Err(ConfigError::InvalidValue {
                field: "scoring.medium_threshold".into(),
                message: "Medium threshold must not exceed high threshold".into(),
            });
        }
        Ok(())
    }
}

/// Guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Table targeted by generated queries.
    pub table_name: String,
    pub scoring: ScoringConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            table_name: "freelancer_earnings".into(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl GuardConfig {
    pub fn builder() -> GuardConfigBuilder {
        GuardConfigBuilder::default()
    }
}

/// Builder for GuardConfig with fluent API.
#[derive(Default)]
pub struct GuardConfigBuilder {
    config: GuardConfig,
}

impl GuardConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.config.table_name = table_name.into();
        self
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.config.scoring = scoring;
        self
    }

    pub fn markers(mut self, markers: Vec<MarkerWeight>) -> Self {
        self.config.scoring.markers = markers;
        self
    }

    pub fn thresholds(mut self, high: f64, medium: f64) -> Self {
        self.config.scoring.high_threshold = high;
        self.config.scoring.medium_threshold = medium;
        self
    }

    /// Load a JSON config file, replacing the current values.
    pub fn from_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.config = serde_json::from_str(&contents)?;
        Ok(self)
    }

    /// Apply overrides from environment variables.
    pub fn from_env(mut self) -> Result<Self> {
        if let Ok(table) = env::var("SQL_GUARD_TABLE") {
            self.config.table_name = table;
        }

        if let Ok(high) = env::var("SQL_GUARD_HIGH_THRESHOLD") {
            self.config.scoring.high_threshold = parse_threshold("SQL_GUARD_HIGH_THRESHOLD", &high)?;
        }

        if let Ok(medium) = env::var("SQL_GUARD_MEDIUM_THRESHOLD") {
            self.config.scoring.medium_threshold =
                parse_threshold("SQL_GUARD_MEDIUM_THRESHOLD", &medium)?;
        }

        Ok(self)
    }

    pub fn build(self) -> Result<GuardConfig> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<()> {
        if self.config.table_name.trim().is_empty() {
            return Err(ConfigError::MissingField("table_name".into()).into());
        }
        self.config.scoring.validate()?;
        Ok(())
    }
}

fn parse_threshold(field: &'static str, value: &str) -> Result<f64> {
    value.trim().parse().map_err(|_| {
        GuardError::Config(ConfigError::InvalidValue {
            field: field.into(),
            message: format!("Invalid threshold: {}", value).into(),
        })
    })
}
