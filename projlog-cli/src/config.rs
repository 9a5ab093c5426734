//! Configuration loading and parsing
//!
//! The project plan lives in a TOML file: project metadata, the optional log
//! source, the baseline schedule, and the EVM series. Config problems are
//! fatal at startup; there is no sensible degraded mode for a malformed plan.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use projlog_core::{BaselineItem, EvmSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from a plan TOML file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub baseline: Vec<BaselineItem>,
    #[serde(default)]
    pub evm: Vec<EvmSnapshot>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Date week 1 starts, as "YYYY-MM-DD"
    pub start_date: NaiveDate,
    #[serde(default = "default_total_weeks")]
    pub total_weeks: u32,
    pub budget_at_completion: f64,
    /// Optional fixed week override; when absent the week is derived from
    /// the start date and today's date
    #[serde(default)]
    pub current_week: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// URL of the status sheet CSV export
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,
}

fn default_total_weeks() -> u32 {
    12
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_secs() -> u64 {
    60
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

impl AppConfig {
    /// Reject plans the pipeline cannot run on. Fatal at startup.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            bail!("project.name must not be empty");
        }
        if self.project.total_weeks == 0 {
            bail!("project.total_weeks must be at least 1");
        }
        if self.project.budget_at_completion <= 0.0 {
            bail!("project.budget_at_completion must be positive");
        }
        if let Some(week) = self.project.current_week {
            if week == 0 || week > self.project.total_weeks {
                bail!(
                    "project.current_week must be in 1..={}",
                    self.project.total_weeks
                );
            }
        }

        if self.baseline.is_empty() {
            bail!("baseline must contain at least one document");
        }
        let mut seen = HashSet::new();
        for item in &self.baseline {
            if item.document.trim().is_empty() {
                bail!("baseline document names must not be empty");
            }
            if !seen.insert(item.document.as_str()) {
                bail!("duplicate baseline document: {:?}", item.document);
            }
            if item.target_week == 0 || item.target_week > self.project.total_weeks {
                bail!(
                    "baseline document {:?} has target_week {} outside 1..={}",
                    item.document,
                    item.target_week,
                    self.project.total_weeks
                );
            }
        }

        let mut previous_week = 0;
        for snapshot in &self.evm {
            if snapshot.week <= previous_week {
                bail!(
                    "evm series weeks must be strictly increasing (week {} follows {})",
                    snapshot.week,
                    previous_week
                );
            }
            previous_week = snapshot.week;
            if snapshot.pv < 0.0 || snapshot.ev < 0.0 || snapshot.ac < 0.0 {
                bail!("evm values for week {} must not be negative", snapshot.week);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLAN: &str = r#"
        [project]
        name = "Office Supplies"
        start_date = "2025-11-10"
        total_weeks = 12
        budget_at_completion = 500000.0

        [source]
        url = "https://example.com/log.csv"

        [[baseline]]
        document = "Project Charter"
        phase = "initiation"
        pic_role = "PM"
        target_week = 1

        [[baseline]]
        document = "SRS"
        phase = "planning"
        pic_role = "BA/SA"
        target_week = 3

        [[evm]]
        week = 1
        pv = 40000.0
        ev = 40000.0
        ac = 45000.0

        [[evm]]
        week = 2
        pv = 80000.0
        ev = 75000.0
        ac = 85000.0
    "#;

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = toml::from_str(PLAN).unwrap();
        assert_eq!(config.project.name, "Office Supplies");
        assert_eq!(config.project.total_weeks, 12);
        assert_eq!(config.baseline.len(), 2);
        assert_eq!(config.evm.len(), 2);

        let source = config.source.as_ref().unwrap();
        assert_eq!(source.timeout_secs, 10);
        assert_eq!(source.cache_secs, 60);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_source_is_optional() {
        let plan = PLAN.replace("[source]", "[removed]").replace(
            "url = \"https://example.com/log.csv\"",
            "ignored = true",
        );
        let config: AppConfig = toml::from_str(&plan).unwrap();
        assert!(config.source.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.baseline[1].document, "SRS");
    }

    #[test]
    fn test_duplicate_baseline_document_rejected() {
        let plan = PLAN.replace("document = \"SRS\"", "document = \"Project Charter\"");
        let config: AppConfig = toml::from_str(&plan).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate baseline document"), "{err}");
    }

    #[test]
    fn test_target_week_out_of_range_rejected() {
        let plan = PLAN.replace("target_week = 3", "target_week = 13");
        let config: AppConfig = toml::from_str(&plan).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_budget_rejected() {
        let plan = PLAN.replace(
            "budget_at_completion = 500000.0",
            "budget_at_completion = 0.0",
        );
        let config: AppConfig = toml::from_str(&plan).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unordered_evm_weeks_rejected() {
        let plan = PLAN.replace("week = 2", "week = 1");
        let config: AppConfig = toml::from_str(&plan).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("strictly increasing"), "{err}");
    }

    #[test]
    fn test_empty_baseline_rejected() {
        let plan: String = PLAN
            .lines()
            .take_while(|line| !line.contains("[[baseline]]"))
            .collect::<Vec<_>>()
            .join("\n");
        let config: AppConfig = toml::from_str(&plan).unwrap();
        assert!(config.validate().is_err());
    }
}
